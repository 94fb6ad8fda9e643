//! Cart records
//!
//! Serialized form of a cart, the shape that goes into and comes back out of
//! [`CartStorage`](crate::storage::CartStorage). Money is flattened to minor
//! units plus an ISO currency code so round-trips are exact, and a missing
//! variant is omitted from the serialized form rather than written as null.

use rustc_hash::FxHashSet;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::Cart, items::LineItem};

/// Errors raised while rehydrating a cart from a persisted record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record names a currency code the ISO table does not know.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A line's currency differs from the cart currency.
    #[error("line currency {0} does not match cart currency {1}")]
    CurrencyMismatch(String, &'static str),

    /// Two lines share the same `(product id, variant)` identity key.
    #[error("duplicate cart line for product {product_id}, variant {variant:?}")]
    DuplicateLine {
        /// Product id of the colliding lines.
        product_id: u32,
        /// Variant key of the colliding lines.
        variant: Option<String>,
    },

    /// A line carries a negative unit price.
    #[error("negative unit price: {0} minor units")]
    NegativePrice(i64),
}

/// Serialized cart. Only the lines are persisted; the panel flag is
/// deliberately not, so a rehydrated cart always starts closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Serialized lines in first-add order.
    pub items: Vec<LineRecord>,
}

/// Serialized cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Catalog product id.
    pub product_id: u32,

    /// Selected variant label; omitted when no variant was chosen.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub variant: Option<String>,

    /// URL slug snapshot.
    pub slug: String,

    /// Display name snapshot.
    pub name: String,

    /// Image URL snapshot.
    pub image: String,

    /// Category name snapshot.
    pub category: String,

    /// Unit price in minor units.
    pub unit_price_minor: i64,

    /// ISO alpha currency code of the unit price.
    pub currency: String,

    /// Quantity at save time.
    pub quantity: u32,

    /// Stock flag snapshot.
    pub in_stock: bool,
}

impl CartRecord {
    /// Snapshot a cart into its serialized form.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let items = cart
            .iter()
            .map(|line| LineRecord {
                product_id: line.product_id(),
                variant: line.variant().map(ToOwned::to_owned),
                slug: line.slug().to_string(),
                name: line.name().to_string(),
                image: line.image().to_string(),
                category: line.category().to_string(),
                unit_price_minor: line.unit_price().to_minor_units(),
                currency: line.unit_price().currency().iso_alpha_code.to_string(),
                quantity: line.quantity(),
                in_stock: line.in_stock(),
            })
            .collect();

        Self { items }
    }

    /// Rebuild a cart from this record.
    ///
    /// Quantities below 1 are clamped up rather than rejected; anything that
    /// would break a cart invariant (unknown or mismatched currency, a
    /// duplicate identity key, a negative price) rejects the whole record.
    /// The rebuilt cart always starts closed.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] describing the first malformed line found.
    pub fn into_cart(self, currency: &'static Currency) -> Result<Cart, RecordError> {
        let mut seen: FxHashSet<(u32, Option<String>)> = FxHashSet::default();
        let mut lines = Vec::with_capacity(self.items.len());

        for record in self.items {
            let line_currency = iso::find(&record.currency)
                .ok_or_else(|| RecordError::UnknownCurrency(record.currency.clone()))?;

            if line_currency != currency {
                return Err(RecordError::CurrencyMismatch(
                    record.currency,
                    currency.iso_alpha_code,
                ));
            }

            if record.unit_price_minor < 0 {
                return Err(RecordError::NegativePrice(record.unit_price_minor));
            }

            if !seen.insert((record.product_id, record.variant.clone())) {
                return Err(RecordError::DuplicateLine {
                    product_id: record.product_id,
                    variant: record.variant,
                });
            }

            lines.push(LineItem {
                product_id: record.product_id,
                variant: record.variant,
                slug: record.slug,
                name: record.name,
                image: record.image,
                category: record.category,
                unit_price: Money::from_minor(record.unit_price_minor, line_currency),
                quantity: record.quantity.max(1),
                in_stock: record.in_stock,
            });
        }

        Ok(Cart::from_lines(lines, currency))
    }
}
