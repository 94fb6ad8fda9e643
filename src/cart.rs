//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{TotalsError, subtotal},
    products::Product,
};

/// Errors related to cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product id, product currency, cart currency).
    #[error("product {0} is priced in {1}, but the cart holds {2}")]
    CurrencyMismatch(u32, &'static str, &'static str),
}

/// The cart aggregate: an ordered list of line items plus the panel flag.
///
/// Lines are kept in first-add order; re-adding an existing line bumps its
/// quantity in place and never moves it. Every line shares the cart currency.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<LineItem>,
    is_open: bool,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty, closed cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            is_open: false,
            currency,
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// If a line with the same `(product id, variant)` key already exists its
    /// quantity is incremented and its snapshot left untouched; otherwise a
    /// new line is appended with quantity 1. Opens the cart panel either way.
    /// Out-of-stock products are accepted; stock warnings are a display
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] if the product is priced in
    /// a different currency than the cart.
    pub fn add_item(&mut self, product: &Product, variant: Option<&str>) -> Result<(), CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(line) = self.find_mut(product.id, variant) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.items.push(LineItem::from_product(product, variant));
        }

        self.is_open = true;

        Ok(())
    }

    /// Remove the line with the given identity key. No-op if absent.
    pub fn remove_item(&mut self, product_id: u32, variant: Option<&str>) {
        self.items
            .retain(|line| !line.matches(product_id, variant));
    }

    /// Adjust a line's quantity by `delta`, clamping at 1.
    ///
    /// Dropping a line entirely is [`Cart::remove_item`]'s job; driving the
    /// quantity down only ever floors it. No-op if the line is absent. No
    /// upper bound is enforced here; stock limits belong to the catalog.
    pub fn update_quantity(&mut self, product_id: u32, variant: Option<&str>, delta: i32) {
        if let Some(line) = self.find_mut(product_id, variant) {
            line.quantity = line.quantity.saturating_add_signed(delta).max(1);
        }
    }

    /// Remove every line. Leaves the panel flag alone.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Show the cart panel.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Hide the cart panel.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Whether the cart panel is currently shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The lines in first-add order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by identity key.
    #[must_use]
    pub fn get(&self, product_id: u32, variant: Option<&str>) -> Option<&LineItem> {
        self.items
            .iter()
            .find(|line| line.matches(product_id, variant))
    }

    /// Iterate over the lines in first-add order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Sum of line totals, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, TotalsError> {
        subtotal(&self.items, self.currency)
    }

    /// The cart currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    pub(crate) fn from_lines(items: Vec<LineItem>, currency: &'static Currency) -> Self {
        Cart {
            items,
            is_open: false,
            currency,
        }
    }

    fn find_mut(&mut self, product_id: u32, variant: Option<&str>) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|line| line.matches(product_id, variant))
    }
}
