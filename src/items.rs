//! Line items

use rusty_money::{Money, iso::Currency};

use crate::products::Product;

/// One row in a cart.
///
/// A line is uniquely identified by `(product_id, variant)`; everything else
/// is a display snapshot copied from the catalog when the line was first
/// added, never re-synced afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub(crate) product_id: u32,
    pub(crate) variant: Option<String>,
    pub(crate) slug: String,
    pub(crate) name: String,
    pub(crate) image: String,
    pub(crate) category: String,
    pub(crate) unit_price: Money<'static, Currency>,
    pub(crate) quantity: u32,
    pub(crate) in_stock: bool,
}

impl LineItem {
    /// Build a new line from a catalog snapshot, with quantity 1.
    ///
    /// This is the single place the product-to-line field mapping lives, so a
    /// catalog model change surfaces here rather than drifting silently.
    #[must_use]
    pub fn from_product(product: &Product, variant: Option<&str>) -> Self {
        Self {
            product_id: product.id,
            variant: variant.map(ToOwned::to_owned),
            slug: product.slug.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            unit_price: product.price,
            quantity: 1,
            in_stock: product.in_stock,
        }
    }

    /// Returns true if this line has the given identity key.
    #[must_use]
    pub fn matches(&self, product_id: u32, variant: Option<&str>) -> bool {
        self.product_id == product_id && self.variant.as_deref() == variant
    }

    /// Catalog product id of the line.
    #[must_use]
    pub fn product_id(&self) -> u32 {
        self.product_id
    }

    /// Selected variant label, if any.
    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// URL slug snapshot.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name snapshot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image URL snapshot.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Category name snapshot.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Unit price at the time the line was added.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Current quantity, always at least 1.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Stock flag at the time the line was added. Display-only.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.in_stock
    }

    /// `unit_price × quantity`, exact in minor units.
    #[must_use]
    pub fn line_total(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }
}
