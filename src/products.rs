//! Products

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

/// Catalog product snapshot consumed by the cart.
///
/// The catalog owns the full product record; the cart only ever reads this
/// already-validated view and copies the fields it needs into a line item.
#[derive(Debug, Clone)]
pub struct Product {
    /// Catalog product id
    pub id: u32,

    /// URL slug
    pub slug: String,

    /// Display name
    pub name: String,

    /// Current price
    pub price: Money<'static, Currency>,

    /// Image URL
    pub image: String,

    /// Category display name
    pub category: String,

    /// Whether the product is currently in stock
    pub in_stock: bool,

    /// Available size labels, if the product is sized
    pub sizes: SmallVec<[String; 5]>,
}
