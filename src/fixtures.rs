//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::Product;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Catalog product id
    pub id: u32,

    /// URL slug
    pub slug: String,

    /// Display name
    pub name: String,

    /// Price as `"<amount> <ISO code>"`, e.g. `"19.99 USD"`
    pub price: String,

    /// Image URL
    pub image: String,

    /// Category display name
    pub category: String,

    /// Stock flag
    pub in_stock: bool,

    /// Available size labels
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// Parse a fixture price string into minor units and a currency.
///
/// # Errors
///
/// Returns an error if the string is not `"<amount> <code>"`, the amount has
/// more fractional digits than the currency carries, or the code is unknown.
pub fn parse_price(price: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let (amount_str, code) = price
        .split_once(' ')
        .ok_or_else(|| FixtureError::InvalidPrice(price.to_string()))?;

    let currency = iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount: Decimal = amount_str
        .parse()
        .map_err(|_err| FixtureError::InvalidPrice(price.to_string()))?;

    let scaled = amount * Decimal::from(10_i64.pow(currency.exponent));

    if scaled.fract() != Decimal::ZERO {
        return Err(FixtureError::InvalidPrice(price.to_string()));
    }

    scaled
        .to_i64()
        .map(|minor| (minor, currency))
        .ok_or_else(|| FixtureError::InvalidPrice(price.to_string()))
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            id: fixture.id,
            slug: fixture.slug,
            name: fixture.name,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
            category: fixture.category,
            in_stock: fixture.in_stock,
            sizes: fixture.sizes.into_iter().collect::<SmallVec<_>>(),
        })
    }
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products keyed by their fixture string key
    products: FxHashMap<String, Product>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are
    /// currency mismatches within the set.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let (_minor_units, currency) = parse_price(&product_fixture.price)?;

            // A fixture set is single-currency, like the cart it feeds.
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product: Product = product_fixture.try_into()?;
            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load a complete fixture set by name
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Iterate over all loaded products.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Currency of the loaded set, if any products were loaded.
    #[must_use]
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        let (minor, currency) = parse_price("19.99 USD")?;

        assert_eq!(minor, 19_99);
        assert_eq!(currency, USD);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_missing_currency() {
        assert!(matches!(
            parse_price("19.99"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        assert!(matches!(
            parse_price("19.99 ZZZ"),
            Err(FixtureError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn parse_price_rejects_sub_minor_precision() {
        assert!(matches!(
            parse_price("19.999 USD"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn product_fixture_converts_to_product() -> TestResult {
        let yaml = r#"
products:
  classic-tee:
    id: 7
    slug: classic-tee
    name: Classic Tee
    price: "19.99 USD"
    image: https://cdn.example/classic-tee.jpg
    category: T-Shirts
    in_stock: true
    sizes: [S, M, L]
"#;
        let fixture: ProductsFixture = serde_norway::from_str(yaml)?;
        let (_, product_fixture) = fixture
            .products
            .into_iter()
            .next()
            .ok_or("fixture is empty")?;

        let product: Product = product_fixture.try_into()?;

        assert_eq!(product.id, 7);
        assert_eq!(product.price, Money::from_minor(19_99, USD));
        assert_eq!(product.sizes.len(), 3);

        Ok(())
    }

    #[test]
    fn classic_set_loads_with_a_single_currency() -> TestResult {
        let fixture = Fixture::from_set("classic")?;

        assert_eq!(fixture.currency(), Some(USD));
        assert!(fixture.product("classic-tee").is_ok());
        assert!(fixture.products().count() >= 4);

        Ok(())
    }

    #[test]
    fn missing_product_key_errors() -> TestResult {
        let fixture = Fixture::from_set("classic")?;

        assert!(matches!(
            fixture.product("flux-capacitor"),
            Err(FixtureError::ProductNotFound(_))
        ));

        Ok(())
    }
}
