//! Cart Demo
//!
//! Walks through a storefront session: load a product catalog fixture, add
//! and adjust cart lines, persist the cart under `target/cart-demo`, and
//! print the order summary.
//!
//! Use `-f` to load a fixture set by name
//! Use `-t` to set the tax rate as a fraction of the subtotal
//! Use `-s` to set a flat shipping fee in minor units

use std::io;

use anyhow::{Result, anyhow};
use clap::Parser;
use decimal_percentage::Percentage;
use rusty_money::Money;
use trolley::{
    fixtures::Fixture,
    pricing::PricingPolicy,
    storage::YamlFileStorage,
    store::{CartStore, DEFAULT_STORAGE_KEY},
    summary::write_summary,
    utils::DemoCartArgs,
};

/// Cart Demo
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = DemoCartArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let currency = fixture
        .currency()
        .ok_or_else(|| anyhow!("fixture set has no products"))?;

    let policy = PricingPolicy::new(
        Percentage::from(args.tax_rate),
        Money::from_minor(args.shipping, currency),
    );

    let storage = YamlFileStorage::new("target/cart-demo");
    let mut store = CartStore::open(storage, DEFAULT_STORAGE_KEY, currency, policy);

    // Start each run from a clean cart; the persisted copy from the previous
    // run was already rehydrated above and would otherwise accumulate.
    store.clear_cart();

    let tee = fixture.product("classic-tee")?.clone();
    let jeans = fixture.product("slim-jeans")?.clone();
    let tote = fixture.product("tote-bag")?.clone();

    store.add_item(&tee, Some("M"))?;
    store.add_item(&tee, Some("M"))?;
    store.add_item(&tee, Some("L"))?;
    store.add_item(&jeans, Some("M"))?;
    store.add_item(&tote, None)?;

    store.update_quantity(tote.id, None, 1);
    store.remove_item(jeans.id, Some("M"));

    let breakdown = store.totals()?;
    write_summary(io::stdout(), store.cart(), &breakdown)?;

    Ok(())
}
