//! Utils

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct DemoCartArgs {
    /// Fixture set to use for the product catalog
    #[clap(short, long, default_value = "classic")]
    pub fixture: String,

    /// Tax rate as a fraction of the subtotal (e.g. 0.1 for 10%)
    #[clap(short, long, default_value_t = 0.0)]
    pub tax_rate: f64,

    /// Flat shipping fee in minor units (e.g. 500 for $5.00)
    #[clap(short, long, default_value_t = 0)]
    pub shipping: i64,
}
