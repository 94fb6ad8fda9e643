//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    fixtures::{Fixture, FixtureError},
    items::LineItem,
    pricing::{CartTotals, PricingPolicy, TotalsError, totals},
    products::Product,
    records::{CartRecord, LineRecord, RecordError},
    storage::{CartStorage, MemoryStorage, StorageError, YamlFileStorage},
    store::{CartObserver, CartStore, DEFAULT_STORAGE_KEY, NoopObserver},
    summary::{SummaryError, write_summary},
};
