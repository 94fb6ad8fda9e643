//! Cart store
//!
//! The owned, injected service the original system kept as a global reactive
//! store. One instance per running app, constructed at the composition root;
//! UI layers call its operations and subscribe for change notifications.

use std::fmt;

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{Cart, CartError},
    items::LineItem,
    pricing::{self, CartTotals, PricingPolicy, TotalsError},
    products::Product,
    records::CartRecord,
    storage::{CartStorage, StorageError},
};

/// Storage key carts are persisted under by default.
pub const DEFAULT_STORAGE_KEY: &str = "cart-storage";

/// Subscription interface for cart changes.
///
/// Consumers subscribe instead of polling; the store calls
/// [`CartObserver::cart_changed`] after every mutation, whether or not the
/// accompanying persistence write succeeded.
pub trait CartObserver {
    /// Called after every cart mutation with the new state.
    fn cart_changed(&mut self, cart: &Cart);

    /// Called when a persistence write fails. The in-memory cart is still
    /// valid; persistence is best-effort.
    fn persist_failed(&mut self, _error: &StorageError) {}
}

/// An observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn cart_changed(&mut self, _cart: &Cart) {}
}

/// Cart service owning the cart state, pricing policy and storage backend.
///
/// Every mutating operation runs to completion on the caller's thread, then
/// writes the new state to storage and notifies observers. The persisted copy
/// seeds the next session; two live instances over the same key are not
/// reconciled, and the last writer wins on the next load.
pub struct CartStore<S> {
    cart: Cart,
    policy: PricingPolicy,
    storage: S,
    storage_key: String,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("policy", &self.policy)
            .field("storage", &self.storage)
            .field("storage_key", &self.storage_key)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Open a store, rehydrating any cart persisted under `storage_key`.
    ///
    /// A missing, unreadable or malformed persisted cart degrades to an
    /// empty one: rehydration never fails and never propagates parse
    /// errors. The panel flag is not rehydrated; a fresh session always
    /// starts closed.
    pub fn open(
        storage: S,
        storage_key: impl Into<String>,
        currency: &'static Currency,
        policy: PricingPolicy,
    ) -> Self {
        let storage_key = storage_key.into();

        let cart = match storage.load(&storage_key) {
            Ok(Some(record)) => match record.into_cart(currency) {
                Ok(cart) => cart,
                Err(error) => {
                    tracing::warn!(error = %error, "persisted cart is malformed; starting empty");
                    Cart::new(currency)
                }
            },
            Ok(None) => Cart::new(currency),
            Err(error) => {
                tracing::warn!(error = %error, "failed to load persisted cart; starting empty");
                Cart::new(currency)
            }
        };

        Self {
            cart,
            policy,
            storage,
            storage_key,
            observers: Vec::new(),
        }
    }

    /// Subscribe an observer to cart changes.
    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// Add one unit of a product, opening the cart panel.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product's currency does not match the
    /// cart's.
    pub fn add_item(&mut self, product: &Product, variant: Option<&str>) -> Result<(), CartError> {
        self.cart.add_item(product, variant)?;
        self.after_mutation();

        Ok(())
    }

    /// Remove a line by identity key. No-op if absent.
    pub fn remove_item(&mut self, product_id: u32, variant: Option<&str>) {
        self.cart.remove_item(product_id, variant);
        self.after_mutation();
    }

    /// Adjust a line's quantity by `delta`, clamping at 1. No-op if absent.
    pub fn update_quantity(&mut self, product_id: u32, variant: Option<&str>, delta: i32) {
        self.cart.update_quantity(product_id, variant, delta);
        self.after_mutation();
    }

    /// Empty the cart. Leaves the panel flag alone.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.after_mutation();
    }

    /// Show the cart panel.
    pub fn open_cart(&mut self) {
        self.cart.open();
        self.after_mutation();
    }

    /// Hide the cart panel.
    pub fn close_cart(&mut self) {
        self.cart.close();
        self.after_mutation();
    }

    /// The current cart state.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The lines in first-add order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// Whether the cart panel is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.cart.is_open()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, TotalsError> {
        self.cart.subtotal()
    }

    /// Tax on the current subtotal under the injected policy rate.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn tax(&self) -> Result<Money<'static, Currency>, TotalsError> {
        Ok(self.totals()?.tax)
    }

    /// Grand total: subtotal plus tax plus shipping.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn total(&self) -> Result<Money<'static, Currency>, TotalsError> {
        Ok(self.totals()?.total)
    }

    /// Full totals breakdown under the injected pricing policy.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn totals(&self) -> Result<CartTotals, TotalsError> {
        pricing::totals(&self.cart, &self.policy)
    }

    /// The injected pricing policy.
    #[must_use]
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Persist the new state best-effort, then notify observers.
    ///
    /// A failed write is logged and reported; the in-memory cart stays the
    /// source of truth for the rest of the session.
    fn after_mutation(&mut self) {
        let record = CartRecord::from_cart(&self.cart);

        if let Err(error) = self.storage.save(&self.storage_key, &record) {
            tracing::warn!(error = %error, "cart persistence failed; continuing in memory");

            for observer in &mut self.observers {
                observer.persist_failed(&error);
            }
        }

        for observer in &mut self.observers {
            observer.cart_changed(&self.cart);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, io, rc::Rc};

    use decimal_percentage::Percentage;
    use rusty_money::iso::USD;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::storage::{MemoryStorage, YamlFileStorage};

    use super::*;

    fn product(id: u32, minor: i64) -> Product {
        Product {
            id,
            slug: format!("product-{id}"),
            name: format!("Product {id}"),
            price: Money::from_minor(minor, USD),
            image: format!("https://cdn.example/{id}.jpg"),
            category: "Apparel".to_string(),
            in_stock: true,
            sizes: smallvec!["M".to_string(), "L".to_string()],
        }
    }

    /// Storage whose writes always fail.
    #[derive(Debug, Default)]
    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn load(&self, _key: &str) -> Result<Option<CartRecord>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _key: &str, _record: &CartRecord) -> Result<(), StorageError> {
            Err(StorageError::Io(io::Error::other("quota exceeded")))
        }
    }

    /// Observer counting notifications through shared cells.
    struct Probe {
        changes: Rc<Cell<usize>>,
        failures: Rc<Cell<usize>>,
    }

    impl CartObserver for Probe {
        fn cart_changed(&mut self, _cart: &Cart) {
            self.changes.set(self.changes.get() + 1);
        }

        fn persist_failed(&mut self, _error: &StorageError) {
            self.failures.set(self.failures.get() + 1);
        }
    }

    #[test]
    fn opens_empty_when_nothing_is_persisted() {
        let store = CartStore::open(
            MemoryStorage::new(),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        assert!(store.items().is_empty());
        assert!(!store.is_open());
    }

    #[test]
    fn rehydrates_items_but_not_the_panel_flag() -> TestResult {
        let dir = tempfile::tempdir()?;

        {
            let mut store = CartStore::open(
                YamlFileStorage::new(dir.path()),
                DEFAULT_STORAGE_KEY,
                USD,
                PricingPolicy::zero(USD),
            );

            store.add_item(&product(7, 19_99), Some("M"))?;
            store.add_item(&product(7, 19_99), Some("M"))?;
            store.add_item(&product(9, 5_50), None)?;
            assert!(store.is_open());
        }

        let store = CartStore::open(
            YamlFileStorage::new(dir.path()),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        assert_eq!(store.items().len(), 2);
        assert_eq!(store.item_count(), 3);
        assert!(
            !store.is_open(),
            "panel state must not survive rehydration"
        );

        Ok(())
    }

    #[test]
    fn corrupt_persisted_blob_degrades_to_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(format!("{DEFAULT_STORAGE_KEY}.yml")),
            "items: {not: [a, cart",
        )?;

        let store = CartStore::open(
            YamlFileStorage::new(dir.path()),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        assert!(store.items().is_empty());

        Ok(())
    }

    #[test]
    fn malformed_record_degrades_to_empty() -> TestResult {
        // Well-formed YAML whose contents break a cart invariant: two lines
        // with the same identity key.
        let dir = tempfile::tempdir()?;
        let mut seed = CartStore::open(
            YamlFileStorage::new(dir.path()),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );
        seed.add_item(&product(7, 19_99), Some("M"))?;

        let mut record = CartRecord::from_cart(seed.cart());
        let duplicate = record.items.first().ok_or("record is empty")?.clone();
        record.items.push(duplicate);

        let mut storage = YamlFileStorage::new(dir.path());
        storage.save(DEFAULT_STORAGE_KEY, &record)?;

        let store = CartStore::open(
            storage,
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        assert!(store.items().is_empty());

        Ok(())
    }

    #[test]
    fn every_mutation_is_persisted() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = CartStore::open(
            YamlFileStorage::new(dir.path()),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        store.add_item(&product(7, 19_99), Some("M"))?;
        store.update_quantity(7, Some("M"), 2);

        let reader = YamlFileStorage::new(dir.path());
        let record = reader
            .load(DEFAULT_STORAGE_KEY)?
            .ok_or("nothing persisted")?;

        assert_eq!(record.items.first().map(|line| line.quantity), Some(3));

        store.remove_item(7, Some("M"));

        let record = reader
            .load(DEFAULT_STORAGE_KEY)?
            .ok_or("nothing persisted")?;

        assert!(record.items.is_empty());

        Ok(())
    }

    #[test]
    fn failed_persistence_keeps_memory_state_and_reports() -> TestResult {
        let changes = Rc::new(Cell::new(0));
        let failures = Rc::new(Cell::new(0));

        let mut store = CartStore::open(
            FailingStorage,
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        store.subscribe(Box::new(Probe {
            changes: Rc::clone(&changes),
            failures: Rc::clone(&failures),
        }));

        store.add_item(&product(7, 19_99), Some("M"))?;

        // Memory state is intact and fully usable despite the failed write.
        assert_eq!(store.item_count(), 1);
        assert_eq!(store.subtotal()?, Money::from_minor(19_99, USD));
        assert_eq!(failures.get(), 1);
        assert_eq!(changes.get(), 1, "observers still see the change");

        Ok(())
    }

    #[test]
    fn observers_hear_every_mutation() -> TestResult {
        let changes = Rc::new(Cell::new(0));
        let failures = Rc::new(Cell::new(0));

        let mut store = CartStore::open(
            MemoryStorage::new(),
            DEFAULT_STORAGE_KEY,
            USD,
            PricingPolicy::zero(USD),
        );

        store.subscribe(Box::new(Probe {
            changes: Rc::clone(&changes),
            failures: Rc::clone(&failures),
        }));

        store.add_item(&product(1, 100), None)?;
        store.update_quantity(1, None, 2);
        store.close_cart();
        store.open_cart();
        store.remove_item(1, None);
        store.clear_cart();

        assert_eq!(changes.get(), 6);
        assert_eq!(failures.get(), 0);

        Ok(())
    }

    #[test]
    fn totals_use_the_injected_policy() -> TestResult {
        let policy = PricingPolicy::new(Percentage::from(0.1), Money::from_minor(5_00, USD));

        let mut store = CartStore::open(MemoryStorage::new(), DEFAULT_STORAGE_KEY, USD, policy);
        store.add_item(&product(7, 19_99), None)?;

        let breakdown = store.totals()?;

        assert_eq!(breakdown.subtotal, Money::from_minor(19_99, USD));
        assert_eq!(breakdown.tax, Money::from_minor(2_00, USD));
        assert_eq!(breakdown.shipping, Money::from_minor(5_00, USD));
        assert_eq!(breakdown.total, Money::from_minor(26_99, USD));

        assert_eq!(store.tax()?, breakdown.tax);
        assert_eq!(store.total()?, breakdown.total);

        Ok(())
    }
}
