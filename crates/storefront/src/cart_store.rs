//! The cart store: single owner of the shopper's cart.
//!
//! Construct one [`CartStore`] at startup, call [`CartStore::load`] once, and
//! pass the store by reference to whatever needs the cart. Every action runs
//! the pure reducer from `fitgear_core::cart`, mirrors the new state to
//! storage, and then notifies subscribers.
//!
//! Storage is a mirror, not the source of truth: a failed write is logged
//! and the in-memory state is kept.

use fitgear_core::{
    CartAction, CartError, CartState, LineKey, OrderSummary, Product, PromoCode, reduce,
};
use tracing::{debug, info, warn};

use crate::error::add_breadcrumb;
use crate::storage::{CART_KEY, CartStorage, StorageError};

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&CartState)>;

/// What [`CartStore::load`] found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored; the cart starts empty.
    Empty,
    /// A snapshot was restored.
    Restored {
        /// Number of line items restored.
        lines: usize,
    },
    /// The stored snapshot was unreadable or invalid and was deleted.
    DiscardedCorrupt,
}

/// Owns the cart state and its persistence.
pub struct CartStore<S: CartStorage> {
    state: CartState,
    storage: S,
    key: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: CartStorage> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store with an empty cart persisted under the default key.
    ///
    /// Nothing is read from storage until [`CartStore::load`] is called.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_KEY)
    }

    /// Create a store persisted under a custom key.
    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            state: CartState::new(),
            storage,
            key: key.into(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a store and immediately restore the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn open(storage: S) -> Result<(Self, LoadOutcome), StorageError> {
        let mut store = Self::new(storage);
        let outcome = store.load()?;
        Ok((store, outcome))
    }

    /// Restore the persisted cart, replacing the in-memory state.
    ///
    /// A snapshot that is not UTF-8, fails to parse, or describes a cart
    /// the reducer rejects is deleted and the cart starts empty. That is
    /// reported as [`LoadOutcome::DiscardedCorrupt`], not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage itself cannot be read.
    pub fn load(&mut self) -> Result<LoadOutcome, StorageError> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.state = CartState::new();
                debug!(key = %self.key, "No persisted cart");
                return Ok(LoadOutcome::Empty);
            }
            Err(e @ StorageError::Corrupt { .. }) => return Ok(self.discard_corrupt(&e)),
            Err(e) => return Err(e),
        };

        let snapshot = match serde_json::from_str::<CartState>(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(self.discard_corrupt(&e)),
        };
        match reduce(&self.state, CartAction::Load(snapshot)) {
            Ok(state) => self.state = state,
            Err(e) => return Ok(self.discard_corrupt(&e)),
        }

        let lines = self.state.items().len();
        info!(
            key = %self.key,
            lines,
            item_count = self.state.item_count(),
            "Restored persisted cart"
        );
        self.notify();
        Ok(LoadOutcome::Restored { lines })
    }

    fn discard_corrupt(&mut self, error: &dyn std::fmt::Display) -> LoadOutcome {
        warn!(key = %self.key, error = %error, "Discarding corrupt cart snapshot");
        if let Err(remove_err) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %remove_err, "Failed to delete corrupt cart snapshot");
        }
        self.state = CartState::new();
        self.notify();
        LoadOutcome::DiscardedCorrupt
    }

    /// Current cart.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action, persist, and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error if the action is invalid; the cart and
    /// storage are left unchanged in that case.
    pub fn dispatch(&mut self, action: CartAction) -> Result<&CartState, CartError> {
        let name = action.name();
        let clears = matches!(action, CartAction::Clear);

        self.state = reduce(&self.state, action)?;
        debug!(
            action = name,
            lines = self.state.items().len(),
            item_count = self.state.item_count(),
            total = %self.state.total(),
            "Applied cart action"
        );
        add_breadcrumb("cart", name, None);

        if clears {
            self.forget();
        } else {
            self.persist();
        }
        self.notify();

        Ok(&self.state)
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero.
    pub fn add(
        &mut self,
        product: Product,
        size: impl Into<String>,
        color: impl Into<String>,
        quantity: u32,
    ) -> Result<&CartState, CartError> {
        self.dispatch(CartAction::Add {
            product: Box::new(product),
            size: size.into(),
            color: color.into(),
            quantity,
        })
    }

    /// Remove a line. Absent lines are ignored.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches [`CartStore::dispatch`].
    pub fn remove(&mut self, key: LineKey) -> Result<&CartState, CartError> {
        self.dispatch(CartAction::Remove(key))
    }

    /// Set a line's quantity; zero or negative removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` exceeds `u32::MAX`.
    pub fn update_quantity(&mut self, key: LineKey, quantity: i64) -> Result<&CartState, CartError> {
        self.dispatch(CartAction::UpdateQuantity { key, quantity })
    }

    /// Empty the cart and delete the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches [`CartStore::dispatch`].
    pub fn clear(&mut self) -> Result<&CartState, CartError> {
        self.dispatch(CartAction::Clear)
    }

    /// Order summary for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the taxed total does not fit.
    pub fn summary(&self, promo: Option<PromoCode>) -> Result<OrderSummary, CartError> {
        OrderSummary::compute(&self.state, promo)
    }

    /// Register a callback invoked with the new state after every action.
    pub fn subscribe(&mut self, listener: impl Fn(&CartState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.state)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&self.key, &json));
        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }

    fn forget(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to delete persisted cart");
        }
    }
}
