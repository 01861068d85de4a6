//! The live cart: provider, consumer handles and hydration.
//!
//! A [`CartProvider`] owns the store for one application session. It
//! publishes the current [`CartCollection`] on a watch channel, hydrates it
//! once from storage and persists every mutation in the background.
//! Consumers get a [`CartHandle`], which stops working once the provider
//! is dropped.

use std::sync::{Arc, Weak};

use cart_engine::{CartCollection, CartSnapshot, Change, NewLineItem};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::config::CartConfig;
use crate::error::{Error, Result};
use crate::persist::Persister;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Progress of the one-time load from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationStatus {
    /// The load has not finished; the cart reads as empty
    Pending,
    /// The stored cart (if any) has been loaded
    Hydrated,
    /// The stored value could not be read or parsed; the cart stays as it was
    Failed(String),
}

impl HydrationStatus {
    /// Whether the load has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self, HydrationStatus::Pending)
    }
}

/// Shared state behind a provider and its handles.
struct CartStore {
    key: String,
    products: watch::Sender<CartCollection>,
    hydration: watch::Sender<HydrationStatus>,
    persister: Persister,
}

impl CartStore {
    fn mutate<F>(&self, operation: &'static str, apply: F) -> Change
    where
        F: FnOnce(&mut CartCollection) -> Change,
    {
        let mut change = Change::Unchanged;
        let mut items = 0;

        // Always notifies, including when nothing changed. Writes are
        // submitted while the channel is still locked so they reach the
        // persister in mutation order.
        self.products.send_modify(|products| {
            change = apply(products);
            items = products.len();
            self.persist(&products.export_state());
        });

        tracing::debug!(operation, ?change, items, "Cart updated");
        change
    }

    fn persist(&self, snapshot: &CartSnapshot) {
        match snapshot.to_json() {
            Ok(json) => self.persister.submit(self.key.clone(), json),
            Err(e) => {
                let e = Error::from(e);
                tracing::warn!(key = %self.key, error = %e, "Failed to serialize cart");
            }
        }
    }

    fn replace(&self, hydrated: CartCollection) {
        self.products.send_modify(|products| {
            if !products.is_empty() {
                tracing::debug!(
                    discarded = products.len(),
                    "Hydration replaced items added before the stored cart loaded"
                );
            }
            *products = hydrated;
        });
    }
}

/// Owner of the live cart for one application session.
pub struct CartProvider {
    store: Arc<CartStore>,
}

impl CartProvider {
    /// Mount a cart over `storage` and start hydrating it.
    ///
    /// Must be called from inside a Tokio runtime; the runtime is kept to
    /// run hydration and persistence tasks.
    pub fn mount<S: KeyValueStorage>(storage: S, config: &CartConfig) -> Result<Self> {
        Self::mount_shared(Arc::new(storage), config)
    }

    /// Mount a cart over the storage selected by `config`: files under
    /// `storage_dir` when set, process memory otherwise.
    pub fn open(config: &CartConfig) -> Result<Self> {
        match &config.storage_dir {
            Some(dir) => Self::mount(FileStorage::new(dir), config),
            None => Self::mount(MemoryStorage::new(), config),
        }
    }

    /// Mount a cart over storage that is already shared.
    pub fn mount_shared(storage: Arc<dyn KeyValueStorage>, config: &CartConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let key = config.storage_key();

        let (products, _) = watch::channel(CartCollection::new());
        let (hydration, _) = watch::channel(HydrationStatus::Pending);
        let persister = Persister::new(storage.clone(), runtime.clone(), config.persist_mode);

        let store = Arc::new(CartStore {
            key: key.clone(),
            products,
            hydration,
            persister,
        });

        tracing::info!(key = %key, mode = ?config.persist_mode, "Mounting cart");
        runtime.spawn(hydrate(Arc::downgrade(&store), storage, key));

        Ok(Self { store })
    }

    /// Get a handle for consumers.
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            store: Arc::downgrade(&self.store),
        }
    }

    /// Storage key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.store.key
    }

    /// Watch the hydration status.
    pub fn hydration(&self) -> watch::Receiver<HydrationStatus> {
        self.store.hydration.subscribe()
    }

    /// Wait for the one-time load to finish.
    ///
    /// Returns [`Error::Hydration`] if the stored cart could not be loaded.
    pub async fn wait_hydrated(&self) -> Result<()> {
        let mut rx = self.hydration();
        let status = rx
            .wait_for(HydrationStatus::is_settled)
            .await
            .map_err(|_| Error::MissingProvider)?
            .clone();

        match status {
            HydrationStatus::Failed(reason) => Err(Error::Hydration(reason)),
            _ => Ok(()),
        }
    }

    /// Wait for every persistence write submitted so far.
    pub async fn flush(&self) {
        self.store.persister.flush().await;
    }
}

/// Consumer access to a mounted cart.
///
/// Handles are cheap to clone. Every accessor fails with
/// [`Error::MissingProvider`] once the provider has been dropped.
#[derive(Clone)]
pub struct CartHandle {
    store: Weak<CartStore>,
}

impl CartHandle {
    fn store(&self) -> Result<Arc<CartStore>> {
        self.store.upgrade().ok_or(Error::MissingProvider)
    }

    /// Current cart contents.
    pub fn products(&self) -> Result<CartCollection> {
        Ok(self.store()?.products.borrow().clone())
    }

    /// Receive the cart on every change, including no-op mutations and
    /// hydration.
    pub fn subscribe(&self) -> Result<watch::Receiver<CartCollection>> {
        Ok(self.store()?.products.subscribe())
    }

    /// Watch the hydration status.
    pub fn hydration(&self) -> Result<watch::Receiver<HydrationStatus>> {
        Ok(self.store()?.hydration.subscribe())
    }

    /// Add a product, or bump its quantity if already in the cart.
    pub fn add_to_cart(&self, item: NewLineItem) -> Result<Change> {
        Ok(self.store()?.mutate("add_to_cart", |p| p.add_to_cart(item)))
    }

    /// Increase the quantity of an item. Unknown ids leave the cart as is.
    pub fn increment(&self, id: &str) -> Result<Change> {
        Ok(self.store()?.mutate("increment", |p| p.increment(id)))
    }

    /// Decrease the quantity of an item, removing it at 1. Unknown ids
    /// leave the cart as is.
    pub fn decrement(&self, id: &str) -> Result<Change> {
        Ok(self.store()?.mutate("decrement", |p| p.decrement(id)))
    }

    /// Whether the provider is still mounted.
    pub fn is_active(&self) -> bool {
        self.store.strong_count() > 0
    }
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

async fn hydrate(store: Weak<CartStore>, storage: Arc<dyn KeyValueStorage>, key: String) {
    let loaded = load(storage.as_ref(), &key).await;

    let Some(store) = store.upgrade() else {
        tracing::debug!(key = %key, "Cart unmounted before hydration finished");
        return;
    };

    let status = match loaded {
        Ok(Some(collection)) => {
            tracing::info!(key = %key, items = collection.len(), "Hydrated cart");
            store.replace(collection);
            HydrationStatus::Hydrated
        }
        Ok(None) => {
            tracing::debug!(key = %key, "No stored cart");
            HydrationStatus::Hydrated
        }
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Failed to hydrate cart");
            HydrationStatus::Failed(e.to_string())
        }
    };

    store.hydration.send_replace(status);
}

async fn load(storage: &dyn KeyValueStorage, key: &str) -> Result<Option<CartCollection>> {
    let raw = match storage.get_item(key).await? {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    let mut collection = CartCollection::new();
    collection.import_state(CartSnapshot::from_json(&raw)?)?;
    Ok(Some(collection))
}
