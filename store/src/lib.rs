//! # Cart Store
//!
//! Persistent, observable shopping cart for local-first mobile apps.
//!
//! This crate wraps the pure [`cart_engine`] logic with the parts that
//! touch the outside world: hydration from on-device storage, background
//! persistence after every mutation, and change notification for the
//! rendering layer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cart_store::{CartConfig, CartProvider, CartScope, NewLineItem};
//!
//! # async fn run() -> cart_store::Result<()> {
//! cart_store::telemetry::init();
//!
//! let config = CartConfig::load()?;
//! let provider = CartProvider::open(&config)?;
//! let scope = CartScope::new(provider.handle());
//!
//! // In a consumer
//! let cart = scope.cart()?;
//! cart.add_to_cart(NewLineItem::new("p1", "Mug", "https://img/mug.png", 12.5))?;
//! let mut updates = cart.subscribe()?;
//! updates.changed().await.ok();
//!
//! // On shutdown
//! provider.flush().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! The cart is stored under `<namespace>:Products` as a JSON array of
//! line-items. Writes are fire-and-forget: failures are logged and never
//! reach the caller. With [`PersistMode::Detached`] writes may complete out
//! of order; [`PersistMode::Sequenced`] applies them in submission order.

pub mod config;
pub mod error;
mod persist;
pub mod provider;
pub mod scope;
pub mod storage;
pub mod telemetry;

pub use cart_engine::{CartCollection, Change, LineItem, NewLineItem};
pub use config::{CartConfig, ConfigError, PersistMode};
pub use error::{Error, Result};
pub use provider::{CartHandle, CartProvider, HydrationStatus};
pub use scope::CartScope;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
