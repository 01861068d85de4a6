//! Durable key-value storage used to persist the cart.
//!
//! The store treats storage as an opaque blob store: one string value per
//! key, read once at hydration and fully replaced after each mutation.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use futures::future::BoxFuture;

/// Async get/set-by-key storage.
///
/// Implementations must be safe to share between the store and its
/// background persistence tasks.
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Read the value at `key`, or `None` if the key was never written.
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

    /// Replace the value at `key`.
    fn set_item<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Delete the value at `key`. Deleting a missing key is not an error.
    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>>;
}
