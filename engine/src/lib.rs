//! # Cart Engine
//!
//! A deterministic shopping cart engine for local-first mobile apps.
//!
//! This crate holds the cart's data-consistency logic: an ordered list of
//! line-items, three mutations over it, and the snapshot form that gets
//! written to on-device storage. The same inputs always produce the same
//! cart.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, storage or platform
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Testable**: Pure logic, no mocks needed
//! - **Portable**: Runs anywhere Rust runs (native, WASM, mobile)
//!
//! ## Core Concepts
//!
//! ### Line-items
//!
//! A [`LineItem`] is one product in the cart with a quantity of at least 1.
//! Callers submit a [`NewLineItem`], which has no quantity; the cart
//! assigns it.
//!
//! ### Mutations
//!
//! [`CartCollection`] exposes three mutations, each returning a [`Change`]:
//! - [`CartCollection::add_to_cart`] - append, or bump the quantity of an
//!   existing id (stored title, image and price win)
//! - [`CartCollection::increment`] - bump an existing id; unknown ids are a no-op
//! - [`CartCollection::decrement`] - lower an existing id, removing it at 1
//!
//! ## Quick Start
//!
//! ```rust
//! use cart_engine::{CartCollection, CartSnapshot, NewLineItem};
//!
//! let mut cart = CartCollection::new();
//! cart.add_to_cart(NewLineItem::new("p1", "Mug", "https://img/mug.png", 12.5));
//! cart.add_to_cart(NewLineItem::new("p1", "Mug", "https://img/mug.png", 12.5));
//! cart.increment("p1");
//! assert_eq!(cart.get("p1").unwrap().quantity, 3);
//!
//! // Persist and restore
//! let json = cart.export_state().to_json().unwrap();
//! let mut restored = CartCollection::new();
//! restored.import_state(CartSnapshot::from_json(&json).unwrap()).unwrap();
//! assert_eq!(cart, restored);
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for use from other
//! languages. All data is exchanged as JSON strings.

pub mod collection;
pub mod error;
pub mod ffi;
pub mod item;
pub mod snapshot;

// Re-export main types at crate root
pub use collection::{CartCollection, Change};
pub use error::Error;
pub use item::{LineItem, NewLineItem};
pub use snapshot::CartSnapshot;

/// Type aliases for clarity
pub type ProductId = String;
pub type Price = f64;
pub type Quantity = u32;
