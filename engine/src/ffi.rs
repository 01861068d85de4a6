//! FFI layer for mobile hosts.
//!
//! This module provides C-compatible functions that can be called from
//! Dart, Swift or Kotlin. All data crosses the boundary as JSON strings.
//! Persistence stays with the host: it stores the string returned by
//! `cart_export_json` and hands it back to `cart_import_json` on launch.
//!
//! # Memory Management
//!
//! - Strings returned by `cart_*` functions are allocated by Rust
//! - Caller must free them with `cart_string_free`
//! - Collection pointers must be freed with `cart_collection_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{CartCollection, CartSnapshot, NewLineItem};
use std::ffi::{c_char, CStr, CString};

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `cart_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            static NUL_ERROR: &str = r#"{"error":"string contained null bytes"}"#;
            CString::new(NUL_ERROR)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut())
        }
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn error_string(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

// ============================================================================
// Collection Lifecycle
// ============================================================================

/// Create a new, empty cart.
///
/// # Returns
/// Pointer to CartCollection. Free with `cart_collection_free`.
#[no_mangle]
pub extern "C" fn cart_collection_new() -> *mut CartCollection {
    Box::into_raw(Box::new(CartCollection::new()))
}

/// Free a cart.
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn cart_collection_free(cart: *mut CartCollection) {
    if !cart.is_null() {
        drop(Box::from_raw(cart));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `cart_*` function or null
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn cart_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Add a product to the cart.
///
/// # Arguments
/// - `item_json`: JSON object `{"id", "title", "imageUrl", "price"}`
///
/// # Returns
/// JSON string: `{"ok": Change}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - `item_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_add_to_cart(
    cart: *mut CartCollection,
    item_json: *const c_char,
) -> *mut c_char {
    let cart = match cart.as_mut() {
        Some(c) => c,
        None => return error_string("null cart pointer"),
    };

    let item_str = match from_c_string(item_json) {
        Some(s) => s,
        None => return error_string("invalid item JSON"),
    };

    let item: NewLineItem = match serde_json::from_str(&item_str) {
        Ok(i) => i,
        Err(e) => return error_string(format!("parse error: {}", e)),
    };

    to_c_string(FfiResult::ok(cart.add_to_cart(item)).to_json())
}

/// Increase the quantity of an item by one.
///
/// # Returns
/// JSON string: `{"ok": Change}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - `id` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_increment(cart: *mut CartCollection, id: *const c_char) -> *mut c_char {
    let cart = match cart.as_mut() {
        Some(c) => c,
        None => return error_string("null cart pointer"),
    };

    match from_c_string(id) {
        Some(id) => to_c_string(FfiResult::ok(cart.increment(&id)).to_json()),
        None => error_string("invalid id"),
    }
}

/// Decrease the quantity of an item by one, removing it at zero.
///
/// # Returns
/// JSON string: `{"ok": Change}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - `id` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_decrement(cart: *mut CartCollection, id: *const c_char) -> *mut c_char {
    let cart = match cart.as_mut() {
        Some(c) => c,
        None => return error_string("null cart pointer"),
    };

    match from_c_string(id) {
        Some(id) => to_c_string(FfiResult::ok(cart.decrement(&id)).to_json()),
        None => error_string("invalid id"),
    }
}

// ============================================================================
// Reads and Snapshots
// ============================================================================

/// Get all items in the cart.
///
/// # Returns
/// JSON string: `{"ok": [LineItem, ...]}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_products(cart: *const CartCollection) -> *mut c_char {
    match cart.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.items()).to_json()),
        None => error_string("null cart pointer"),
    }
}

/// Export the cart as the string to persist on device.
///
/// # Returns
/// JSON string: `{"ok": "<snapshot json>"}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_export_json(cart: *const CartCollection) -> *mut c_char {
    let cart = match cart.as_ref() {
        Some(c) => c,
        None => return error_string("null cart pointer"),
    };

    match cart.export_state().to_json() {
        Ok(json) => to_c_string(FfiResult::ok(json).to_json()),
        Err(e) => error_string(e.to_string()),
    }
}

/// Replace the cart contents with a persisted snapshot.
///
/// # Arguments
/// - `snapshot_json`: the string previously returned inside `cart_export_json`
///
/// # Returns
/// JSON string: `{"ok": null}` or `{"error": "message"}`
///
/// # Safety
/// - `cart` must be a valid pointer from `cart_collection_new` or null
/// - `snapshot_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `cart_string_free`
#[no_mangle]
pub unsafe extern "C" fn cart_import_json(
    cart: *mut CartCollection,
    snapshot_json: *const c_char,
) -> *mut c_char {
    let cart = match cart.as_mut() {
        Some(c) => c,
        None => return error_string("null cart pointer"),
    };

    let snapshot_str = match from_c_string(snapshot_json) {
        Some(s) => s,
        None => return error_string("invalid snapshot JSON"),
    };

    let result = CartSnapshot::from_json(&snapshot_str).and_then(|s| cart.import_state(s));
    match result {
        Ok(()) => to_c_string(FfiResult::ok(()).to_json()),
        Err(e) => error_string(e.to_string()),
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn cart_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
