//! Explicit injection of the cart into consumers.

use crate::error::{Error, Result};
use crate::provider::CartHandle;

/// A container handed to consumers that may or may not hold a cart.
///
/// Components receive a scope instead of reaching for a global; asking an
/// empty scope for the cart is a wiring mistake and fails with
/// [`Error::MissingProvider`].
#[derive(Debug, Clone, Default)]
pub struct CartScope {
    cart: Option<CartHandle>,
}

impl CartScope {
    /// A scope providing `cart`.
    pub fn new(cart: CartHandle) -> Self {
        Self { cart: Some(cart) }
    }

    /// A scope with no cart provider.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the cart, failing if no active provider is in scope.
    pub fn cart(&self) -> Result<CartHandle> {
        match &self.cart {
            Some(cart) if cart.is_active() => Ok(cart.clone()),
            _ => Err(Error::MissingProvider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CartConfig, CartProvider, MemoryStorage};

    #[test]
    fn empty_scope_has_no_cart() {
        let scope = CartScope::empty();
        assert!(matches!(scope.cart(), Err(Error::MissingProvider)));
    }

    #[tokio::test]
    async fn scope_provides_cart_while_mounted() {
        let provider = CartProvider::mount(MemoryStorage::new(), &CartConfig::default()).unwrap();
        let scope = CartScope::new(provider.handle());

        assert!(scope.cart().is_ok());

        drop(provider);
        assert!(matches!(scope.cart(), Err(Error::MissingProvider)));
    }
}
