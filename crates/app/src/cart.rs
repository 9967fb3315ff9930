//! Persistent cart store.

use std::sync::Arc;

use thiserror::Error;

use storefront::cart::{Cart, CartError, CartItem};

use crate::store::{self, StateStore, StoreError, keys};

/// Errors related to the persistent cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The cart mutation itself was invalid.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The snapshot could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The process-wide cart, snapshotted to the state store under
/// [`keys::CART`] on every mutation.
pub struct CartStore {
    cart: Cart,
    store: Arc<dyn StateStore>,
}

impl CartStore {
    /// Load the persisted snapshot, or start empty.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be read.
    pub fn load(store: Arc<dyn StateStore>) -> Result<Self, CartStoreError> {
        let cart = store::get_typed(store.as_ref(), keys::CART)?.unwrap_or_default();

        Ok(Self { cart, store })
    }

    /// The current cart contents.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a line, merging into an existing (product, size, color) line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] on an invalid quantity or a failed
    /// snapshot write.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartStoreError> {
        self.cart.add(item)?;

        self.persist()
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] for an unknown line or a failed
    /// snapshot write.
    pub fn set_qty(
        &mut self,
        product_id: &str,
        size: &str,
        color: &str,
        qty: u32,
    ) -> Result<(), CartStoreError> {
        self.cart.set_qty(product_id, size, color, qty)?;

        self.persist()
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] for an unknown line or a failed
    /// snapshot write.
    pub fn remove(&mut self, product_id: &str, size: &str, color: &str) -> Result<(), CartStoreError> {
        self.cart.remove(product_id, size, color)?;

        self.persist()
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] on a failed snapshot write.
    pub fn clear(&mut self) -> Result<(), CartStoreError> {
        self.cart.clear();

        self.persist()
    }

    fn persist(&self) -> Result<(), CartStoreError> {
        store::put_typed(self.store.as_ref(), keys::CART, &self.cart)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{store::MemoryStore, test::cart_item};

    use super::*;

    #[test]
    fn mutations_survive_a_reload() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        {
            let mut cart = CartStore::load(store.clone())?;
            cart.add(cart_item())?;
            cart.add(cart_item())?;
        }

        let reloaded = CartStore::load(store)?;

        assert_eq!(reloaded.cart().len(), 1);
        assert_eq!(
            reloaded.cart().items().first().map(|line| line.qty),
            Some(2),
            "quantities should merge and persist"
        );

        Ok(())
    }

    #[test]
    fn clear_persists_the_empty_snapshot() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        let mut cart = CartStore::load(store.clone())?;
        cart.add(cart_item())?;
        cart.clear()?;

        let reloaded = CartStore::load(store)?;

        assert!(reloaded.cart().is_empty());

        Ok(())
    }

    #[test]
    fn invalid_mutations_do_not_touch_the_snapshot() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        let mut cart = CartStore::load(store.clone())?;
        cart.add(cart_item())?;

        let result = cart.set_qty("missing", "M", "blue", 2);

        assert!(result.is_err(), "unknown line should be rejected");

        let reloaded = CartStore::load(store)?;

        assert_eq!(reloaded.cart().len(), 1);

        Ok(())
    }
}
