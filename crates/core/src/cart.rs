//! Cart

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line quantity of zero was supplied where at least one is required.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// No line matches the given (product, size, color) combination.
    #[error("item not found in cart")]
    ItemNotFound,
}

/// A single cart line: a product variant plus quantity and price snapshot.
///
/// Prices are minor currency units, captured when the line was added. The
/// backend remains the pricing authority; the snapshot only exists so the
/// checkout summary matches what the customer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Backend product identifier.
    pub product_id: String,

    /// Display name at add time.
    pub name: String,

    /// Unit price in minor currency units.
    pub price: u64,

    /// Pre-discount unit price, when the product advertises one.
    pub market_price: Option<u64>,

    /// Product image URL.
    pub image: String,

    /// Selected size variant.
    pub size: String,

    /// Selected color variant.
    pub color: String,

    /// Line quantity, always at least one.
    pub qty: u32,
}

impl CartItem {
    /// Line identity: lines are unique per (product, size, color).
    #[must_use]
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.product_id, &self.size, &self.color)
    }
}

/// Cart
///
/// An ordered list of lines, unique per [`CartItem::key`]. Re-adding an
/// existing combination merges into the existing line's quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from the given lines, merging duplicate combinations.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if any line has quantity zero.
    pub fn with_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();

        for item in items {
            cart.add(item)?;
        }

        Ok(cart)
    }

    /// Add a line, merging quantity into an existing line with the same
    /// (product, size, color) combination.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if the line quantity is zero.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.qty == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.key() == item.key()) {
            line.qty = line.qty.saturating_add(item.qty);

            return Ok(());
        }

        self.items.push(item);

        Ok(())
    }

    /// Set the quantity of an existing line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no line matches.
    pub fn set_qty(
        &mut self,
        product_id: &str,
        size: &str,
        color: &str,
        qty: u32,
    ) -> Result<(), CartError> {
        if qty == 0 {
            return self.remove(product_id, size, color);
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.key() == (product_id, size, color))
            .ok_or(CartError::ItemNotFound)?;

        line.qty = qty;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no line matches.
    pub fn remove(&mut self, product_id: &str, size: &str, color: &str) -> Result<(), CartError> {
        let position = self
            .items
            .iter()
            .position(|line| line.key() == (product_id, size, color))
            .ok_or(CartError::ItemNotFound)?;

        self.items.remove(position);

        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether a line exists for the given combination.
    #[must_use]
    pub fn contains(&self, product_id: &str, size: &str, color: &str) -> bool {
        self.items
            .iter()
            .any(|line| line.key() == (product_id, size, color))
    }

    /// Number of lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
