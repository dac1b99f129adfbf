//! Shopping cart with one line per product.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::format_price;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("product {0} is not in the cart")]
    NotInCart(u64),
}

/// A catalog entry as far as the cart is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: u64,
    pub name: String,
    pub unit_price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> u64 {
        self.product
            .unit_price
            .saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: u64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    /// Adds `quantity` units of `product`, bumping the existing line when the
    /// product is already in the cart. A zero quantity is a no-op.
    pub fn add_or_increment(&mut self, product: CartProduct, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                tracing::debug!(
                    product_id = product.id,
                    quantity = line.quantity,
                    "Incremented cart line"
                );
            }
            None => {
                tracing::debug!(product_id = product.id, quantity, "Added cart line");
                self.lines.push(CartLine { product, quantity });
            }
        }
    }

    /// Sets the quantity of an existing line; zero removes it.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: u64) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != product_id);
        if self.lines.len() == before {
            return Err(CartError::NotInCart(product_id));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.subtotal()))
    }

    pub fn formatted_total(&self) -> String {
        format_price(self.total())
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u64, price: u64) -> CartProduct {
        CartProduct {
            id,
            name: format!("Marco {id}"),
            unit_price: price,
        }
    }

    #[test]
    fn test_add_or_increment_merges_lines() {
        let mut cart = Cart::new();
        cart.add_or_increment(frame(1, 12990), 1);
        cart.add_or_increment(frame(2, 5000), 2);
        cart.add_or_increment(frame(1, 12990), 3);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].product.id, 1);
        assert_eq!(cart.lines()[0].quantity, 4);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total(), 4 * 12990 + 2 * 5000);
        assert_eq!(cart.formatted_total(), "$61.960");
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let mut cart = Cart::new();
        cart.add_or_increment(frame(1, 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_or_increment(frame(1, 100), 1);
        cart.add_or_increment(frame(2, 200), 1);

        cart.set_quantity(1, 5).unwrap();
        assert_eq!(cart.lines()[0].quantity, 5);

        cart.set_quantity(2, 0).unwrap();
        assert_eq!(cart.lines().len(), 1);

        assert_eq!(cart.remove(2), Err(CartError::NotInCart(2)));
        assert_eq!(cart.set_quantity(9, 1), Err(CartError::NotInCart(9)));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_total_saturates() {
        let mut cart = Cart::new();
        cart.add_or_increment(frame(1, u64::MAX), 2);
        cart.add_or_increment(frame(2, 1), 1);
        assert_eq!(cart.total(), u64::MAX);
    }
}
