//! The shopping cart.
//!
//! The cart is owned by the client and never stored server-side. The API
//! receives its lines with every summary or checkout request and rebuilds a
//! [`Cart`] priced from the catalogue.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Dimensions, shipping::Package};

pub const MAX_LINE_QUANTITY: i32 = 99;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,

    #[error("Item is not in the cart")]
    MissingLine,
}

/// A cart line as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub customization: Option<String>,
    pub color: Option<String>,
}

/// Identifies a line: the same product with a different embroidery or color is
/// a separate line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineKey {
    pub product_id: Uuid,
    pub customization: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    /// Unit price in centavos, taken from the catalogue.
    pub unit_price: i64,
    pub quantity: i32,
    pub customization: Option<String>,
    pub color: Option<String>,
    #[serde(skip)]
    pub dimensions: Dimensions,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            customization: self.customization.clone(),
            color: self.color.clone(),
        }
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Cart {
    lines: Vec<CartLine>,
}

fn check_quantity(quantity: i32) -> Result<(), CartError> {
    if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CartError::InvalidQuantity)
    }
}

/// Trim customization text and drop it when blank.
pub fn normalize_customization(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Add a line, merging quantities with an existing line for the same key.
    pub fn add(&mut self, mut line: CartLine) -> Result<(), CartError> {
        check_quantity(line.quantity)?;
        line.customization = normalize_customization(line.customization.take());
        line.color = normalize_customization(line.color.take());

        let key = line.key();
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(existing) => {
                let merged = existing.quantity + line.quantity;
                check_quantity(merged)?;
                existing.quantity = merged;
                existing.unit_price = line.unit_price;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &LineKey) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| &l.key() == key)
            .ok_or(CartError::MissingLine)?;
        Ok(self.lines.remove(index))
    }

    /// Set the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(key).map(|_| ());
        }
        check_quantity(quantity)?;
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.key() == key)
            .ok_or(CartError::MissingLine)?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn package(&self) -> Package {
        Package::from_items(self.lines.iter().map(|l| (l.dimensions, l.quantity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: Dimensions = Dimensions {
        weight_grams: 300,
        height_cm: 4,
        width_cm: 20,
        length_cm: 30,
    };

    fn line(product_id: Uuid, price: i64, quantity: i32, customization: Option<&str>) -> CartLine {
        CartLine {
            product_id,
            product_name: "Body bordado".into(),
            unit_price: price,
            quantity,
            customization: customization.map(str::to_string),
            color: None,
            dimensions: DIMS,
        }
    }

    #[test]
    fn add_merges_same_product_and_customization() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(id, 5_000, 1, Some("Maria"))).unwrap();
        cart.add(line(id, 5_000, 2, Some("  Maria "))).unwrap();
        cart.add(line(id, 5_000, 1, Some("João"))).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), 20_000);
    }

    #[test]
    fn rejects_non_positive_quantities() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(line(Uuid::new_v4(), 100, 0, None)),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(
            cart.add(line(Uuid::new_v4(), 100, -3, None)),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_to_zero_removes_line() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(id, 1_000, 3, None)).unwrap();
        let key = cart.lines()[0].key();

        cart.update_quantity(&key, 5).unwrap();
        assert_eq!(cart.item_count(), 5);

        cart.update_quantity(&key, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(&key, 1), Err(CartError::MissingLine));
    }

    #[test]
    fn clear_and_package() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), 1_000, 2, None)).unwrap();
        let package = cart.package();
        assert_eq!(package.weight_grams, 600);
        assert_eq!(package.height_cm, 8);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0);
    }
}
