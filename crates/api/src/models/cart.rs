//! The shopping cart aggregate.
//!
//! A cart owns its line items and derives its total; adding or removing a
//! line also moves units between the line and the product's stock counter.
//! The operations here are pure: the repository loads the cart and the
//! affected product inside one transaction (rows locked `FOR UPDATE`),
//! applies these methods, and writes the results back, so a failed
//! operation persists nothing.
//!
//! The total is always recomputed from the lines rather than adjusted
//! incrementally. Carts hold tens of lines at most, and a full recompute
//! cannot drift from the true line-item state.

use rust_decimal::Decimal;
use thiserror::Error;

use galeria_core::{CartId, ProductId, UserId};

use super::product::Product;

/// Errors from cart line mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity exceeds the product's available stock.
    #[error("stock insuficiente: {available} disponibles, {requested} solicitados")]
    InsufficientStock { available: i32, requested: i32 },

    /// Quantity must be a positive integer.
    #[error("la cantidad debe ser mayor que cero")]
    InvalidQuantity,
}

/// One (product, quantity) entry within a cart.
///
/// `precio` is the product's current catalog price, captured when the cart
/// was loaded; totals therefore always reflect catalog prices at call time,
/// not at add time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub producto_id: ProductId,
    pub nombre: String,
    pub precio: Decimal,
    pub cantidad: i32,
}

/// A customer's in-progress, unpaid cart.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    pub cliente_id: UserId,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}

impl Cart {
    /// An empty cart for a customer.
    #[must_use]
    pub fn new(id: CartId, cliente_id: UserId) -> Self {
        Self {
            id,
            cliente_id,
            lines: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Add `cantidad` units of `product` to the cart.
    ///
    /// Merges into the existing line for this product if there is one,
    /// otherwise appends a new line. Decrements the product's stock and
    /// recomputes the total. On error nothing is mutated.
    ///
    /// # Errors
    ///
    /// [`CartError::InvalidQuantity`] if `cantidad <= 0`;
    /// [`CartError::InsufficientStock`] if `cantidad > product.stock`.
    pub fn add_line(&mut self, product: &mut Product, cantidad: i32) -> Result<(), CartError> {
        if cantidad <= 0 {
            return Err(CartError::InvalidQuantity);
        }
        if cantidad > product.stock {
            return Err(CartError::InsufficientStock {
                available: product.stock,
                requested: cantidad,
            });
        }

        match self.line_mut(product.id) {
            Some(line) => {
                line.cantidad += cantidad;
                line.precio = product.precio;
            }
            None => self.lines.push(CartLine {
                producto_id: product.id,
                nombre: product.nombre.clone(),
                precio: product.precio,
                cantidad,
            }),
        }

        product.stock -= cantidad;
        self.recompute_total();
        Ok(())
    }

    /// Remove the line for `product`, restoring its quantity onto the
    /// product's stock. Removing an absent line is a no-op.
    pub fn remove_line(&mut self, product: &mut Product) {
        let Some(pos) = self
            .lines
            .iter()
            .position(|l| l.producto_id == product.id)
        else {
            return;
        };

        let line = self.lines.remove(pos);
        product.stock += line.cantidad;
        self.recompute_total();
    }

    /// Recompute the derived total from the current lines.
    ///
    /// Idempotent; called as the final step of every mutation but safe to
    /// call at any time.
    pub fn recompute_total(&mut self) {
        self.total = self
            .lines
            .iter()
            .map(|l| l.precio * Decimal::from(l.cantidad))
            .sum();
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, producto_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.producto_id == producto_id)
    }

    fn line_mut(&mut self, producto_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.producto_id == producto_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(id: i32, stock: i32, precio: &str) -> Product {
        Product {
            id: ProductId::new(id),
            nombre: format!("producto-{id}"),
            categoria: "pintura".to_owned(),
            stock,
            precio: dec(precio),
            imagen: String::new(),
            created_at: Utc::now(),
        }
    }

    fn cart() -> Cart {
        Cart::new(CartId::new(1), UserId::new(1))
    }

    #[test]
    fn add_within_stock_moves_units_and_totals() {
        let mut cart = cart();
        let mut p = product(1, 10, "5000.00");

        cart.add_line(&mut p, 3).unwrap();

        assert_eq!(p.stock, 7);
        assert_eq!(cart.line(p.id).unwrap().cantidad, 3);
        assert_eq!(cart.total, dec("15000.00"));
    }

    #[test]
    fn add_beyond_stock_mutates_nothing() {
        let mut cart = cart();
        let mut p = product(1, 2, "5000.00");
        cart.add_line(&mut p, 2).unwrap();
        let before_total = cart.total;
        let before_lines = cart.lines.clone();

        let err = cart.add_line(&mut p, 1).unwrap_err();

        assert_eq!(
            err,
            CartError::InsufficientStock {
                available: 0,
                requested: 1
            }
        );
        assert_eq!(p.stock, 0);
        assert_eq!(cart.total, before_total);
        assert_eq!(cart.lines, before_lines);
    }

    #[test]
    fn zero_or_negative_quantity_is_rejected() {
        let mut cart = cart();
        let mut p = product(1, 10, "100.00");
        assert_eq!(cart.add_line(&mut p, 0), Err(CartError::InvalidQuantity));
        assert_eq!(cart.add_line(&mut p, -4), Err(CartError::InvalidQuantity));
        assert_eq!(p.stock, 10);
        assert!(cart.is_empty());
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = cart();
        let mut p = product(1, 10, "100.00");

        cart.add_line(&mut p, 2).unwrap();
        cart.add_line(&mut p, 3).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.line(p.id).unwrap().cantidad, 5);
        assert_eq!(p.stock, 5);
    }

    #[test]
    fn remove_restores_stock_round_trip() {
        let mut cart = cart();
        let mut p = product(1, 10, "250.50");

        cart.add_line(&mut p, 4).unwrap();
        cart.remove_line(&mut p);

        assert_eq!(p.stock, 10);
        assert!(cart.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn remove_absent_line_is_a_noop() {
        let mut cart = cart();
        let mut p = product(1, 10, "100.00");
        let mut other = product(2, 5, "10.00");
        cart.add_line(&mut p, 1).unwrap();

        cart.remove_line(&mut other);

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(other.stock, 5);
        assert_eq!(cart.total, dec("100.00"));
    }

    #[test]
    fn recompute_total_is_idempotent() {
        let mut cart = cart();
        let mut p = product(1, 10, "333.33");
        cart.add_line(&mut p, 3).unwrap();

        cart.recompute_total();
        let first = cart.total;
        cart.recompute_total();

        assert_eq!(cart.total, first);
        assert_eq!(first, dec("999.99"));
    }

    #[test]
    fn total_reflects_current_catalog_price_on_merge() {
        let mut cart = cart();
        let mut p = product(1, 10, "100.00");
        cart.add_line(&mut p, 1).unwrap();

        // Price changed in the catalog before the second add.
        p.precio = dec("150.00");
        cart.add_line(&mut p, 1).unwrap();

        assert_eq!(cart.total, dec("300.00"));
    }

    #[test]
    fn full_lifecycle_scenario() {
        let mut cart = cart();
        let mut p = product(1, 10, "1000.00");

        cart.add_line(&mut p, 3).unwrap();
        assert_eq!(p.stock, 7);
        assert_eq!(cart.line(p.id).unwrap().cantidad, 3);
        assert_eq!(cart.total, dec("3000.00"));

        cart.add_line(&mut p, 4).unwrap();
        assert_eq!(p.stock, 3);
        assert_eq!(cart.line(p.id).unwrap().cantidad, 7);
        assert_eq!(cart.total, dec("7000.00"));

        let err = cart.add_line(&mut p, 5).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { .. }));
        assert_eq!(p.stock, 3);
        assert_eq!(cart.line(p.id).unwrap().cantidad, 7);
        assert_eq!(cart.total, dec("7000.00"));

        cart.remove_line(&mut p);
        assert_eq!(p.stock, 10);
        assert!(cart.line(p.id).is_none());
        assert_eq!(cart.total, Decimal::ZERO);
    }
}
