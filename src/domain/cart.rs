use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product line in the shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: u64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub weight: Decimal,
}

impl CartLine {
    pub fn new(
        product_id: u64,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        weight: Decimal,
    ) -> Result<Self> {
        let line = Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            weight,
        };
        line.validate()?;
        Ok(line)
    }

    /// Checks the value rules for a line read from an untrusted source.
    pub fn validate(&self) -> Result<()> {
        if self.unit_price < Decimal::ZERO {
            return Err(CheckoutError::InvalidCartLine(format!(
                "product {} has a negative unit price",
                self.product_id
            )));
        }
        if self.weight < Decimal::ZERO {
            return Err(CheckoutError::InvalidCartLine(format!(
                "product {} has a negative weight",
                self.product_id
            )));
        }
        if self.quantity == 0 {
            return Err(CheckoutError::InvalidCartLine(format!(
                "product {} has a zero quantity",
                self.product_id
            )));
        }
        self.line_total()?;
        Ok(())
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Result<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                CheckoutError::InvalidCartLine(format!(
                    "product {} line total is out of range",
                    self.product_id
                ))
            })
    }
}

/// The (quantity, weight) pair the shipping collaborator prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingItem {
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
}

/// The shopper's cart for the current session.
///
/// Every mutation keeps the subtotal representable; an edit that would
/// overflow it is rejected and leaves the cart unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    subtotal: Decimal,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from lines, merging repeated products.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Result<Self> {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line)?;
        }
        Ok(cart)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line, or bumps the quantity of an existing line for the same product.
    pub fn add(&mut self, line: CartLine) -> Result<()> {
        line.validate()?;
        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| {
                        CheckoutError::InvalidCartLine(format!(
                            "product {} quantity is out of range",
                            line.product_id
                        ))
                    })?;
            }
            None => lines.push(line),
        }
        self.replace_lines(lines)
    }

    pub fn remove(&mut self, product_id: u64) -> Result<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(CheckoutError::UnknownProduct(product_id))?;
        let mut lines = self.lines.clone();
        let removed = lines.remove(index);
        self.replace_lines(lines)?;
        Ok(removed)
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove(product_id).map(|_| ());
        }
        let mut lines = self.lines.clone();
        let line = lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CheckoutError::UnknownProduct(product_id))?;
        line.quantity = quantity;
        self.replace_lines(lines)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.subtotal = Decimal::ZERO;
    }

    fn replace_lines(&mut self, lines: Vec<CartLine>) -> Result<()> {
        let mut subtotal = Decimal::ZERO;
        for line in &lines {
            subtotal = subtotal.checked_add(line.line_total()?).ok_or_else(|| {
                CheckoutError::InvalidCartLine(format!(
                    "product {} pushes the subtotal out of range",
                    line.product_id
                ))
            })?;
        }
        self.lines = lines;
        self.subtotal = subtotal;
        Ok(())
    }

    /// Σ unit price × quantity.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn shipping_items(&self) -> Vec<ShippingItem> {
        self.lines
            .iter()
            .map(|l| ShippingItem {
                quantity: l.quantity,
                weight: l.weight,
            })
            .collect()
    }

    pub fn product_quantities(&self) -> BTreeMap<u64, u32> {
        self.lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect()
    }
}
