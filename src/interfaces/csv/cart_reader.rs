use crate::domain::cart::CartLine;
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CartRow {
    product_id: u64,
    name: String,
    unit_price: Decimal,
    quantity: u32,
    weight: Decimal,
}

/// Reads cart lines from a CSV source with the header
/// `product_id,name,unit_price,quantity,weight`.
///
/// Whitespace around fields is trimmed. Every row is checked with the same
/// rules as [`CartLine::new`].
pub struct CartReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one result per row.
    pub fn lines(self) -> impl Iterator<Item = Result<CartLine>> {
        self.reader.into_deserialize().map(|row| {
            let row: CartRow = row.map_err(CheckoutError::from)?;
            CartLine::new(row.product_id, row.name, row.unit_price, row.quantity, row.weight)
        })
    }
}
