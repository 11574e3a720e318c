use crate::domain::order::OrderId;
use crate::domain::payment::PaymentInstrument;
use crate::domain::pricing::PricingState;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One row summarizing a placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub order_id: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub card_type: &'static str,
    pub last4: String,
}

impl Receipt {
    pub fn new(order_id: &OrderId, pricing: &PricingState, payment: &PaymentInstrument) -> Self {
        Self {
            order_id: order_id.to_string(),
            subtotal: pricing.subtotal,
            shipping: pricing.shipping_cost,
            tax_rate: pricing.tax_rate,
            tax: pricing.tax_amount,
            total: pricing.grand_total,
            card_type: payment.card_type.as_str(),
            last4: payment.last4().to_string(),
        }
    }
}

pub struct ReceiptWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReceiptWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_receipt(&mut self, receipt: &Receipt) -> Result<()> {
        self.writer.serialize(receipt)?;
        self.writer.flush()?;
        Ok(())
    }
}
