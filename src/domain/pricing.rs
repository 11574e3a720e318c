use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// A numeric value as a collaborator may send it: a JSON number, a numeric
/// string, or nothing at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuotedNumber {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl QuotedNumber {
    /// Converts to a finite decimal, or `None` when the value is absent,
    /// unparsable, or not finite.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => parse_decimal(&n.to_string()),
            Self::Text(s) => parse_decimal(s.trim()),
            Self::Missing => None,
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(Decimal::from_f64))
}

impl From<Decimal> for QuotedNumber {
    fn from(value: Decimal) -> Self {
        Self::Text(value.to_string())
    }
}

/// Coerces a tax rate into `[0, 1)`; anything else becomes zero.
pub fn coerce_rate(raw: &QuotedNumber) -> Option<Decimal> {
    raw.to_decimal()
        .filter(|rate| *rate >= Decimal::ZERO && *rate < Decimal::ONE)
}

/// Coerces a shipping cost to a non-negative amount.
pub fn coerce_cost(raw: &QuotedNumber) -> Option<Decimal> {
    raw.to_decimal().filter(|cost| *cost >= Decimal::ZERO)
}

/// `round(subtotal × rate, 2)`, with halves rounded away from zero.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn tax_amount(subtotal: Decimal, rate: Decimal) -> Option<Decimal> {
    subtotal
        .checked_mul(rate)
        .map(|tax| tax.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Current pricing for the session. The derived fields are never fetched;
/// they follow from the inputs through [`PricingState::recomputed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingState {
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
}

impl PricingState {
    /// Recomputes the tax amount and grand total, or `None` if either
    /// overflows.
    pub fn recomputed(mut self) -> Option<Self> {
        self.tax_amount = tax_amount(self.subtotal, self.tax_rate)?;
        self.grand_total = self
            .subtotal
            .checked_add(self.shipping_cost)?
            .checked_add(self.tax_amount)?;
        Some(self)
    }

    pub fn with_subtotal(self, subtotal: Decimal) -> Option<Self> {
        Self { subtotal, ..self }.recomputed()
    }

    pub fn with_tax_rate(self, tax_rate: Decimal) -> Option<Self> {
        Self { tax_rate, ..self }.recomputed()
    }

    pub fn with_shipping_cost(self, shipping_cost: Decimal) -> Option<Self> {
        Self {
            shipping_cost,
            ..self
        }
        .recomputed()
    }
}
