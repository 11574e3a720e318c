use crate::domain::address::state_name;
use crate::domain::cart::ShippingItem;
use crate::domain::order::{OrderRequest, OrderResponse};
use crate::domain::ports::{OrderGateway, ShippingCostLookup, TaxRateLookup};
use crate::domain::pricing::QuotedNumber;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A fixed table of tax rates keyed by state code and by ZIP.
///
/// State codes must appear in [`US_STATES`](crate::domain::address::US_STATES).
/// Unknown keys are reported as lookup errors, which the pricing resolver
/// turns into a zero rate.
#[derive(Debug, Default, Clone)]
pub struct StaticTaxTable {
    states: HashMap<String, QuotedNumber>,
    zips: HashMap<String, QuotedNumber>,
}

impl StaticTaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, code: &str, rate: QuotedNumber) -> Self {
        self.states.insert(code.to_ascii_uppercase(), rate);
        self
    }

    pub fn with_zip(mut self, zip: &str, rate: QuotedNumber) -> Self {
        self.zips.insert(zip.to_string(), rate);
        self
    }

    /// Base state sales-tax rates for a handful of states.
    pub fn us_base_rates() -> Self {
        [
            ("CA", dec!(0.0725)),
            ("FL", dec!(0.06)),
            ("IL", dec!(0.0625)),
            ("NY", dec!(0.04)),
            ("OR", dec!(0)),
            ("TX", dec!(0.0625)),
            ("WA", dec!(0.065)),
        ]
        .into_iter()
        .fold(Self::new(), |table, (code, rate)| {
            table.with_state(code, rate.into())
        })
    }
}

#[async_trait]
impl TaxRateLookup for StaticTaxTable {
    async fn tax_rate(&self, zip: Option<&str>, state: Option<&str>) -> Result<QuotedNumber> {
        let found = match (state, zip) {
            (Some(state), _) => {
                let name = state_name(state).ok_or_else(|| {
                    CheckoutError::PricingLookup(format!("unknown state code {state}"))
                })?;
                self.states
                    .get(&state.to_ascii_uppercase())
                    .ok_or_else(|| CheckoutError::PricingLookup(format!("no tax rate for {name}")))
            }
            (None, Some(zip)) => self
                .zips
                .get(zip)
                .ok_or_else(|| CheckoutError::PricingLookup(format!("no tax rate for ZIP {zip}"))),
            (None, None) => Err(CheckoutError::PricingLookup(
                "no ZIP or state given".to_string(),
            )),
        };
        found.cloned()
    }
}

/// Weight-based shipping: a flat base charge plus a charge per unit of
/// total weight. An empty cart ships for free.
#[derive(Debug, Clone, Copy)]
pub struct WeightBasedShipping {
    pub base: Decimal,
    pub per_weight_unit: Decimal,
}

impl Default for WeightBasedShipping {
    fn default() -> Self {
        Self {
            base: dec!(4.99),
            per_weight_unit: dec!(0.75),
        }
    }
}

impl WeightBasedShipping {
    pub fn quote(&self, items: &[ShippingItem]) -> Decimal {
        if items.is_empty() {
            return Decimal::ZERO;
        }
        let total_weight: Decimal = items
            .iter()
            .map(|i| i.weight * Decimal::from(i.quantity))
            .sum();
        (self.base + self.per_weight_unit * total_weight)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[async_trait]
impl ShippingCostLookup for WeightBasedShipping {
    async fn shipping_cost(&self, items: &[ShippingItem]) -> Result<QuotedNumber> {
        Ok(self.quote(items).into())
    }
}

/// Records every order it is asked to create and hands out sequential ids.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderGateway {
    requests: Arc<RwLock<Vec<OrderRequest>>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<OrderRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        let mut requests = self.requests.write().await;
        requests.push(request.clone());
        Ok(OrderResponse::with_id(format!("ORD-{:04}", requests.len())))
    }
}
