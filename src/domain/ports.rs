use super::cart::ShippingItem;
use super::order::{OrderRequest, OrderResponse};
use super::pricing::QuotedNumber;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Resolves a sales-tax rate. Either parameter may be given; callers pass
/// only one.
#[async_trait]
pub trait TaxRateLookup: Send + Sync {
    async fn tax_rate(&self, zip: Option<&str>, state: Option<&str>) -> Result<QuotedNumber>;
}

/// Prices shipping for a set of (quantity, weight) pairs.
#[async_trait]
pub trait ShippingCostLookup: Send + Sync {
    async fn shipping_cost(&self, items: &[ShippingItem]) -> Result<QuotedNumber>;
}

/// Creates an order. Not idempotent: call at most once per submission.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse>;
}

/// Source of the current date for expiration checks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub type TaxRateLookupRef = Arc<dyn TaxRateLookup>;
pub type ShippingCostLookupRef = Arc<dyn ShippingCostLookup>;
pub type OrderGatewayRef = Arc<dyn OrderGateway>;
pub type ClockRef = Arc<dyn Clock>;

/// Everything a checkout session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub tax: TaxRateLookupRef,
    pub shipping: ShippingCostLookupRef,
    pub orders: OrderGatewayRef,
    pub clock: ClockRef,
}
