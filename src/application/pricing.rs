use crate::domain::address::{Address, zip_valid};
use crate::domain::cart::ShippingItem;
use crate::domain::ports::{ShippingCostLookupRef, TaxRateLookupRef};
use crate::domain::pricing::{PricingState, coerce_cost, coerce_rate};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a tax lookup is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxQuery {
    State(String),
    Zip(String),
}

impl TaxQuery {
    /// Picks the lookup key for a shipping address, or `None` when there is
    /// not enough to look anything up and the rate is simply zero.
    ///
    /// A state code wins over a ZIP when both are present.
    pub fn for_address(shipping: &Address) -> Option<Self> {
        let zip = shipping.zip_code.trim();
        let state = shipping.state_code.trim();
        if !state.is_empty() {
            Some(Self::State(state.to_string()))
        } else if zip_valid(zip) {
            Some(Self::Zip(zip.to_string()))
        } else {
            None
        }
    }
}

impl fmt::Display for TaxQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => write!(f, "State {state}"),
            Self::Zip(zip) => write!(f, "ZIP {zip}"),
        }
    }
}

/// An issued tax lookup that has not been committed yet.
///
/// Owns everything it needs, so it can be awaited without borrowing the
/// session that issued it.
pub struct PendingTax {
    epoch: u64,
    query: TaxQuery,
    lookup: TaxRateLookupRef,
}

impl PendingTax {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn query(&self) -> &TaxQuery {
        &self.query
    }

    /// Performs the lookup. Failures and malformed rates resolve to zero.
    pub async fn resolve(self) -> TaxResolution {
        let result = match &self.query {
            TaxQuery::State(state) => self.lookup.tax_rate(None, Some(state.as_str())).await,
            TaxQuery::Zip(zip) => self.lookup.tax_rate(Some(zip.as_str()), None).await,
        };
        let rate = match result {
            Ok(raw) => coerce_rate(&raw).unwrap_or_else(|| {
                warn!(query = %self.query, ?raw, "Malformed tax rate, using 0");
                Decimal::ZERO
            }),
            Err(e) => {
                warn!(query = %self.query, error = %e, "Tax rate fetch error, using 0");
                Decimal::ZERO
            }
        };
        TaxResolution {
            epoch: self.epoch,
            query: self.query,
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxResolution {
    epoch: u64,
    pub query: TaxQuery,
    pub rate: Decimal,
}

/// An issued shipping lookup that has not been committed yet.
pub struct PendingShipping {
    epoch: u64,
    items: Vec<ShippingItem>,
    lookup: ShippingCostLookupRef,
}

impl PendingShipping {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn items(&self) -> &[ShippingItem] {
        &self.items
    }

    /// Performs the lookup. Failures and malformed costs resolve to zero.
    pub async fn resolve(self) -> ShippingResolution {
        let cost = match self.lookup.shipping_cost(&self.items).await {
            Ok(raw) => coerce_cost(&raw).unwrap_or_else(|| {
                warn!(?raw, "Malformed shipping cost, using 0");
                Decimal::ZERO
            }),
            Err(e) => {
                warn!(error = %e, "Shipping cost fetch error, using 0");
                Decimal::ZERO
            }
        };
        ShippingResolution {
            epoch: self.epoch,
            cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingResolution {
    epoch: u64,
    pub cost: Decimal,
}

/// Keeps [`PricingState`] in step with the address and cart.
///
/// Tax and shipping each have their own epoch counter. Beginning a lookup
/// bumps the counter and stamps the pending lookup with it; a resolution is
/// committed only if its stamp still matches, so whichever lookup was issued
/// last wins regardless of the order in which replies arrive.
#[derive(Debug, Default)]
pub struct PricingResolver {
    tax_epoch: u64,
    shipping_epoch: u64,
    last_shipping_items: Option<Vec<ShippingItem>>,
    state: PricingState,
}

impl PricingResolver {
    pub fn new(subtotal: Decimal) -> Self {
        let mut resolver = Self::default();
        resolver.set_subtotal(subtotal);
        resolver
    }

    pub fn state(&self) -> &PricingState {
        &self.state
    }

    /// Replaces the subtotal. Fetched amounts that no longer fit in the
    /// totals are dropped to zero, shipping first.
    pub fn set_subtotal(&mut self, subtotal: Decimal) {
        let next = PricingState {
            subtotal,
            ..self.state
        };
        let fitted = next
            .recomputed()
            .or_else(|| {
                warn!(%subtotal, "Totals overflow, dropping shipping cost to 0");
                PricingState {
                    shipping_cost: Decimal::ZERO,
                    ..next
                }
                .recomputed()
            })
            .or_else(|| {
                warn!(%subtotal, "Totals overflow, dropping tax rate to 0");
                PricingState {
                    shipping_cost: Decimal::ZERO,
                    tax_rate: Decimal::ZERO,
                    ..next
                }
                .recomputed()
            });
        if let Some(state) = fitted {
            self.state = state;
        }
    }

    /// Prices an emptied cart. Any shipping lookup still in flight is
    /// superseded, and an empty cart ships for nothing.
    pub fn clear_cart(&mut self) {
        self.shipping_epoch += 1;
        self.last_shipping_items = Some(Vec::new());
        let cleared = PricingState {
            subtotal: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            ..self.state
        };
        if let Some(state) = cleared.recomputed() {
            self.state = state;
        }
    }

    /// Starts a new tax epoch for `shipping`.
    ///
    /// Returns `None` when the rate short-circuits to zero; that commit is
    /// immediate and also supersedes any lookup still in flight.
    pub fn begin_tax(&mut self, shipping: &Address, lookup: &TaxRateLookupRef) -> Option<PendingTax> {
        self.tax_epoch += 1;
        match TaxQuery::for_address(shipping) {
            Some(query) => {
                debug!(epoch = self.tax_epoch, %query, "Issuing tax lookup");
                Some(PendingTax {
                    epoch: self.tax_epoch,
                    query,
                    lookup: Arc::clone(lookup),
                })
            }
            None => {
                debug!(epoch = self.tax_epoch, "No ZIP or state, tax rate reset to 0");
                if let Some(state) = self.state.with_tax_rate(Decimal::ZERO) {
                    self.state = state;
                }
                None
            }
        }
    }

    /// Commits a tax resolution if no newer tax epoch has begun.
    pub fn commit_tax(&mut self, resolution: TaxResolution) -> bool {
        if resolution.epoch != self.tax_epoch {
            debug!(
                epoch = resolution.epoch,
                current = self.tax_epoch,
                "Discarding stale tax rate"
            );
            return false;
        }
        match self.state.with_tax_rate(resolution.rate) {
            Some(state) => self.state = state,
            None => {
                warn!(query = %resolution.query, rate = %resolution.rate, "Tax rate overflows totals, using 0");
                if let Some(state) = self.state.with_tax_rate(Decimal::ZERO) {
                    self.state = state;
                }
            }
        }
        info!(
            "Tax rate updated for {}: {}%",
            resolution.query,
            (self.state.tax_rate * Decimal::ONE_HUNDRED).round_dp(2)
        );
        true
    }

    /// Starts a new shipping epoch if the (quantity, weight) projection of
    /// the cart changed since the last lookup was issued.
    pub fn begin_shipping(
        &mut self,
        items: Vec<ShippingItem>,
        lookup: &ShippingCostLookupRef,
    ) -> Option<PendingShipping> {
        if self.last_shipping_items.as_ref() == Some(&items) {
            return None;
        }
        self.shipping_epoch += 1;
        self.last_shipping_items = Some(items.clone());
        debug!(epoch = self.shipping_epoch, lines = items.len(), "Issuing shipping lookup");
        Some(PendingShipping {
            epoch: self.shipping_epoch,
            items,
            lookup: Arc::clone(lookup),
        })
    }

    /// Commits a shipping resolution if no newer shipping epoch has begun.
    pub fn commit_shipping(&mut self, resolution: ShippingResolution) -> bool {
        if resolution.epoch != self.shipping_epoch {
            debug!(
                epoch = resolution.epoch,
                current = self.shipping_epoch,
                "Discarding stale shipping cost"
            );
            return false;
        }
        match self.state.with_shipping_cost(resolution.cost) {
            Some(state) => self.state = state,
            None => {
                warn!(cost = %resolution.cost, "Shipping cost overflows totals, using 0");
                if let Some(state) = self.state.with_shipping_cost(Decimal::ZERO) {
                    self.state = state;
                }
            }
        }
        info!("Shipping cost updated: {}", self.state.shipping_cost);
        true
    }
}
