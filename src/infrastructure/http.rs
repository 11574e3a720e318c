use crate::domain::cart::ShippingItem;
use crate::domain::order::{OrderRequest, OrderResponse};
use crate::domain::ports::{OrderGateway, ShippingCostLookup, TaxRateLookup};
use crate::domain::pricing::QuotedNumber;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// The tax endpoint answers either `{"rate": ..}` or the bare rate.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaxRateBody {
    Wrapped {
        #[serde(default)]
        rate: QuotedNumber,
    },
    Bare(QuotedNumber),
}

impl TaxRateBody {
    fn into_rate(self) -> QuotedNumber {
        match self {
            Self::Wrapped { rate } | Self::Bare(rate) => rate,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShippingCostBody {
    #[serde(default)]
    shipping_cost: QuotedNumber,
}

/// Storefront REST API client implementing all three collaborator ports.
///
/// `Clone` shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorefrontApi {
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TaxRateLookup for HttpStorefrontApi {
    async fn tax_rate(&self, zip: Option<&str>, state: Option<&str>) -> Result<QuotedNumber> {
        let mut query = Vec::new();
        if let Some(zip) = zip {
            query.push(("zip", zip));
        }
        if let Some(state) = state {
            query.push(("state", state));
        }
        let url = self.url("/tax/rate");
        debug!(%url, ?query, "GET");
        let body: TaxRateBody = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.into_rate())
    }
}

#[async_trait]
impl ShippingCostLookup for HttpStorefrontApi {
    async fn shipping_cost(&self, items: &[ShippingItem]) -> Result<QuotedNumber> {
        let url = self.url("/shipping/calculate");
        debug!(%url, lines = items.len(), "POST");
        let body: ShippingCostBody = self
            .client
            .post(url)
            .json(items)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.shipping_cost)
    }
}

#[async_trait]
impl OrderGateway for HttpStorefrontApi {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        let url = self.url("/orders");
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}
