use super::address::Address;
use crate::error::SubmissionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The contact block sent with an order, taken from the shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl From<&Address> for Customer {
    fn from(shipping: &Address) -> Self {
        Self {
            first_name: shipping.first_name.clone(),
            last_name: shipping.last_name.clone(),
            email: shipping.email.clone().unwrap_or_default(),
            phone: shipping.phone.clone().unwrap_or_default(),
            address: shipping.street.clone(),
            city: shipping.city.clone(),
            state: shipping.state_code.clone(),
            zip_code: shipping.zip_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer: Customer,
    pub product_quantities: BTreeMap<u64, u32>,
}

/// An order identifier as issued by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An id field that may arrive as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOrderId {
    Text(String),
    Number(u64),
}

impl RawOrderId {
    fn into_order_id(self) -> Option<OrderId> {
        match self {
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(OrderId(s)),
            Self::Number(n) => Some(OrderId(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEnvelope {
    #[serde(default)]
    pub order_id: Option<RawOrderId>,
}

/// The order service's reply: either `{orderId}` or `{order: {orderId}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(default)]
    pub order_id: Option<RawOrderId>,
    #[serde(default)]
    pub order: Option<OrderEnvelope>,
}

impl OrderResponse {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            order_id: Some(RawOrderId::Text(id.into())),
            order: None,
        }
    }

    pub fn nested(id: impl Into<String>) -> Self {
        Self {
            order_id: None,
            order: Some(OrderEnvelope {
                order_id: Some(RawOrderId::Text(id.into())),
            }),
        }
    }

    /// Extracts the order id, preferring the top-level field.
    pub fn into_order_id(self) -> Result<OrderId, SubmissionError> {
        self.order_id
            .and_then(RawOrderId::into_order_id)
            .or_else(|| {
                self.order
                    .and_then(|o| o.order_id)
                    .and_then(RawOrderId::into_order_id)
            })
            .ok_or(SubmissionError::MissingOrderId)
    }
}
