#![allow(dead_code)]

use async_trait::async_trait;
use checkout_engine::application::checkout::CheckoutSession;
use checkout_engine::domain::address::AddressField;
use checkout_engine::domain::cart::{Cart, CartLine, ShippingItem};
use checkout_engine::domain::order::{OrderRequest, OrderResponse};
use checkout_engine::domain::payment::PaymentField;
use checkout_engine::domain::ports::{
    Collaborators, OrderGateway, OrderGatewayRef, ShippingCostLookup, ShippingCostLookupRef,
    TaxRateLookup, TaxRateLookupRef,
};
use checkout_engine::domain::pricing::QuotedNumber;
use checkout_engine::error::{CheckoutError, Result};
use checkout_engine::infrastructure::clock::FixedClock;
use checkout_engine::infrastructure::in_memory::{InMemoryOrderGateway, WeightBasedShipping};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Records every call and answers with a fixed value.
#[derive(Default)]
pub struct RecordingTaxLookup {
    pub calls: Mutex<Vec<(Option<String>, Option<String>)>>,
    pub answer: Mutex<Option<QuotedNumber>>,
}

impl RecordingTaxLookup {
    pub fn answering(answer: QuotedNumber) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            answer: Mutex::new(Some(answer)),
        }
    }

    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxRateLookup for RecordingTaxLookup {
    async fn tax_rate(&self, zip: Option<&str>, state: Option<&str>) -> Result<QuotedNumber> {
        self.calls
            .lock()
            .unwrap()
            .push((zip.map(str::to_string), state.map(str::to_string)));
        self.answer
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CheckoutError::PricingLookup("unavailable".into()))
    }
}

/// Holds each reply until the test releases it, so tests decide arrival order.
#[derive(Default)]
pub struct GatedTaxLookup {
    gates: Mutex<HashMap<String, oneshot::Receiver<QuotedNumber>>>,
}

impl GatedTaxLookup {
    /// Registers a gate for a state code and returns the sender that opens it.
    pub fn gate(&self, state: &str) -> oneshot::Sender<QuotedNumber> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(state.to_string(), rx);
        tx
    }
}

#[async_trait]
impl TaxRateLookup for GatedTaxLookup {
    async fn tax_rate(&self, _zip: Option<&str>, state: Option<&str>) -> Result<QuotedNumber> {
        let key = state.unwrap_or_default().to_string();
        let rx = self
            .gates
            .lock()
            .unwrap()
            .remove(&key)
            .ok_or_else(|| CheckoutError::PricingLookup(format!("no gate for {key}")))?;
        rx.await
            .map_err(|_| CheckoutError::PricingLookup("gate dropped".into()))
    }
}

/// Answers every shipping lookup with the same raw value, or fails.
pub struct FixedShipping(pub Option<QuotedNumber>);

#[async_trait]
impl ShippingCostLookup for FixedShipping {
    async fn shipping_cost(&self, _items: &[ShippingItem]) -> Result<QuotedNumber> {
        self.0
            .clone()
            .ok_or_else(|| CheckoutError::PricingLookup("shipping down".into()))
    }
}

/// Returns a scripted response and counts calls.
pub struct ScriptedOrderGateway {
    pub calls: AtomicUsize,
    response: Mutex<Option<OrderResponse>>,
}

impl ScriptedOrderGateway {
    pub fn replying(response: OrderResponse) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(Some(response)),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderGateway for ScriptedOrderGateway {
    async fn create_order(&self, _request: &OrderRequest) -> Result<OrderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CheckoutError::Submission(
                checkout_engine::error::SubmissionError::Gateway("503 Service Unavailable".into()),
            ))
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn collaborators(
    tax: TaxRateLookupRef,
    shipping: ShippingCostLookupRef,
    orders: OrderGatewayRef,
) -> Collaborators {
    Collaborators {
        tax,
        shipping,
        orders,
        clock: Arc::new(FixedClock(today())),
    }
}

pub fn default_collaborators() -> Collaborators {
    collaborators(
        Arc::new(RecordingTaxLookup::answering(QuotedNumber::Number(0.0725))),
        Arc::new(WeightBasedShipping::default()),
        Arc::new(InMemoryOrderGateway::new()),
    )
}

/// One line: product 7, quantity 2, 12.50 each.
pub fn cart() -> Cart {
    Cart::from_lines([CartLine::new(7, "Maple Syrup", dec!(12.50), 2, dec!(1.2)).unwrap()]).unwrap()
}

pub fn fill_shipping(session: &mut CheckoutSession) {
    for (field, value) in [
        (AddressField::FirstName, "A"),
        (AddressField::LastName, "B"),
        (AddressField::Email, "a@example.test"),
        (AddressField::Phone, "555-0100"),
        (AddressField::Street, "1 Main St"),
        (AddressField::City, "X"),
        (AddressField::StateCode, "CA"),
        (AddressField::ZipCode, "90210"),
    ] {
        session.edit_shipping(field, value).unwrap();
    }
}

pub fn fill_visa(session: &mut CheckoutSession) {
    session.edit_payment(PaymentField::CardNumber, "4111111111111111").unwrap();
    session.edit_payment(PaymentField::ExpirationDate, "12/30").unwrap();
    session.edit_payment(PaymentField::Cvv, "123").unwrap();
}

/// A session that passes validation as-is.
pub fn ready_session(collaborators: Collaborators) -> CheckoutSession {
    let mut session = CheckoutSession::new(cart(), collaborators);
    fill_shipping(&mut session);
    session.set_same_as_shipping(true).unwrap();
    fill_visa(&mut session);
    session
}
