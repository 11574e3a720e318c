use super::pricing::{PendingShipping, PendingTax, PricingResolver, ShippingResolution, TaxResolution};
use crate::domain::address::{
    Address, AddressEvent, AddressField, billing_complete, shipping_complete, sync_billing,
};
use crate::domain::cart::{Cart, CartLine};
use crate::domain::order::{Customer, OrderId, OrderRequest, OrderResponse};
use crate::domain::payment::{
    PaymentField, PaymentInstrument, card_number_valid, cvv_valid, expiration_valid, format,
};
use crate::domain::ports::{Collaborators, OrderGatewayRef};
use crate::domain::pricing::PricingState;
use crate::error::{CheckoutError, Result, SubmissionError, ValidationError};
use std::sync::Arc;
use tracing::{info, warn};

/// Where the session is in the submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// The form is editable. Carries the message of the last failed submit.
    Editing { error: Option<String> },
    /// An order request is in flight.
    Processing,
    /// The order was placed and the cart cleared. Terminal.
    Complete { order_id: OrderId },
}

/// An order request that passed validation and is ready to send.
pub struct PendingOrder {
    request: OrderRequest,
    gateway: OrderGatewayRef,
}

impl PendingOrder {
    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    /// Sends the request once. No retry is attempted.
    pub async fn send(self) -> Result<OrderResponse> {
        self.gateway.create_order(&self.request).await
    }
}

/// The single owner of all checkout state.
///
/// Every edit runs to completion synchronously. Edits that change a pricing
/// input hand back a pending lookup; the caller awaits it whenever it likes
/// and passes the resolution back through [`CheckoutSession::apply_tax`] or
/// [`CheckoutSession::apply_shipping`], where stale results are dropped.
pub struct CheckoutSession {
    shipping: Address,
    billing: Address,
    same_as_shipping: bool,
    payment: PaymentInstrument,
    cart: Cart,
    pricing: PricingResolver,
    state: SubmissionState,
    collaborators: Collaborators,
}

impl CheckoutSession {
    pub fn new(cart: Cart, collaborators: Collaborators) -> Self {
        let pricing = PricingResolver::new(cart.subtotal());
        Self {
            shipping: Address::default(),
            billing: Address::default(),
            same_as_shipping: false,
            payment: PaymentInstrument::default(),
            cart,
            pricing,
            state: SubmissionState::Editing { error: None },
            collaborators,
        }
    }

    pub fn shipping(&self) -> &Address {
        &self.shipping
    }

    pub fn billing(&self) -> &Address {
        &self.billing
    }

    pub fn same_as_shipping(&self) -> bool {
        self.same_as_shipping
    }

    pub fn payment(&self) -> &PaymentInstrument {
        &self.payment
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn pricing(&self) -> &PricingState {
        self.pricing.state()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match &self.state {
            SubmissionState::Complete { order_id } => Some(order_id),
            _ => None,
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.state {
            SubmissionState::Complete { .. } => Err(CheckoutError::SessionComplete),
            _ => Ok(()),
        }
    }

    /// The cart is frozen while its order request is in flight.
    fn ensure_cart_editable(&self) -> Result<()> {
        self.ensure_editable()?;
        match self.state {
            SubmissionState::Processing => Err(CheckoutError::SubmissionInFlight),
            _ => Ok(()),
        }
    }

    /// Starts the lookups a freshly opened checkout page needs.
    pub fn open(&mut self) -> (Option<PendingTax>, Option<PendingShipping>) {
        let tax = self
            .pricing
            .begin_tax(&self.shipping, &self.collaborators.tax);
        (tax, self.begin_shipping())
    }

    pub fn edit_shipping(&mut self, field: AddressField, value: &str) -> Result<Option<PendingTax>> {
        self.ensure_editable()?;
        let before = self.shipping.get(field).to_string();
        self.shipping.set(field, value);
        self.billing = sync_billing(
            &self.shipping,
            &self.billing,
            self.same_as_shipping,
            AddressEvent::ShippingChanged,
        );
        if field.affects_tax() && self.shipping.get(field) != before {
            Ok(self
                .pricing
                .begin_tax(&self.shipping, &self.collaborators.tax))
        } else {
            Ok(None)
        }
    }

    pub fn edit_billing(&mut self, field: AddressField, value: &str) -> Result<()> {
        self.ensure_editable()?;
        if self.same_as_shipping {
            return Err(CheckoutError::BillingMirrored);
        }
        self.billing = sync_billing(
            &self.shipping,
            &self.billing,
            false,
            AddressEvent::BillingEdited { field, value },
        );
        Ok(())
    }

    pub fn set_same_as_shipping(&mut self, same_as_shipping: bool) -> Result<()> {
        self.ensure_editable()?;
        self.same_as_shipping = same_as_shipping;
        self.billing = sync_billing(
            &self.shipping,
            &self.billing,
            same_as_shipping,
            AddressEvent::ModeToggled,
        );
        Ok(())
    }

    pub fn edit_payment(&mut self, field: PaymentField, raw: &str) -> Result<()> {
        self.ensure_editable()?;
        self.payment = format(field, raw, &self.payment);
        Ok(())
    }

    pub fn add_to_cart(&mut self, line: CartLine) -> Result<Option<PendingShipping>> {
        self.ensure_cart_editable()?;
        self.cart.add(line)?;
        Ok(self.cart_changed())
    }

    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> Result<Option<PendingShipping>> {
        self.ensure_cart_editable()?;
        self.cart.set_quantity(product_id, quantity)?;
        Ok(self.cart_changed())
    }

    pub fn remove_from_cart(&mut self, product_id: u64) -> Result<Option<PendingShipping>> {
        self.ensure_cart_editable()?;
        self.cart.remove(product_id)?;
        Ok(self.cart_changed())
    }

    fn cart_changed(&mut self) -> Option<PendingShipping> {
        self.pricing.set_subtotal(self.cart.subtotal());
        self.begin_shipping()
    }

    fn begin_shipping(&mut self) -> Option<PendingShipping> {
        self.pricing
            .begin_shipping(self.cart.shipping_items(), &self.collaborators.shipping)
    }

    /// Commits a tax resolution unless it has been superseded.
    pub fn apply_tax(&mut self, resolution: TaxResolution) -> bool {
        self.pricing.commit_tax(resolution)
    }

    /// Commits a shipping resolution unless it has been superseded.
    pub fn apply_shipping(&mut self, resolution: ShippingResolution) -> bool {
        self.pricing.commit_shipping(resolution)
    }

    /// Awaits both lookups side by side and commits whatever is still current.
    pub async fn settle(&mut self, tax: Option<PendingTax>, shipping: Option<PendingShipping>) {
        let (tax, shipping) = tokio::join!(
            async move {
                match tax {
                    Some(pending) => Some(pending.resolve().await),
                    None => None,
                }
            },
            async move {
                match shipping {
                    Some(pending) => Some(pending.resolve().await),
                    None => None,
                }
            }
        );
        if let Some(resolution) = tax {
            self.apply_tax(resolution);
        }
        if let Some(resolution) = shipping {
            self.apply_shipping(resolution);
        }
    }

    /// Checks the form in submission order, stopping at the first failure.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let card_type = self.payment.card_type;
        if !card_number_valid(&self.payment) {
            return Err(ValidationError::CardNumberLength {
                expected: card_type.card_length(),
            });
        }
        if !expiration_valid(&self.payment, self.collaborators.clock.today()) {
            return Err(ValidationError::Expiration);
        }
        if !cvv_valid(&self.payment) {
            return Err(ValidationError::CvvLength {
                expected: card_type.cvv_length(),
            });
        }
        if !billing_complete(&self.billing, self.same_as_shipping) {
            return Err(ValidationError::IncompleteBilling);
        }
        if !shipping_complete(&self.shipping) {
            return Err(ValidationError::IncompleteShipping);
        }
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        Ok(())
    }

    /// Validates and moves to `Processing`, returning the request to send.
    ///
    /// A validation failure leaves the session in `Editing` with the message
    /// recorded and nothing else touched.
    pub fn begin_submission(&mut self) -> Result<PendingOrder> {
        match self.state {
            SubmissionState::Complete { .. } => return Err(CheckoutError::SessionComplete),
            SubmissionState::Processing => return Err(CheckoutError::SubmissionInFlight),
            SubmissionState::Editing { .. } => {}
        }
        if let Err(e) = self.validate() {
            self.state = SubmissionState::Editing {
                error: Some(e.to_string()),
            };
            return Err(e.into());
        }
        self.state = SubmissionState::Processing;
        Ok(PendingOrder {
            request: OrderRequest {
                customer: Customer::from(&self.shipping),
                product_quantities: self.cart.product_quantities(),
            },
            gateway: Arc::clone(&self.collaborators.orders),
        })
    }

    /// Resolves an in-flight submission to `Complete` or back to `Editing`.
    pub fn finish_submission(&mut self, outcome: Result<OrderResponse>) -> Result<OrderId> {
        match self.state {
            SubmissionState::Processing => {}
            SubmissionState::Complete { .. } => return Err(CheckoutError::SessionComplete),
            SubmissionState::Editing { .. } => return Err(CheckoutError::NotProcessing),
        }
        let result = outcome.and_then(|response| response.into_order_id().map_err(Into::into));
        match result {
            Ok(order_id) => {
                info!(%order_id, "Order placed");
                self.cart.clear();
                self.pricing.clear_cart();
                self.state = SubmissionState::Complete {
                    order_id: order_id.clone(),
                };
                Ok(order_id)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                self.state = SubmissionState::Editing {
                    error: Some(SubmissionError::USER_MESSAGE.to_string()),
                };
                Err(match e {
                    CheckoutError::Submission(inner) => CheckoutError::Submission(inner),
                    other => CheckoutError::Submission(SubmissionError::Gateway(other.to_string())),
                })
            }
        }
    }

    /// Validates, sends the order exactly once, and records the outcome.
    pub async fn submit(&mut self) -> Result<OrderId> {
        let pending = self.begin_submission()?;
        let outcome = pending.send().await;
        self.finish_submission(outcome)
    }
}
