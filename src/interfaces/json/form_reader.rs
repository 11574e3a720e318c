use crate::application::checkout::CheckoutSession;
use crate::application::pricing::PendingTax;
use crate::domain::address::{Address, AddressField};
use crate::domain::payment::PaymentField;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentInput {
    pub card_number: String,
    pub expiration_date: String,
    pub cvv: String,
}

/// A filled-in checkout form, as the shopper would have typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub shipping: Address,
    pub billing: Option<Address>,
    pub same_as_shipping: bool,
    pub payment: PaymentInput,
}

const ADDRESS_FIELDS: [AddressField; 8] = [
    AddressField::FirstName,
    AddressField::LastName,
    AddressField::Email,
    AddressField::Phone,
    AddressField::Street,
    AddressField::City,
    AddressField::StateCode,
    AddressField::ZipCode,
];

impl CheckoutForm {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Types the form into `session` field by field, in page order.
    ///
    /// Returns the tax lookup issued by the last tax-relevant edit; earlier
    /// ones are already superseded.
    pub fn replay(&self, session: &mut CheckoutSession) -> Result<Option<PendingTax>> {
        let mut pending = None;
        for field in ADDRESS_FIELDS {
            if let Some(issued) = session.edit_shipping(field, self.shipping.get(field))? {
                pending = Some(issued);
            }
        }
        session.set_same_as_shipping(self.same_as_shipping)?;
        if !self.same_as_shipping
            && let Some(billing) = &self.billing
        {
            for field in ADDRESS_FIELDS {
                session.edit_billing(field, billing.get(field))?;
            }
        }
        session.edit_payment(PaymentField::CardNumber, &self.payment.card_number)?;
        session.edit_payment(PaymentField::ExpirationDate, &self.payment.expiration_date)?;
        session.edit_payment(PaymentField::Cvv, &self.payment.cvv)?;
        Ok(pending)
    }
}
