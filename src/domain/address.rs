use serde::{Deserialize, Serialize};

/// Number of digits in a complete ZIP code.
pub const ZIP_MAX_LEN: usize = 5;

/// A complete ZIP: exactly five ASCII digits.
pub fn zip_valid(zip: &str) -> bool {
    zip.len() == ZIP_MAX_LEN && zip.bytes().all(|b| b.is_ascii_digit())
}

/// US state codes accepted by the checkout form, with display names.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Looks up the display name of a state code.
pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// A postal address plus the contact fields collected with it.
///
/// The same type serves as the shipping address (where email and phone are
/// collected) and the billing address (where they stay `None`, mirrored or
/// not).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "address")]
    pub street: String,
    pub city: String,
    #[serde(alias = "state")]
    pub state_code: String,
    pub zip_code: String,
}

/// Identifies a single editable address input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    FirstName,
    LastName,
    Email,
    Phone,
    Street,
    City,
    StateCode,
    ZipCode,
}

impl AddressField {
    /// Whether an edit to this field can change the tax rate.
    pub fn affects_tax(self) -> bool {
        matches!(self, Self::StateCode | Self::ZipCode)
    }
}

impl Address {
    /// Applies a single keystroke-level edit.
    ///
    /// ZIP inputs keep only ASCII digits, at most [`ZIP_MAX_LEN`] of them.
    /// Empty contact fields are stored as `None`.
    pub fn set(&mut self, field: AddressField, value: &str) {
        match field {
            AddressField::FirstName => self.first_name = value.to_string(),
            AddressField::LastName => self.last_name = value.to_string(),
            AddressField::Email => self.email = non_empty(value),
            AddressField::Phone => self.phone = non_empty(value),
            AddressField::Street => self.street = value.to_string(),
            AddressField::City => self.city = value.to_string(),
            AddressField::StateCode => self.state_code = value.to_string(),
            AddressField::ZipCode => {
                self.zip_code = value
                    .chars()
                    .filter(char::is_ascii_digit)
                    .take(ZIP_MAX_LEN)
                    .collect()
            }
        }
    }

    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::FirstName => &self.first_name,
            AddressField::LastName => &self.last_name,
            AddressField::Email => self.email.as_deref().unwrap_or_default(),
            AddressField::Phone => self.phone.as_deref().unwrap_or_default(),
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::StateCode => &self.state_code,
            AddressField::ZipCode => &self.zip_code,
        }
    }

    fn has_postal_fields(&self) -> bool {
        [
            AddressField::FirstName,
            AddressField::LastName,
            AddressField::Street,
            AddressField::City,
            AddressField::StateCode,
            AddressField::ZipCode,
        ]
        .iter()
        .all(|field| !self.get(*field).is_empty())
            && zip_valid(&self.zip_code)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Checks the required billing fields.
///
/// A mirrored billing address is never checked on its own.
pub fn billing_complete(billing: &Address, same_as_shipping: bool) -> bool {
    same_as_shipping || billing.has_postal_fields()
}

/// Checks the required shipping fields, contact details included.
pub fn shipping_complete(shipping: &Address) -> bool {
    shipping.has_postal_fields()
        && !shipping.get(AddressField::Email).is_empty()
        && !shipping.get(AddressField::Phone).is_empty()
}

/// Something that happened to the address pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressEvent<'a> {
    /// Any shipping field changed.
    ShippingChanged,
    /// `sameAsShipping` was flipped; the new value is passed alongside.
    ModeToggled,
    /// The shopper typed into a billing field.
    BillingEdited { field: AddressField, value: &'a str },
}

/// Computes the billing address after `event`.
///
/// While `same_as_shipping` holds, billing is a fresh copy of the shipping
/// postal fields; email and phone are never mirrored. Once the mode is off,
/// billing keeps whatever it last held and only `BillingEdited` changes it.
pub fn sync_billing(
    shipping: &Address,
    billing: &Address,
    same_as_shipping: bool,
    event: AddressEvent<'_>,
) -> Address {
    if same_as_shipping {
        return Address {
            email: None,
            phone: None,
            ..shipping.clone()
        };
    }
    let mut next = billing.clone();
    if let AddressEvent::BillingEdited { field, value } = event
        && !matches!(field, AddressField::Email | AddressField::Phone)
    {
        next.set(field, value);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> Address {
        Address {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: None,
            phone: None,
            street: "1 Main St".to_string(),
            city: "X".to_string(),
            state_code: "CA".to_string(),
            zip_code: "90210".to_string(),
        }
    }

    #[test]
    fn test_toggle_on_copies_shipping() {
        let billing = sync_billing(&shipping(), &Address::default(), true, AddressEvent::ModeToggled);
        assert_eq!(billing, shipping());
    }

    #[test]
    fn test_contact_fields_are_not_mirrored() {
        let mut ship = shipping();
        ship.set(AddressField::Email, "a@b.test");
        ship.set(AddressField::Phone, "555-0100");
        let billing = sync_billing(&ship, &Address::default(), true, AddressEvent::ShippingChanged);
        assert_eq!(billing.email, None);
        assert_eq!(billing.phone, None);
        assert_eq!(billing.street, ship.street);

        let billing = sync_billing(&ship, &billing, false, AddressEvent::BillingEdited {
            field: AddressField::Email,
            value: "b@c.test",
        });
        assert_eq!(billing.email, None);
    }

    #[test]
    fn test_toggle_off_keeps_last_snapshot() {
        let mirrored = sync_billing(&shipping(), &Address::default(), true, AddressEvent::ModeToggled);
        let billing = sync_billing(&shipping(), &mirrored, false, AddressEvent::ModeToggled);
        assert_eq!(billing, shipping());
    }

    #[test]
    fn test_independent_edit_does_not_touch_shipping() {
        let ship = shipping();
        let billing = sync_billing(&ship, &ship, false, AddressEvent::BillingEdited {
            field: AddressField::City,
            value: "Y",
        });
        assert_eq!(billing.city, "Y");
        assert_eq!(ship.city, "X");
    }

    #[test]
    fn test_shipping_change_ignored_when_independent() {
        let mut ship = shipping();
        let billing = ship.clone();
        ship.set(AddressField::Street, "2 Side St");
        let billing = sync_billing(&ship, &billing, false, AddressEvent::ShippingChanged);
        assert_eq!(billing.street, "1 Main St");
    }

    #[test]
    fn test_billing_edit_ignored_while_mirrored() {
        let ship = shipping();
        let billing = sync_billing(&ship, &ship, true, AddressEvent::BillingEdited {
            field: AddressField::City,
            value: "Y",
        });
        assert_eq!(billing.city, "X");
    }

    #[test]
    fn test_billing_complete_only_checked_when_independent() {
        let empty = Address::default();
        assert!(billing_complete(&empty, true));
        assert!(!billing_complete(&empty, false));
        assert!(billing_complete(&shipping(), false));
    }

    #[test]
    fn test_shipping_complete_requires_contact() {
        let mut ship = shipping();
        assert!(!shipping_complete(&ship));
        ship.set(AddressField::Email, "a@b.test");
        ship.set(AddressField::Phone, "555-0100");
        assert!(shipping_complete(&ship));
    }

    #[test]
    fn test_zip_is_capped() {
        let mut address = Address::default();
        address.set(AddressField::ZipCode, "902101234");
        assert_eq!(address.zip_code, "90210");
    }

    #[test]
    fn test_zip_keeps_only_digits() {
        let mut address = Address::default();
        address.set(AddressField::ZipCode, "ABCDE");
        assert_eq!(address.zip_code, "");
        address.set(AddressField::ZipCode, "9a0-2 1x0");
        assert_eq!(address.zip_code, "90210");
    }

    #[test]
    fn test_partial_zip_is_incomplete() {
        let mut ship = shipping();
        ship.zip_code = "9021".to_string();
        assert!(!billing_complete(&ship, false));
        ship.zip_code = "9021A".to_string();
        assert!(!billing_complete(&ship, false));
    }

    #[test]
    fn test_state_name() {
        assert_eq!(state_name("ca"), Some("California"));
        assert_eq!(state_name("ZZ"), None);
    }
}
