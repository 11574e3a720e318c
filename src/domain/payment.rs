//! Payment instrument classification, keystroke formatting, and the
//! submission-time predicates.
//!
//! Formatting runs on every keystroke and never rejects input: it strips what
//! does not belong and truncates to the card type's limits. Whether the result
//! is acceptable is decided later by [`card_number_valid`], [`expiration_valid`]
//! and [`cvv_valid`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Visa,
    Mastercard,
    Discover,
    Amex,
    #[default]
    Unknown,
}

impl CardType {
    /// Classifies a card from the leading digit of its number.
    pub fn from_digits(digits: &str) -> Self {
        match digits.chars().next() {
            Some('4') => Self::Visa,
            Some('5') | Some('2') => Self::Mastercard,
            Some('6') => Self::Discover,
            Some('3') => Self::Amex,
            _ => Self::Unknown,
        }
    }

    fn groups(self) -> &'static [usize] {
        match self {
            Self::Amex => &[4, 6, 5],
            _ => &[4, 4, 4, 4],
        }
    }

    /// Digits a complete card number of this type has.
    pub fn card_length(self) -> usize {
        self.groups().iter().sum()
    }

    /// Length of the formatted number, separators included.
    pub fn max_formatted_length(self) -> usize {
        self.card_length() + self.groups().len() - 1
    }

    pub fn cvv_length(self) -> usize {
        match self {
            Self::Amex => 4,
            _ => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Discover => "discover",
            Self::Amex => "amex",
            Self::Unknown => "unknown",
        }
    }

    /// Splits `digits` into this type's display groups.
    fn group(self, digits: &str) -> String {
        let mut out = String::with_capacity(self.max_formatted_length());
        let mut rest = digits;
        for size in self.groups() {
            if rest.is_empty() {
                break;
            }
            let (head, tail) = rest.split_at(rest.len().min(*size));
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(head);
            rest = tail;
        }
        out
    }
}

/// The payment inputs on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    CardNumber,
    ExpirationDate,
    Cvv,
}

/// A card as typed so far. Never charged; only validated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstrument {
    /// Up to 16 digits, truncated to the card type's length.
    pub raw_digits: String,
    pub card_type: CardType,
    pub formatted_number: String,
    /// `MM/YY` as typed, possibly partial.
    pub expiration: String,
    pub cvv: String,
}

impl PaymentInstrument {
    /// Parses the typed expiration into `(month, two-digit year)`.
    ///
    /// Only a complete `MM/YY` parses; partial input yields `None`.
    pub fn expiration_month_year(&self) -> Option<(u32, u32)> {
        let (month, year) = self.expiration.split_once('/')?;
        if month.len() != 2 || year.len() != 2 {
            return None;
        }
        Some((month.parse().ok()?, year.parse().ok()?))
    }

    /// The last four digits, for receipts.
    pub fn last4(&self) -> &str {
        let len = self.raw_digits.len();
        &self.raw_digits[len.saturating_sub(4)..]
    }
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Applies one keystroke-level edit to a payment field.
///
/// A CVV already entered is left alone when the card number changes type;
/// its length is only checked at submission.
pub fn format(field: PaymentField, raw: &str, current: &PaymentInstrument) -> PaymentInstrument {
    let mut next = current.clone();
    let digits = digits_only(raw);
    match field {
        PaymentField::CardNumber => {
            let card_type = CardType::from_digits(&digits);
            let raw_digits: String = digits.chars().take(card_type.card_length()).collect();
            next.formatted_number = card_type.group(&raw_digits);
            next.raw_digits = raw_digits;
            next.card_type = card_type;
        }
        PaymentField::ExpirationDate => {
            let formatted = if digits.len() >= 2 {
                let (month, year) = digits.split_at(2);
                format!("{month}/{}", &year[..year.len().min(2)])
            } else {
                digits
            };
            next.expiration = formatted.chars().take(5).collect();
        }
        PaymentField::Cvv => {
            next.cvv = digits.chars().take(current.card_type.cvv_length()).collect();
        }
    }
    next
}

pub fn card_number_valid(instrument: &PaymentInstrument) -> bool {
    instrument.raw_digits.len() == instrument.card_type.card_length()
}

/// The expiration parses as `MM/YY` and is not before `today`'s month.
pub fn expiration_valid(instrument: &PaymentInstrument, today: NaiveDate) -> bool {
    let Some((month, year)) = instrument.expiration_month_year() else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    let year = 2000 + year as i32;
    (year, month) >= (today.year(), today.month())
}

pub fn cvv_valid(instrument: &PaymentInstrument) -> bool {
    instrument.cvv.len() == instrument.card_type.cvv_length()
}
