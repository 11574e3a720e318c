use thiserror::Error;

/// A submitted field failed a format or range check.
///
/// The `Display` text is the message shown to the shopper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Card number must be {expected} digits")]
    CardNumberLength { expected: usize },
    #[error("Please enter a valid expiration date (MM/YY)")]
    Expiration,
    #[error("CVV must be {expected} digits")]
    CvvLength { expected: usize },
    #[error("Please complete all billing address fields")]
    IncompleteBilling,
    #[error("Please complete all shipping address fields")]
    IncompleteShipping,
    #[error("Your cart is empty")]
    EmptyCart,
}

/// The order-creation call failed or returned no usable identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Order ID not received from server")]
    MissingOrderId,
    #[error("order gateway error: {0}")]
    Gateway(String),
}

impl SubmissionError {
    /// The single message surfaced for every submission failure.
    pub const USER_MESSAGE: &'static str = "Failed to place order. Please try again.";
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("pricing lookup failed: {0}")]
    PricingLookup(String),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("the order for this session is already complete")]
    SessionComplete,
    #[error("an order submission is already in flight")]
    SubmissionInFlight,
    #[error("no order submission is in flight")]
    NotProcessing,
    #[error("billing address mirrors the shipping address and cannot be edited")]
    BillingMirrored,
    #[error("invalid cart line: {0}")]
    InvalidCartLine(String),
    #[error("product {0} is not in the cart")]
    UnknownProduct(u64),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "http-client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_expected_lengths() {
        assert_eq!(
            ValidationError::CardNumberLength { expected: 15 }.to_string(),
            "Card number must be 15 digits"
        );
        assert_eq!(
            ValidationError::CvvLength { expected: 3 }.to_string(),
            "CVV must be 3 digits"
        );
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: CheckoutError = ValidationError::Expiration.into();
        assert_eq!(
            err.to_string(),
            "Please enter a valid expiration date (MM/YY)"
        );
    }
}
