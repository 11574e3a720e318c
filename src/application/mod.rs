//! Application layer orchestrating a checkout.
//!
//! `CheckoutSession` owns the addresses, payment instrument, cart, pricing and
//! submission state of one checkout, and talks to the outside world only
//! through the ports in `domain::ports`. `PricingResolver` keeps tax and
//! shipping lookups ordered with per-flow epoch counters.

pub mod checkout;
pub mod pricing;
