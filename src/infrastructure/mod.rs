//! Adapters implementing the domain ports.

pub mod clock;
#[cfg(feature = "http-client")]
pub mod http;
pub mod in_memory;
