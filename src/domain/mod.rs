//! Domain types and the pure rules over them: address mirroring, card
//! formatting, pricing arithmetic, and the collaborator ports.

pub mod address;
pub mod cart;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
