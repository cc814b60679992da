//! Outbound adapters (driven side).

pub mod appeears;
pub mod elastic;
pub mod memory;
