//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`extraction`] - [`ScriptedExtraction`](extraction::ScriptedExtraction),
//!   an offline extraction service driven by a status script.
//! - [`store`] - store doubles such as an always-unreachable store.
//! - [`fixtures`] - builders for coordinates, queries, CSV bodies and records.

pub mod extraction;
pub mod fixtures;
pub mod store;
