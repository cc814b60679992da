//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │       Application       │
//!     ┌──────────────┤   Retriever + caches    ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                                                       ▼
//! ┌────────────┐                                      ┌──────────────┐
//! │ Extraction │                                      │ Result store │
//! │  adapter   │                                      │   adapter    │
//! └────────────┘                                      └──────────────┘
//! ```
//!
//! - [`ExtractionService`] - submit/poll/download against the remote service
//! - [`ResultStore`] - proximity lookups and upserts of past results

mod extraction;
mod store;

pub use extraction::{
    DateRange, ExtractionService, FormatSpec, LayerSpec, OutputSpec, PointSpec, ProductLayer,
    TaskParams, TaskRequest,
};
pub use store::{ProximityQuery, ResultStore};
