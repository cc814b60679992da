//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod cache;
pub mod extraction;
pub mod materialize;
pub mod retrieval;

pub use retrieval::{Answer, Retrieval, RetrievalSettings, Retriever, Source};
