//! Elasticsearch result store adapter.

mod client;
mod dto;
mod settings;

pub use client::ElasticStore;
pub use settings::ElasticConfig;
