//! NDVI time-series retrieval for geographic points.
//!
//! A request for a point and date range is answered from the cheapest tier
//! that has it:
//!
//! 1. a bounded on-disk cache of previously downloaded extraction results,
//! 2. a geospatial store of earlier results, searched by proximity,
//! 3. a new point-extraction task on NASA AppEEARS (submit, poll, download).
//!
//! # Modules
//!
//! - [`domain`] - Queries, coordinates, tasks and result records (no I/O)
//! - [`port`] - Traits for the extraction service and the result store
//! - [`application`] - Cache, task runner, CSV materializer and [`application::Retriever`]
//! - [`adapter`] - AppEEARS and Elasticsearch clients, in-memory store, CLI
//! - [`infrastructure`] - Configuration and runtime wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use ndvi_retriever::domain::Query;
//! use ndvi_retriever::infrastructure::bootstrap::build_retriever;
//! use ndvi_retriever::infrastructure::config::Config;
//!
//! # async fn run() -> ndvi_retriever::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let (_shutdown, rx) = tokio::sync::watch::channel(false);
//! let retriever = build_retriever(&config, rx).await?;
//!
//! let query = Query::parse("-3.45", "-60.12", "01-01-2022", "12-31-2022")?;
//! let retrieval = retriever.retrieve(&query).await?;
//! println!("{} rows from {}", retrieval.record.len(), retrieval.source);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
