//! NASA AppEEARS extraction service adapter.

mod client;
mod dto;
mod settings;

pub use client::{partial_path, AppeearsClient};
pub use settings::{AppeearsConfig, EarthdataCredentials};
