//! Infrastructure configuration modules.

pub mod cache;
pub mod credentials;
pub mod logging;
pub mod settings;
pub mod store;

pub use credentials::Credentials;
pub use settings::Config;
