//! Credentials resolved from the environment.
//!
//! Secrets never come from the configuration file. A `.env` file in the
//! working directory is loaded by the binary before these are read.

use std::env;

use crate::adapter::outbound::appeears::EarthdataCredentials;
use crate::error::{ConfigError, Result};

pub const APPEEARS_USERNAME: &str = "APPEEARS_USERNAME";
pub const APPEEARS_PASSWORD: &str = "APPEEARS_PASSWORD";
pub const ELASTIC_API_KEY: &str = "ELASTIC_API_KEY";

/// Secrets available to this process.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub elastic_api_key: Option<String>,
}

impl Credentials {
    /// Read credentials from the environment. Blank values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            username: var(APPEEARS_USERNAME),
            password: var(APPEEARS_PASSWORD),
            elastic_api_key: var(ELASTIC_API_KEY),
        }
    }

    /// Earthdata login for the extraction service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] naming the first unset variable.
    pub fn earthdata(&self) -> Result<EarthdataCredentials> {
        let username = self
            .username
            .clone()
            .ok_or(ConfigError::MissingCredential {
                var: APPEEARS_USERNAME,
            })?;
        let password = self
            .password
            .clone()
            .ok_or(ConfigError::MissingCredential {
                var: APPEEARS_PASSWORD,
            })?;
        Ok(EarthdataCredentials { username, password })
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn earthdata_requires_both_values() {
        let creds = Credentials {
            username: Some("user".into()),
            ..Credentials::default()
        };
        let err = creds.earthdata().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingCredential { var: APPEEARS_PASSWORD })
        ));

        let creds = Credentials {
            username: Some("user".into()),
            password: Some("pass".into()),
            elastic_api_key: None,
        };
        let earthdata = creds.earthdata().unwrap();
        assert_eq!(earthdata.username, "user");
        assert_eq!(earthdata.password, "pass");
    }
}
