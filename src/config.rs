//! Client configuration

use crate::error::{FahrplanError, Result};

/// Settings for the timetable HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the transport API, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://transport.opendata.ch/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("fahrplan/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at an arbitrary host, with a short timeout
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Full URL of the connections endpoint
    #[must_use]
    pub fn connections_url(&self) -> String {
        format!("{}/connections", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(FahrplanError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(FahrplanError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
