//! Blocking client for the transport.opendata.ch connections endpoint

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{FahrplanError, Result};
use crate::models::{self, RawConnection};
use crate::query::ConnectionQuery;

#[derive(Debug)]
pub struct TimetableClient {
    client: Client,
    config: ClientConfig,
}

impl TimetableClient {
    /// Create a client with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FahrplanError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch and decode the connections for `query`. One request, no retries.
    #[instrument(skip(self, query), fields(from = %query.from, to = %query.to))]
    pub fn fetch_connections(&self, query: &ConnectionQuery) -> Result<Vec<RawConnection>> {
        let url = self.config.connections_url();
        let params = query.params();

        debug!(?url, ?params, "Requesting connections");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .ok()
                .and_then(|body| models::api_error_message(&body));
            return Err(FahrplanError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .map_err(|e| FahrplanError::InvalidResponse(e.to_string()))?;

        let connections = models::decode_connections(models::parse_response(&body)?)?;

        debug!(count = connections.len(), "Connections received");

        Ok(connections)
    }

    fn transport_error(&self, e: &reqwest::Error) -> FahrplanError {
        if e.is_timeout() {
            FahrplanError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            FahrplanError::Network(e.to_string())
        }
    }
}
