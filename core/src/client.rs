//! Client core: authenticated GET requests against the v3 API.
//!
//! # Design
//! `Client` holds immutable configuration and a `Transport`. Building the
//! request and unwrapping the envelope are pure functions of their inputs;
//! only `get` performs I/O, and it does so through the transport. Nothing is
//! mutated after construction, so a `Client` can be shared across threads
//! whenever its transport can.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::envelope::unwrap_envelope;
use crate::error::BitlyError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryParams, Transport, UreqTransport};
use crate::links::Links;

#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<UreqTransport> {
    /// Client backed by a blocking `ureq` agent honoring `config.timeout`.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout.0);
        Self { config, transport }
    }
}

impl<T> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Operations on bitlinks.
    pub fn links(&self) -> Links<'_, T> {
        Links::new(self)
    }

    /// Build a GET for `path` with `params`, appending the access token last.
    pub fn build_get(&self, path: &str, params: &QueryParams) -> Result<HttpRequest, BitlyError> {
        let raw = format!("{}/{}", self.config.base(), path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| BitlyError::InvalidUrl(format!("{raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params.iter() {
                query.append_pair(name, value);
            }
            query.append_pair("access_token", &self.config.access_token);
        }

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    /// Unwrap the envelope and return its `data` payload.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, BitlyError> {
        unwrap_envelope(response)
    }
}

impl<T: Transport> Client<T> {
    /// Perform one GET round trip and return the `data` payload.
    pub fn get(&self, path: &str, params: &QueryParams) -> Result<Value, BitlyError> {
        let request = self.build_get(path, params)?;
        debug!(path, params = params.len(), "sending bitly request");

        let response = self.transport.execute(&request).map_err(|e| {
            warn!(path, error = %e, "bitly transport failed");
            BitlyError::from(e)
        })?;

        self.parse_response(response).inspect_err(|e| {
            warn!(path, error = %e, "bitly request failed");
        })
    }
}
