//! JSON:API HTTP client and its request pipeline

use std::io::Read;
use std::sync::Arc;

use neuron_core::{Context, Controller, MEDIA_TYPE};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use validator::Validate;

use crate::config::ClientConfig;
use crate::decompress::decompress;
use crate::error::{ClientError, Result};
use crate::request::format_request;
use crate::status::translate;

/// Path of the health endpoint, relative to the base URL
pub const HEALTH_PATH: &str = "/health";

/// Health status reported by a passing server
pub const HEALTH_PASS: &str = "pass";

/// Consumes a successful response body
///
/// One decoder is built per call and handed to the pipeline, which invokes
/// it only after the status was classified as a success.
pub trait ResponseDecoder {
    fn decode(self, body: &mut dyn Read, status: StatusCode) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct HealthStatus {
    status: String,
}

/// Reads `{"status": "..."}` from the health endpoint
struct HealthDecoder<'a> {
    status: &'a mut String,
}

impl ResponseDecoder for HealthDecoder<'_> {
    fn decode(self, body: &mut dyn Read, status: StatusCode) -> Result<()> {
        if status != StatusCode::OK {
            return Err(ClientError::HealthCheck(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }
        let health: HealthStatus =
            serde_json::from_reader(body).map_err(neuron_core::CodecError::from)?;
        *self.status = health.status;
        Ok(())
    }
}

/// Client for a remote JSON:API server
///
/// Cheap to clone; clones share the connection pool, configuration and
/// model registry. Safe for concurrent use.
#[derive(Debug, Clone)]
pub struct NeuronClient {
    http: Client,
    config: Arc<ClientConfig>,
    controller: Arc<Controller>,
}

impl NeuronClient {
    /// Create a client for the server described by `config`
    ///
    /// Validates the configuration and performs one health check; no client
    /// is returned when either fails.
    pub async fn new(controller: Arc<Controller>, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Transport)?;

        let client = Self {
            http,
            config: Arc::new(config),
            controller,
        };
        client.health_check().await?;

        info!(base_url = %client.config.base_url(), "Connected to JSON:API server");
        Ok(client)
    }

    /// Check server health
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        let mut status = String::new();
        let decoder = HealthDecoder {
            status: &mut status,
        };
        self.execute(
            &Context::background(),
            Method::GET,
            HEALTH_PATH,
            None,
            None,
            decoder,
        )
        .await?;

        if status != HEALTH_PASS {
            return Err(ClientError::HealthCheck(format!(
                "server reported status '{}'",
                status
            )));
        }
        Ok(())
    }

    /// Get the connection configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the model controller used for encoding and decoding
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Perform one HTTP exchange and hand the body to `decoder`
    ///
    /// The round trip is aborted when `ctx` is cancelled or its deadline
    /// passes. The decoder only runs for success statuses.
    pub(crate) async fn execute<D>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Vec<u8>>,
        decoder: D,
    ) -> Result<()>
    where
        D: ResponseDecoder + Send,
    {
        let url = self.config.endpoint_url(path);

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, MEDIA_TYPE).body(body);
        }
        let mut request = builder.build().map_err(|source| {
            error!(method = %method, path, error = %source, "Failed to create request");
            ClientError::RequestBuild {
                method: method.clone(),
                url: url.clone(),
                source,
            }
        })?;

        format_request(request.headers_mut());
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request.url_mut().query_pairs_mut().extend_pairs(query);
        }

        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        debug!(method = %method, url = %request.url(), "Sending request");

        let exchange = async {
            let response = self
                .http
                .execute(request)
                .await
                .map_err(ClientError::Transport)?;
            let status = response.status();
            let headers = response.headers().clone();
            let declared_len = response.content_length();
            let raw = response.bytes().await.map_err(ClientError::Transport)?;
            Ok::<_, ClientError>((status, headers, declared_len, raw))
        };

        let (status, headers, declared_len, raw) = tokio::select! {
            biased;
            reason = ctx.done() => {
                debug!(method = %method, path, reason = %reason, "Request aborted");
                return Err(reason.into());
            }
            result = exchange => result?,
        };

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            bytes = raw.len(),
            "Response received"
        );

        let body_len = declared_len.unwrap_or(raw.len() as u64);
        let mut body = decompress(&headers, false, raw)?;

        translate(status, &method, &mut body, body_len)?;
        decoder.decode(&mut body, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_decoder_reads_status() {
        let mut status = String::new();
        let decoder = HealthDecoder {
            status: &mut status,
        };
        decoder
            .decode(&mut &br#"{"status":"pass"}"#[..], StatusCode::OK)
            .unwrap();
        assert_eq!(status, "pass");
    }

    #[test]
    fn test_health_decoder_requires_ok() {
        let mut status = String::new();
        let decoder = HealthDecoder {
            status: &mut status,
        };
        let err = decoder
            .decode(&mut &br#"{"status":"pass"}"#[..], StatusCode::NO_CONTENT)
            .unwrap_err();
        assert!(matches!(err, ClientError::HealthCheck(_)));
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let controller = Controller::builder().build_shared();
        let err = NeuronClient::new(controller, ClientConfig::new("bad host"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }
}
