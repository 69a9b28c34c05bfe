//! Test utilities for neuron-client
//!
//! Provides an in-process JSON:API server for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use neuron_core::Controller;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::client::HEALTH_PATH;
use crate::{ClientConfig, NeuronClient, Result};

/// Health handler reporting a passing server
pub async fn healthy() -> Json<Value> {
    Json(json!({ "status": crate::client::HEALTH_PASS }))
}

/// Add a passing health route at `/v{api_version}[/{path_base}]/health`
pub fn with_health(router: Router, config: &ClientConfig) -> Router {
    router.route(&route_path(config, HEALTH_PATH), get(healthy))
}

/// Server-side route for a client path, e.g. `/v1/api/articles`
pub fn route_path(config: &ClientConfig, path: &str) -> String {
    let mut route = format!("/v{}", config.api_version);
    let path_base = config.path_base.trim_matches('/');
    if !path_base.is_empty() {
        route.push('/');
        route.push_str(path_base);
    }
    route.push_str(path);
    route
}

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve `router` on an ephemeral localhost port
    ///
    /// No health route is added; see [`with_health`].
    pub async fn spawn(router: Router) -> std::io::Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Serve `router` plus a passing health route and connect a client to it
    ///
    /// # Example
    ///
    /// ```ignore
    /// use neuron_client::testing::TestServer;
    ///
    /// let (server, client) = TestServer::start(router, controller).await?;
    /// client.list(&mut scope).await?;
    /// ```
    pub async fn start(
        router: Router,
        controller: Arc<Controller>,
    ) -> Result<(Self, NeuronClient)> {
        Self::start_with_config(router, controller, |config| config).await
    }

    /// Like [`TestServer::start`], with the client configuration adjusted by `configure`
    pub async fn start_with_config<F>(
        router: Router,
        controller: Arc<Controller>,
        configure: F,
    ) -> Result<(Self, NeuronClient)>
    where
        F: FnOnce(ClientConfig) -> ClientConfig,
    {
        let config = configure(ClientConfig::new("127.0.0.1"));
        let router = with_health(router, &config);

        let server = Self::spawn(router).await?;

        let config = config.with_port(server.addr.port());
        let client = NeuronClient::new(controller, config).await?;
        Ok((server, client))
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("127.0.0.1")
            .with_port(self.addr.port())
            .with_timeout(Duration::from_secs(5))
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path() {
        let config = ClientConfig::new("h");
        assert_eq!(route_path(&config, "/health"), "/v1/health");

        let config = config.with_api_version(2).with_path_base("/store/");
        assert_eq!(route_path(&config, "/api/articles"), "/v2/store/api/articles");
    }
}
