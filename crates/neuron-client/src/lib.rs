//! Neuron JSON:API Client Library
//!
//! Implements the neuron [`Repository`] operations against a remote JSON:API
//! server over HTTP.
//!
//! # Example
//!
//! ```rust,no_run
//! use neuron_client::{ClientConfig, NeuronClient};
//! use neuron_core::{Controller, Model, Operator, Repository, Scope};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Article {
//!     id: String,
//!     title: String,
//! }
//!
//! impl Model for Article {
//!     const COLLECTION: &'static str = "articles";
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let controller = Controller::builder().register::<Article>().build_shared();
//!     let config = ClientConfig::new("localhost").with_port(8080);
//!
//!     // Validates the configuration and checks server health
//!     let client = NeuronClient::new(controller, config).await?;
//!
//!     let mut scope = Scope::<Article>::new().filter_primary(Operator::Equal, ["7"]);
//!     client.get(&mut scope).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module serves an axum router on an ephemeral port:
//!
//! ```rust,ignore
//! use neuron_client::testing::TestServer;
//!
//! let (server, client) = TestServer::start(router, controller).await?;
//! ```

mod client;
mod config;
mod decompress;
mod error;
mod operations;
mod request;
mod status;
pub mod testing;

pub use client::{NeuronClient, HEALTH_PASS, HEALTH_PATH};
pub use config::ClientConfig;
pub use decompress::{decompress, ResponseBody};
pub use error::{ClientError, Result};
pub use operations::{collection_path, encode_path_segment, primary_id, resource_path};
pub use request::{ACCEPTED_ENCODINGS, CLIENT_USER_AGENT};
pub use status::{status_error, translate, STATUS_ERRORS};

// Re-export core types for convenience
pub use neuron_core::{
    ApiError, Context, ContextError, Controller, ErrorKind, Model, Operator, Repository, Scope,
    ScopeValue,
};
