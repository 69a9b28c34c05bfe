//! neuron-core - Core traits and types for neuron JSON:API repositories
//!
//! This crate provides the abstractions a repository adapter works against:
//! models and their registry, query scopes with filters and a cancellation
//! context, the JSON:API document codec, and the JSON:API error object.

pub mod codec;
pub mod context;
pub mod error;
pub mod model;
pub mod repository;
pub mod scope;

pub use codec::{Document, PrimaryData, Resource, MEDIA_TYPE};
pub use context::{Context, ContextError};
pub use error::{ApiError, CodecError, CodecResult, ErrorKind, ErrorsPayload};
pub use model::{Controller, ControllerBuilder, Model, ModelRegistry, ModelStruct, DEFAULT_SCHEMA};
pub use repository::Repository;
pub use scope::{
    Filter, Operator, OperatorValues, Pagination, Scope, ScopeValue, SortField, SortOrder,
};
