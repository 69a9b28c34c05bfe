//! Repository operations over the request pipeline

use std::io::Read;

use async_trait::async_trait;
use neuron_core::{Controller, Model, ModelStruct, Repository, Scope, ScopeValue};
use reqwest::{Method, StatusCode};
use tracing::{error, instrument};

use crate::client::{NeuronClient, ResponseDecoder};
use crate::error::{ClientError, Result};

/// URL-encode a resource ID for use in a path segment.
///
/// IDs containing `/` are encoded to `%2F` so they address a single
/// resource rather than a nested path.
pub fn encode_path_segment(id: &str) -> String {
    id.replace('/', "%2F")
}

/// `/{schema}/{collection}`
pub fn collection_path(ms: &ModelStruct) -> String {
    format!("/{}/{}", ms.schema_name(), ms.collection())
}

/// `/{schema}/{collection}/{id}`
pub fn resource_path(ms: &ModelStruct, id: &str) -> String {
    format!("{}/{}", collection_path(ms), encode_path_segment(id))
}

/// Identifier of the single resource a scope addresses
///
/// Uses the last value of the first primary filter. A comma-separated list
/// of identifiers addresses only its first entry.
pub fn primary_id<M: Model>(scope: &Scope<M>) -> Result<String> {
    let filter = scope
        .primary_filters()
        .first()
        .ok_or(ClientError::NoPrimaryFilters)?;

    let mut id = filter
        .format_query(M::COLLECTION)
        .into_iter()
        .last()
        .map(|(_, value)| value)
        .unwrap_or_default();

    if let Some(comma) = id.find(',') {
        id.truncate(comma);
    }

    if id.is_empty() {
        error!(collection = M::COLLECTION, "Primary filter holds no identifier");
        return Err(ClientError::NoPrimaryFilters);
    }
    Ok(id)
}

/// How a successful body is read into the scope value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Decode as the scope's model
    Value,
    /// Decode after resolving the document's type in the model registry
    Registered,
    /// Like `Value`, but a `204 No Content` leaves the value untouched
    SkipNoContent,
}

/// Decodes a response body into a scope value
pub struct ScopeDecoder<'a, M> {
    controller: &'a Controller,
    value: &'a mut ScopeValue<M>,
    mode: DecodeMode,
}

impl<'a, M: Model> ScopeDecoder<'a, M> {
    pub fn new(controller: &'a Controller, value: &'a mut ScopeValue<M>, mode: DecodeMode) -> Self {
        Self {
            controller,
            value,
            mode,
        }
    }
}

impl<M: Model> ResponseDecoder for ScopeDecoder<'_, M> {
    fn decode(self, body: &mut dyn Read, status: StatusCode) -> Result<()> {
        match self.mode {
            DecodeMode::SkipNoContent if status == StatusCode::NO_CONTENT => Ok(()),
            DecodeMode::Value | DecodeMode::SkipNoContent => {
                Ok(self.controller.decode(body, self.value)?)
            }
            DecodeMode::Registered => Ok(self.controller.decode_registered(body, self.value)?),
        }
    }
}

/// Ignores the response body
pub struct DiscardBody;

impl ResponseDecoder for DiscardBody {
    fn decode(self, _body: &mut dyn Read, _status: StatusCode) -> Result<()> {
        Ok(())
    }
}

impl NeuronClient {
    fn encode_value<M: Model>(&self, value: &ScopeValue<M>) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.controller().encode(&mut body, value)?;
        Ok(body)
    }
}

#[async_trait]
impl<M: Model> Repository<M> for NeuronClient {
    type Error = ClientError;

    #[instrument(skip_all, fields(collection = M::COLLECTION))]
    async fn create(&self, scope: &mut Scope<M>) -> Result<()> {
        let path = collection_path(&scope.model_struct());
        let body = self.encode_value(&scope.value)?;
        let ctx = scope.context().clone();

        let decoder = ScopeDecoder::new(self.controller(), &mut scope.value, DecodeMode::Value);
        self.execute(&ctx, Method::POST, &path, None, Some(body), decoder).await
    }

    #[instrument(skip_all, fields(collection = M::COLLECTION))]
    async fn get(&self, scope: &mut Scope<M>) -> Result<()> {
        let id = primary_id(scope)?;
        let path = resource_path(&scope.model_struct(), &id);
        let ctx = scope.context().clone();

        let decoder = ScopeDecoder::new(self.controller(), &mut scope.value, DecodeMode::Registered);
        self.execute(&ctx, Method::GET, &path, None, None, decoder).await
    }

    #[instrument(skip_all, fields(collection = M::COLLECTION))]
    async fn list(&self, scope: &mut Scope<M>) -> Result<()> {
        let path = collection_path(&scope.model_struct());
        let query = scope.format_query();
        let ctx = scope.context().clone();

        let decoder = ScopeDecoder::new(self.controller(), &mut scope.value, DecodeMode::Value);
        self.execute(
            &ctx,
            Method::GET,
            &path,
            Some(query.as_slice()),
            None,
            decoder,
        )
        .await
    }

    #[instrument(skip_all, fields(collection = M::COLLECTION))]
    async fn patch(&self, scope: &mut Scope<M>) -> Result<()> {
        let id = primary_id(scope)?;
        let path = resource_path(&scope.model_struct(), &id);
        let body = self.encode_value(&scope.value)?;
        let ctx = scope.context().clone();

        let decoder = ScopeDecoder::new(
            self.controller(),
            &mut scope.value,
            DecodeMode::SkipNoContent,
        );
        self.execute(&ctx, Method::PATCH, &path, None, Some(body), decoder).await
    }

    #[instrument(skip_all, fields(collection = M::COLLECTION))]
    async fn delete(&self, scope: &mut Scope<M>) -> Result<()> {
        let id = primary_id(scope)?;
        let path = resource_path(&scope.model_struct(), &id);
        let ctx = scope.context().clone();

        self.execute(&ctx, Method::DELETE, &path, None, None, DiscardBody).await
    }
}
