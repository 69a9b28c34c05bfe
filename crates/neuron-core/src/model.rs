//! Models, model metadata and the model registry

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Schema used when a model does not name one
pub const DEFAULT_SCHEMA: &str = "api";

/// A resource type that can be exchanged with a JSON:API server
///
/// The serialized form must be a JSON object. The field named by
/// [`Model::PRIMARY_FIELD`] becomes the resource `id` on the wire and must
/// deserialize from a string.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// JSON:API resource type and collection path segment
    const COLLECTION: &'static str;

    /// Schema the collection lives in
    const SCHEMA: &'static str = DEFAULT_SCHEMA;

    /// Name of the primary key field in the serialized model
    const PRIMARY_FIELD: &'static str = "id";

    /// Static metadata for this model
    fn model_struct() -> ModelStruct {
        ModelStruct {
            schema: Self::SCHEMA,
            collection: Self::COLLECTION,
            primary_field: Self::PRIMARY_FIELD,
            type_id: TypeId::of::<Self>(),
        }
    }
}

/// Metadata describing a registered model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStruct {
    schema: &'static str,
    collection: &'static str,
    primary_field: &'static str,
    type_id: TypeId,
}

impl ModelStruct {
    pub fn schema_name(&self) -> &'static str {
        self.schema
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn primary_field(&self) -> &'static str {
        self.primary_field
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// Registry of known models keyed by collection name
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<&'static str, ModelStruct>,
}

impl ModelRegistry {
    /// Look up a model by its collection (resource type) name
    pub fn get(&self, collection: &str) -> Option<&ModelStruct> {
        self.models.get(collection)
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.models.contains_key(collection)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Owner of the model registry, shared by every repository built from it
///
/// A controller is immutable once built; clone the `Arc` to share it.
#[derive(Debug, Default)]
pub struct Controller {
    registry: ModelRegistry,
}

impl Controller {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Whether `M` has been registered with this controller
    pub fn is_registered<M: Model>(&self) -> bool {
        self.registry
            .get(M::COLLECTION)
            .is_some_and(|ms| ms.type_id() == TypeId::of::<M>())
    }
}

/// Builder collecting models before the controller is frozen
#[derive(Debug, Default)]
pub struct ControllerBuilder {
    registry: ModelRegistry,
}

impl ControllerBuilder {
    /// Register a model; a later registration of the same collection replaces the earlier one
    pub fn register<M: Model>(mut self) -> Self {
        let ms = M::model_struct();
        if self.registry.models.insert(ms.collection(), ms).is_some() {
            tracing::warn!(collection = ms.collection(), "Model collection registered twice");
        }
        self
    }

    pub fn build(self) -> Controller {
        Controller {
            registry: self.registry,
        }
    }

    pub fn build_shared(self) -> Arc<Controller> {
        Arc::new(self.build())
    }
}
