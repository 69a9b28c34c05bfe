//! Repository trait implemented by storage adapters

use async_trait::async_trait;

use crate::model::Model;
use crate::scope::Scope;

/// CRUD + list operations over scopes of model `M`
///
/// Read operations populate `scope.value` in place on success.
#[async_trait]
pub trait Repository<M: Model>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create the scope's value
    async fn create(&self, scope: &mut Scope<M>) -> Result<(), Self::Error>;

    /// Fetch the single resource addressed by the scope's primary filter
    async fn get(&self, scope: &mut Scope<M>) -> Result<(), Self::Error>;

    /// Fetch every resource matching the scope's filters
    async fn list(&self, scope: &mut Scope<M>) -> Result<(), Self::Error>;

    /// Update the resource addressed by the scope's primary filter with the scope's value
    async fn patch(&self, scope: &mut Scope<M>) -> Result<(), Self::Error>;

    /// Delete the resource addressed by the scope's primary filter
    async fn delete(&self, scope: &mut Scope<M>) -> Result<(), Self::Error>;
}
