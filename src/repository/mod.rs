//! # Repository Module
//!
//! [`ModelRepository`] is the persistence seam the default CRUD controller
//! talks to. Queries arrive already validated against the model, so an
//! implementation can trust field names, operators and coerced values.
//!
//! [`InMemoryRepository`] evaluates those queries over JSON rows and backs
//! the tests and the CLI.

mod memory;

pub use memory::InMemoryRepository;

use crate::error::RepositoryError;
use crate::model::ModelDefinition;
use crate::validation::ValidatedParams;
use serde_json::{Map, Value};

/// One page of rows plus the number of rows matching the query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListResult {
    pub rows: Vec<Value>,
    pub total: u64,
}

/// Record storage for models.
pub trait ModelRepository: Send + Sync {
    /// Live records matching `params`, paginated.
    fn list(&self, model: &ModelDefinition, params: &ValidatedParams) -> Result<ListResult, RepositoryError>;

    /// Soft-deleted records matching `params`, paginated.
    fn list_deleted(
        &self,
        model: &ModelDefinition,
        params: &ValidatedParams,
    ) -> Result<ListResult, RepositoryError>;

    /// Live record by id.
    fn find(&self, model: &ModelDefinition, id: &str) -> Result<Option<Value>, RepositoryError>;

    /// Store a new record and return it with its id.
    fn create(&self, model: &ModelDefinition, data: Map<String, Value>) -> Result<Value, RepositoryError>;

    /// Merge `data` into a live record. `None` when it does not exist.
    fn update(
        &self,
        model: &ModelDefinition,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, RepositoryError>;

    /// Soft delete. `false` when there was no live record.
    fn delete(&self, model: &ModelDefinition, id: &str) -> Result<bool, RepositoryError>;

    /// Undo a soft delete. `None` when there was no deleted record.
    fn restore(&self, model: &ModelDefinition, id: &str) -> Result<Option<Value>, RepositoryError>;
}
