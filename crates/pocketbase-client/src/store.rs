// The RecordStore trait — the collection CRUD surface the adapter layer
// programs against.
//
// The HTTP client (`PocketBase`) implements this against a live server;
// the in-memory store in `authjs-test-utils` implements it for tests.
// Records are schema-agnostic `serde_json::Value` objects; typed mapping
// happens one layer up.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::filter::Filter;

/// Result type for record store operations.
pub type StoreResult<T> = std::result::Result<T, ClientError>;

/// One page of records from a list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordList {
    pub page: u32,
    pub per_page: u32,
    /// `-1` when the server was asked to skip counting.
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub total_pages: i64,
    pub items: Vec<Value>,
}

/// Collection CRUD operations offered by a document-collection backend.
///
/// Every method addresses one named collection; there is no cross-collection
/// operation and no transaction.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Create a record. Returns the created record including the
    /// backend-generated `id`.
    async fn create(&self, collection: &str, fields: Value) -> StoreResult<Value>;

    /// Fetch a single record by id.
    async fn get_one(&self, collection: &str, id: &str) -> StoreResult<Value>;

    /// Fetch the first record matching the filter. A miss is the
    /// not-found error, mirroring the backend SDK.
    async fn get_first_list_item(&self, collection: &str, filter: &Filter) -> StoreResult<Value>;

    /// Fetch one page of records matching the filter.
    async fn get_list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        filter: &Filter,
    ) -> StoreResult<RecordList>;

    /// Fetch every record matching the filter, paging `batch` at a time.
    async fn get_full_list(
        &self,
        collection: &str,
        batch: u32,
        filter: &Filter,
    ) -> StoreResult<Vec<Value>>;

    /// Update a record by id. Returns the updated record.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value>;

    /// Delete a record by id.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}
