// In-memory record store — HashMap-based stand-in for a PocketBase server.
//
// Stores records in `HashMap<String, Vec<serde_json::Value>>` keyed by
// collection name, thread-safe via `tokio::sync::RwLock`. Filters are
// matched structurally against the clauses, never via the string dialect.
// Relation fields stored as arrays match a scalar filter value by
// membership, mirroring the backend's multi-relation filtering.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use pocketbase_client::{ClientError, Filter, RecordList, RecordStore, StoreResult};

/// Type alias for the in-memory store.
type Store = HashMap<String, Vec<Value>>;

/// In-memory record store.
///
/// Data lives in an `Arc<RwLock<...>>` for concurrent access and is lost
/// when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    store: Arc<RwLock<Store>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records into a collection as-is (ids included).
    pub async fn seed(&self, collection: &str, records: Vec<Value>) {
        let mut store = self.store.write().await;
        store
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    /// Get a snapshot of all data (for assertions).
    pub async fn snapshot(&self) -> Store {
        self.store.read().await.clone()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Record count for one collection.
    pub async fn record_count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

/// Check if a record matches every clause of the filter.
fn matches_filter(record: &Value, filter: &Filter) -> bool {
    filter.clauses().iter().all(|clause| {
        let field_val = record.get(&clause.field).unwrap_or(&Value::Null);
        match field_val {
            // Relation lists match a scalar by membership.
            Value::Array(items) if !clause.value.is_array() => items.contains(&clause.value),
            other => other == &clause.value,
        }
    })
}

/// Merge update fields into an existing record.
fn merge_update(record: &mut Value, fields: &Value) {
    if let (Some(rec_obj), Some(data_obj)) = (record.as_object_mut(), fields.as_object()) {
        for (k, v) in data_obj {
            rec_obj.insert(k.clone(), v.clone());
        }
    }
}

fn not_found(collection: &str) -> ClientError {
    ClientError::NotFound {
        message: format!("no matching {collection} record"),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Value) -> StoreResult<Value> {
        let mut record = fields;

        // Backend-generated id, like the real server.
        if record.get("id").map_or(true, Value::is_null) {
            let obj = record.as_object_mut().ok_or_else(|| {
                ClientError::BadRequest {
                    message: "record fields must be an object".into(),
                }
            })?;
            obj.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().simple().to_string()),
            );
        }

        let mut store = self.store.write().await;
        store
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn get_one(&self, collection: &str, id: &str) -> StoreResult<Value> {
        let store = self.store.read().await;
        store
            .get(collection)
            .and_then(|recs| recs.iter().find(|r| r.get("id").and_then(Value::as_str) == Some(id)))
            .cloned()
            .ok_or_else(|| not_found(collection))
    }

    async fn get_first_list_item(&self, collection: &str, filter: &Filter) -> StoreResult<Value> {
        let store = self.store.read().await;
        store
            .get(collection)
            .and_then(|recs| recs.iter().find(|r| matches_filter(r, filter)))
            .cloned()
            .ok_or_else(|| not_found(collection))
    }

    async fn get_list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        filter: &Filter,
    ) -> StoreResult<RecordList> {
        let store = self.store.read().await;
        let empty = Vec::new();
        let matching: Vec<Value> = store
            .get(collection)
            .unwrap_or(&empty)
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect();

        let total = matching.len();
        let page = page.max(1);
        let offset = (page as usize - 1) * per_page as usize;
        let items: Vec<Value> = matching
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();

        Ok(RecordList {
            page,
            per_page,
            total_items: total as i64,
            total_pages: total.div_ceil(per_page.max(1) as usize) as i64,
            items,
        })
    }

    async fn get_full_list(
        &self,
        collection: &str,
        _batch: u32,
        filter: &Filter,
    ) -> StoreResult<Vec<Value>> {
        let store = self.store.read().await;
        let empty = Vec::new();
        Ok(store
            .get(collection)
            .unwrap_or(&empty)
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect())
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value> {
        let mut store = self.store.write().await;
        let records = store.get_mut(collection).ok_or_else(|| not_found(collection))?;
        let record = records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| not_found(collection))?;

        merge_update(record, &fields);
        Ok(record.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let records = store.get_mut(collection).ok_or_else(|| not_found(collection))?;
        let pos = records
            .iter()
            .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| not_found(collection))?;

        records.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_generates_id() {
        let store = MemoryStore::new();
        let created = store
            .create("users", json!({"user_email": "alice@test.com"}))
            .await
            .unwrap();
        assert!(created["id"].is_string());
        assert_eq!(store.record_count("users").await, 1);
    }

    #[tokio::test]
    async fn test_get_one_round_trip() {
        let store = MemoryStore::new();
        let created = store.create("users", json!({"user_name": "Alice"})).await.unwrap();
        let id = created["id"].as_str().unwrap();

        let fetched = store.get_one("users", id).await.unwrap();
        assert_eq!(fetched["user_name"], "Alice");

        let err = store.get_one("users", "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_filter_matching() {
        let store = MemoryStore::new();
        store
            .create("users", json!({"user_email": "a@test.com"}))
            .await
            .unwrap();
        store
            .create("users", json!({"user_email": "b@test.com"}))
            .await
            .unwrap();

        let found = store
            .get_first_list_item("users", &Filter::eq("user_email", "b@test.com"))
            .await
            .unwrap();
        assert_eq!(found["user_email"], "b@test.com");

        let err = store
            .get_first_list_item("users", &Filter::eq("user_email", "c@test.com"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_relation_array_matches_scalar() {
        let store = MemoryStore::new();
        store
            .seed(
                "accounts",
                vec![json!({"id": "acc1", "account_user_id": ["u1"]})],
            )
            .await;

        let found = store
            .get_first_list_item("accounts", &Filter::eq("account_user_id", "u1"))
            .await
            .unwrap();
        assert_eq!(found["id"], "acc1");
    }

    #[tokio::test]
    async fn test_get_list_paginates() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create("sessions", json!({"n": i}))
                .await
                .unwrap();
        }

        let page = store
            .get_list("sessions", 2, 2, &Filter::all())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0]["n"], 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let created = store
            .create("authenticators", json!({"authenticator_counter": 1}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = store
            .update("authenticators", id, json!({"authenticator_counter": 7}))
            .await
            .unwrap();
        assert_eq!(updated["authenticator_counter"], 7);
        assert_eq!(updated["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let store = MemoryStore::new();
        let created = store.create("sessions", json!({"x": 1})).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        store.delete("sessions", &id).await.unwrap();
        assert_eq!(store.record_count("sessions").await, 0);

        let err = store.delete("sessions", &id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
