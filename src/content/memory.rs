//! Process-local backend for tests and offline runs.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::{Value, json};

use super::{Backend, BackendError, Collection, Query};

/// Rows kept in insertion order per collection.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<FxHashMap<Collection, Vec<Value>>>,
    next_id: AtomicU64,
    /// Errors returned by the next calls, in order.
    failures: Mutex<VecDeque<BackendError>>,
    selects: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Append rows as-is.
    pub fn seed(&self, collection: Collection, rows: Vec<Value>) {
        self.tables.write().entry(collection).or_default().extend(rows);
    }

    /// Make the next call (read or write) fail with `error`.
    pub fn fail_next(&self, error: BackendError) {
        self.failures.lock().push_back(error);
    }

    /// Number of `select` calls that reached the backend.
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    /// Number of write calls that reached the backend.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.tables
            .read()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn take_failure(&self) -> Result<(), BackendError> {
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn object(row: Value) -> Result<serde_json::Map<String, Value>, BackendError> {
        match row {
            Value::Object(map) => Ok(map),
            other => Err(BackendError::InvalidRequest(format!(
                "row must be an object, got {other}"
            ))),
        }
    }

    /// Fill in a generated key, unused in `table`, when the row has none.
    fn with_key(
        &self,
        collection: Collection,
        row: Value,
        table: &[Value],
    ) -> Result<Value, BackendError> {
        let mut map = Self::object(row)?;
        let key = collection.key_column();
        if map.get(key).is_none_or(Value::is_null) {
            if collection == Collection::Settings {
                return Err(BackendError::InvalidRequest("setting row without key".into()));
            }
            let id = loop {
                let candidate = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
                if !contains_key(table, key, &json!(candidate)) {
                    break candidate;
                }
            };
            map.insert(key.to_string(), json!(id));
        }
        Ok(Value::Object(map))
    }
}

fn contains_key(table: &[Value], key: &str, value: &Value) -> bool {
    let query = Query::new().eq(key, value.clone());
    table.iter().any(|row| query.matches(row))
}

fn merge(target: &mut Value, patch: &serde_json::Map<String, Value>) {
    if let Value::Object(fields) = target {
        for (k, v) in patch {
            fields.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let tables = self.tables.read();
        let rows = tables.get(&collection).map(Vec::as_slice).unwrap_or_default();
        Ok(query.apply(rows))
    }

    async fn insert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let mut tables = self.tables.write();
        let table = tables.entry(collection).or_default();
        let key = collection.key_column();

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let row = self.with_key(collection, row, table)?;
            if contains_key(table, key, &row[key]) || contains_key(&inserted, key, &row[key]) {
                return Err(BackendError::Status {
                    status: 409,
                    message: format!("duplicate {key} {}", row[key]),
                });
            }
            inserted.push(row);
        }
        table.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn upsert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let mut tables = self.tables.write();
        let table = tables.entry(collection).or_default();
        let mut affected = Vec::with_capacity(rows.len());

        for row in rows {
            let patch = Self::object(row)?;
            let conflict = patch.get(on_conflict).cloned().unwrap_or(Value::Null);
            match table
                .iter_mut()
                .find(|existing| !conflict.is_null() && existing.get(on_conflict) == Some(&conflict))
            {
                Some(existing) => {
                    merge(existing, &patch);
                    affected.push(existing.clone());
                }
                None => {
                    let row = self.with_key(collection, Value::Object(patch), table)?;
                    table.push(row.clone());
                    affected.push(row);
                }
            }
        }
        Ok(affected)
    }

    async fn update(
        &self,
        collection: Collection,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let patch = Self::object(patch)?;

        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&collection) else {
            return Ok(Vec::new());
        };
        let mut affected = Vec::new();
        for row in table.iter_mut().filter(|row| query.matches(row)) {
            merge(row, &patch);
            affected.push(row.clone());
        }
        Ok(affected)
    }

    async fn delete(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&collection) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            table.drain(..).partition(|row| query.matches(row));
        *table = kept;
        Ok(removed)
    }
}
