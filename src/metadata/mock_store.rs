//! Mock implementation of MetadataClient for testing

use crate::fingerprint::Fingerprint;
use crate::metadata::{ImageUpdate, MetadataClient, MetadataError, MetadataRecord, NewImageRecord};
use crate::namespace::IdentityResolver;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory metadata service keyed by identity token
pub struct MockMetadataClient {
    identities: Arc<Mutex<HashMap<String, String>>>,
    records: Arc<Mutex<HashMap<String, Vec<MetadataRecord>>>>,
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    creates_attempted: usize,
    /// 1-based index of the create attempt that fails
    fail_create_at: Option<usize>,
    fail_lookups: bool,
    fail_deletes: bool,
    deleted: Vec<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unavailable(what: &str) -> MetadataError {
    MetadataError::Server {
        status: 503,
        message: format!("mock: {} unavailable", what),
    }
}

impl MockMetadataClient {
    /// Create a new mock metadata client
    pub fn new() -> Self {
        Self {
            identities: Arc::new(Mutex::new(HashMap::new())),
            records: Arc::new(Mutex::new(HashMap::new())),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Map an identity token to a storage owner
    pub fn register_identity(&self, identity: &str, owner: &str) {
        lock(&self.identities).insert(identity.to_string(), owner.to_string());
    }

    /// Insert a record directly, bypassing `create`
    pub fn insert_record(&self, identity: &str, record: MetadataRecord) {
        lock(&self.records)
            .entry(identity.to_string())
            .or_default()
            .push(record);
    }

    /// Fail the `n`th create attempt (1-based) from now on
    pub fn fail_create_at(&self, n: usize) {
        let mut state = lock(&self.state);
        state.fail_create_at = Some(state.creates_attempted + n);
    }

    /// Make identity resolution and fingerprint lookups fail
    pub fn set_fail_lookups(&self, fail: bool) {
        lock(&self.state).fail_lookups = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        lock(&self.state).fail_deletes = fail;
    }

    pub fn records_for(&self, identity: &str) -> Vec<MetadataRecord> {
        lock(&self.records).get(identity).cloned().unwrap_or_default()
    }

    /// Get the number of records for a specific identity
    pub fn record_count(&self, identity: &str) -> usize {
        lock(&self.records).get(identity).map(Vec::len).unwrap_or(0)
    }

    pub fn create_attempts(&self) -> usize {
        lock(&self.state).creates_attempted
    }

    /// Ids removed through `delete`, in call order
    pub fn deleted_ids(&self) -> Vec<String> {
        lock(&self.state).deleted.clone()
    }

    /// Clear all data from the store (useful for test cleanup)
    pub fn clear(&self) {
        lock(&self.records).clear();
        lock(&self.identities).clear();
        *lock(&self.state) = MockState::default();
    }
}

impl Default for MockMetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityResolver for MockMetadataClient {
    async fn resolve_owner(&self, identity: &str) -> Result<Option<String>, MetadataError> {
        if lock(&self.state).fail_lookups {
            return Err(unavailable("identity lookup"));
        }
        Ok(lock(&self.identities).get(identity).cloned())
    }
}

#[async_trait]
impl MetadataClient for MockMetadataClient {
    async fn find_by_fingerprint(
        &self,
        identity: &str,
        fingerprint: &Fingerprint,
        suffix: &str,
    ) -> Result<Option<MetadataRecord>, MetadataError> {
        if lock(&self.state).fail_lookups {
            return Err(unavailable("lookup"));
        }
        Ok(lock(&self.records).get(identity).and_then(|records| {
            records
                .iter()
                .find(|r| &r.fingerprint == fingerprint && r.suffix == suffix)
                .cloned()
        }))
    }

    async fn create(&self, identity: &str, record: &NewImageRecord) -> Result<MetadataRecord, MetadataError> {
        let id = {
            let mut state = lock(&self.state);
            state.creates_attempted += 1;
            if state.fail_create_at == Some(state.creates_attempted) {
                return Err(unavailable("create"));
            }
            state.next_id += 1;
            format!("img-{}", state.next_id)
        };

        let mut records = lock(&self.records);
        let entries = records.entry(identity.to_string()).or_default();
        if entries
            .iter()
            .any(|r| r.fingerprint == record.fingerprint && r.suffix == record.suffix)
        {
            return Err(MetadataError::AlreadyExists(record.fingerprint.to_string()));
        }

        let created = MetadataRecord {
            id,
            fingerprint: record.fingerprint.clone(),
            suffix: record.suffix.clone(),
            uri: record.uri.clone(),
            size_bytes: record.size_bytes,
            properties: HashMap::new(),
            created_at: Some(Utc::now()),
        };
        entries.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, identity: &str, record_id: &str) -> Result<bool, MetadataError> {
        if lock(&self.state).fail_deletes {
            return Err(unavailable("delete"));
        }

        let removed = match lock(&self.records).get_mut(identity) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| r.id != record_id);
                records.len() != before
            }
            None => false,
        };
        if removed {
            lock(&self.state).deleted.push(record_id.to_string());
        }
        Ok(removed)
    }

    async fn get(&self, identity: &str, record_id: &str) -> Result<Option<MetadataRecord>, MetadataError> {
        Ok(lock(&self.records)
            .get(identity)
            .and_then(|records| records.iter().find(|r| r.id == record_id).cloned()))
    }

    async fn update(&self, identity: &str, update: &ImageUpdate) -> Result<MetadataRecord, MetadataError> {
        let mut records = lock(&self.records);
        let record = records
            .get_mut(identity)
            .and_then(|records| records.iter_mut().find(|r| r.id == update.id))
            .ok_or_else(|| MetadataError::Server {
                status: 404,
                message: format!("no image with id {}", update.id),
            })?;
        record.properties = update.properties.clone();
        Ok(record.clone())
    }

    async fn list(&self, identity: &str) -> Result<Vec<MetadataRecord>, MetadataError> {
        Ok(self.records_for(identity))
    }

    async fn count(&self, identity: &str) -> Result<u64, MetadataError> {
        Ok(self.record_count(identity) as u64)
    }
}
