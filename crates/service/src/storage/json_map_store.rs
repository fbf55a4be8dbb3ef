use std::{fmt, hash::Hash, sync::Arc};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::backend::StoreBackend;

/// How the store obtained its current map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// Document present. `rejected` records were malformed and left out; when
    /// non-zero the original document was moved aside before being rewritten.
    Existing { rejected: usize },
    /// No document yet; started empty.
    Absent,
    /// Document present but unreadable; started empty and the old document was moved aside.
    Corrupt { reason: String },
}

impl LoadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadSource::Existing { .. } => "existing",
            LoadSource::Absent => "absent",
            LoadSource::Corrupt { .. } => "corrupt",
        }
    }

    /// Records dropped while loading.
    pub fn rejected(&self) -> usize {
        match self {
            LoadSource::Existing { rejected } => *rejected,
            _ => 0,
        }
    }
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::Existing { rejected } if *rejected > 0 => {
                write!(f, "existing ({rejected} records rejected)")
            }
            LoadSource::Corrupt { reason } => write!(f, "corrupt ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of reading a document: the map plus where it came from.
#[derive(Debug)]
pub struct LoadOutcome<K, V> {
    pub map: IndexMap<K, V>,
    pub source: LoadSource,
}

/// Per-record check applied while loading.
pub type RecordCheck<K, V> = fn(&K, &V) -> Result<(), String>;

struct State<K, V> {
    map: IndexMap<K, V>,
    source: LoadSource,
}

/// Generic JSON document-backed key-value map store.
///
/// Keeps an insertion-ordered map in memory and writes the whole map through
/// the backend after every mutation. Mutations hold the write lock until the
/// document is persisted, so writers in one process never interleave; a failed
/// write rolls the in-memory map back. Nothing coordinates separate processes
/// sharing the same document: the last writer wins.
pub struct JsonMapStore<K, V> {
    inner: RwLock<State<K, V>>,
    backend: Arc<dyn StoreBackend>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + Serialize + DeserializeOwned + Clone + Send + Sync + fmt::Debug,
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open the store over a backend. An absent document is created empty;
    /// a corrupt one is quarantined and replaced with an empty document.
    /// Records that fail to decode or fail `check` are dropped one by one.
    pub async fn open(
        backend: Arc<dyn StoreBackend>,
        check: Option<RecordCheck<K, V>>,
    ) -> Result<Arc<Self>, ServiceError> {
        let outcome = Self::prepare(backend.as_ref(), check).await?;
        info!(
            store = %backend.describe(),
            source = outcome.source.as_str(),
            entries = outcome.map.len(),
            rejected = outcome.source.rejected(),
            "json map store opened"
        );
        let state = State { map: outcome.map, source: outcome.source };
        Ok(Arc::new(Self { inner: RwLock::new(state), backend }))
    }

    /// Read and decode the backend's document without touching it.
    pub async fn load(
        backend: &dyn StoreBackend,
        check: Option<RecordCheck<K, V>>,
    ) -> Result<LoadOutcome<K, V>, ServiceError> {
        let Some(bytes) = backend.read().await? else {
            return Ok(LoadOutcome { map: IndexMap::new(), source: LoadSource::Absent });
        };
        match decode(&bytes, check) {
            Ok((map, rejected)) => Ok(LoadOutcome { map, source: LoadSource::Existing { rejected } }),
            Err(reason) => Ok(LoadOutcome { map: IndexMap::new(), source: LoadSource::Corrupt { reason } }),
        }
    }

    /// `load`, then make the backend match the result: create an empty document
    /// when absent, quarantine and rewrite when corrupt or when records were dropped.
    async fn prepare(
        backend: &dyn StoreBackend,
        check: Option<RecordCheck<K, V>>,
    ) -> Result<LoadOutcome<K, V>, ServiceError> {
        let outcome = Self::load(backend, check).await?;
        match &outcome.source {
            LoadSource::Existing { rejected: 0 } => {}
            LoadSource::Existing { rejected } => {
                warn!(
                    store = %backend.describe(),
                    rejected,
                    kept = outcome.map.len(),
                    "malformed records dropped; original document kept aside"
                );
                backend.quarantine().await?;
                backend.write(encode(&outcome.map)?).await?;
            }
            LoadSource::Absent => {
                backend.write(encode(&outcome.map)?).await?;
            }
            LoadSource::Corrupt { reason } => {
                warn!(store = %backend.describe(), %reason, "stored document is unreadable; starting empty");
                backend.quarantine().await?;
                backend.write(encode(&outcome.map)?).await?;
            }
        }
        Ok(outcome)
    }

    pub async fn load_source(&self) -> LoadSource {
        self.inner.read().await.source.clone()
    }

    /// Values matching `pred`, in insertion order.
    pub async fn filter_values<F>(&self, pred: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        let state = self.inner.read().await;
        state.map.values().filter(|v| pred(v)).cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let state = self.inner.read().await;
        state.map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    /// Apply a mutation to the underlying map and persist it.
    /// If `f` fails or the write fails, the map is restored to its prior content.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut IndexMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut state = self.inner.write().await;
        let before = state.map.clone();
        let out = match f(&mut state.map) {
            Ok(out) => out,
            Err(e) => {
                state.map = before;
                return Err(e);
            }
        };
        let written = match encode(&state.map) {
            Ok(bytes) => self.backend.write(bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            state.map = before;
            return Err(e);
        }
        Ok(out)
    }
}

fn encode<K: Serialize + Eq + Hash, V: Serialize>(map: &IndexMap<K, V>) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec_pretty(map).map_err(ServiceError::storage)
}

/// Decode the top-level object, keeping every record that decodes and passes
/// `check`. Only an unreadable top level is an error.
fn decode<K, V>(
    bytes: &[u8],
    check: Option<RecordCheck<K, V>>,
) -> Result<(IndexMap<K, V>, usize), String>
where
    K: Eq + Hash + DeserializeOwned + fmt::Debug,
    V: DeserializeOwned,
{
    let raw: IndexMap<K, serde_json::Value> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let mut map = IndexMap::with_capacity(raw.len());
    let mut rejected = 0;
    for (key, value) in raw {
        let record = serde_json::from_value::<V>(value)
            .map_err(|e| e.to_string())
            .and_then(|v| match check {
                Some(check) => check(&key, &v).map(|()| v),
                None => Ok(v),
            });
        match record {
            Ok(v) => {
                map.insert(key, v);
            }
            Err(reason) => {
                warn!(?key, %reason, "skipping malformed record");
                rejected += 1;
            }
        }
    }
    Ok((map, rejected))
}
