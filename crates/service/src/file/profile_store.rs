use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::Profile;

use crate::directory::repository::ProfileRepository;
use crate::errors::ServiceError;
use crate::storage::{FileBackend, JsonMapStore, LoadSource, StoreBackend};

/// Profiles persisted as one JSON object keyed by email.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<JsonMapStore<String, Profile>>,
}

fn check_record(email: &String, profile: &Profile) -> Result<(), String> {
    profile.check_persisted(email).map_err(|e| e.to_string())
}

impl ProfileStore {
    /// Open the file at `path`. Creates it with an empty map if missing.
    /// Malformed records are dropped and the original file is kept aside.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        Self::with_backend(Arc::new(FileBackend::new(path))).await
    }

    pub async fn with_backend(backend: Arc<dyn StoreBackend>) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Profile>::open(backend, Some(check_record)).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn list(&self) -> Vec<Profile> {
        self.store.filter_values(|_| true).await
    }

    async fn filter(&self, pred: &(dyn for<'p> Fn(&'p Profile) -> bool + Send + Sync)) -> Vec<Profile> {
        self.store.filter_values(pred).await
    }

    async fn get(&self, email: &str) -> Option<Profile> {
        self.store.get(&email.to_string()).await
    }

    async fn count(&self) -> usize {
        self.store.len().await
    }

    async fn upsert(&self, profile: Profile) -> Result<(Profile, bool), ServiceError> {
        self.store
            .update_map(|map| match map.get_mut(&profile.email) {
                Some(existing) => {
                    let registered_at = existing.registered_at;
                    *existing = Profile { registered_at, ..profile };
                    Ok((existing.clone(), false))
                }
                None => {
                    map.insert(profile.email.clone(), profile.clone());
                    Ok((profile, true))
                }
            })
            .await
    }

    async fn load_source(&self) -> LoadSource {
        self.store.load_source().await
    }
}
