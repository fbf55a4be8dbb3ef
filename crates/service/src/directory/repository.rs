use async_trait::async_trait;
use models::Profile;

use crate::errors::ServiceError;
use crate::storage::LoadSource;

/// Repository abstraction for tutor profiles keyed by email.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Every profile in store order.
    async fn list(&self) -> Vec<Profile>;
    /// Profiles accepted by `pred`, in store order.
    async fn filter(&self, pred: &(dyn for<'p> Fn(&'p Profile) -> bool + Send + Sync)) -> Vec<Profile>;
    async fn get(&self, email: &str) -> Option<Profile>;
    async fn count(&self) -> usize;
    /// Insert or overwrite the profile at `profile.email`. An overwrite keeps the
    /// stored `registered_at`. Returns the stored profile and whether it was new.
    async fn upsert(&self, profile: Profile) -> Result<(Profile, bool), ServiceError>;
    async fn load_source(&self) -> LoadSource;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockProfileRepository {
        profiles: Mutex<Vec<Profile>>,
        fail_writes: bool,
    }

    impl MockProfileRepository {
        /// A repository whose every write fails, to exercise storage error paths.
        pub fn failing() -> Self {
            Self { fail_writes: true, ..Self::default() }
        }
    }

    #[async_trait]
    impl ProfileRepository for MockProfileRepository {
        async fn list(&self) -> Vec<Profile> {
            self.profiles.lock().unwrap().clone()
        }

        async fn filter(&self, pred: &(dyn for<'p> Fn(&'p Profile) -> bool + Send + Sync)) -> Vec<Profile> {
            self.profiles.lock().unwrap().iter().filter(|p| pred(p)).cloned().collect()
        }

        async fn get(&self, email: &str) -> Option<Profile> {
            self.profiles.lock().unwrap().iter().find(|p| p.email == email).cloned()
        }

        async fn count(&self) -> usize {
            self.profiles.lock().unwrap().len()
        }

        async fn upsert(&self, profile: Profile) -> Result<(Profile, bool), ServiceError> {
            if self.fail_writes {
                return Err(ServiceError::Storage("mock: write refused".into()));
            }
            let mut profiles = self.profiles.lock().unwrap();
            match profiles.iter_mut().find(|p| p.email == profile.email) {
                Some(existing) => {
                    let registered_at = existing.registered_at;
                    *existing = Profile { registered_at, ..profile };
                    Ok((existing.clone(), false))
                }
                None => {
                    profiles.push(profile.clone());
                    Ok((profile, true))
                }
            }
        }

        async fn load_source(&self) -> LoadSource {
            LoadSource::Existing { rejected: 0 }
        }
    }
}
