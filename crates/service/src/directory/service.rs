use std::sync::Arc;

use chrono::NaiveDateTime;
use models::{catalog::Catalog, timestamp, Profile, ProfileInput};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::repository::ProfileRepository;
use super::search::SearchQuery;
use crate::errors::ServiceError;
use crate::storage::LoadSource;

/// Outcome of `register_or_update`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Registration {
    pub profile: Profile,
    /// `false` when an existing profile with the same email was overwritten.
    pub created: bool,
}

/// Home-page figures: how many tutors, which skills and cities they cover.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct DirectoryStats {
    pub tutors: usize,
    pub skills: Vec<String>,
    pub cities: Vec<String>,
}

/// Directory business service independent of web framework
pub struct DirectoryService<R: ProfileRepository> {
    repo: Arc<R>,
    catalog: Catalog,
}

impl<R: ProfileRepository> DirectoryService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, catalog: Catalog::default() } }

    /// Validate the form and upsert the profile keyed by its email.
    ///
    /// # Examples
    /// ```
    /// use service::directory::{DirectoryService, repository::mock::MockProfileRepository};
    /// use models::ProfileInput;
    /// use std::sync::Arc;
    /// let svc = DirectoryService::new(Arc::new(MockProfileRepository::default()));
    /// let input = ProfileInput {
    ///     name: "Jean Kouadio".into(),
    ///     email: "jean@example.com".into(),
    ///     phone: "+225 01 23 45 67".into(),
    ///     skills: vec!["Mathématiques".into()],
    ///     ..Default::default()
    /// };
    /// let reg = tokio_test::block_on(svc.register_or_update(input)).unwrap();
    /// assert!(reg.created);
    /// ```
    pub async fn register_or_update(&self, input: ProfileInput) -> Result<Registration, ServiceError> {
        self.register_at(input, timestamp::now_minute()).await
    }

    /// `register_or_update` with an explicit registration time for new profiles.
    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn register_at(&self, input: ProfileInput, now: NaiveDateTime) -> Result<Registration, ServiceError> {
        let profile = Profile::from_input(input, now).map_err(|e| match e {
            models::errors::ModelError::Validation(msg) => ServiceError::Validation(msg),
            other => other.into(),
        })?;
        let (profile, created) = self.repo.upsert(profile).await?;
        info!(event = "profile_registered", created, skills = profile.skills.len(), "profile saved");
        Ok(Registration { profile, created })
    }

    /// Profiles matching `query`, in store order.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &SearchQuery) -> Vec<Profile> {
        let found = if query.is_unfiltered() {
            self.repo.list().await
        } else {
            self.repo.filter(&|p: &Profile| query.matches(p)).await
        };
        debug!(matches = found.len(), "directory search");
        found
    }

    /// Every stored profile, unfiltered.
    pub async fn list_all(&self) -> Vec<Profile> {
        self.repo.list().await
    }

    /// Exact match on email; `None` when nobody registered with it.
    pub async fn lookup(&self, email: &str) -> Option<Profile> {
        self.repo.get(email.trim()).await
    }

    pub async fn stats(&self) -> DirectoryStats {
        let mut stats = DirectoryStats { tutors: self.repo.count().await, ..Default::default() };
        let profiles = self.repo.list().await;
        for p in &profiles {
            for skill in &p.skills {
                if !stats.skills.contains(skill) {
                    stats.skills.push(skill.clone());
                }
            }
            if !p.city.is_empty() && !stats.cities.contains(&p.city) {
                stats.cities.push(p.city.clone());
            }
        }
        stats
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub async fn load_source(&self) -> LoadSource {
        self.repo.load_source().await
    }
}
