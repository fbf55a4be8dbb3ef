use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::{catalog::Catalog, timestamp, Profile, ProfileInput};
use serde::{Deserialize, Serialize};
use service::directory::{DirectoryStats, SearchQuery};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::errors::JsonApiError;
use crate::extract::JsonBody;
use crate::routes::AppState;

/// Profile as returned over HTTP.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ProfileBody {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub rate: String,
    pub skills: Vec<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD HH:MM`
    pub registered_at: String,
}

impl From<Profile> for ProfileBody {
    fn from(p: Profile) -> Self {
        Self {
            registered_at: timestamp::format(&p.registered_at),
            name: p.name,
            email: p.email,
            phone: p.phone,
            city: p.city,
            rate: p.rate,
            skills: p.skills,
            description: p.description,
        }
    }
}

fn bodies(profiles: Vec<Profile>) -> Vec<ProfileBody> {
    profiles.into_iter().map(ProfileBody::from).collect()
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Comma-separated skills; a tutor matches if they offer any of them.
    pub skills: Option<String>,
    /// Comma-separated cities; a tutor matches if they live in one of them.
    pub cities: Option<String>,
}

#[utoipa::path(
    post, path = "/tutors", tag = "tutors",
    request_body = crate::openapi::ProfileInputDoc,
    responses(
        (status = 201, description = "Created", body = ProfileBody),
        (status = 200, description = "Updated", body = ProfileBody),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Storage Failed")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProfileInput>,
) -> Result<(StatusCode, Json<ProfileBody>), JsonApiError> {
    let reg = state.directory.register_or_update(input).await?;
    let status = if reg.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(reg.profile.into())))
}

#[utoipa::path(
    get, path = "/tutors", tag = "tutors",
    responses((status = 200, description = "Every registered tutor", body = [ProfileBody]))
)]
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<ProfileBody>> {
    Json(bodies(state.directory.list_all().await))
}

#[utoipa::path(
    get, path = "/tutors/search", tag = "tutors",
    params(SearchParams),
    responses((status = 200, description = "Matching tutors, possibly none", body = [ProfileBody]))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<ProfileBody>> {
    let query = SearchQuery::from_csv(params.skills.as_deref(), params.cities.as_deref());
    let found = state.directory.search(&query).await;
    info!(skills = ?query.skills, cities = ?query.cities, matches = found.len(), "tutor search");
    Json(bodies(found))
}

#[utoipa::path(
    get, path = "/tutors/{email}", tag = "tutors",
    params(("email" = String, Path, description = "Email the tutor registered with")),
    responses(
        (status = 200, description = "OK", body = ProfileBody),
        (status = 404, description = "Not Found")
    )
)]
pub async fn lookup(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ProfileBody>, JsonApiError> {
    match state.directory.lookup(&email).await {
        Some(p) => Ok(Json(p.into())),
        None => Err(JsonApiError::not_found(format!("no tutor registered with {email}"))),
    }
}

#[utoipa::path(
    get, path = "/stats", tag = "directory",
    responses((status = 200, description = "OK", body = crate::openapi::DirectoryStatsDoc))
)]
pub async fn stats(State(state): State<AppState>) -> Json<DirectoryStats> {
    Json(state.directory.stats().await)
}

#[utoipa::path(
    get, path = "/catalog", tag = "directory",
    responses((status = 200, description = "OK", body = crate::openapi::CatalogDoc))
)]
pub async fn catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.directory.catalog().clone())
}
