use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::routes::tutors::ProfileBody;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `existing`, `absent` or `corrupt`
    pub store: String,
}

#[derive(ToSchema)]
pub struct ProfileInputDoc {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: Option<String>,
    pub rate: Option<String>,
    pub skills: Vec<String>,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct DirectoryStatsDoc {
    pub tutors: usize,
    pub skills: Vec<String>,
    pub cities: Vec<String>,
}

#[derive(ToSchema)]
pub struct CatalogDoc {
    pub skills: Vec<String>,
    pub cities: Vec<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::tutors::register,
        crate::routes::tutors::list_all,
        crate::routes::tutors::search,
        crate::routes::tutors::lookup,
        crate::routes::tutors::stats,
        crate::routes::tutors::catalog,
    ),
    components(
        schemas(
            HealthResponse,
            ProfileInputDoc,
            ProfileBody,
            DirectoryStatsDoc,
            CatalogDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "tutors"),
        (name = "directory")
    )
)]
pub struct ApiDoc;
