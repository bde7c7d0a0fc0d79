//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    preview::{ApiError, ErrorResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BlendingWaves API",
        version = "1.0.0",
        description = "Status and effect preview endpoints of the BlendingWaves site server",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "effect", description = "Displacement effect previews")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::preview::preview,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ApiError,
        )
    )
)]
pub struct ApiDoc;
