//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_files::Files;
use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::config::ContentSettings;

/// Configure all site and API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, content: &ContentSettings) {
    cfg.route("/", web::get().to(handlers::home::home))
        // Informational pages
        .route("/privacy", web::get().to(handlers::info::privacy))
        .route("/tou", web::get().to(handlers::info::terms_of_use))
        .route("/non", web::get().to(handlers::info::nondiscrimination))
        // Static assets
        .route("/styles.css", web::get().to(handlers::assets::stylesheet))
        .route("/main.js", web::get().to(handlers::assets::script))
        .service(Files::new("/static", &content.static_dir))
        .service(
            web::scope("/api/v1")
                .app_data(web::QueryConfig::default().error_handler(handlers::preview::query_error_handler))
                .route("/effect/preview", web::get().to(handlers::preview::preview))
        )
        .route("/health", web::get().to(handlers::health::health_check))
        // Swagger UI and OpenAPI spec
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
        );
}
