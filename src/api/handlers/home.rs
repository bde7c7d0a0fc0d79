//! Home page

use actix_web::{http::header::ContentType, web, HttpResponse};
use tracing::error;

use crate::pages::HomeContext;
use crate::AppState;

/// GET / - Home page with the full catalog
pub async fn home(state: web::Data<AppState>) -> HttpResponse {
    let context = HomeContext {
        title: &state.settings.content.title,
        items: state.catalog.items(),
    };

    match state.pages.render_home(&context) {
        Ok(html) => HttpResponse::Ok().content_type(ContentType::html()).body(html),
        Err(e) => {
            error!(error = %e, "Failed to render home page");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
