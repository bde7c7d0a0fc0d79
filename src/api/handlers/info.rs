//! Informational pages wrapped in the shared layout

use actix_web::{http::header::ContentType, web, HttpResponse};
use tracing::error;

use crate::pages::InfoPage;
use crate::AppState;

fn render(state: &AppState, page: InfoPage) -> HttpResponse {
    match state.pages.render_info(&state.settings.content.title, page) {
        Ok(html) => HttpResponse::Ok().content_type(ContentType::html()).body(html),
        Err(e) => {
            error!(page = page.heading(), error = %e, "Failed to render page");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// GET /privacy
pub async fn privacy(state: web::Data<AppState>) -> HttpResponse {
    render(&state, InfoPage::Privacy)
}

/// GET /tou
pub async fn terms_of_use(state: web::Data<AppState>) -> HttpResponse {
    render(&state, InfoPage::TermsOfUse)
}

/// GET /non
pub async fn nondiscrimination(state: web::Data<AppState>) -> HttpResponse {
    render(&state, InfoPage::Nondiscrimination)
}
