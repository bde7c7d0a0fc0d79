//! Single-file asset passthrough

use actix_files::NamedFile;
use actix_web::web;

use crate::AppState;

/// GET /styles.css
pub async fn stylesheet(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open_async(&state.settings.content.stylesheet).await?)
}

/// GET /main.js
pub async fn script(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open_async(&state.settings.content.script).await?)
}
