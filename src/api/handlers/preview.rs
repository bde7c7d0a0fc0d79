//! Effect preview endpoint

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::engine::{render_preview, PreviewError, PreviewRequest};
use crate::AppState;

/// Query parameters for a preview render
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Surface width in pixels (default 320)
    pub width: Option<u32>,
    /// Surface height in pixels (default 180)
    pub height: Option<u32>,
    /// Number of simulated frames (1-600, default 30)
    pub frames: Option<u32>,
}

impl PreviewQuery {
    fn to_request(&self) -> PreviewRequest {
        let defaults = PreviewRequest::default();
        PreviewRequest {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            frames: self.frames.unwrap_or(defaults.frames),
        }
    }
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

fn error_response(e: &PreviewError) -> HttpResponse {
    let (mut builder, code) = match e {
        PreviewError::LayersUnavailable => (HttpResponse::ServiceUnavailable(), "EFFECT_LAYERS_UNAVAILABLE"),
        PreviewError::Encode(_) => (HttpResponse::InternalServerError(), "PREVIEW_FAILED"),
        _ => (HttpResponse::BadRequest(), "INVALID_PREVIEW"),
    };

    builder.json(ErrorResponse {
        success: false,
        error: ApiError {
            code: code.to_string(),
            message: e.to_string(),
        },
    })
}

/// Turn a malformed query string into the same JSON envelope as other
/// preview errors
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        success: false,
        error: ApiError {
            code: "INVALID_PREVIEW".to_string(),
            message: err.to_string(),
        },
    });
    InternalError::from_response(err, response).into()
}

/// GET /api/v1/effect/preview - Render the displacement effect to PNG
#[utoipa::path(
    get,
    path = "/api/v1/effect/preview",
    tag = "effect",
    params(PreviewQuery),
    responses(
        (status = 200, description = "Last frame of a scripted pointer sweep, as image/png"),
        (status = 400, description = "Invalid preview size or frame count", body = ErrorResponse),
        (status = 503, description = "Effect layers not loaded", body = ErrorResponse),
        (status = 500, description = "Render failed", body = ErrorResponse)
    )
)]
pub async fn preview(state: web::Data<AppState>, query: web::Query<PreviewQuery>) -> HttpResponse {
    let start = Instant::now();
    let request = query.to_request();

    let params = state.effect;
    let layers = state.layers.clone();
    let max_pixels = state.settings.effect.max_preview_pixels;

    // Rendering is CPU bound; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || {
        render_preview(&request, params, layers, max_pixels)
    })
    .await;

    match result {
        Ok(Ok(preview)) => {
            info!(
                width = preview.width,
                height = preview.height,
                frames = request.frames,
                render_time_ms = start.elapsed().as_millis() as u64,
                "Preview rendered"
            );
            HttpResponse::Ok().content_type("image/png").body(preview.bytes)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Preview render rejected");
            error_response(&e)
        }
        Err(e) => {
            error!(error = %e, "Preview task failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                success: false,
                error: ApiError {
                    code: "PREVIEW_FAILED".to_string(),
                    message: e.to_string(),
                },
            })
        }
    }
}
