//! BlendingWaves site server
//!
//! Loads the catalog and page templates at startup, then serves the home
//! page, informational pages, static assets and effect previews with
//! Actix-Web.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;

use blending_waves::api;
use blending_waves::config::Settings;
use blending_waves::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blending_waves=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = settings.bind_addr();
    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    info!(
        "Starting BlendingWaves v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    // Catalog and templates are required; without them there is nothing to serve
    let app_state = AppState::build(settings)
        .await
        .context("Failed to load site content")?;
    let content = app_state.settings.content.clone();
    let app_state = web::Data::new(app_state);

    // Configure and start HTTP server
    HttpServer::new(move || {
        let content = content.clone();
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "blending-waves"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            .configure(move |cfg| api::configure_routes(cfg, &content))
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
