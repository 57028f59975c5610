//! # Portal Web
//!
//! Server-rendered public portal for the health authority.
//!
//! Handles:
//! - HTML pages with axum (structure explorer, centers map, posts, static pages, complaint form)
//! - JSON endpoints with OpenAPI/Swagger documentation
//! - CORS
//!
//! Data comes from the remote REST API through [`portal_client::SiteApi`].

#![warn(rust_2018_idioms)]

pub mod html;
mod pages;

use axum::routing::get;
use axum::Router;
use chrono::NaiveDateTime;
use portal_client::SiteApi;
use portal_core::PortalConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use pages::api::{ApiErrorRes, HealthRes, StructureRes};

/// Local wall-clock source used for opening-hours badges.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn SiteApi>,
    pub config: Arc<PortalConfig>,
    pub clock: Clock,
}

impl AppState {
    /// State using the server's local time.
    pub fn new(api: Arc<dyn SiteApi>, config: Arc<PortalConfig>) -> Self {
        Self {
            api,
            config,
            clock: Arc::new(|| chrono::Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(pages::api::health, pages::api::structure),
    components(schemas(HealthRes, StructureRes, ApiErrorRes))
)]
pub struct ApiDoc;

/// Build the site router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home::index))
        .route("/structure", get(pages::structure::page))
        .route("/structure.json", get(pages::structure::download))
        .route("/map", get(pages::centers::map))
        .route("/posts", get(pages::posts::list))
        .route("/posts/:slug", get(pages::posts::show))
        .route("/awareness/:id", get(pages::info::awareness))
        .route("/faqs", get(pages::info::faqs))
        .route("/contact", get(pages::info::contact))
        .route("/about", get(pages::info::about))
        .route("/terms", get(pages::info::terms))
        .route("/privacy", get(pages::info::privacy))
        .route(
            "/complaint",
            get(pages::complaint::form).post(pages::complaint::submit),
        )
        .route("/health", get(pages::api::health))
        .route("/api/structure", get(pages::api::structure))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
