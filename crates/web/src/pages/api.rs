use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use portal_core::structure::{count_nodes, filter_forest, OrgUnit, SearchQuery};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Canonical structure forest, optionally filtered.
#[derive(Debug, Serialize, ToSchema)]
pub struct StructureRes {
    /// Number of units in `units`, counting every descendant.
    pub total: usize,
    /// Normalised query that produced `units`, if any.
    pub query: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub units: Vec<OrgUnit>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorRes {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StructureParams {
    /// Free-text filter over names, types, contacts, and employees.
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the portal
///
/// Reports that the site process is serving; it does not call the remote API.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Portal is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/structure",
    params(StructureParams),
    responses(
        (status = 200, description = "Organisational structure forest", body = StructureRes),
        (status = 502, description = "Remote API unavailable", body = ApiErrorRes)
    )
)]
/// Organisational structure as a sorted forest
///
/// Fetches `/structures` from the remote API, builds the canonical forest, and applies the
/// optional `q` filter. Matching units keep their full ancestor chain.
///
/// # Errors
/// Returns `502 Bad Gateway` if the remote API cannot be reached or returns an unusable body.
#[axum::debug_handler]
pub async fn structure(
    State(state): State<AppState>,
    Query(params): Query<StructureParams>,
) -> Result<Json<StructureRes>, (StatusCode, Json<ApiErrorRes>)> {
    let forest = state.api.structures().await.map_err(|e| {
        tracing::error!("Fetch structures error: {:?}", e);
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiErrorRes {
                message: e.user_message(),
            }),
        )
    })?;

    let query = SearchQuery::new(params.q.as_deref().unwrap_or(""));
    let units = filter_forest(&forest, &query);
    Ok(Json(StructureRes {
        total: count_nodes(&units),
        query: (!query.is_empty()).then(|| query.as_str().to_string()),
        units,
    }))
}
