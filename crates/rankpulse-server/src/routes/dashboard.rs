use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use rankpulse_core::dashboard::build_dashboard;

use super::{keyword_rows, load_site, WindowQuery};
use crate::{error::AppError, state::AppState};

/// `GET /api/sites/{site_id}/dashboard`: KPIs and distributions for a window.
///
/// Only tracked keywords count.
#[tracing::instrument(skip(state, query))]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let site = load_site(&state, &site_id).await?;
    let window = query.window(&state)?;
    let (rows, range) = keyword_rows(&state, &site, &window, false).await?;
    let metrics = build_dashboard(&rows, &window, &range);
    Ok(Json(json!({ "data": metrics })))
}
