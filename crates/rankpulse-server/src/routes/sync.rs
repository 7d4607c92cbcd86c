use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use rankpulse_core::keyword::SyncRow;

use crate::{error::AppError, state::AppState};

/// `POST /api/sites/{site_id}/sync`: append a batch of raw performance rows.
///
/// The whole batch is validated before anything is written; one bad row
/// rejects the request.
#[tracing::instrument(skip(state, rows), fields(rows = rows.len()))]
pub async fn sync(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
    Json(rows): Json<Vec<SyncRow>>,
) -> Result<impl IntoResponse, AppError> {
    state.require_site(&site_id).await?;

    let max = state.config.sync_max_rows;
    if rows.len() > max {
        return Err(AppError::PayloadTooLarge(rows.len(), max));
    }
    for (index, row) in rows.iter().enumerate() {
        row.validate(index)?;
    }

    let outcome = state.db.ingest_sync(&site_id, &rows).await?;
    Ok(Json(json!({ "data": outcome })))
}
