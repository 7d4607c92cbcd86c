use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use rankpulse_core::error::CoreError;
use rankpulse_core::intent::IntentCategory;
use rankpulse_core::keyword::normalize_keyword_text;
use rankpulse_core::summary::{average_position, sort_summaries, SortKey, SortOrder};
use rankpulse_duckdb::keywords::UpdateKeywordParams;

use super::{keyword_rows, load_site, WindowQuery};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct KeywordTableQuery {
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub intent: Option<String>,
    #[serde(default)]
    pub include_untracked: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddKeywordRequest {
    pub keyword: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKeywordRequest {
    pub category: Option<String>,
    pub is_tracked: Option<bool>,
}

/// `GET /api/sites/{site_id}/keywords`: keyword table for a window.
pub async fn list_keywords(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
    Query(query): Query<KeywordTableQuery>,
) -> Result<impl IntoResponse, AppError> {
    let site = load_site(&state, &site_id).await?;
    let window = WindowQuery {
        range: query.range,
        start_date: query.start_date,
        end_date: query.end_date,
    }
    .window(&state)?;
    let key = query
        .sort
        .as_deref()
        .map(SortKey::parse)
        .transpose()?
        .unwrap_or_default();
    let order = query
        .order
        .as_deref()
        .map(SortOrder::parse)
        .transpose()?
        .unwrap_or_default();
    let intent = query
        .intent
        .as_deref()
        .map(IntentCategory::parse)
        .transpose()?;

    let (mut rows, range) = keyword_rows(&state, &site, &window, query.include_untracked).await?;
    if let Some(intent) = intent {
        rows.retain(|row| row.intent == intent);
    }
    sort_summaries(&mut rows, key, order, state.config.min_reliable_impressions);

    Ok(Json(json!({
        "data": rows,
        "window": {
            "label": window.label(),
            "start_date": range.start,
            "end_date": range.end,
        },
        "average_position": average_position(&rows),
    })))
}

/// `POST /api/sites/{site_id}/keywords`: track a keyword by hand.
///
/// `201` for a new keyword, `200` with the stored record when the text is
/// already known.
pub async fn add_keyword(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
    Json(req): Json<AddKeywordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.require_site(&site_id).await?;
    if normalize_keyword_text(&req.keyword).is_empty() {
        return Err(CoreError::EmptyKeyword.into());
    }

    let (record, created) = state
        .db
        .add_keyword(&site_id, &req.keyword, req.category.as_deref())
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "data": record }))))
}

/// `GET /api/sites/{site_id}/keywords/{keyword_id}`: one keyword with its
/// stored history, newest first.
pub async fn get_keyword(
    State(state): State<Arc<AppState>>,
    Path((site_id, keyword_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.require_site(&site_id).await?;
    let record = state
        .db
        .get_keyword(&site_id, &keyword_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Keyword not found".to_string()))?;
    let history = state.db.keyword_history(&site_id, &keyword_id).await?;
    Ok(Json(json!({
        "data": {
            "keyword": record,
            "history": history,
        }
    })))
}

/// `PATCH /api/sites/{site_id}/keywords/{keyword_id}`: recategorize or (un)track.
pub async fn update_keyword(
    State(state): State<Arc<AppState>>,
    Path((site_id, keyword_id)): Path<(String, String)>,
    Json(req): Json<UpdateKeywordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.require_site(&site_id).await?;
    if req.category.is_none() && req.is_tracked.is_none() {
        return Err(AppError::BadRequest(
            "nothing to update: pass category and/or is_tracked".to_string(),
        ));
    }

    let record = state
        .db
        .update_keyword(
            &site_id,
            &keyword_id,
            UpdateKeywordParams {
                category: req.category,
                is_tracked: req.is_tracked,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Keyword not found".to_string()))?;
    Ok(Json(json!({ "data": record })))
}

/// `DELETE /api/sites/{site_id}/keywords/{keyword_id}`: the keyword and its history.
pub async fn remove_keyword(
    State(state): State<Arc<AppState>>,
    Path((site_id, keyword_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.require_site(&site_id).await?;
    if !state.db.remove_keyword(&site_id, &keyword_id).await? {
        return Err(AppError::NotFound("Keyword not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
