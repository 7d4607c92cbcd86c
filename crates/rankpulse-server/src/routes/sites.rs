use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use rankpulse_duckdb::site::CreateSiteParams;

use super::{load_site, site_brands};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
    pub property_url: String,
}

/// `POST /api/sites`: register a Search Console property.
pub async fn create_site(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim().to_string();
    let property_url = req.property_url.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if property_url.is_empty() {
        return Err(AppError::BadRequest("property_url is required".to_string()));
    }

    let site = state
        .db
        .create_site(CreateSiteParams {
            name,
            property_url: property_url.clone(),
        })
        .await?
        .ok_or_else(|| AppError::Conflict(format!("a site for {property_url} already exists")))?;
    state.remember_site(&site.id).await;
    tracing::info!(site_id = %site.id, "Site created");

    let brands = site_brands(&site);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "id": site.id,
                "name": site.name,
                "property_url": site.property_url,
                "brand_variations": brands,
                "created_at": site.created_at,
            }
        })),
    ))
}

/// `GET /api/sites`: all sites, oldest first.
pub async fn list_sites(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let sites = state.db.list_sites().await?;
    Ok(Json(json!({ "data": sites })))
}

/// `GET /api/sites/{site_id}`
pub async fn get_site(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let site = load_site(&state, &site_id).await?;
    let brands = site_brands(&site);
    Ok(Json(json!({
        "data": {
            "id": site.id,
            "name": site.name,
            "property_url": site.property_url,
            "brand_variations": brands,
            "created_at": site.created_at,
            "updated_at": site.updated_at,
        }
    })))
}

/// `DELETE /api/sites/{site_id}`: the site, its keywords and their history.
pub async fn delete_site(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_site(&site_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Site not found".to_string()));
    }
    state.forget_site(&site_id).await;
    Ok(StatusCode::NO_CONTENT)
}
