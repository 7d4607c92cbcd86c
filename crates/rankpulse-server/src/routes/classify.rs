use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use rankpulse_core::brand::{bare_domain, derive_brand_variations, BrandVariations};
use rankpulse_core::intent::classify as classify_intent;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub keyword: Option<String>,
    /// Explicit variations win over `site_url`.
    #[serde(default)]
    pub brand_variations: Option<Vec<String>>,
    #[serde(default)]
    pub site_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrandVariationsRequest {
    pub site: String,
}

/// `POST /api/classify`: intent of a single keyword.
///
/// A missing keyword classifies like an empty one (Informational).
pub async fn classify(Json(req): Json<ClassifyRequest>) -> Result<impl IntoResponse, AppError> {
    let brands: BrandVariations = match (req.brand_variations, req.site_url.as_deref()) {
        (Some(explicit), _) => explicit.into_iter().collect(),
        (None, Some(site)) => derive_brand_variations(site),
        (None, None) => BrandVariations::default(),
    };
    let keyword = req.keyword.unwrap_or_default();
    let intent = classify_intent(&keyword, &brands);

    Ok(Json(json!({
        "data": {
            "keyword": keyword,
            "intent": intent,
            "brand_variations": brands,
        }
    })))
}

/// `POST /api/brand-variations`: brand variations derived from a site name or URL.
pub async fn brand_variations(
    Json(req): Json<BrandVariationsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.site.trim().is_empty() {
        return Err(AppError::BadRequest("site is required".to_string()));
    }
    Ok(Json(json!({
        "data": {
            "site": req.site,
            "domain": bare_domain(&req.site),
            "variations": derive_brand_variations(&req.site),
        }
    })))
}
