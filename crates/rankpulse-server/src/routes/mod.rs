pub mod classify;
pub mod dashboard;
pub mod health;
pub mod keywords;
pub mod sites;
pub mod sync;

use chrono::Utc;
use serde::Deserialize;

use rankpulse_core::brand::{derive_brand_variations, BrandVariations};
use rankpulse_core::dashboard::{build_keyword_rows, KeywordRow};
use rankpulse_core::window::{DateWindow, ResolvedWindow};
use rankpulse_duckdb::site::Site;

use crate::{error::AppError, state::AppState};

/// Reporting-window query parameters shared by keyword tables and dashboards.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl WindowQuery {
    pub fn window(&self, state: &AppState) -> Result<DateWindow, AppError> {
        Ok(DateWindow::from_params(
            self.range.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            state.config.default_range,
        )?)
    }
}

/// Brand variations for a site: from its property URL, or its name when the
/// URL yields nothing.
pub fn site_brands(site: &Site) -> BrandVariations {
    let from_url = derive_brand_variations(&site.property_url);
    if from_url.is_empty() {
        derive_brand_variations(&site.name)
    } else {
        from_url
    }
}

pub(crate) async fn load_site(state: &AppState, site_id: &str) -> Result<Site, AppError> {
    state.require_site(site_id).await?;
    state
        .db
        .get_site(site_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("site {site_id} not found")))
}

/// Summarize every keyword of a site for `window`.
///
/// Full history is loaded so keywords idle in the window still show their
/// latest known position.
pub(crate) async fn keyword_rows(
    state: &AppState,
    site: &Site,
    window: &DateWindow,
    include_untracked: bool,
) -> Result<(Vec<KeywordRow>, ResolvedWindow), AppError> {
    let today = Utc::now().date_naive();
    let records = state.history.keywords(&site.id, include_untracked).await?;
    let histories = state.history.site_history(&site.id, None).await?;
    let rows = build_keyword_rows(
        &records,
        &histories,
        &site_brands(site),
        window,
        today,
        state.config.min_reliable_impressions,
    );
    Ok((rows, window.resolve(today)))
}
