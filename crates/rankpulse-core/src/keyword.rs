use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category assigned to keywords that nobody has filed yet.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A keyword tracked (or formerly tracked) for a site.
///
/// Identity is `(site_id, text)`. Records are created on manual add or the
/// first sync that discovers the keyword, and are only removed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub id: String,
    pub site_id: String,
    pub text: String,
    pub category: String,
    pub is_tracked: bool,
    pub created_at: String,
}

/// One day of performance data for a keyword on a single landing page.
///
/// `position` is `None` when the source row carried no usable rank. Rows are
/// immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub keyword_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub page_url: String,
}

impl HistoryPoint {
    /// The position if it is a usable number.
    pub fn ranked_position(&self) -> Option<f64> {
        self.position.filter(|p| p.is_finite())
    }
}

/// A raw search-performance row as delivered by a sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRow {
    pub date: NaiveDate,
    pub keyword: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: Option<f64>,
}

impl SyncRow {
    /// Reject rows that would corrupt stored totals. `index` names the row in
    /// the error.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        let reason = if normalize_keyword_text(&self.keyword).is_empty() {
            "keyword must not be empty"
        } else if self.clicks < 0 {
            "clicks must not be negative"
        } else if self.impressions < 0 {
            "impressions must not be negative"
        } else {
            return Ok(());
        };
        Err(CoreError::InvalidSyncRow { index, reason })
    }
}

/// Canonical form of a keyword's text: trimmed, lowercased, single-spaced.
pub fn normalize_keyword_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
