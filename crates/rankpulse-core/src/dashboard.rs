//! Keyword table rows and dashboard KPIs for a site.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::brand::BrandVariations;
use crate::distribution::{category_distribution, position_distribution, BucketCount};
use crate::intent::{classify, intent_distribution, IntentCategory};
use crate::keyword::{HistoryPoint, KeywordRecord};
use crate::summary::{
    average_position, ratio, round1, summarize_at, KeywordSummary, PositionReliability,
};
use crate::window::{DateWindow, ResolvedWindow};

/// A keyword with its window summary and derived labels.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordRow {
    pub id: String,
    pub category: String,
    pub is_tracked: bool,
    pub intent: IntentCategory,
    pub reliability: PositionReliability,
    #[serde(flatten)]
    pub summary: KeywordSummary,
}

impl AsRef<KeywordSummary> for KeywordRow {
    fn as_ref(&self) -> &KeywordSummary {
        &self.summary
    }
}

/// Summarize and classify every keyword of a site for one window.
///
/// Keywords without history still get a row (the no-data summary).
pub fn build_keyword_rows(
    records: &[KeywordRecord],
    histories: &HashMap<String, Vec<HistoryPoint>>,
    brands: &BrandVariations,
    window: &DateWindow,
    today: NaiveDate,
    min_reliable_impressions: i64,
) -> Vec<KeywordRow> {
    records
        .iter()
        .map(|record| {
            let history = histories.get(&record.id).map(Vec::as_slice).unwrap_or(&[]);
            let summary = summarize_at(&record.text, history, window, today);
            KeywordRow {
                id: record.id.clone(),
                category: record.category.clone(),
                is_tracked: record.is_tracked,
                intent: classify(&record.text, brands),
                reliability: summary.reliability(min_reliable_impressions),
                summary,
            }
        })
        .collect()
}

/// Percentage change from `previous` to `current`, one decimal.
///
/// `None` when there is no previous value to compare against.
pub fn pct_change(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some(round1(
        (current as f64 - previous as f64) / previous as f64 * 100.0,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentCount {
    pub intent: IntentCategory,
    pub count: usize,
}

/// Clicks on brand (Navigational) keywords, this period against the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandClickTrend {
    pub current: i64,
    pub previous: i64,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub window: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub tracked_keywords: usize,
    pub ranked_keywords: usize,
    pub total_clicks: i64,
    pub total_impressions: i64,
    pub prev_clicks: i64,
    pub prev_impressions: i64,
    pub clicks_change_pct: Option<f64>,
    pub impressions_change_pct: Option<f64>,
    pub ctr: f64,
    pub avg_position: Option<f64>,
    pub position_distribution: Vec<BucketCount>,
    pub intent_distribution: Vec<IntentCount>,
    pub category_distribution: BTreeMap<String, Vec<BucketCount>>,
    pub brand_clicks: BrandClickTrend,
}

/// Positions only count when the keyword ranked inside the window.
fn in_window_position(row: &KeywordRow) -> Option<f64> {
    row.summary.position.filter(|_| row.summary.has_data_in_range)
}

/// Roll keyword rows up into dashboard KPIs. Untracked rows are ignored.
pub fn build_dashboard(
    rows: &[KeywordRow],
    window: &DateWindow,
    range: &ResolvedWindow,
) -> DashboardMetrics {
    let tracked: Vec<&KeywordRow> = rows.iter().filter(|r| r.is_tracked).collect();

    let sum = |f: fn(&KeywordSummary) -> i64| -> i64 {
        tracked
            .iter()
            .fold(0i64, |acc, r| acc.saturating_add(f(&r.summary)))
    };
    let total_clicks = sum(|s| s.total_clicks);
    let total_impressions = sum(|s| s.total_impressions);
    let prev_clicks = sum(|s| s.prev_clicks);
    let prev_impressions = sum(|s| s.prev_impressions);

    let ranked_keywords = tracked
        .iter()
        .filter(|r| in_window_position(r).is_some())
        .count();

    let brand_rows = tracked
        .iter()
        .filter(|r| r.intent == IntentCategory::Navigational);
    let (brand_current, brand_previous) = brand_rows.fold((0i64, 0i64), |(c, p), r| {
        (
            c.saturating_add(r.summary.total_clicks),
            p.saturating_add(r.summary.prev_clicks),
        )
    });

    DashboardMetrics {
        window: window.label(),
        range_start: range.start,
        range_end: range.end,
        tracked_keywords: tracked.len(),
        ranked_keywords,
        total_clicks,
        total_impressions,
        prev_clicks,
        prev_impressions,
        clicks_change_pct: pct_change(total_clicks, prev_clicks),
        impressions_change_pct: pct_change(total_impressions, prev_impressions),
        ctr: ratio(total_clicks, total_impressions),
        avg_position: average_position(&tracked),
        position_distribution: position_distribution(tracked.iter().map(|r| in_window_position(r))),
        intent_distribution: intent_distribution(tracked.iter().map(|r| r.intent))
            .into_iter()
            .map(|(intent, count)| IntentCount { intent, count })
            .collect(),
        category_distribution: category_distribution(
            tracked
                .iter()
                .map(|r| (r.category.as_str(), in_window_position(r))),
        ),
        brand_clicks: BrandClickTrend {
            current: brand_current,
            previous: brand_previous,
            change_pct: pct_change(brand_current, brand_previous),
        },
    }
}
