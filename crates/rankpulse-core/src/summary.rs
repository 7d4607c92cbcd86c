//! Per-keyword summaries over a reporting window.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::keyword::HistoryPoint;
use crate::window::DateWindow;

/// What a dashboard shows for one keyword in the selected window.
///
/// `change` is `previous − latest` between the two most recent points inside
/// the window (positive means the keyword moved up). It is not a comparison
/// with the previous period; `prev_clicks`/`prev_impressions` carry that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSummary {
    pub keyword: String,
    /// Latest known position, serialized as `"-"` when there is none.
    #[serde(serialize_with = "position_or_dash")]
    pub position: Option<f64>,
    pub change: f64,
    pub total_clicks: i64,
    pub total_impressions: i64,
    pub prev_clicks: i64,
    pub prev_impressions: i64,
    pub ctr: f64,
    pub page: String,
    pub has_data_in_range: bool,
}

impl AsRef<KeywordSummary> for KeywordSummary {
    fn as_ref(&self) -> &KeywordSummary {
        self
    }
}

fn position_or_dash<S: Serializer>(position: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match position {
        Some(p) => s.serialize_f64(*p),
        None => s.serialize_str("-"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionReliability {
    Reliable,
    /// Too few impressions for the average position to mean much.
    NotReliable,
    Unranked,
}

impl KeywordSummary {
    pub fn reliability(&self, min_impressions: i64) -> PositionReliability {
        match self.position {
            None => PositionReliability::Unranked,
            Some(_) if self.total_impressions < min_impressions => {
                PositionReliability::NotReliable
            }
            Some(_) => PositionReliability::Reliable,
        }
    }
}

/// Summarize `history` for `window`, ending presets at today's UTC date.
pub fn summarize(keyword: &str, history: &[HistoryPoint], window: &DateWindow) -> KeywordSummary {
    summarize_at(keyword, history, window, chrono::Utc::now().date_naive())
}

/// Summarize `history` for `window` as seen on `today`.
///
/// History is expected newest first; the order is re-established here with a
/// stable sort so rows sharing a date keep their relative order.
pub fn summarize_at(
    keyword: &str,
    history: &[HistoryPoint],
    window: &DateWindow,
    today: NaiveDate,
) -> KeywordSummary {
    let range = window.resolve(today);

    let mut ordered: Vec<&HistoryPoint> = history.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let in_range: Vec<&HistoryPoint> = ordered
        .iter()
        .copied()
        .filter(|p| range.contains(p.date))
        .collect();

    let latest = in_range.first().or(ordered.first()).copied();

    let change = match (in_range.first(), in_range.get(1)) {
        (Some(latest), Some(previous)) => {
            match (previous.ranked_position(), latest.ranked_position()) {
                (Some(prev), Some(cur)) => prev - cur,
                _ => 0.0,
            }
        }
        _ => 0.0,
    };

    let (total_clicks, total_impressions) = totals(in_range.iter().copied());
    let (prev_clicks, prev_impressions) =
        totals(ordered.iter().copied().filter(|p| range.in_previous(p.date)));

    KeywordSummary {
        keyword: keyword.to_string(),
        position: latest.and_then(HistoryPoint::ranked_position),
        change,
        total_clicks,
        total_impressions,
        prev_clicks,
        prev_impressions,
        ctr: ratio(total_clicks, total_impressions),
        page: latest.map(|p| p.page_url.clone()).unwrap_or_default(),
        has_data_in_range: !in_range.is_empty(),
    }
}

/// Clicks and impressions summed over `points`, saturating at `i64::MAX`.
fn totals<'a>(points: impl Iterator<Item = &'a HistoryPoint>) -> (i64, i64) {
    points.fold((0i64, 0i64), |(c, i), p| {
        (
            c.saturating_add(p.clicks.max(0)),
            i.saturating_add(p.impressions.max(0)),
        )
    })
}

/// `clicks / impressions` clamped to `[0, 1]`; zero without impressions.
pub fn ratio(clicks: i64, impressions: i64) -> f64 {
    if impressions <= 0 {
        return 0.0;
    }
    (clicks as f64 / impressions as f64).clamp(0.0, 1.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean position over keywords that ranked inside the window, to one decimal.
///
/// Keywords without a numeric position are left out rather than counted as
/// a worst rank.
pub fn average_position<T: AsRef<KeywordSummary>>(summaries: &[T]) -> Option<f64> {
    let positions: Vec<f64> = summaries
        .iter()
        .map(AsRef::<KeywordSummary>::as_ref)
        .filter(|s| s.has_data_in_range)
        .filter_map(|s| s.position)
        .collect();
    if positions.is_empty() {
        return None;
    }
    Some(round1(positions.iter().sum::<f64>() / positions.len() as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Position,
    Clicks,
    Impressions,
    Change,
    Keyword,
}

impl SortKey {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "position" => Ok(Self::Position),
            "clicks" => Ok(Self::Clicks),
            "impressions" => Ok(Self::Impressions),
            "change" => Ok(Self::Change),
            "keyword" => Ok(Self::Keyword),
            other => Err(CoreError::InvalidSort {
                field: "sort",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::InvalidSort {
                field: "order",
                value: other.to_string(),
            }),
        }
    }
}

/// Sort keyword rows for a table.
///
/// When sorting by position, rows whose position is unranked or not reliable
/// go last in either direction. Ties fall back to the keyword text.
pub fn sort_summaries<T: AsRef<KeywordSummary>>(
    rows: &mut [T],
    key: SortKey,
    order: SortOrder,
    min_impressions: i64,
) {
    rows.sort_by(|a, b| {
        let (a, b): (&KeywordSummary, &KeywordSummary) = (a.as_ref(), b.as_ref());
        let directed = |ord: Ordering| match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        let primary = match key {
            SortKey::Position => {
                let rank = |s: &KeywordSummary| match s.reliability(min_impressions) {
                    PositionReliability::Reliable => s.position,
                    _ => None,
                };
                match (rank(a), rank(b)) {
                    (Some(x), Some(y)) => directed(x.total_cmp(&y)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            SortKey::Clicks => directed(a.total_clicks.cmp(&b.total_clicks)),
            SortKey::Impressions => directed(a.total_impressions.cmp(&b.total_impressions)),
            SortKey::Change => directed(a.change.total_cmp(&b.change)),
            SortKey::Keyword => directed(a.keyword.cmp(&b.keyword)),
        };
        primary.then_with(|| a.keyword.cmp(&b.keyword))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::RangePreset;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn point(date: NaiveDate, position: Option<f64>, clicks: i64, impressions: i64) -> HistoryPoint {
        HistoryPoint {
            keyword_id: "kw_1".to_string(),
            date,
            position,
            impressions,
            clicks,
            ctr: 0.0,
            page_url: format!("https://acme.com/{date}"),
        }
    }

    fn summary(keyword: &str, position: Option<f64>, impressions: i64) -> KeywordSummary {
        KeywordSummary {
            keyword: keyword.to_string(),
            position,
            change: 0.0,
            total_clicks: 0,
            total_impressions: impressions,
            prev_clicks: 0,
            prev_impressions: 0,
            ctr: 0.0,
            page: String::new(),
            has_data_in_range: true,
        }
    }

    #[test]
    fn empty_history_is_the_no_data_summary() {
        let s = summarize("acme", &[], &DateWindow::Preset(RangePreset::Days30));
        assert!(!s.has_data_in_range);
        assert_eq!(s.position, None);
        assert_eq!(s.total_clicks, 0);
        assert_eq!(s.total_impressions, 0);
        assert_eq!(s.prev_clicks, 0);
        assert_eq!(s.change, 0.0);
        assert_eq!(s.ctr, 0.0);

        let json = serde_json::to_value(&s).expect("serialize");
        assert_eq!(json["position"], "-");
    }

    #[test]
    fn change_compares_the_two_latest_points_in_range() {
        let history = vec![
            point(day(2024, 5, 8), Some(5.0), 3, 40),
            point(day(2024, 5, 1), Some(10.0), 1, 20),
        ];
        let window = DateWindow::custom(day(2024, 5, 1), day(2024, 5, 8)).expect("window");
        let s = summarize_at("acme", &history, &window, day(2024, 6, 1));
        assert_eq!(s.change, 5.0);
        assert_eq!(s.position, Some(5.0));
        assert_eq!(s.page, "https://acme.com/2024-05-08");
        assert_eq!(s.total_clicks, 4);
        assert_eq!(s.total_impressions, 60);
        assert!(s.has_data_in_range);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let history = vec![
            point(day(2024, 5, 8), Some(1.0), i64::MAX, i64::MAX),
            point(day(2024, 5, 7), Some(1.0), i64::MAX, i64::MAX),
            point(day(2024, 4, 30), Some(2.0), i64::MAX, i64::MAX),
            point(day(2024, 4, 29), Some(2.0), i64::MAX, i64::MAX),
        ];
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days7),
            day(2024, 5, 9),
        );
        assert_eq!(s.total_clicks, i64::MAX);
        assert_eq!(s.total_impressions, i64::MAX);
        assert_eq!(s.prev_clicks, i64::MAX);
        assert_eq!(s.prev_impressions, i64::MAX);
        assert_eq!(s.ctr, 1.0);
    }

    #[test]
    fn unsorted_history_is_ordered_newest_first() {
        let history = vec![
            point(day(2024, 5, 1), Some(10.0), 0, 10),
            point(day(2024, 5, 8), Some(5.0), 0, 10),
        ];
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days30),
            day(2024, 5, 10),
        );
        assert_eq!(s.position, Some(5.0));
        assert_eq!(s.change, 5.0);
    }

    #[test]
    fn summarize_is_idempotent() {
        let history = vec![
            point(day(2024, 5, 8), Some(5.0), 3, 40),
            point(day(2024, 5, 1), Some(10.0), 1, 20),
        ];
        let window = DateWindow::Preset(RangePreset::Days7);
        let first = summarize_at("acme", &history, &window, day(2024, 5, 9));
        let second = summarize_at("acme", &history, &window, day(2024, 5, 9));
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_history_falls_back_to_latest_point() {
        let history = vec![point(day(2023, 1, 5), Some(12.0), 9, 90)];
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days7),
            day(2024, 5, 10),
        );
        assert!(!s.has_data_in_range);
        assert_eq!(s.position, Some(12.0));
        assert_eq!(s.total_clicks, 0);
        assert_eq!(s.total_impressions, 0);
        assert_eq!(s.change, 0.0);
    }

    #[test]
    fn previous_period_totals_are_separate() {
        let today = day(2024, 5, 31);
        let history = vec![
            point(day(2024, 5, 30), Some(4.0), 10, 100),
            point(day(2024, 5, 20), Some(6.0), 7, 70),
            point(day(2024, 5, 18), Some(8.0), 5, 50),
        ];
        // 7d: current period 05-24..=05-31, previous 05-17..05-24.
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days7),
            today,
        );
        assert_eq!(s.total_clicks, 10);
        assert_eq!(s.prev_clicks, 12);
        assert_eq!(s.prev_impressions, 120);
        assert_eq!(s.change, 0.0);
    }

    #[test]
    fn non_numeric_positions_do_not_produce_a_change() {
        let history = vec![
            point(day(2024, 5, 8), None, 0, 5),
            point(day(2024, 5, 7), Some(3.0), 0, 5),
        ];
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days7),
            day(2024, 5, 9),
        );
        assert_eq!(s.position, None);
        assert_eq!(s.change, 0.0);
    }

    #[test]
    fn ctr_is_clamped_when_clicks_exceed_impressions() {
        let history = vec![point(day(2024, 5, 8), Some(1.0), 50, 10)];
        let s = summarize_at(
            "acme",
            &history,
            &DateWindow::Preset(RangePreset::Days7),
            day(2024, 5, 9),
        );
        assert_eq!(s.ctr, 1.0);
        assert_eq!(ratio(1, 4), 0.25);
        assert_eq!(ratio(5, 0), 0.0);
    }

    #[test]
    fn average_position_skips_unranked_keywords() {
        let rows = vec![
            summary("a", Some(3.0), 100),
            summary("b", None, 100),
            summary("c", Some(7.0), 100),
        ];
        assert_eq!(average_position(&rows), Some(5.0));
    }

    #[test]
    fn average_position_ignores_keywords_without_data_in_range() {
        let mut stale = summary("stale", Some(50.0), 0);
        stale.has_data_in_range = false;
        let rows = vec![
            summary("a", Some(1.0), 10),
            summary("b", Some(2.0), 10),
            summary("c", Some(2.0), 10),
            stale,
        ];
        assert_eq!(average_position(&rows), Some(1.7));
        assert_eq!(average_position::<KeywordSummary>(&[]), None);
    }

    #[test]
    fn reliability_needs_ten_impressions() {
        assert_eq!(
            summary("a", Some(2.0), 9).reliability(10),
            PositionReliability::NotReliable
        );
        assert_eq!(
            summary("a", Some(2.0), 10).reliability(10),
            PositionReliability::Reliable
        );
        assert_eq!(
            summary("a", None, 500).reliability(10),
            PositionReliability::Unranked
        );
    }

    #[test]
    fn position_sort_puts_unreliable_rows_last_both_ways() {
        let mut rows = vec![
            summary("thin", Some(1.0), 3),
            summary("mid", Some(8.0), 100),
            summary("none", None, 100),
            summary("top", Some(2.0), 100),
        ];
        sort_summaries(&mut rows, SortKey::Position, SortOrder::Asc, 10);
        let order: Vec<&str> = rows.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(order, vec!["top", "mid", "none", "thin"]);

        sort_summaries(&mut rows, SortKey::Position, SortOrder::Desc, 10);
        let order: Vec<&str> = rows.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(order, vec!["mid", "top", "none", "thin"]);
    }

    #[test]
    fn sort_by_clicks_descending() {
        let mut a = summary("a", Some(1.0), 10);
        a.total_clicks = 3;
        let mut b = summary("b", Some(1.0), 10);
        b.total_clicks = 9;
        let mut rows = vec![a, b];
        sort_summaries(&mut rows, SortKey::Clicks, SortOrder::Desc, 10);
        assert_eq!(rows[0].keyword, "b");
    }

    #[test]
    fn sort_options_parse() {
        assert_eq!(SortKey::parse("impressions"), Ok(SortKey::Impressions));
        assert_eq!(SortOrder::parse("desc"), Ok(SortOrder::Desc));
        assert!(SortKey::parse("ctr").is_err());
    }
}
