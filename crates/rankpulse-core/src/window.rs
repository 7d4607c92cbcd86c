//! Reporting windows and their comparison periods.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RangePreset {
    #[serde(rename = "7d")]
    Days7,
    #[default]
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "1y")]
    Year1,
    #[serde(rename = "16m")]
    Months16,
}

impl RangePreset {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(Self::Days7),
            "30d" => Ok(Self::Days30),
            "90d" => Ok(Self::Days90),
            "1y" => Ok(Self::Year1),
            "16m" => Ok(Self::Months16),
            other => Err(CoreError::InvalidRange(other.to_string())),
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Self::Days7 => 7,
            Self::Days30 => 30,
            Self::Days90 => 90,
            Self::Year1 => 365,
            Self::Months16 => 480,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days90 => "90d",
            Self::Year1 => "1y",
            Self::Months16 => "16m",
        }
    }
}

/// The reporting span selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateWindow {
    Preset(RangePreset),
    Custom { start: NaiveDate, end: NaiveDate },
}

impl From<RangePreset> for DateWindow {
    fn from(preset: RangePreset) -> Self {
        Self::Preset(preset)
    }
}

/// Concrete day bounds of a window, relative to a given day.
///
/// `start..=end` is the current period; `prev_start..start` is the period
/// used for period-over-period comparisons. Both periods span `days` days
/// measured back from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub prev_start: NaiveDate,
    pub days: i64,
}

impl ResolvedWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn in_previous(&self, date: NaiveDate) -> bool {
        date >= self.prev_start && date < self.start
    }
}

impl DateWindow {
    /// Build a window from request parameters.
    ///
    /// A `start_date`/`end_date` pair wins over `range`; with neither present
    /// the `default` preset is used.
    pub fn from_params(
        range: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        default: RangePreset,
    ) -> Result<Self, CoreError> {
        match (start_date, end_date) {
            (Some(start), Some(end)) => {
                let start = parse_date(start, "start_date")?;
                let end = parse_date(end, "end_date")?;
                Self::custom(start, end)
            }
            (Some(_), None) => Err(CoreError::InvalidDate { field: "end_date" }),
            (None, Some(_)) => Err(CoreError::InvalidDate {
                field: "start_date",
            }),
            (None, None) => match range.map(str::trim).filter(|r| !r.is_empty()) {
                Some(raw) => RangePreset::parse(raw).map(Self::Preset),
                None => Ok(Self::Preset(default)),
            },
        }
    }

    /// A fixed `start..=end` window.
    ///
    /// The comparison period ending at `start` must also be a valid date,
    /// so windows reaching the edge of the calendar are rejected.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvertedWindow);
        }
        let days = (end - start).num_days() + 1;
        if start.checked_sub_signed(Duration::days(days)).is_none() {
            return Err(CoreError::WindowOutOfRange);
        }
        Ok(Self::Custom { start, end })
    }

    /// Number of days the window spans.
    pub fn days(&self) -> i64 {
        match self {
            Self::Preset(preset) => preset.days(),
            Self::Custom { start, end } => (*end - *start).num_days() + 1,
        }
    }

    /// Pin the window to calendar days, with `today` as the end of presets.
    pub fn resolve(&self, today: NaiveDate) -> ResolvedWindow {
        let days = self.days();
        let (start, end) = match self {
            Self::Preset(_) => (days_before(today, days), today),
            Self::Custom { start, end } => (*start, *end),
        };
        ResolvedWindow {
            start,
            end,
            prev_start: days_before(start, days),
            days,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Preset(preset) => preset.slug().to_string(),
            Self::Custom { start, end } => format!("{start}..{end}"),
        }
    }
}

/// `date - days`, clamped to the first representable day.
fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| CoreError::InvalidDate { field })
}
