//! Read access to stored keyword history.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::keyword::{HistoryPoint, KeywordRecord};

/// Storage-side queries the aggregation pipeline depends on.
///
/// Implementations return complete arrays: any paging against the underlying
/// store happens inside the implementation.
#[async_trait]
pub trait HistorySource: Send + Sync + 'static {
    /// Keyword records of a site, tracked ones only unless `include_untracked`.
    async fn keywords(
        &self,
        site_id: &str,
        include_untracked: bool,
    ) -> anyhow::Result<Vec<KeywordRecord>>;

    /// History rows of a site grouped by keyword id, newest first.
    ///
    /// With `since` set, rows dated before it are left out.
    async fn site_history(
        &self,
        site_id: &str,
        since: Option<NaiveDate>,
    ) -> anyhow::Result<HashMap<String, Vec<HistoryPoint>>>;
}
