use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use rankpulse_core::history::HistorySource;
use rankpulse_core::keyword::{HistoryPoint, KeywordRecord};

use crate::DuckDbBackend;

#[async_trait]
impl HistorySource for DuckDbBackend {
    async fn keywords(
        &self,
        site_id: &str,
        include_untracked: bool,
    ) -> anyhow::Result<Vec<KeywordRecord>> {
        self.list_keywords(site_id, include_untracked).await
    }

    async fn site_history(
        &self,
        site_id: &str,
        since: Option<NaiveDate>,
    ) -> anyhow::Result<HashMap<String, Vec<HistoryPoint>>> {
        let rows = self.site_history_rows(site_id, since).await?;
        let mut grouped: HashMap<String, Vec<HistoryPoint>> = HashMap::new();
        // Rows arrive newest first, so each group keeps that order.
        for point in rows {
            grouped
                .entry(point.keyword_id.clone())
                .or_default()
                .push(point);
        }
        Ok(grouped)
    }
}
