use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use duckdb::types::ToSql;
use duckdb::Connection;
use serde::Serialize;

use rankpulse_core::keyword::{normalize_keyword_text, HistoryPoint, SyncRow, UNCATEGORIZED};

use crate::keywords::ensure_keyword;
use crate::DuckDbBackend;

/// Rows fetched per query when reading history back.
pub const HISTORY_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub keywords_created: usize,
    pub rows_inserted: usize,
    /// Rows already stored for the same keyword, day and page.
    pub rows_skipped: usize,
}

struct RawHistoryRow {
    keyword_id: String,
    date: String,
    page_url: String,
    position: Option<f64>,
    impressions: i64,
    clicks: i64,
    ctr: f64,
}

const HISTORY_COLUMNS: &str =
    "keyword_id, CAST(date AS VARCHAR), page_url, position, impressions, clicks, ctr";

/// Run `sql` page by page until a short page comes back.
///
/// `sql` must end with `LIMIT ? OFFSET ?`; the two values are appended after
/// `params`.
fn read_paged(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<HistoryPoint>> {
    let mut stmt = conn.prepare(sql)?;
    let mut points = Vec::new();
    let mut offset: i64 = 0;

    loop {
        let mut page_params: Vec<&dyn ToSql> = params.to_vec();
        page_params.push(&HISTORY_PAGE_SIZE);
        page_params.push(&offset);

        let rows = stmt.query_map(page_params.as_slice(), |row| {
            Ok(RawHistoryRow {
                keyword_id: row.get(0)?,
                date: row.get(1)?,
                page_url: row.get(2)?,
                position: row.get(3)?,
                impressions: row.get(4)?,
                clicks: row.get(5)?,
                ctr: row.get(6)?,
            })
        })?;

        let mut fetched: i64 = 0;
        for row in rows {
            let raw = row?;
            fetched += 1;
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
                .with_context(|| format!("bad history date {:?}", raw.date))?;
            points.push(HistoryPoint {
                keyword_id: raw.keyword_id,
                date,
                position: raw.position,
                impressions: raw.impressions,
                clicks: raw.clicks,
                ctr: raw.ctr,
                page_url: raw.page_url,
            });
        }

        if fetched < HISTORY_PAGE_SIZE {
            break;
        }
        offset += HISTORY_PAGE_SIZE;
    }

    Ok(points)
}

impl DuckDbBackend {
    /// Store a batch of synced rows in one transaction.
    ///
    /// Unknown keywords are created tracked and Uncategorized. History is
    /// append-only: a row for a keyword, day and page that is already stored
    /// is skipped, never overwritten. Rows must have passed
    /// [`SyncRow::validate`].
    pub async fn ingest_sync(&self, site_id: &str, rows: &[SyncRow]) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::default();
        if rows.is_empty() {
            return Ok(outcome);
        }

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let mut keyword_ids: HashMap<String, String> = HashMap::new();

        for row in rows {
            let text = normalize_keyword_text(&row.keyword);
            let keyword_id = match keyword_ids.get(&text) {
                Some(id) => id.clone(),
                None => {
                    let (id, created) = ensure_keyword(&tx, site_id, &text, UNCATEGORIZED)?;
                    if created {
                        outcome.keywords_created += 1;
                    }
                    keyword_ids.insert(text, id.clone());
                    id
                }
            };

            let position = row.position.filter(|p| p.is_finite());
            let ctr = if row.ctr.is_finite() { row.ctr } else { 0.0 };
            let inserted = tx.execute(
                "INSERT INTO keyword_history \
                 (keyword_id, site_id, date, page_url, position, impressions, clicks, ctr) \
                 VALUES (?1, ?2, CAST(?3 AS DATE), ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT DO NOTHING",
                duckdb::params![
                    keyword_id,
                    site_id,
                    row.date.to_string(),
                    row.page,
                    position,
                    row.impressions,
                    row.clicks,
                    ctr,
                ],
            )?;
            if inserted > 0 {
                outcome.rows_inserted += 1;
            } else {
                outcome.rows_skipped += 1;
            }
        }

        tx.commit()?;
        tracing::info!(
            site_id = %site_id,
            keywords_created = outcome.keywords_created,
            rows_inserted = outcome.rows_inserted,
            rows_skipped = outcome.rows_skipped,
            "Sync ingested"
        );
        Ok(outcome)
    }

    /// Full history of one keyword, newest first.
    pub async fn keyword_history(&self, site_id: &str, keyword_id: &str) -> Result<Vec<HistoryPoint>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM keyword_history \
             WHERE site_id = ?1 AND keyword_id = ?2 \
             ORDER BY date DESC, page_url LIMIT ?3 OFFSET ?4"
        );
        read_paged(&conn, &sql, &[&site_id, &keyword_id])
    }

    /// History of every keyword of a site, newest first, optionally cut off
    /// before `since`.
    pub async fn site_history_rows(
        &self,
        site_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<HistoryPoint>> {
        let conn = self.conn.lock().await;
        match since {
            Some(since) => {
                let sql = format!(
                    "SELECT {HISTORY_COLUMNS} FROM keyword_history \
                     WHERE site_id = ?1 AND date >= CAST(?2 AS DATE) \
                     ORDER BY date DESC, keyword_id, page_url LIMIT ?3 OFFSET ?4"
                );
                let since = since.to_string();
                read_paged(&conn, &sql, &[&site_id, &since])
            }
            None => {
                let sql = format!(
                    "SELECT {HISTORY_COLUMNS} FROM keyword_history \
                     WHERE site_id = ?1 \
                     ORDER BY date DESC, keyword_id, page_url LIMIT ?2 OFFSET ?3"
                );
                read_paged(&conn, &sql, &[&site_id])
            }
        }
    }
}
