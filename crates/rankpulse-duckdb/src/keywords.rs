use anyhow::Result;
use duckdb::Connection;

use rankpulse_core::keyword::{normalize_keyword_text, KeywordRecord, UNCATEGORIZED};

use crate::DuckDbBackend;

pub struct UpdateKeywordParams {
    pub category: Option<String>,
    pub is_tracked: Option<bool>,
}

const KEYWORD_COLUMNS: &str =
    "id, site_id, text, category, is_tracked, CAST(created_at AS VARCHAR)";

pub(crate) fn keyword_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<KeywordRecord> {
    Ok(KeywordRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        text: row.get(2)?,
        category: row.get(3)?,
        is_tracked: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn find_keyword(conn: &Connection, site_id: &str, keyword_id: &str) -> Result<Option<KeywordRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {KEYWORD_COLUMNS} FROM keywords WHERE site_id = ?1 AND id = ?2"
    ))?;
    match stmt.query_row(duckdb::params![site_id, keyword_id], keyword_from_row) {
        Ok(record) => Ok(Some(record)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert a keyword unless `(site_id, text)` is already stored, and return
/// its id together with whether a new row was written.
///
/// `text` must already be normalized.
pub(crate) fn ensure_keyword(
    conn: &Connection,
    site_id: &str,
    text: &str,
    category: &str,
) -> Result<(String, bool)> {
    let id = uuid::Uuid::new_v4().to_string();
    let inserted = conn.execute(
        "INSERT INTO keywords (id, site_id, text, category, is_tracked, created_at) \
         VALUES (?1, ?2, ?3, ?4, true, CURRENT_TIMESTAMP) \
         ON CONFLICT (site_id, text) DO NOTHING",
        duckdb::params![id, site_id, text, category],
    )?;
    if inserted > 0 {
        return Ok((id, true));
    }
    let existing: String = conn
        .prepare("SELECT id FROM keywords WHERE site_id = ?1 AND text = ?2")?
        .query_row(duckdb::params![site_id, text], |row| row.get(0))?;
    Ok((existing, false))
}

impl DuckDbBackend {
    /// Add a keyword by hand.
    ///
    /// Text is normalized first; adding text that is already stored returns
    /// the existing record with `false`.
    pub async fn add_keyword(
        &self,
        site_id: &str,
        text: &str,
        category: Option<&str>,
    ) -> Result<(KeywordRecord, bool)> {
        let conn = self.conn.lock().await;
        let text = normalize_keyword_text(text);
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);

        let (id, created) = ensure_keyword(&conn, site_id, &text, category)?;
        let record = find_keyword(&conn, site_id, &id)?
            .ok_or_else(|| anyhow::anyhow!("keyword {id} vanished after insert"))?;
        Ok((record, created))
    }

    /// Keywords of a site ordered by text. Untracked ones only on request.
    pub async fn list_keywords(
        &self,
        site_id: &str,
        include_untracked: bool,
    ) -> Result<Vec<KeywordRecord>> {
        let conn = self.conn.lock().await;
        let sql = if include_untracked {
            format!("SELECT {KEYWORD_COLUMNS} FROM keywords WHERE site_id = ?1 ORDER BY text")
        } else {
            format!(
                "SELECT {KEYWORD_COLUMNS} FROM keywords WHERE site_id = ?1 AND is_tracked ORDER BY text"
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(duckdb::params![site_id], keyword_from_row)?;

        let mut keywords = Vec::new();
        for row in rows {
            keywords.push(row?);
        }
        Ok(keywords)
    }

    pub async fn get_keyword(&self, site_id: &str, keyword_id: &str) -> Result<Option<KeywordRecord>> {
        let conn = self.conn.lock().await;
        find_keyword(&conn, site_id, keyword_id)
    }

    /// Recategorize and/or (un)track a keyword. `None` when it doesn't exist.
    pub async fn update_keyword(
        &self,
        site_id: &str,
        keyword_id: &str,
        params: UpdateKeywordParams,
    ) -> Result<Option<KeywordRecord>> {
        let conn = self.conn.lock().await;
        if find_keyword(&conn, site_id, keyword_id)?.is_none() {
            return Ok(None);
        }

        if let Some(ref category) = params.category {
            let category = match category.trim() {
                "" => UNCATEGORIZED,
                trimmed => trimmed,
            };
            conn.execute(
                "UPDATE keywords SET category = ?1 WHERE site_id = ?2 AND id = ?3",
                duckdb::params![category, site_id, keyword_id],
            )?;
        }
        if let Some(is_tracked) = params.is_tracked {
            conn.execute(
                "UPDATE keywords SET is_tracked = ?1 WHERE site_id = ?2 AND id = ?3",
                duckdb::params![is_tracked, site_id, keyword_id],
            )?;
        }

        find_keyword(&conn, site_id, keyword_id)
    }

    /// Remove a keyword and its history. Returns `false` if it didn't exist.
    pub async fn remove_keyword(&self, site_id: &str, keyword_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let exists: i64 = tx
            .prepare("SELECT COUNT(*) FROM keywords WHERE site_id = ?1 AND id = ?2")?
            .query_row(duckdb::params![site_id, keyword_id], |row| row.get(0))?;
        if exists == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM keyword_history WHERE keyword_id = ?1",
            duckdb::params![keyword_id],
        )?;
        tx.execute(
            "DELETE FROM keywords WHERE site_id = ?1 AND id = ?2",
            duckdb::params![site_id, keyword_id],
        )?;
        tx.commit()?;
        Ok(true)
    }
}
