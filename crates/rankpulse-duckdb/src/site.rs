use anyhow::Result;
use serde::Serialize;

use crate::DuckDbBackend;

#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub property_url: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct CreateSiteParams {
    pub name: String,
    pub property_url: String,
}

const SITE_COLUMNS: &str =
    "id, name, property_url, CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR)";

fn site_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        name: row.get(1)?,
        property_url: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Generate a site ID: "site_" + 10 random alphanumeric chars.
fn generate_site_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: String = (0..10)
        .map(|_| {
            let idx = rng.gen_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect();
    format!("site_{}", chars)
}

impl DuckDbBackend {
    /// Register a site. `None` when a site for the same property URL
    /// (ignoring case) already exists.
    ///
    /// The duplicate check and the insert share one lock, so concurrent
    /// creates for one property cannot both succeed.
    pub async fn create_site(&self, params: CreateSiteParams) -> Result<Option<Site>> {
        let conn = self.conn.lock().await;

        let existing: i64 = conn
            .prepare("SELECT COUNT(*) FROM sites WHERE lower(property_url) = lower(?1)")?
            .query_row(duckdb::params![params.property_url], |row| row.get(0))?;
        if existing > 0 {
            return Ok(None);
        }

        let id = generate_site_id();
        conn.execute(
            "INSERT INTO sites (id, name, property_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
            duckdb::params![id, params.name, params.property_url],
        )?;

        // Read back the created row to get timestamps.
        let site = conn
            .prepare(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"))?
            .query_row(duckdb::params![id], site_from_row)?;
        Ok(Some(site))
    }

    pub async fn list_sites(&self) -> Result<Vec<Site>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SITE_COLUMNS} FROM sites ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map([], site_from_row)?;

        let mut sites = Vec::new();
        for row in rows {
            sites.push(row?);
        }
        Ok(sites)
    }

    pub async fn get_site(&self, id: &str) -> Result<Option<Site>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"))?;
        match stmt.query_row(duckdb::params![id], site_from_row) {
            Ok(site) => Ok(Some(site)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a site with its keywords and their history.
    ///
    /// DuckDB doesn't cascade, so children go first: history → keywords →
    /// site, in one transaction together with the existence check.
    pub async fn delete_site(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let exists: i64 = tx
            .prepare("SELECT COUNT(*) FROM sites WHERE id = ?1")?
            .query_row(duckdb::params![id], |row| row.get(0))?;
        if exists == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM keyword_history WHERE site_id = ?1",
            duckdb::params![id],
        )?;
        tx.execute("DELETE FROM keywords WHERE site_id = ?1", duckdb::params![id])?;
        tx.execute("DELETE FROM sites WHERE id = ?1", duckdb::params![id])?;
        tx.commit()?;

        tracing::info!(site_id = %id, "Site deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_ids_have_prefix_and_lowercase_alphanumerics() {
        let id = generate_site_id();
        assert!(id.starts_with("site_"));
        let suffix = &id["site_".len()..];
        assert_eq!(suffix.len(), 10);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
