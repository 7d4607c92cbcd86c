/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// Every statement uses `IF NOT EXISTS`, so re-running it on each startup
/// is a no-op for an existing database.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `RANKPULSE_DUCKDB_MEMORY`, default `"1GB"`). Any DuckDB size string
/// works, e.g. `"512MB"` or `"4GB"`.
///
/// DuckDB does not cascade deletes for us: removing a site or keyword must
/// delete `keyword_history` rows first, then `keywords`, then `sites`, all in
/// one transaction. See `delete_site()` in site.rs.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- SITES
-- ===========================================
CREATE TABLE IF NOT EXISTS sites (
    id              VARCHAR PRIMARY KEY,           -- 'site_' + 10 random [0-9a-z]
    name            VARCHAR NOT NULL,
    property_url    VARCHAR NOT NULL,              -- 'https://acme.com/' or 'sc-domain:acme.com'
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- KEYWORDS
-- ===========================================
-- One row per (site, normalized text). Created by manual add or by the first
-- sync that sees the query; untracked keywords stay stored but are hidden
-- from dashboards.
CREATE TABLE IF NOT EXISTS keywords (
    id              VARCHAR PRIMARY KEY,           -- UUID v4
    site_id         VARCHAR NOT NULL,
    text            VARCHAR NOT NULL,
    category        VARCHAR NOT NULL DEFAULT 'Uncategorized',
    is_tracked      BOOLEAN NOT NULL DEFAULT true,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (site_id, text)
);

-- ===========================================
-- KEYWORD HISTORY (append-only)
-- ===========================================
-- One row per keyword, day and landing page. Re-syncing a day never
-- overwrites: inserts use ON CONFLICT DO NOTHING.
CREATE TABLE IF NOT EXISTS keyword_history (
    keyword_id      VARCHAR NOT NULL,
    site_id         VARCHAR NOT NULL,
    date            DATE NOT NULL,
    page_url        VARCHAR NOT NULL DEFAULT '',
    position        DOUBLE,                        -- NULL when the source had no rank
    impressions     BIGINT NOT NULL DEFAULT 0,
    clicks          BIGINT NOT NULL DEFAULT 0,
    ctr             DOUBLE NOT NULL DEFAULT 0,
    PRIMARY KEY (keyword_id, date, page_url)
);
-- Dashboard reads: all history of a site, newest first
CREATE INDEX IF NOT EXISTS idx_history_site_date
    ON keyword_history(site_id, date DESC);
"#
    )
}
