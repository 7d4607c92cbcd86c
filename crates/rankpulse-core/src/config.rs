use crate::window::RangePreset;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    pub cors_origins: Vec<String>,
    /// Window used by dashboard and keyword endpoints when the request names none.
    pub default_range: RangePreset,
    /// Summaries with fewer impressions than this report their position as not reliable.
    pub min_reliable_impressions: i64,
    /// Upper bound on rows accepted by a single `POST /api/sites/{id}/sync`.
    pub sync_max_rows: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("RANKPULSE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("RANKPULSE_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("RANKPULSE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            cors_origins: std::env::var("RANKPULSE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            default_range: {
                let raw = std::env::var("RANKPULSE_DEFAULT_RANGE")
                    .unwrap_or_else(|_| "30d".to_string());
                RangePreset::parse(&raw).map_err(|e| e.to_string())?
            },
            min_reliable_impressions: std::env::var("RANKPULSE_MIN_RELIABLE_IMPRESSIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            sync_max_rows: 25_000,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: "./data".to_string(),
            duckdb_memory_limit: "1GB".to_string(),
            cors_origins: Vec::new(),
            default_range: RangePreset::Days30,
            min_reliable_impressions: 10,
            sync_max_rows: 25_000,
        }
    }
}
