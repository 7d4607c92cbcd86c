use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use rankpulse_server::state::AppState;

/// `rankpulse health`: liveness probe for container health checks.
///
/// Calls `GET http://localhost:$RANKPULSE_PORT/health` and exits 0 on
/// HTTP 200, 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("RANKPULSE_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging; RUST_LOG adds to the default directive.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rankpulse=info".parse()?),
        )
        .json()
        .init();

    let cfg = rankpulse_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/rankpulse.db", cfg.data_dir);
    let db = rankpulse_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    let state = Arc::new(AppState::new(db, cfg.clone()));
    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = rankpulse_server::app::build_app(Arc::clone(&state));

    info!(
        port = cfg.port,
        default_range = cfg.default_range.slug(),
        "RankPulse listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("RankPulse stopped");
    Ok(())
}
