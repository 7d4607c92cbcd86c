pub mod backend;
pub mod history;
pub mod history_impl;
pub mod keywords;
pub mod schema;
pub mod site;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so tests can use
/// `rankpulse_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
