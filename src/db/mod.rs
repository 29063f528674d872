//! Database module: schema, row models and the storage handle.
//!
//! Layout:
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `models.rs`: Rust structs mirroring DB rows, plus write-side records
//! - `sqlite.rs`: `MarketStorage`, users and credentials
//! - `listing.rs`: filtered, paginated reads
//! - `upsert.rs`: keyed writes, stock/status updates and bulk clear

pub mod listing;
pub mod models;
pub mod schema;
pub mod sqlite;
pub mod upsert;

pub use models::DbCredential;
pub use schema::SQLITE_INIT;
pub use sqlite::{MarketStorage, SqlitePool};
