//! # ch-crosscheck
//!
//! Manual row ingestion and cross-table verification for ClickHouse.
//!
//! Two operations share one core:
//!
//! - **Insert**: prompt an operator per-column, coerce each free-text
//!   value into database-literal form per the declared schema, and issue
//!   a positional INSERT - gated by a positional check of the
//!   introspected schema against the registered one.
//! - **Compare**: full-scan two tables, decode every delivered block
//!   into normalized rows, and count all-pairs exact matches (duplicates
//!   multiply; NULL equals NULL).
//!
//! Database transport and interactive prompting sit behind the
//! [`QueryExecutor`] and [`LineReader`] seams.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ch_crosscheck::{run_compare, Config, HttpExecutor};
//!
//! #[tokio::main]
//! async fn main() -> ch_crosscheck::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let executor = HttpExecutor::new(&config)?;
//!     let outcome = run_compare(&executor, "t_accessattributes", "t_archive").await?;
//!     println!("{} matching pairs", outcome.matches);
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod compare;
pub mod config;
pub mod decode;
pub mod error;
pub mod executor;
pub mod ingest;
pub mod matcher;
pub mod registry;
pub mod schema;

// Re-exports for convenient access
pub use compare::{run_compare, CompareOutcome};
pub use config::{ClickHouseConfig, ColumnDef, Config};
pub use decode::{decode_block, Block, BlockColumn, DecodedBlock, Row};
pub use error::{Error, Result};
pub use executor::{HttpExecutor, QueryExecutor};
pub use ingest::{run_insert, InsertOutcome, LineReader};
pub use matcher::count_matches;
pub use registry::SchemaRegistry;
pub use schema::{validate, ColumnSpec, Schema, TypeTag};
