//! The comparison operation: scan two tables, count exact row matches.

use serde::Serialize;
use tracing::info;

use crate::decode::{decode_block, Block, Row};
use crate::error::{Error, Result};
use crate::executor::QueryExecutor;
use crate::matcher::count_matches;

/// Summary of one cross-table comparison.
#[derive(Debug, Clone, Serialize)]
pub struct CompareOutcome {
    pub left_table: String,
    pub right_table: String,
    /// Rows decoded from each table.
    pub left_rows: usize,
    pub right_rows: usize,
    /// Records skipped for runtime shape mismatches.
    pub left_skipped: usize,
    pub right_skipped: usize,
    /// All-pairs exact match count.
    pub matches: u64,
}

/// Scan both tables in full, decode every delivered block, and count
/// all-pairs exact matches between the two row sets.
///
/// Per-record decode failures are logged and skipped; they never abort a
/// scan. Everything else is fail-fast.
pub async fn run_compare(
    executor: &dyn QueryExecutor,
    left: &str,
    right: &str,
) -> Result<CompareOutcome> {
    let (left_rows, left_skipped) = scan_rows(executor, left).await?;
    let (right_rows, right_skipped) = scan_rows(executor, right).await?;

    let matches = count_matches(&left_rows, &right_rows);

    info!(
        "{} ({} rows) x {} ({} rows): {} matching pairs",
        left,
        left_rows.len(),
        right,
        right_rows.len(),
        matches
    );

    Ok(CompareOutcome {
        left_table: left.to_string(),
        right_table: right.to_string(),
        left_rows: left_rows.len(),
        right_rows: right_rows.len(),
        left_skipped,
        right_skipped,
        matches,
    })
}

/// Decode one table's full scan into a row set, preserving delivery
/// order within and across blocks.
async fn scan_rows(executor: &dyn QueryExecutor, table: &str) -> Result<(Vec<Row>, usize)> {
    let schema = executor.fetch_schema(table).await?;
    if schema.is_empty() {
        return Err(Error::MissingTable(table.to_string()));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut sink = |block: Block| {
        let decoded = decode_block(&schema, &block);
        skipped += decoded.skipped;
        rows.extend(decoded.rows);
    };
    executor.scan_table(table, &mut sink).await?;

    Ok((rows, skipped))
}
