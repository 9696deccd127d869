//! Query executor seam and the ClickHouse HTTP implementation.
//!
//! The core operations only ever talk to a `QueryExecutor`; connection
//! handling and SQL transport live behind it. `HttpExecutor` drives the
//! ClickHouse HTTP interface: the SQL text is the request body,
//! credentials travel as query parameters, and scan results come back as
//! `TabSeparatedWithNamesAndTypes` which is re-chunked into fixed-size
//! blocks before delivery.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::decode::{Block, BlockColumn};
use crate::error::{Error, Result};
use crate::schema::{ColumnSpec, Schema, TypeTag};

/// Seam to the collaborating database.
///
/// Scan delivery is sequential: the sink is invoked once per block, and
/// each invocation runs to completion before the next block is
/// delivered. No retries at this level; failures surface as-is.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Enumerate available tables (`SHOW TABLES`).
    async fn show_tables(&self) -> Result<Vec<String>>;

    /// Introspect a table's schema from `system.columns`.
    async fn fetch_schema(&self, table: &str) -> Result<Schema>;

    /// Full scan of a table, delivering one `Block` per sink call.
    async fn scan_table(
        &self,
        table: &str,
        sink: &mut (dyn FnMut(Block) + Send),
    ) -> Result<()>;

    /// Execute a statement with no result set (INSERT).
    async fn execute(&self, sql: &str) -> Result<()>;
}

/// ClickHouse HTTP interface executor.
pub struct HttpExecutor {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    database: String,
    block_rows: usize,
}

impl HttpExecutor {
    /// Build an executor from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.clickhouse.base_url(),
            user: config.clickhouse.user.clone(),
            password: config.clickhouse.password.clone(),
            database: config.clickhouse.database.clone(),
            block_rows: config.scan_block_rows,
        })
    }

    /// POST one query; returns the response body on success, the server's
    /// diagnostic text as an `Executor` error otherwise.
    async fn raw_query(&self, sql: &str) -> Result<String> {
        debug!("query: {}", sql);

        let response = self
            .http
            .post(&self.base_url)
            .query(&[
                ("user", self.user.as_str()),
                ("password", self.password.as_str()),
                ("database", self.database.as_str()),
            ])
            .body(sql.to_owned())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Executor(body.trim().to_string()))
        }
    }
}

#[async_trait]
impl QueryExecutor for HttpExecutor {
    async fn show_tables(&self) -> Result<Vec<String>> {
        let body = self.raw_query("SHOW TABLES").await?;
        Ok(body
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn fetch_schema(&self, table: &str) -> Result<Schema> {
        let sql = format!(
            "SELECT name, type FROM system.columns WHERE table = '{}'",
            table
        );
        let body = self.raw_query(&sql).await?;
        parse_schema_body(&body)
    }

    async fn scan_table(
        &self,
        table: &str,
        sink: &mut (dyn FnMut(Block) + Send),
    ) -> Result<()> {
        let sql = format!(
            "SELECT * FROM {} FORMAT TabSeparatedWithNamesAndTypes",
            table
        );
        let body = self.raw_query(&sql).await?;

        for block in parse_scan_body(&body, self.block_rows)? {
            debug!("delivering block of {} records", block.record_count());
            sink(block);
        }
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        self.raw_query(sql).await?;
        Ok(())
    }
}

/// Parse `system.columns` introspection output (name TAB type per line).
fn parse_schema_body(body: &str) -> Result<Schema> {
    let mut columns = Vec::new();
    for line in body.lines().filter(|line| !line.is_empty()) {
        let (name, type_name) = line.split_once('\t').ok_or_else(|| {
            Error::Executor(format!("malformed introspection row: '{}'", line))
        })?;
        columns.push(ColumnSpec::new(name, TypeTag::parse(type_name)));
    }
    Ok(Schema::new(columns))
}

/// Parse a `TabSeparatedWithNamesAndTypes` body into blocks of at most
/// `block_rows` records each, preserving row order across blocks.
fn parse_scan_body(body: &str, block_rows: usize) -> Result<Vec<Block>> {
    let mut lines = body.lines();

    let names: Vec<String> = match lines.next() {
        Some(header) => header.split('\t').map(str::to_string).collect(),
        None => return Ok(Vec::new()),
    };
    let types: Vec<String> = lines
        .next()
        .ok_or_else(|| Error::Executor("scan result is missing its types header".into()))?
        .split('\t')
        .map(str::to_string)
        .collect();

    if names.len() != types.len() {
        return Err(Error::Executor(format!(
            "scan headers disagree: {} names, {} types",
            names.len(),
            types.len()
        )));
    }

    let mut blocks = Vec::new();
    let mut pending: Vec<Vec<Option<String>>> = Vec::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<Option<String>> = line.split('\t').map(unescape_field).collect();
        if fields.len() != names.len() {
            warn!(
                "dropping malformed scan line with {} of {} fields",
                fields.len(),
                names.len()
            );
            continue;
        }
        pending.push(fields);
        if pending.len() == block_rows {
            blocks.push(build_block(&names, &types, std::mem::take(&mut pending)));
        }
    }

    if !pending.is_empty() {
        blocks.push(build_block(&names, &types, pending));
    }

    Ok(blocks)
}

/// Transpose row-major TSV fields into the column-oriented block shape.
fn build_block(names: &[String], types: &[String], rows: Vec<Vec<Option<String>>>) -> Block {
    let mut columns: Vec<BlockColumn> = names
        .iter()
        .zip(types)
        .map(|(name, type_name)| BlockColumn {
            name: name.clone(),
            type_name: type_name.clone(),
            cells: Vec::with_capacity(rows.len()),
        })
        .collect();

    for row in rows {
        for (column, cell) in columns.iter_mut().zip(row) {
            column.cells.push(cell);
        }
    }

    Block { columns }
}

/// Decode one TSV field. `\N` is NULL; standard ClickHouse TSV escapes
/// are resolved, and an unrecognized escape keeps its literal character.
fn unescape_field(field: &str) -> Option<String> {
    if field == "\\N" {
        return None;
    }

    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_null_marker() {
        assert_eq!(unescape_field("\\N"), None);
        // An escaped backslash before N is data, not the NULL marker.
        assert_eq!(unescape_field("\\\\N"), Some("\\N".to_string()));
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape_field("a\\tb"), Some("a\tb".to_string()));
        assert_eq!(unescape_field("a\\nb"), Some("a\nb".to_string()));
        assert_eq!(unescape_field("it\\'s"), Some("it's".to_string()));
        assert_eq!(unescape_field("plain"), Some("plain".to_string()));
    }

    #[test]
    fn test_parse_schema_body() {
        let body = "datetime\tDateTime64(3)\nmsgtype\tUInt32\nseverity\tNullable(UInt8)\n";
        let schema = parse_schema_body(body).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.columns()[0].name, "datetime");
        assert_eq!(schema.columns()[2].type_tag, TypeTag::NullableUInt8);
    }

    #[test]
    fn test_parse_schema_body_empty() {
        assert!(parse_schema_body("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_schema_body_malformed() {
        assert!(parse_schema_body("no-tab-here\n").is_err());
    }

    #[test]
    fn test_parse_scan_body_chunks_into_blocks() {
        let body = "n\tlabel\nUInt32\tNullable(String)\n\
                    1\ta\n2\t\\N\n3\tc\n4\td\n5\te\n";
        let blocks = parse_scan_body(body, 2).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].record_count(), 2);
        assert_eq!(blocks[1].record_count(), 2);
        assert_eq!(blocks[2].record_count(), 1);

        assert_eq!(blocks[0].columns[0].name, "n");
        assert_eq!(blocks[0].columns[1].type_name, "Nullable(String)");
        assert_eq!(blocks[0].columns[1].cells[1], None);
        assert_eq!(blocks[2].columns[0].cells[0], Some("5".to_string()));
    }

    #[test]
    fn test_parse_scan_body_empty_table() {
        let body = "n\tlabel\nUInt32\tNullable(String)\n";
        assert!(parse_scan_body(body, 8).unwrap().is_empty());
    }

    #[test]
    fn test_parse_scan_body_empty_response() {
        assert!(parse_scan_body("", 8).unwrap().is_empty());
    }

    #[test]
    fn test_parse_scan_body_drops_ragged_lines() {
        let body = "n\tlabel\nUInt32\tNullable(String)\n1\ta\nonly-one-field\n2\tb\n";
        let blocks = parse_scan_body(body, 8).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].record_count(), 2);
    }

    #[test]
    fn test_parse_scan_body_header_disagreement() {
        let body = "a\tb\nUInt32\n";
        assert!(parse_scan_body(body, 8).is_err());
    }
}
