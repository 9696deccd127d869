//! The insertion operation: prompt, coerce, insert.

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::executor::QueryExecutor;
use crate::registry::SchemaRegistry;
use crate::schema;

/// Seam to the interactive input source. The CLI backs this with a
/// terminal prompt; tests script it.
pub trait LineReader {
    /// Read one line of operator input for the given prompt.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Summary of a completed insertion.
#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub table: String,
    pub columns: usize,
    /// The statement handed to the executor.
    pub statement: String,
}

/// Insert one operator-entered row into `table`.
///
/// The registered schema gates the operation: introspection must agree
/// with it positionally before any prompting happens. Each prompted
/// value is coerced into literal form per its column's type; the first
/// coercion failure aborts. Literals are joined positionally into a
/// single `INSERT INTO <table> VALUES (...)`.
pub async fn run_insert(
    executor: &dyn QueryExecutor,
    registry: &SchemaRegistry,
    reader: &mut dyn LineReader,
    table: &str,
) -> Result<InsertOutcome> {
    let expected = registry.lookup(table)?;
    if expected.is_empty() {
        return Err(Error::Config(format!(
            "registered schema for table '{}' has no columns",
            table
        )));
    }

    let actual = executor.fetch_schema(table).await?;
    if actual.is_empty() {
        return Err(Error::MissingTable(table.to_string()));
    }
    schema::validate(&actual, &expected)?;

    let mut literals = Vec::with_capacity(expected.len());
    for spec in expected.columns() {
        let prompt = format!("{} ({})", spec.name, spec.type_tag);
        let raw = reader.read_line(&prompt)?;
        literals.push(spec.type_tag.coerce(&spec.name, &raw)?);
    }

    let statement = format!("INSERT INTO {} VALUES ({})", table, literals.join(", "));
    executor.execute(&statement).await?;

    info!("inserted 1 row into {} ({} columns)", table, expected.len());

    Ok(InsertOutcome {
        table: table.to_string(),
        columns: expected.len(),
        statement,
    })
}
