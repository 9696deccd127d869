//! Block decoding into normalized rows.
//!
//! A `Block` is one batch of column data delivered by the query executor;
//! a full scan may deliver many. Decoding turns each record into a `Row`
//! of normalized textual values. A record whose runtime shape disagrees
//! with the declared schema is skipped with a warning; a per-record
//! failure never aborts the batch or the scan.

use tracing::warn;

use crate::schema::{ColumnSpec, Schema, TypeTag};

/// One column of a block: runtime metadata plus raw nullable cells.
#[derive(Debug, Clone)]
pub struct BlockColumn {
    /// Column name as reported by the database.
    pub name: String,

    /// Runtime type name as reported by the database.
    pub type_name: String,

    /// Raw text cells; `None` is a NULL cell.
    pub cells: Vec<Option<String>>,
}

/// One batch of rows delivered by a single query-result callback.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub columns: Vec<BlockColumn>,
}

impl Block {
    /// Number of records in this block.
    pub fn record_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }
}

/// One normalized record: positional values, `None` marking NULL.
///
/// Rows are value objects; equality is field-wise over all positions,
/// with NULL equal to NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(pub Vec<Option<String>>);

/// Result of decoding one block: the rows that decoded cleanly plus the
/// count of records skipped for shape mismatches.
#[derive(Debug, Default)]
pub struct DecodedBlock {
    pub rows: Vec<Row>,
    pub skipped: usize,
}

/// Decode every record of a block under the given schema.
///
/// Rows come back by value in delivery order; the caller owns appending
/// them into its row set.
pub fn decode_block(schema: &Schema, block: &Block) -> DecodedBlock {
    let mut decoded = DecodedBlock {
        rows: Vec::with_capacity(block.record_count()),
        ..Default::default()
    };

    for index in 0..block.record_count() {
        match decode_record(schema, block, index) {
            Ok(row) => decoded.rows.push(row),
            Err(reason) => {
                warn!("skipping record {}: {}", index, reason);
                decoded.skipped += 1;
            }
        }
    }

    decoded
}

fn decode_record(schema: &Schema, block: &Block, index: usize) -> Result<Row, String> {
    let mut values = Vec::with_capacity(schema.len());

    for (position, spec) in schema.columns().iter().enumerate() {
        let column = block
            .columns
            .get(position)
            .ok_or_else(|| format!("column {} ({}) missing from block", position, spec.name))?;

        let runtime_tag = TypeTag::parse(&column.type_name);
        if runtime_tag != spec.type_tag {
            return Err(format!(
                "column {}: declared {} but database reports {}",
                spec.name, spec.type_tag, column.type_name
            ));
        }

        let cell = column
            .cells
            .get(index)
            .ok_or_else(|| format!("column {}: record {} missing", spec.name, index))?;

        values.push(normalize_cell(spec, cell.as_deref())?);
    }

    Ok(Row(values))
}

/// Normalize one extracted cell to text: numerics re-render through a
/// decimal parse, NULLs stay as the distinguished marker, text passes
/// through.
fn normalize_cell(spec: &ColumnSpec, cell: Option<&str>) -> Result<Option<String>, String> {
    match (spec.type_tag, cell) {
        (TypeTag::NullableUInt8 | TypeTag::NullableString | TypeTag::Unknown, None) => Ok(None),
        (_, None) => Err(format!(
            "column {}: NULL in non-nullable {} column",
            spec.name, spec.type_tag
        )),
        (TypeTag::UInt32, Some(raw)) => raw
            .trim()
            .parse::<u32>()
            .map(|v| Some(v.to_string()))
            .map_err(|_| format!("column {}: '{}' is not a UInt32 value", spec.name, raw)),
        (TypeTag::NullableUInt8, Some(raw)) => raw
            .trim()
            .parse::<u8>()
            .map(|v| Some(v.to_string()))
            .map_err(|_| format!("column {}: '{}' is not a UInt8 value", spec.name, raw)),
        (
            TypeTag::DateTime64Milli | TypeTag::NullableString | TypeTag::Str | TypeTag::Unknown,
            Some(raw),
        ) => Ok(Some(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnSpec::new("n", TypeTag::UInt32),
            ColumnSpec::new("severity", TypeTag::NullableUInt8),
            ColumnSpec::new("label", TypeTag::NullableString),
        ])
    }

    fn block(cells: Vec<(&str, &str, Vec<Option<&str>>)>) -> Block {
        Block {
            columns: cells
                .into_iter()
                .map(|(name, type_name, cells)| BlockColumn {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    cells: cells.into_iter().map(|c| c.map(str::to_string)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_decode_clean_block() {
        let block = block(vec![
            ("n", "UInt32", vec![Some("1"), Some("2")]),
            ("severity", "Nullable(UInt8)", vec![Some("5"), None]),
            ("label", "Nullable(String)", vec![None, Some("audit")]),
        ]);

        let decoded = decode_block(&schema(), &block);
        assert_eq!(decoded.skipped, 0);
        assert_eq!(
            decoded.rows,
            vec![
                Row(vec![Some("1".into()), Some("5".into()), None]),
                Row(vec![Some("2".into()), None, Some("audit".into())]),
            ]
        );
    }

    #[test]
    fn test_numeric_cells_are_renormalized() {
        let block = block(vec![
            ("n", "UInt32", vec![Some("007")]),
            ("severity", "Nullable(UInt8)", vec![Some(" 5 ")]),
            ("label", "Nullable(String)", vec![Some("x")]),
        ]);

        let decoded = decode_block(&schema(), &block);
        assert_eq!(
            decoded.rows,
            vec![Row(vec![Some("7".into()), Some("5".into()), Some("x".into())])]
        );
    }

    #[test]
    fn test_bad_record_is_skipped_not_fatal() {
        let block = block(vec![
            ("n", "UInt32", vec![Some("1"), Some("oops"), Some("3")]),
            ("severity", "Nullable(UInt8)", vec![None, None, None]),
            ("label", "Nullable(String)", vec![None, None, None]),
        ]);

        let decoded = decode_block(&schema(), &block);
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[1].0[0], Some("3".to_string()));
    }

    #[test]
    fn test_runtime_type_mismatch_fails_each_record() {
        // Database reports Int64 where UInt32 was declared: every record
        // in the block fails its shape check.
        let block = block(vec![
            ("n", "Int64", vec![Some("1"), Some("2")]),
            ("severity", "Nullable(UInt8)", vec![None, None]),
            ("label", "Nullable(String)", vec![None, None]),
        ]);

        let decoded = decode_block(&schema(), &block);
        assert!(decoded.rows.is_empty());
        assert_eq!(decoded.skipped, 2);
    }

    #[test]
    fn test_null_in_non_nullable_column_skips_record() {
        let block = block(vec![
            ("n", "UInt32", vec![None, Some("2")]),
            ("severity", "Nullable(UInt8)", vec![None, None]),
            ("label", "Nullable(String)", vec![None, None]),
        ]);

        let decoded = decode_block(&schema(), &block);
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.rows.len(), 1);
    }

    #[test]
    fn test_short_block_skips_all_records() {
        // Block carries fewer columns than the schema declares.
        let block = block(vec![("n", "UInt32", vec![Some("1")])]);
        let decoded = decode_block(&schema(), &block);
        assert!(decoded.rows.is_empty());
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_empty_block() {
        let decoded = decode_block(&schema(), &Block::default());
        assert!(decoded.rows.is_empty());
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let block = block(vec![
            ("n", "UInt32", vec![Some("1"), Some("1"), Some("1")]),
            ("severity", "Nullable(UInt8)", vec![None, None, None]),
            ("label", "Nullable(String)", vec![None, None, None]),
        ]);
        let decoded = decode_block(&schema(), &block);
        assert_eq!(decoded.rows.len(), 3);
        assert_eq!(decoded.rows[0], decoded.rows[2]);
    }
}
