//! Reference schema registry.
//!
//! Maps a table name to its declared ordered column specification. The
//! compiled-in reference set and any config-declared tables merge into
//! one map behind a single `lookup` surface; callers never branch on
//! where a schema came from.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::schema::{ColumnSpec, Schema, TypeTag};

/// Registry of reference schemas, keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the compiled-in reference schemas.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "t_accessattributes",
            Schema::new(vec![
                ColumnSpec::new("datetime", TypeTag::DateTime64Milli),
                ColumnSpec::new("msgtype", TypeTag::UInt32),
                ColumnSpec::new("severity", TypeTag::NullableUInt8),
                ColumnSpec::new("ownerpermissions", TypeTag::NullableString),
                ColumnSpec::new("operationresult", TypeTag::NullableUInt8),
                ColumnSpec::new("actiontype", TypeTag::NullableUInt8),
                ColumnSpec::new("objectid", TypeTag::NullableString),
                ColumnSpec::new("grouppermissions", TypeTag::NullableString),
                ColumnSpec::new("classifyinglabel", TypeTag::NullableString),
            ]),
        );
        registry
    }

    /// Builtin schemas plus any tables declared in the configuration.
    /// Config-declared tables win on name collision.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::builtin();
        for (table, columns) in &config.tables {
            let schema = columns
                .iter()
                .map(|c| ColumnSpec::new(c.name.clone(), TypeTag::parse(&c.r#type)))
                .collect();
            registry.insert(table.clone(), schema);
        }
        registry
    }

    /// Register (or replace) a table's reference schema.
    pub fn insert(&mut self, table: impl Into<String>, schema: Schema) {
        self.tables.insert(table.into(), schema);
    }

    /// Look up the reference schema for a table.
    ///
    /// Returns a fresh copy per call; schemas are read once per
    /// operation, never cached across invocations.
    pub fn lookup(&self, table: &str) -> Result<Schema> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::SchemaNotFound(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnDef;

    #[test]
    fn test_builtin_access_attributes() {
        let registry = SchemaRegistry::builtin();
        let schema = registry.lookup("t_accessattributes").unwrap();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema.columns()[0].name, "datetime");
        assert_eq!(schema.columns()[0].type_tag, TypeTag::DateTime64Milli);
        assert_eq!(schema.columns()[1].type_tag, TypeTag::UInt32);
        assert_eq!(schema.columns()[8].name, "classifyinglabel");
    }

    #[test]
    fn test_lookup_unknown_table() {
        let registry = SchemaRegistry::builtin();
        let err = registry.lookup("t_missing").unwrap_err();
        assert!(matches!(err, Error::SchemaNotFound(t) if t == "t_missing"));
    }

    #[test]
    fn test_config_tables_override_builtin() {
        let mut config = Config::for_tests();
        config.tables.insert(
            "t_accessattributes".to_string(),
            vec![ColumnDef {
                name: "only".to_string(),
                r#type: "UInt32".to_string(),
            }],
        );
        config.tables.insert(
            "t_events".to_string(),
            vec![
                ColumnDef {
                    name: "dt".to_string(),
                    r#type: "DateTime64(3)".to_string(),
                },
                ColumnDef {
                    name: "payload".to_string(),
                    r#type: "Nullable(String)".to_string(),
                },
            ],
        );

        let registry = SchemaRegistry::from_config(&config);

        let overridden = registry.lookup("t_accessattributes").unwrap();
        assert_eq!(overridden.len(), 1);
        assert_eq!(overridden.columns()[0].name, "only");

        let events = registry.lookup("t_events").unwrap();
        assert_eq!(events.columns()[1].type_tag, TypeTag::NullableString);
    }
}
