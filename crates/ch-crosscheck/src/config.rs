//! Configuration loading and validation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ClickHouse connection configuration.
    pub clickhouse: ClickHouseConfig,

    /// Reference schemas declared in the config file, merged over the
    /// compiled-in set. Each entry is an ordered column list.
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<ColumnDef>>,

    /// Rows per block delivered during a full table scan.
    #[serde(default = "default_scan_block_rows")]
    pub scan_block_rows: usize,
}

/// ClickHouse connection parameters (HTTP interface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    /// Database host.
    pub host: String,

    /// HTTP interface port (default: 8123).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username (default: "default").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database name (default: "default").
    #[serde(default = "default_database")]
    pub database: String,

    /// Connect over HTTPS.
    #[serde(default)]
    pub tls: bool,
}

impl ClickHouseConfig {
    /// Base URL for the HTTP interface.
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// One column of a config-declared reference schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// ClickHouse type name (e.g. "UInt32", "Nullable(String)").
    pub r#type: String,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.clickhouse.host.is_empty() {
            return Err(Error::Config("clickhouse.host is required".into()));
        }
        if self.scan_block_rows == 0 {
            return Err(Error::Config("scan_block_rows must be at least 1".into()));
        }
        for (table, columns) in &self.tables {
            if columns.is_empty() {
                return Err(Error::Config(format!(
                    "tables.{} declares no columns",
                    table
                )));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            clickhouse: ClickHouseConfig {
                host: "localhost".to_string(),
                port: default_port(),
                user: default_user(),
                password: String::new(),
                database: default_database(),
                tls: false,
            },
            tables: BTreeMap::new(),
            scan_block_rows: default_scan_block_rows(),
        }
    }
}

fn default_port() -> u16 {
    8123
}

fn default_user() -> String {
    "default".to_string()
}

fn default_database() -> String {
    "default".to_string()
}

fn default_scan_block_rows() -> usize {
    8192
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_gets_defaults() {
        let config = Config::from_yaml("clickhouse:\n  host: ch.example.org\n").unwrap();
        assert_eq!(config.clickhouse.host, "ch.example.org");
        assert_eq!(config.clickhouse.port, 8123);
        assert_eq!(config.clickhouse.user, "default");
        assert_eq!(config.clickhouse.database, "default");
        assert!(!config.clickhouse.tls);
        assert_eq!(config.scan_block_rows, 8192);
        assert!(config.tables.is_empty());
        assert_eq!(config.clickhouse.base_url(), "http://ch.example.org:8123");
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
clickhouse:
  host: ch.internal
  port: 8443
  user: auditor
  password: secret
  database: audit
  tls: true
scan_block_rows: 1024
tables:
  t_events:
    - name: dt
      type: DateTime64(3)
    - name: n
      type: UInt32
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.clickhouse.base_url(), "https://ch.internal:8443");
        assert_eq!(config.scan_block_rows, 1024);
        assert_eq!(config.tables["t_events"].len(), 2);
        assert_eq!(config.tables["t_events"][1].r#type, "UInt32");
    }

    #[test]
    fn test_empty_host_rejected() {
        let err = Config::from_yaml("clickhouse:\n  host: \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_block_rows_rejected() {
        let yaml = "clickhouse:\n  host: x\nscan_block_rows: 0\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_table_declaration_rejected() {
        let yaml = "clickhouse:\n  host: x\ntables:\n  t_bad: []\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(file, "clickhouse:\n  host: filehost\n").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.clickhouse.host, "filehost");
    }
}
