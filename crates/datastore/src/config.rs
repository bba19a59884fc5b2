use crate::error::DatastoreError;

use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// One named datastore, as declared in the datastores YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Database file; in-memory when absent. Relative paths are resolved
    /// against the directory of the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub read_only: bool,

    /// Remove `/* */` comments from literal SQL before it is sent.
    #[serde(default)]
    pub strip_block_comments: bool,

    /// SQL run once when the datastore is opened.
    #[serde(default)]
    pub init_sql: Option<String>,
}

impl DatastoreConfig {
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            path: None,
            read_only: false,
            strip_block_comments: false,
            init_sql: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoresFile {
    pub datastores: Vec<DatastoreConfig>,
}

pub fn parse_config(text: &str, path: &Path) -> Result<Vec<DatastoreConfig>, DatastoreError> {
    let file: DatastoresFile =
        serde_yaml_ng::from_str(text).map_err(|source| DatastoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(file
        .datastores
        .into_iter()
        .map(|mut ds| {
            if let Some(p) = &ds.path {
                if p.is_relative() {
                    ds.path = Some(base.join(p));
                }
            }
            ds
        })
        .collect())
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Vec<DatastoreConfig>, DatastoreError> {
    let path = path.as_ref();
    let text = read_to_string(path).map_err(|source| DatastoreError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
datastores:
  - name: hydro
    path: data/hydro.duckdb
    readOnly: true
  - name: scratch
    stripBlockComments: true
    initSql: "CREATE TABLE t (a INTEGER);"
"#;
        let configs = parse_config(yaml, Path::new("/etc/tsql/datastores.yaml"))
            .expect("valid config");
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "hydro");
        assert_eq!(
            configs[0].path.as_deref(),
            Some(Path::new("/etc/tsql/data/hydro.duckdb"))
        );
        assert!(configs[0].read_only);
        assert!(!configs[0].strip_block_comments);
        assert!(configs[1].path.is_none());
        assert!(configs[1].strip_block_comments);
        assert!(configs[1].init_sql.is_some());
    }

    #[test]
    fn test_parse_config_error() {
        let err = parse_config("datastores: 7", Path::new("x.yaml")).expect_err("should fail");
        assert!(matches!(err, DatastoreError::ConfigParse { .. }));
    }
}
