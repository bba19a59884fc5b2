use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use datastore::{DatastoreRegistry, load_config};
use diagnostics::*;

/// Environment variable naming the datastores file when `--datastores` is not given.
pub const DATASTORES_ENV: &str = "TSQL_DATASTORES";

/// How query results are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width columns
    #[default]
    Table,
    /// The table as JSON
    Json,
    /// Row count only
    Count,
}

/// Get the datastores file path, falling back to the TSQL_DATASTORES environment variable
pub fn get_datastores_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    env::var(DATASTORES_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("no datastores file: use --datastores or set {DATASTORES_ENV}"))
}

/// Load the datastores file and open every datastore it lists.
pub fn open_datastores(override_path: Option<PathBuf>) -> Result<DatastoreRegistry> {
    let path = get_datastores_path_with_override(override_path)?;
    let shown = path.display().to_string();
    debug!("Loading datastores from {path}", path: shown.as_str());

    let configs = load_config(&path)
        .with_context(|| format!("Failed to load datastores from {}", path.display()))?;
    DatastoreRegistry::open_all(configs).context("Failed to open datastores")
}

/// Parse `key=value` for clap.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn to_map(pairs: &[(String, String)]) -> BTreeMap<String, String> {
    pairs.iter().cloned().collect()
}
