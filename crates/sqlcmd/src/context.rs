use crate::properties::{Properties, PropertyExpander};

use datastore::{DatastoreRegistry, ResultTable};
use diagnostics::*;
use std::path::{Path, PathBuf};

/// Tables produced by commands, in the order they were first stored.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Vec<ResultTable>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `table`, replacing any table with the same id in place.
    pub fn insert(&mut self, table: ResultTable) {
        match self.tables.iter_mut().find(|t| t.id() == table.id()) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ResultTable> {
        self.tables.iter().find(|t| t.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Everything commands read from and write to while a command list runs.
#[derive(Debug)]
pub struct ProcessorContext {
    pub datastores: DatastoreRegistry,
    pub properties: Properties,
    pub tables: TableRegistry,
    working_dir: PathBuf,
}

impl ProcessorContext {
    pub fn new(datastores: DatastoreRegistry, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            datastores,
            properties: Properties::new(),
            tables: TableRegistry::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Expands `${Name}` tokens, returning the names that had no value.
    pub fn expand(&self, text: &str) -> (String, Vec<String>) {
        let expanded = self.properties.expand(text);
        for name in &expanded.unresolved {
            debug!("No value for property {name}", name: name.as_str());
        }
        (expanded.text, expanded.unresolved)
    }

    /// Resolves a (possibly relative) path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}
