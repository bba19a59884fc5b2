use crate::client::DatabaseClient;
use crate::config::DatastoreConfig;
use crate::duck::DuckDbClient;
use crate::error::DatastoreError;

use diagnostics::*;
use std::collections::BTreeMap;

/// A named database connection handle.
pub struct Datastore {
    config: DatastoreConfig,
    client: Box<dyn DatabaseClient>,
}

impl Datastore {
    pub fn new(config: DatastoreConfig, client: Box<dyn DatabaseClient>) -> Self {
        Self { config, client }
    }

    pub fn open(config: DatastoreConfig) -> Result<Self, DatastoreError> {
        let client = DuckDbClient::open(&config)?;
        Ok(Self::new(config, Box::new(client)))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn client(&self) -> &dyn DatabaseClient {
        self.client.as_ref()
    }

    pub fn strips_block_comments(&self) -> bool {
        self.config.strip_block_comments
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Datastores available to commands, looked up by name.
#[derive(Debug, Default)]
pub struct DatastoreRegistry {
    stores: BTreeMap<String, Datastore>,
}

impl DatastoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens every configured datastore.
    pub fn open_all(configs: Vec<DatastoreConfig>) -> Result<Self, DatastoreError> {
        let mut registry = Self::new();
        for config in configs {
            let name = config.name.clone();
            registry.insert(Datastore::open(config)?)?;
            info!("Opened datastore {name}", name: name.as_str());
        }
        Ok(registry)
    }

    pub fn insert(&mut self, store: Datastore) -> Result<(), DatastoreError> {
        if self.find(store.name()).is_some() {
            return Err(DatastoreError::Duplicate {
                name: store.name().to_string(),
            });
        }
        _ = self.stores.insert(store.name().to_string(), store);
        Ok(())
    }

    /// Finds a datastore by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Result<&Datastore, DatastoreError> {
        self.find(name).ok_or_else(|| DatastoreError::not_found(name))
    }

    fn find(&self, name: &str) -> Option<&Datastore> {
        self.stores.get(name).or_else(|| {
            self.stores
                .values()
                .find(|ds| ds.name().eq_ignore_ascii_case(name))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() -> Result<(), DatastoreError> {
        let registry = DatastoreRegistry::open_all(vec![DatastoreConfig::in_memory("Hydro")])?;
        assert_eq!(registry.lookup("hydro")?.name(), "Hydro");
        assert_eq!(registry.lookup("Hydro")?.name(), "Hydro");
        assert!(matches!(
            registry.lookup("other"),
            Err(DatastoreError::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = DatastoreRegistry::open_all(vec![
            DatastoreConfig::in_memory("a"),
            DatastoreConfig::in_memory("A"),
        ]);
        assert!(matches!(result, Err(DatastoreError::Duplicate { .. })));
    }
}
