// radar_sim/src/simulation/config/catalog.rs

//! The prefab catalog: every TOML file under a directory, keyed by its
//! dotted relative path.

use crate::simulation::core::ScenarioError;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Raw prefab data. The key is a namespace string such as `radars.generic`.
#[derive(Debug, Clone, Default)]
pub struct PrefabCatalog(pub HashMap<String, Value>);

impl PrefabCatalog {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Walks `catalog_path` and parses every `.toml` file it contains.
///
/// A missing directory gives an empty catalog. A file that fails to parse is
/// logged and skipped.
pub fn load_catalog(catalog_path: &Path) -> Result<PrefabCatalog, ScenarioError> {
    let mut catalog = PrefabCatalog::default();
    if !catalog_path.exists() {
        warn!(
            "Catalog directory not found at {:?}, no prefabs will be loaded.",
            catalog_path
        );
        return Ok(catalog);
    }

    info!("Loading prefab catalog from: {:?}", catalog_path);

    for entry in WalkDir::new(catalog_path).sort_by_file_name() {
        let entry = entry.map_err(|source| ScenarioError::CatalogWalk {
            path: catalog_path.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_dir() || path.extension().map_or(true, |ext| ext != "toml") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(catalog_path) else {
            continue;
        };
        let key = relative
            .with_extension("")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, ".");

        match Figment::new().merge(Toml::file(path)).extract::<Value>() {
            Ok(data) => {
                debug!("Loaded catalog item: '{}'", key);
                catalog.0.insert(key, data);
            }
            Err(e) => {
                error!("Failed to load catalog item from {:?}: {}", path, e);
            }
        }
    }

    info!("Prefab catalog holds {} item(s).", catalog.len());
    Ok(catalog)
}
