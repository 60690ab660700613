// radar_sim/src/simulation/core/error.rs

use radar_core::RadarConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a scenario from loading or running.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to load scenario {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },
    #[error("failed to walk the prefab catalog at {path:?}: {source}")]
    CatalogWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("prefab '{0}' not found in catalog")]
    PrefabNotFound(String),
    #[error("prefab '{0}' must resolve to a table to be merged")]
    PrefabNotTable(String),
    #[error("prefab '{0}' refers back to itself")]
    PrefabCycle(String),
    #[error("invalid {what}: {source}")]
    Deserialize {
        what: String,
        #[source]
        source: Box<figment::Error>,
    },
    #[error("radar '{name}' is misconfigured: {source}")]
    InvalidRadar {
        name: String,
        #[source]
        source: RadarConfigError,
    },
    #[error("invalid simulation settings: {0}")]
    InvalidSimulation(String),
    #[error("failed to render the resolved scenario: {0}")]
    Render(#[from] toml::ser::Error),
}
