// radar_sim/src/prelude.rs

// Re-export the radar_core prelude so binaries get the engine types too.
pub use radar_core::prelude::*;

// Simulation-side types.
pub use crate::cli::Cli;
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{load_catalog, load_scenario, PrefabCatalog};
pub use crate::simulation::core::{init_logging, ScenarioError, SimulationRng};
pub use crate::simulation::runner::{RadarUnit, RunSummary, SimulationRunner};
pub use crate::simulation::world::TargetWorld;
