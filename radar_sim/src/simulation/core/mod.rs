// radar_sim/src/simulation/core/mod.rs

pub mod error;
pub mod logging;
pub mod prng;

pub use error::ScenarioError;
pub use logging::init_logging;
pub use prng::SimulationRng;
