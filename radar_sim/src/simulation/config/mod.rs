// radar_sim/src/simulation/config/mod.rs

//! Loading, resolving and validating scenario configuration, including the
//! prefab catalog system.

mod catalog;
mod resolver;

pub mod structs;

use crate::simulation::core::ScenarioError;
use figment::{
    providers::{Env, Format, Toml},
    value::Value,
    Figment,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

pub use catalog::{load_catalog, PrefabCatalog};
pub use resolver::resolve_value;
pub use structs::{EgoConfig, Pose, RadarMount, Scenario, ScenarioFile, Simulation, TargetConfig};

/// Prefix of environment variables that override scenario values, e.g.
/// `RADAR_SIM_SIMULATION__SEED=7`.
pub const ENV_PREFIX: &str = "RADAR_SIM_";

/// Loads the scenario at `path`, applies environment overrides and resolves
/// it against `catalog`.
pub fn load_scenario(path: &Path, catalog: &PrefabCatalog) -> Result<Scenario, ScenarioError> {
    info!("Loading scenario from: {:?}", path);
    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let file: ScenarioFile = figment.extract().map_err(|e| ScenarioError::Load {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    resolve_scenario(file, catalog)
}

/// Types a raw scenario: every radar and target is resolved against the
/// catalog, then checked.
pub fn resolve_scenario(
    file: ScenarioFile,
    catalog: &PrefabCatalog,
) -> Result<Scenario, ScenarioError> {
    let simulation = file.simulation;
    if !(simulation.step_rate_hz > 0.0) {
        return Err(ScenarioError::InvalidSimulation(format!(
            "step_rate_hz must be positive, got {}",
            simulation.step_rate_hz
        )));
    }
    if !(simulation.units_per_meter > 0.0) {
        return Err(ScenarioError::InvalidSimulation(format!(
            "units_per_meter must be positive, got {}",
            simulation.units_per_meter
        )));
    }

    let mut radars = file
        .radars
        .iter()
        .enumerate()
        .map(|(i, raw)| resolve_typed::<RadarMount>(raw, catalog, &format!("radar #{i}")))
        .collect::<Result<Vec<_>, _>>()?;
    for mount in &mut radars {
        mount.radar.units_per_meter = simulation.units_per_meter;
        mount
            .radar
            .validate()
            .map_err(|source| ScenarioError::InvalidRadar {
                name: mount.name.clone(),
                source,
            })?;
        info!(
            "Resolved radar '{}' ({:?} mode, {} beam set(s))",
            mount.name,
            mount.radar.mode,
            mount.radar.beams.len()
        );
    }

    let targets = file
        .targets
        .iter()
        .enumerate()
        .map(|(i, raw)| resolve_typed::<TargetConfig>(raw, catalog, &format!("target #{i}")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scenario {
        simulation,
        ego: file.ego,
        radars,
        targets,
    })
}

fn resolve_typed<T: DeserializeOwned>(
    raw: &Value,
    catalog: &PrefabCatalog,
    what: &str,
) -> Result<T, ScenarioError> {
    let resolved = resolve_value(raw, catalog)?;
    resolved
        .deserialize::<T>()
        .map_err(|e| ScenarioError::Deserialize {
            what: what.to_string(),
            source: Box::new(e),
        })
}

impl Scenario {
    /// The scenario with every prefab expanded, as TOML.
    pub fn to_toml(&self) -> Result<String, ScenarioError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use radar_core::config::RadarMode;
    use radar_core::labels::{SemanticLabel, SurfaceKind};

    fn parse_file(toml: &str) -> ScenarioFile {
        Figment::new().merge(Toml::string(toml)).extract().unwrap()
    }

    fn catalog() -> PrefabCatalog {
        let mut catalog = PrefabCatalog::default();
        catalog.0.insert(
            "radars.generic".into(),
            Figment::new()
                .merge(Toml::string(
                    r#"
                    [radar]
                    device_id = 3
                    mode = "Object"
                    "#,
                ))
                .extract()
                .unwrap(),
        );
        catalog
    }

    const SCENARIO: &str = r#"
        [simulation]
        seed = 7
        step_rate_hz = 50.0
        duration_seconds = 2.0
        units_per_meter = 100.0

        [ego]
        velocity = [1000.0, 0.0, 0.0]

        [[radars]]
        from = "radars.generic"
        name = "front"
        mount = { translation = [230.0, 0.0, 50.0] }
        radar = { mode = "Cluster" }

        [[targets]]
        name = "lead"
        label = "Vehicles"
        half_extents = [230.0, 100.0, 75.0]
        pose = { translation = [3000.0, 0.0, 75.0], rotation = [0.0, 0.0, 90.0] }
        velocity = [800.0, 0.0, 0.0]
        despawn_after_s = 1.5
    "#;

    #[test]
    fn scenario_resolves_prefabs_and_units() {
        let scenario = resolve_scenario(parse_file(SCENARIO), &catalog()).unwrap();

        assert_eq!(scenario.simulation.seed, Some(7));
        assert_eq!(scenario.simulation.planned_steps(), 100);
        assert_abs_diff_eq!(scenario.simulation.dt(), 0.02, epsilon = 1e-12);

        let radar = &scenario.radars[0];
        assert_eq!(radar.name, "front");
        assert_eq!(radar.radar.device_id, 3);
        assert_eq!(radar.radar.mode, RadarMode::Cluster);
        assert_abs_diff_eq!(radar.radar.units_per_meter, 100.0);
        assert_abs_diff_eq!(radar.mount.translation.z, 50.0);

        let target = &scenario.targets[0];
        assert_eq!(target.label, SemanticLabel::Vehicles);
        assert_eq!(target.surface, SurfaceKind::RigidMesh);
        assert!(target.blocking);
        assert_eq!(target.despawn_after_s, Some(1.5));
        let (_, _, yaw) = target.pose.rotation.euler_angles();
        assert_abs_diff_eq!(yaw.to_degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_radar_is_reported_by_name() {
        let file = parse_file(
            r#"
            [[radars]]
            name = "broken"
            radar = { reflectivity = {} }
            "#,
        );
        let err = resolve_scenario(file, &PrefabCatalog::default()).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidRadar { ref name, .. } if name == "broken"));
    }

    #[test]
    fn unknown_target_fields_are_rejected() {
        let file = parse_file(
            r#"
            [[targets]]
            name = "x"
            label = "Poles"
            half_extents = [0.1, 0.1, 2.0]
            colour = "red"
            "#,
        );
        assert!(matches!(
            resolve_scenario(file, &PrefabCatalog::default()),
            Err(ScenarioError::Deserialize { .. })
        ));
    }

    #[test]
    fn scenario_files_load_from_disk_with_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(&path, "[simulation]\nstep_rate_hz = 20.0\n").unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("RADAR_SIM_SIMULATION__SEED", "11");
            let scenario = load_scenario(&path, &PrefabCatalog::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(scenario.simulation.seed, Some(11));
            assert_abs_diff_eq!(scenario.simulation.step_rate_hz, 20.0);
            Ok(())
        });
    }

    #[test]
    fn resolved_scenario_renders_as_toml() {
        let scenario = resolve_scenario(parse_file(SCENARIO), &catalog()).unwrap();
        let rendered = scenario.to_toml().unwrap();
        assert!(rendered.contains("name = \"front\""));
        assert!(rendered.contains("Cluster"));
    }
}
