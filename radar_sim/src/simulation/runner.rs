// radar_sim/src/simulation/runner.rs

//! Fixed-step driver: moves the world and ticks every mounted radar.

use crate::simulation::config::Scenario;
use crate::simulation::core::SimulationRng;
use crate::simulation::world::TargetWorld;
use nalgebra::Isometry3;
use radar_core::engine::{RadarEngine, ScanStats, TickInput};
use radar_core::messages::{RadarScan, ScanPayload};
use radar_core::snapshot::ScanSnapshot;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// A radar bolted to the ego vehicle.
#[derive(Debug)]
pub struct RadarUnit {
    name: String,
    mount: Isometry3<f64>,
    engine: RadarEngine,
    snapshot: ScanSnapshot,
}

impl RadarUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pose of the sensor relative to the ego body.
    pub fn mount(&self) -> &Isometry3<f64> {
        &self.mount
    }

    pub fn engine(&self) -> &RadarEngine {
        &self.engine
    }

    /// A handle on the latest scan, shareable with reader threads.
    pub fn snapshot(&self) -> ScanSnapshot {
        self.snapshot.clone()
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub sim_time: f64,
    /// Scans published per radar name.
    pub scans: BTreeMap<String, u64>,
}

pub struct SimulationRunner {
    world: TargetWorld,
    radars: Vec<RadarUnit>,
    rng: SimulationRng,
    time: f64,
    dt: f64,
    step: u64,
    planned_steps: u64,
}

impl SimulationRunner {
    pub fn new(scenario: &Scenario) -> Self {
        let world = TargetWorld::new(&scenario.ego, &scenario.targets);
        let radars = scenario
            .radars
            .iter()
            .map(|mount| RadarUnit {
                name: mount.name.clone(),
                mount: mount.mount.to_isometry(),
                engine: RadarEngine::new(mount.radar.clone()),
                snapshot: ScanSnapshot::new(),
            })
            .collect::<Vec<_>>();
        info!(
            "Simulation ready: {} radar(s), {} target(s), dt = {:.4} s",
            radars.len(),
            scenario.targets.len(),
            scenario.simulation.dt()
        );

        Self {
            world,
            radars,
            rng: SimulationRng::new(scenario.simulation.seed),
            time: 0.0,
            dt: scenario.simulation.dt(),
            step: 0,
            planned_steps: scenario.simulation.planned_steps(),
        }
    }

    pub fn world(&self) -> &TargetWorld {
        &self.world
    }

    pub fn radars(&self) -> &[RadarUnit] {
        &self.radars
    }

    pub fn radar(&self, name: &str) -> Option<&RadarUnit> {
        self.radars.iter().find(|r| r.name == name)
    }

    pub fn snapshot(&self, name: &str) -> Option<ScanSnapshot> {
        self.radar(name).map(RadarUnit::snapshot)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps_taken(&self) -> u64 {
        self.step
    }

    pub fn planned_steps(&self) -> u64 {
        self.planned_steps
    }

    /// Ticks every radar against the current world, then advances the world
    /// by one step. Returns the number of scans completed.
    pub fn step(&mut self) -> usize {
        let ego_pose = self.world.ego_pose();
        let ego_velocity = self.world.ego_velocity();
        let owner = Some(self.world.ego());
        let device_time_ms = wall_clock_ms().unwrap_or((self.time * 1000.0) as u64);

        let mut completed = 0;
        for radar in &mut self.radars {
            let input = TickInput {
                timestamp: self.time,
                device_time_ms,
                sensor_pose: ego_pose * radar.mount,
                vehicle_velocity: ego_velocity,
                owner,
            };
            let Some(scan) = radar.engine.tick(&input, self.world.scene()) else {
                continue;
            };
            log_scan(&radar.name, &scan, radar.engine.last_stats());
            radar.snapshot.publish(scan);
            completed += 1;
        }

        self.world.advance(self.time, self.dt, &mut self.rng);
        self.step += 1;
        self.time = self.step as f64 * self.dt;
        completed
    }

    /// Runs `steps` steps, or the scenario's planned duration when `None`.
    pub fn run(&mut self, steps: Option<u64>) -> RunSummary {
        let steps = steps.unwrap_or(self.planned_steps);
        info!("Running {} step(s)", steps);
        for _ in 0..steps {
            self.step();
        }

        let summary = RunSummary {
            steps: self.step,
            sim_time: self.time,
            scans: self
                .radars
                .iter()
                .map(|r| (r.name.clone(), r.snapshot.published()))
                .collect(),
        };
        for (name, count) in &summary.scans {
            info!("Radar '{}' published {} scan(s)", name, count);
        }
        summary
    }
}

fn wall_clock_ms() -> Option<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(elapsed.as_millis()).ok()
}

fn log_scan(name: &str, scan: &RadarScan, stats: ScanStats) {
    let (kind, count) = match &scan.payload {
        ScanPayload::Clusters(c) => ("clusters", c.len()),
        ScanPayload::Objects(o) => ("objects", o.len()),
    };
    info!(
        radar = name,
        counter = scan.measurement_counter,
        beams = stats.beams,
        raw_hits = stats.raw_hits,
        rejected = stats.rejected,
        dropped = stats.dropped,
        "scan at t = {:.3} s: {} {}",
        scan.sim_time,
        count,
        kind
    );
}
