// radar_core/src/engine.rs

use crate::config::{RadarConfig, RadarMode};
use crate::error::RadarConfigError;
use crate::messages::{ClusterReport, ObjectReport, RadarScan, ScanPayload};
use crate::perception::{classify, plan_beams, ClassifyContext, ClusterAggregator};
use crate::scene::{CollisionChannel, SceneQuery, SceneView, SweepRequest};
use crate::tracking::{ObjectTracker, TrackerParams};
use crate::types::{EntityHandle, Timestamp};
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use tracing::{debug, warn};

/// Slack on the period check so fixed-step hosts are not late by one step
/// when `n * dt` rounds just below the period.
const PERIOD_TOLERANCE_S: f64 = 1e-9;

/// What the host hands the engine every simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Simulation time, seconds.
    pub timestamp: Timestamp,
    /// Wall clock stamped on the scan, milliseconds since the Unix epoch.
    pub device_time_ms: u64,
    /// World pose of the sensor.
    pub sensor_pose: Isometry3<f64>,
    /// Owning vehicle velocity, world units per second.
    pub vehicle_velocity: Vector3<f64>,
    /// The vehicle the radar is mounted on; its own body never reflects.
    pub owner: Option<EntityHandle>,
}

impl TickInput {
    pub fn at(timestamp: Timestamp, sensor_pose: Isometry3<f64>) -> Self {
        Self {
            timestamp,
            device_time_ms: (timestamp * 1000.0).round().max(0.0) as u64,
            sensor_pose,
            vehicle_velocity: Vector3::zeros(),
            owner: None,
        }
    }
}

/// Counters of the most recent scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub beams: usize,
    pub raw_hits: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Accepted hits the tracker had no room for.
    pub dropped: usize,
}

/// One radar: beams in, scans out.
#[derive(Debug, Clone)]
pub struct RadarEngine {
    config: RadarConfig,
    status: Result<(), RadarConfigError>,
    channel: CollisionChannel,
    clusters: ClusterAggregator,
    tracker: ObjectTracker,
    last_scan_time: Option<Timestamp>,
    measurement_counter: u16,
    stats: ScanStats,
}

impl RadarEngine {
    /// Builds an engine. An invalid configuration is reported once here and
    /// the engine then produces empty scans.
    pub fn new(config: RadarConfig) -> Self {
        let status = config.validate();
        if let Err(e) = &status {
            warn!(device_id = config.device_id, "radar configuration is unusable: {e}");
        }
        let tracker = ObjectTracker::new(TrackerParams {
            max_objects: config.max_objects,
            probability_counter_max: config.probability_counter_max,
            min_box_size: config.min_box_size_m * config.units_per_meter,
        });
        Self {
            config,
            status,
            channel: CollisionChannel::default(),
            clusters: ClusterAggregator::new(),
            tracker,
            last_scan_time: None,
            measurement_counter: 0,
            stats: ScanStats::default(),
        }
    }

    pub fn with_channel(mut self, channel: CollisionChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn status(&self) -> Result<(), &RadarConfigError> {
        self.status.as_ref().map(|_| ())
    }

    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    pub fn clusters(&self) -> &ClusterAggregator {
        &self.clusters
    }

    pub fn last_stats(&self) -> ScanStats {
        self.stats
    }

    pub fn measurement_counter(&self) -> u16 {
        self.measurement_counter
    }

    /// Forgets every track and restarts period gating.
    pub fn reset(&mut self) {
        self.clusters.reset();
        self.tracker.clear();
        self.last_scan_time = None;
        self.stats = ScanStats::default();
    }

    fn due(&self, timestamp: Timestamp) -> bool {
        match self.last_scan_time {
            Some(last) => timestamp - last + PERIOD_TOLERANCE_S >= self.config.period_s,
            None => true,
        }
    }

    /// Runs one scan if the period has elapsed since the previous one.
    pub fn tick<S>(&mut self, input: &TickInput, scene: &S) -> Option<RadarScan>
    where
        S: SceneQuery + SceneView + ?Sized,
    {
        if !self.due(input.timestamp) {
            return None;
        }
        self.last_scan_time = Some(input.timestamp);
        self.measurement_counter = self.measurement_counter.wrapping_add(1);
        self.stats = ScanStats::default();

        match self.config.mode {
            RadarMode::Cluster => self.clusters.reset(),
            RadarMode::Object => self.tracker.reset_scan(),
        }

        if self.status.is_ok() {
            self.sweep_and_classify(input, scene);
            if self.config.mode == RadarMode::Object {
                self.tracker
                    .finish_scan(scene, &input.sensor_pose, input.timestamp);
            }
        }

        debug!(
            device_id = self.config.device_id,
            counter = self.measurement_counter,
            beams = self.stats.beams,
            raw = self.stats.raw_hits,
            accepted = self.stats.accepted,
            "scan finished"
        );
        Some(self.assemble(input))
    }

    fn sweep_and_classify<S>(&mut self, input: &TickInput, scene: &S)
    where
        S: SceneQuery + SceneView + ?Sized,
    {
        let config = &self.config;
        for params in config.enabled_beams() {
            let plan = plan_beams(&input.sensor_pose, params, config.units_per_meter);
            if plan.is_empty() {
                continue;
            }
            let (starts, ends) = (plan.starts(), plan.ends());
            let results = scene.sweep(&SweepRequest {
                shape: plan.shape(),
                rotation: UnitQuaternion::identity(),
                starts: &starts,
                ends: &ends,
                channel: self.channel,
                ignore: input.owner,
            });
            if results.len() != plan.len() {
                warn!(
                    beam_set = %params.tag,
                    expected = plan.len(),
                    got = results.len(),
                    "sweep returned a mismatched result count"
                );
            }
            self.stats.beams += plan.len();

            let ctx = ClassifyContext {
                sensor_pose: &input.sensor_pose,
                vehicle_velocity: input.vehicle_velocity,
                beams: params,
                catalog: &config.reflectivity,
                mode: config.mode,
                object_rcs_multiplier: config.object_mode_rcs_multiplier,
                units_per_meter: config.units_per_meter,
            };

            for (segment, hits) in plan.segments.iter().zip(results.iter()) {
                for raw in hits {
                    self.stats.raw_hits += 1;
                    match classify(raw, segment.index, &ctx, scene) {
                        Ok(hit) => {
                            self.stats.accepted += 1;
                            match config.mode {
                                RadarMode::Cluster => self.clusters.add_hit(&hit),
                                RadarMode::Object => {
                                    if !self.tracker.add_hit(&hit, input.timestamp) {
                                        self.stats.dropped += 1;
                                    }
                                }
                            }
                        }
                        Err(reason) => {
                            self.stats.rejected += 1;
                            if config.debug_log {
                                debug!(
                                    beam_set = %params.tag,
                                    beam = segment.index,
                                    "hit rejected: {reason}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    fn assemble(&self, input: &TickInput) -> RadarScan {
        let upm = self.config.units_per_meter;
        let payload = match self.config.mode {
            RadarMode::Cluster => ScanPayload::Clusters(
                self.clusters
                    .clusters()
                    .iter()
                    .map(|c| ClusterReport::from_cluster(c, upm))
                    .collect(),
            ),
            RadarMode::Object => ScanPayload::Objects(
                self.tracker
                    .objects()
                    .into_iter()
                    .map(|o| ObjectReport::from_object(o, upm))
                    .collect(),
            ),
        };
        RadarScan {
            device_id: self.config.device_id,
            device_timestamp_ms: input.device_time_ms,
            measurement_counter: self.measurement_counter,
            sim_time: input.timestamp,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReflectivityCatalog;
    use crate::labels::{SemanticLabel, TaggedSurface};
    use crate::scene::{MemoryScene, SceneEntity};

    fn scene_with_car() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.spawn(
            SceneEntity::new("car", Isometry3::translation(20.0, 0.0, 0.0), Vector3::repeat(1.0))
                .with_surface(TaggedSurface::RigidMesh {
                    label: Some(SemanticLabel::Vehicles),
                }),
        );
        scene
    }

    #[test]
    fn period_gates_scans_and_counts_them() {
        let scene = scene_with_car();
        let mut engine = RadarEngine::new(RadarConfig::default());
        let pose = Isometry3::identity();

        assert!(engine.tick(&TickInput::at(0.0, pose), &scene).is_some());
        assert!(engine.tick(&TickInput::at(0.05, pose), &scene).is_none());
        let scan = engine.tick(&TickInput::at(0.07, pose), &scene).unwrap();
        assert_eq!(scan.measurement_counter, 2);
        assert_eq!(scan.device_timestamp_ms, 70);
    }

    #[test]
    fn fixed_steps_scan_on_every_period() {
        let scene = scene_with_car();
        let mut engine = RadarEngine::new(RadarConfig::default());
        let pose = Isometry3::identity();

        let scan_steps: Vec<u32> = (0..30)
            .filter(|&step| {
                engine
                    .tick(&TickInput::at(step as f64 * 0.01, pose), &scene)
                    .is_some()
            })
            .collect();
        assert_eq!(scan_steps, vec![0, 7, 14, 21, 28]);
    }

    #[test]
    fn rejections_are_counted_whether_or_not_logged() {
        let mut scene = scene_with_car();
        scene.spawn(
            SceneEntity::new("tree", Isometry3::translation(10.0, 5.0, 0.0), Vector3::repeat(0.5))
                .with_surface(TaggedSurface::RigidMesh {
                    label: Some(SemanticLabel::Terrain),
                }),
        );
        let stats = |debug_log| {
            let mut engine = RadarEngine::new(RadarConfig {
                debug_log,
                ..Default::default()
            });
            engine.tick(&TickInput::at(0.0, Isometry3::identity()), &scene);
            engine.last_stats()
        };

        let quiet = stats(false);
        let verbose = stats(true);
        assert!(quiet.rejected > 0);
        assert_eq!(quiet, verbose);
        assert_eq!(quiet.raw_hits, quiet.accepted + quiet.rejected);
    }

    #[test]
    fn measurement_counter_wraps() {
        let scene = MemoryScene::new();
        let mut engine = RadarEngine::new(RadarConfig {
            period_s: 0.0,
            ..Default::default()
        });
        engine.measurement_counter = u16::MAX;
        let scan = engine
            .tick(&TickInput::at(0.0, Isometry3::identity()), &scene)
            .unwrap();
        assert_eq!(scan.measurement_counter, 0);
    }

    #[test]
    fn invalid_config_yields_empty_scans() {
        let scene = scene_with_car();
        let mut engine = RadarEngine::new(RadarConfig {
            reflectivity: ReflectivityCatalog::empty(),
            ..Default::default()
        });
        assert!(engine.status().is_err());

        let scan = engine
            .tick(&TickInput::at(0.0, Isometry3::identity()), &scene)
            .unwrap();
        assert!(scan.payload.is_empty());
        assert_eq!(engine.last_stats(), ScanStats::default());
    }

    #[test]
    fn object_mode_tracks_the_car() {
        let scene = scene_with_car();
        let mut engine = RadarEngine::new(RadarConfig::default());
        let scan = engine
            .tick(&TickInput::at(0.0, Isometry3::identity()), &scene)
            .unwrap();

        let objects = scan.objects().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].label, SemanticLabel::Vehicles);
        assert!(engine.last_stats().accepted > 1);
    }
}
