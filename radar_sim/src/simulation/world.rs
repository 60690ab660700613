// radar_sim/src/simulation/world.rs

//! The moving world the radars look at: the ego vehicle plus scripted targets.

use crate::simulation::config::{EgoConfig, TargetConfig};
use crate::simulation::core::SimulationRng;
use nalgebra::{Isometry3, Vector3};
use radar_core::labels::{SemanticLabel, TaggedSurface};
use radar_core::scene::{MemoryScene, SceneEntity, SceneView};
use radar_core::types::EntityHandle;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct ActiveTarget {
    name: String,
    handle: EntityHandle,
    base_velocity: Vector3<f64>,
    jitter: Option<Normal<f64>>,
    despawn_at: Option<f64>,
}

/// Owns the scene and advances every body at constant velocity.
#[derive(Debug, Clone)]
pub struct TargetWorld {
    scene: MemoryScene,
    ego: EntityHandle,
    targets: Vec<ActiveTarget>,
}

impl TargetWorld {
    pub fn new(ego: &EgoConfig, targets: &[TargetConfig]) -> Self {
        let mut scene = MemoryScene::new();
        let ego_handle = scene.spawn(
            SceneEntity::new(&ego.name, ego.starting_pose.to_isometry(), ego.half_extents)
                .with_velocity(ego.velocity)
                .with_surface(TaggedSurface::RigidMesh {
                    label: Some(SemanticLabel::Vehicles),
                }),
        );
        info!("Spawned ego vehicle '{}' as {}", ego.name, ego_handle);

        let targets = targets
            .iter()
            .map(|config| {
                let handle = scene.spawn(
                    SceneEntity::new(&config.name, config.pose.to_isometry(), config.half_extents)
                        .with_velocity(config.velocity)
                        .with_surface(TaggedSurface::new(config.surface, Some(config.label)))
                        .with_blocking(config.blocking),
                );
                info!(
                    "Spawned target '{}' ({:?}) as {}",
                    config.name, config.label, handle
                );
                ActiveTarget {
                    name: config.name.clone(),
                    handle,
                    base_velocity: config.velocity,
                    jitter: (config.velocity_jitter_stddev > 0.0)
                        .then(|| Normal::new(0.0, config.velocity_jitter_stddev).ok())
                        .flatten(),
                    despawn_at: config.despawn_after_s,
                }
            })
            .collect();

        Self {
            scene,
            ego: ego_handle,
            targets,
        }
    }

    pub fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    pub fn ego(&self) -> EntityHandle {
        self.ego
    }

    pub fn ego_pose(&self) -> Isometry3<f64> {
        self.scene.entity_pose(self.ego).unwrap_or_else(Isometry3::identity)
    }

    pub fn ego_velocity(&self) -> Vector3<f64> {
        self.scene.entity_velocity(self.ego).unwrap_or_else(Vector3::zeros)
    }

    /// Handles of the targets still in the world.
    pub fn live_targets(&self) -> impl Iterator<Item = (&str, EntityHandle)> {
        self.targets.iter().map(|t| (t.name.as_str(), t.handle))
    }

    pub fn target(&self, name: &str) -> Option<EntityHandle> {
        self.targets.iter().find(|t| t.name == name).map(|t| t.handle)
    }

    /// Moves the world from `time` to `time + dt`.
    ///
    /// Targets whose despawn time has been reached are removed first. Jittered
    /// targets get fresh horizontal velocity noise every step.
    pub fn advance(&mut self, time: f64, dt: f64, rng: &mut SimulationRng) {
        let scene = &mut self.scene;
        self.targets.retain(|target| match target.despawn_at {
            Some(at) if time >= at => {
                scene.despawn(target.handle);
                info!("Target '{}' left the world at t = {:.3} s", target.name, time);
                false
            }
            _ => true,
        });

        for target in &self.targets {
            let Some(jitter) = target.jitter else {
                continue;
            };
            let noise = Vector3::new(jitter.sample(&mut rng.0), jitter.sample(&mut rng.0), 0.0);
            if let Some(entity) = self.scene.get_mut(target.handle) {
                entity.velocity = target.base_velocity + noise;
                debug!("Target '{}' velocity {:?}", target.name, entity.velocity);
            }
        }

        self.scene.advance(dt);
    }
}
