// radar_core/src/perception/classifier.rs

use crate::config::{BeamParams, RadarMode, ReflectivityCatalog};
use crate::error::HitRejection;
use crate::geometry::azimuth_deg;
use crate::labels::{resolve_label, SemanticLabel};
use crate::scene::{RawHit, SceneView};
use crate::types::EntityHandle;
use nalgebra::{Isometry3, Point3, Vector2, Vector3};

/// An accepted, classified beam intersection.
///
/// Points and distances are in world units; velocity is
/// `(longitudinal, lateral)` in m/s relative to the owning vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub world_point: Point3<f64>,
    /// Sensor-local impact point, flattened onto the sensor plane (z = 0).
    pub local_point: Point3<f64>,
    pub distance: f64,
    pub azimuth_deg: f64,
    /// Angular resolution of the beam set at this azimuth.
    pub resolution_deg: f64,
    pub beam_index: u32,
    pub label: SemanticLabel,
    pub rcs: f64,
    pub velocity: Vector2<f64>,
    pub entity: EntityHandle,
}

/// Everything classification needs besides the raw hit and the scene.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub sensor_pose: &'a Isometry3<f64>,
    /// Owning vehicle velocity, world units per second.
    pub vehicle_velocity: Vector3<f64>,
    pub beams: &'a BeamParams,
    pub catalog: &'a ReflectivityCatalog,
    pub mode: RadarMode,
    pub object_rcs_multiplier: f64,
    pub units_per_meter: f64,
}

/// Turns a raw sweep result into a [`Hit`], or says why it was dropped.
pub fn classify<S>(
    raw: &RawHit,
    beam_index: u32,
    ctx: &ClassifyContext<'_>,
    scene: &S,
) -> Result<Hit, HitRejection>
where
    S: SceneView + ?Sized,
{
    if raw.distance <= 0.0 {
        return Err(HitRejection::NonPositiveDistance(raw.distance));
    }

    let mut local_point = ctx.sensor_pose.inverse_transform_point(&raw.point);
    local_point.z = 0.0;

    let entity = raw.entity.ok_or(HitRejection::NoEntity)?;

    let azimuth = azimuth_deg(&local_point);
    let distance = local_point.coords.norm();
    let max_range = ctx.beams.distance_max_m * ctx.units_per_meter;
    if distance > max_range {
        return Err(HitRejection::OutOfRange {
            distance,
            max_range,
        });
    }

    let surfaces = scene
        .entity_surfaces(entity)
        .ok_or(HitRejection::StaleEntity(entity))?;
    let label = resolve_label(surfaces).ok_or(HitRejection::Unlabeled(entity))?;

    let reflectivity = ctx
        .catalog
        .get(label)
        .ok_or(HitRejection::NotCataloged(label))?;
    if reflectivity.rcs < ctx.beams.min_signal {
        return Err(HitRejection::WeakSignal {
            label,
            rcs: reflectivity.rcs,
            min_signal: ctx.beams.min_signal,
        });
    }

    let target_velocity = scene
        .entity_velocity(entity)
        .ok_or(HitRejection::StaleEntity(entity))?;
    let relative = (target_velocity - ctx.vehicle_velocity) / ctx.units_per_meter;
    let local_velocity = ctx.sensor_pose.rotation.inverse_transform_vector(&relative);

    let rcs = match ctx.mode {
        RadarMode::Object => reflectivity.rcs * ctx.object_rcs_multiplier,
        RadarMode::Cluster => reflectivity.rcs,
    };

    Ok(Hit {
        world_point: raw.point,
        local_point,
        distance,
        azimuth_deg: azimuth,
        resolution_deg: ctx.beams.resolution_for_angle(azimuth),
        beam_index,
        label,
        rcs,
        velocity: Vector2::new(local_velocity.x, local_velocity.y),
        entity,
    })
}
