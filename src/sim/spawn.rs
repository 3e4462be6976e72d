//! Spirit spawn scheduler
//!
//! A fractional accumulator converts a spawns-per-second rate into discrete
//! throw events without drift, at any rate above or below one per tick. Each
//! throw picks a weighted archetype, samples a point inside the oriented
//! spawn volume and a direction inside a cone, and emits a [`SpawnRequest`]
//! the host consumes to instantiate a projectile.
//!
//! The rate and speed range are not constant; the difficulty ramp rewrites
//! them every tick.

use glam::{Quat, Vec3};
use log::warn;
use rand::Rng;

use super::hands::Pose;
use crate::tuning::ThrowerTuning;

/// Everything the host needs to instantiate one spirit projectile
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Index into the archetype catalog
    pub archetype: usize,
    pub position: Vec3,
    /// Unit travel direction
    pub direction: Vec3,
    /// Meters per second along `direction`
    pub speed: f32,
    /// Uniform visual scale
    pub scale: f32,
    /// Spin axis scaled by magnitude, radians per second
    pub angular_velocity: Vec3,
}

/// Oriented box spirits spawn inside
#[derive(Debug, Clone)]
pub struct SpawnVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub pose: Pose,
    pub scale: Vec3,
}

impl SpawnVolume {
    pub fn from_tuning(t: &ThrowerTuning) -> Self {
        Self {
            center: t.volume_center,
            half_extents: t.volume_half_extents,
            pose: Pose::new(t.volume_position, t.volume_rotation),
            scale: t.volume_scale,
        }
    }

    /// Uniform point inside the box, mapped through the volume's full
    /// transform so rotated and scaled volumes are respected.
    pub fn sample_point<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let e = self.half_extents;
        let local = self.center
            + Vec3::new(
                range_sample(rng, [-e.x, e.x]),
                range_sample(rng, [-e.y, e.y]),
                range_sample(rng, [-e.z, e.z]),
            );
        self.pose.transform_point(local * self.scale)
    }
}

/// Walk `weights` accumulating positive entries; first entry whose running
/// total reaches `draw` wins. `draw` must already be in `[0, sum]`.
///
/// A draw of exactly 0 lands on the first positive-weight entry.
pub fn pick_weighted_with_draw(weights: &[f32], draw: f32) -> Option<usize> {
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        acc += w;
        if draw <= acc {
            return Some(i);
        }
    }
    None
}

/// Weighted random selection. `None` when no entry has positive weight -
/// the caller skips the spawn rather than failing.
pub fn pick_weighted<R: Rng>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let sum: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if sum <= 0.0 {
        return None;
    }
    pick_weighted_with_draw(weights, rng.random_range(0.0..=sum))
}

/// Unit vector deviating from `forward` by an angle uniform in
/// `[0, half_angle_deg]`, rolled uniformly around `forward`'s axis.
/// Uniform in angle, not in solid angle. Non-positive half angles return
/// `forward` unchanged.
pub fn sample_cone_direction<R: Rng>(forward: Vec3, half_angle_deg: f32, rng: &mut R) -> Vec3 {
    if half_angle_deg <= 0.0 {
        return forward;
    }

    let deviation = rng.random_range(0.0..=half_angle_deg).to_radians();
    let roll = rng.random_range(0.0..360.0_f32).to_radians();

    // Up hint must not be collinear with the cone axis
    let up = if forward.normalize_or_zero().dot(Vec3::Y).abs() > 0.999 {
        Vec3::X
    } else {
        Vec3::Y
    };
    let Some(look) = crate::look_rotation(forward, up) else {
        return forward;
    };

    look * Quat::from_rotation_z(roll) * Quat::from_rotation_y(deviation) * Vec3::Z
}

/// Random unit axis via spherical coordinates (for projectile spin)
pub fn random_unit_axis<R: Rng>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let theta: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

#[inline]
fn range_sample<R: Rng>(rng: &mut R, range: [f32; 2]) -> f32 {
    if range[1] > range[0] {
        rng.random_range(range[0]..=range[1])
    } else {
        range[0]
    }
}

/// Time-driven throw scheduler. The difficulty controller owns
/// `spawns_per_second` and `speed_range` between ticks.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    accumulator: f32,
    pub spawns_per_second: f32,
    /// [min, max] projectile speed, meters per second
    pub speed_range: [f32; 2],
}

impl SpawnScheduler {
    pub fn new(spawns_per_second: f32, speed_range: [f32; 2]) -> Self {
        Self {
            accumulator: 0.0,
            spawns_per_second,
            speed_range,
        }
    }

    /// Queue an immediate throw on the next tick (the authority throws one
    /// spirit as soon as the session starts, before the timer has charged).
    pub fn prime(&mut self) {
        self.accumulator = self.accumulator.max(1.0);
    }

    /// Accumulate `rate * dt` and emit one request per whole unit.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f32,
        thrower: &ThrowerTuning,
        rng: &mut R,
    ) -> Vec<SpawnRequest> {
        let mut out = Vec::new();
        if self.spawns_per_second > 0.0 {
            self.accumulator += self.spawns_per_second * dt;
        }
        while self.accumulator >= 1.0 {
            self.accumulator -= 1.0;
            if let Some(request) = self.throw_one(thrower, rng) {
                out.push(request);
            }
        }
        out
    }

    /// Build one spawn request, or `None` when the catalog has no entry with
    /// positive weight (a degraded configuration, not an error).
    pub fn throw_one<R: Rng>(&self, thrower: &ThrowerTuning, rng: &mut R) -> Option<SpawnRequest> {
        let weights: Vec<f32> = thrower.archetypes.iter().map(|a| a.weight).collect();
        let Some(archetype) = pick_weighted(&weights, rng) else {
            warn!("spawn skipped: archetype catalog has no positive weight");
            return None;
        };

        let position = SpawnVolume::from_tuning(thrower).sample_point(rng);
        let direction =
            sample_cone_direction(thrower.throw_forward, thrower.cone_half_angle_deg, rng)
                .normalize_or_zero();
        let speed = range_sample(rng, self.speed_range);
        let scale = range_sample(rng, thrower.scale_range);

        let angular_velocity = if thrower.angular_vel_range_deg[1] > 0.0 {
            random_unit_axis(rng) * range_sample(rng, thrower.angular_vel_range_deg).to_radians()
        } else {
            Vec3::ZERO
        };

        Some(SpawnRequest {
            archetype,
            position,
            direction,
            speed,
            scale,
            angular_velocity,
        })
    }
}
