//! Spirit Rings - mixed-reality ring-pairing minigame core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ring pairing, spirit spawning, difficulty, game state)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, XR input, audio and network replication live in the host
//! application; this crate only consumes hand poses and emits events.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::{Mat3, Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (72 Hz, the native refresh of the target headset)
    pub const SIM_DT: f32 = 1.0 / 72.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance threshold for ring contact points (meters)
    pub const PAIR_DISTANCE_THRESHOLD: f32 = 0.1;

    /// Stamina pool defaults
    pub const STAMINA_MAX: f32 = 100.0;
    pub const STAMINA_DRAIN_PER_SEC: f32 = 10.0;
    pub const STAMINA_PER_CAPTURE: f32 = 20.0;
}

/// Linear interpolation between `a` and `b` by `t` in [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Triangle wave: rises from 0 to `length`, falls back to 0, period `2 * length`
#[inline]
pub fn ping_pong(t: f32, length: f32) -> f32 {
    let m = t.rem_euclid(2.0 * length);
    length - (m - length).abs()
}

/// Rotation whose local +Z points along `forward` with `up` as the up hint.
///
/// Returns `None` when the inputs are degenerate (zero length or collinear),
/// in which case callers keep the previous rotation.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z = forward.try_normalize()?;
    let x = up.cross(z).try_normalize()?;
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)))
}
