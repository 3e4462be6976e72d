//! Data-driven game balance
//!
//! Every gameplay scalar the designers iterate on lives here so a build can
//! load a JSON blob instead of recompiling. The sim takes a `Tuning` by
//! reference and never mutates it; difficulty-scaled values are copied into
//! the game state at startup and interpolated from there.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ring pairing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingTuning {
    /// Contact points must be within this distance (meters) for rings to snap together
    pub distance_threshold: f32,
    /// Local offsets of the two ring contact points (the physical ends of the half ring)
    pub contact_point_1: Vec3,
    pub contact_point_2: Vec3,
}

impl Default for PairingTuning {
    fn default() -> Self {
        Self {
            distance_threshold: PAIR_DISTANCE_THRESHOLD,
            contact_point_1: Vec3::new(-0.08, 0.0, 0.0),
            contact_point_2: Vec3::new(0.08, 0.0, 0.0),
        }
    }
}

/// How a half ring is mounted on a tracked hand.
///
/// The right hand uses these values directly; the left hand mirrors the X
/// offset, flips the latitude, and uses `180 - longitude` so the two rings
/// face each other when the palms meet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RingMountTuning {
    /// Local positional offset from the hand anchor (right-hand convention)
    pub offset: Vec3,
    /// Yaw around the local up axis, degrees
    pub longitude_deg: f32,
    /// Pitch around the local right axis, degrees
    pub latitude_deg: f32,
}

impl Default for RingMountTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.05, -0.02, 0.03),
            longitude_deg: 0.0,
            latitude_deg: 45.0,
        }
    }
}

/// One spawnable spirit archetype with its selection weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeEntry {
    /// Name the host application maps to a prefab/model
    pub name: String,
    /// Color a full ring must match to capture this spirit
    pub color: crate::sim::RingColor,
    /// Non-negative selection weight; zero disables the entry
    pub weight: f32,
}

/// Spirit thrower parameters (spawn volume, cone, speed, spin, size)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowerTuning {
    /// Spawn volume center in the volume's local space
    pub volume_center: Vec3,
    /// Spawn volume half extents in local space
    pub volume_half_extents: Vec3,
    /// Volume placement in the world
    pub volume_position: Vec3,
    /// Volume orientation (quaternion xyzw)
    pub volume_rotation: glam::Quat,
    /// Volume scale per local axis
    pub volume_scale: Vec3,
    /// Center direction spirits are thrown along
    pub throw_forward: Vec3,
    /// Half angle of the scatter cone, degrees (0 disables scatter)
    pub cone_half_angle_deg: f32,
    /// Uniform scale range [min, max] applied per spirit
    pub scale_range: [f32; 2],
    /// Random spin magnitude range [min, max], degrees per second
    pub angular_vel_range_deg: [f32; 2],
    /// Weighted archetype catalog
    pub archetypes: Vec<ArchetypeEntry>,
}

impl Default for ThrowerTuning {
    fn default() -> Self {
        use crate::sim::RingColor;
        Self {
            volume_center: Vec3::ZERO,
            volume_half_extents: Vec3::new(1.5, 0.5, 0.25),
            volume_position: Vec3::new(0.0, 1.6, 4.0),
            volume_rotation: glam::Quat::IDENTITY,
            volume_scale: Vec3::ONE,
            throw_forward: Vec3::NEG_Z,
            cone_half_angle_deg: 12.0,
            scale_range: [0.8, 1.2],
            angular_vel_range_deg: [0.0, 360.0],
            archetypes: vec![
                ArchetypeEntry {
                    name: "spirit_orange".into(),
                    color: RingColor::Orange,
                    weight: 1.0,
                },
                ArchetypeEntry {
                    name: "spirit_green".into(),
                    color: RingColor::Green,
                    weight: 1.0,
                },
                ArchetypeEntry {
                    name: "spirit_purple".into(),
                    color: RingColor::Purple,
                    weight: 1.0,
                },
            ],
        }
    }
}

/// Difficulty ramp endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Seconds from session start to peak difficulty
    pub time_to_max: f32,
    /// Oscillate between easy and hard instead of saturating at hard
    pub ping_pong: bool,
    /// Spawns per second at progress 0 and 1
    pub start_spawn_rate: f32,
    pub max_spawn_rate: f32,
    /// Spirit speed range [min, max] at progress 0 and 1, meters per second
    pub start_speed_range: [f32; 2],
    pub max_speed_range: [f32; 2],
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            time_to_max: 60.0,
            ping_pong: true,
            start_spawn_rate: 0.5,
            max_spawn_rate: 2.0,
            start_speed_range: [1.5, 3.0],
            max_speed_range: [4.0, 6.0],
        }
    }
}

/// Stamina pool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaTuning {
    pub max: f32,
    /// Passive drain per second; reaching zero ends the session
    pub drain_per_sec: f32,
    /// Credit per captured spirit
    pub capture_reward: f32,
}

impl Default for StaminaTuning {
    fn default() -> Self {
        Self {
            max: STAMINA_MAX,
            drain_per_sec: STAMINA_DRAIN_PER_SEC,
            capture_reward: STAMINA_PER_CAPTURE,
        }
    }
}

/// Live spirit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiritTuning {
    /// A matching full ring within this distance (meters) captures the spirit
    pub capture_radius: f32,
    /// Spirits older than this (seconds) despawn uncaptured
    pub lifetime: f32,
}

impl Default for SpiritTuning {
    fn default() -> Self {
        Self {
            capture_radius: 0.25,
            lifetime: 20.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub pairing: PairingTuning,
    pub mount: RingMountTuning,
    pub thrower: ThrowerTuning,
    pub difficulty: DifficultyTuning,
    pub stamina: StaminaTuning,
    pub spirits: SpiritTuning,
}

impl Tuning {
    /// Parse a tuning table from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize for export to the host application's config store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
