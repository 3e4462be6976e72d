//! Tracked hand input and ring mounting
//!
//! The XR layer feeds the sim one pose per tracked hand each tick. Hands can
//! appear and disappear at any time (players joining, tracking loss,
//! disconnects); the pairing engine treats the set handed in as the source of
//! truth. The sim never talks to a device directly.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::tuning::RingMountTuning;

/// Which physical hand a pose belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Stable identity of one tracked hand: owning player plus side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandId {
    pub player: u64,
    pub side: Handedness,
}

impl HandId {
    pub fn new(player: u64, side: Handedness) -> Self {
        Self { player, side }
    }
}

/// World-space position and orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local +Z in world space
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +Y in world space
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a local point to world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// One tick's pose sample for a hand
pub type HandPose = Pose;

/// Compute a half ring's world pose from the hand it is mounted on.
///
/// The mount is authored for the right hand; the left hand mirrors the X
/// offset, negates the latitude and uses `180 - longitude` so the two rings
/// face each other when palms are brought together.
pub fn ring_pose(hand: &HandPose, side: Handedness, mount: &RingMountTuning) -> Pose {
    let (offset, longitude_deg, latitude_deg) = match side {
        Handedness::Left => (
            Vec3::new(-mount.offset.x, mount.offset.y, mount.offset.z),
            180.0 - mount.longitude_deg,
            -mount.latitude_deg,
        ),
        Handedness::Right => (mount.offset, mount.longitude_deg, mount.latitude_deg),
    };

    // Longitude spins around the local up axis, latitude tilts around the
    // local right axis, both applied in the ring's own space.
    let rotation = hand.rotation
        * Quat::from_rotation_y(longitude_deg.to_radians())
        * Quat::from_rotation_x(latitude_deg.to_radians());

    let position = hand.position + hand.rotation * offset;

    Pose { position, rotation }
}
