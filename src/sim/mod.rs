//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! One authority (the server role in the networked build) owns the state and
//! calls [`tick`] once per timestep; everyone else observes replicated state.

pub mod color;
pub mod difficulty;
pub mod hands;
pub mod pairing;
pub mod spawn;
pub mod state;
pub mod tick;

pub use color::RingColor;
pub use difficulty::{DifficultyOutputs, DifficultyRamp, RampMode};
pub use hands::{HandId, HandPose, Handedness, Pose, ring_pose};
pub use pairing::{PairArena, PairId, PairRecord, RingToken, TokenId, composite_pose, is_close};
pub use spawn::{SpawnRequest, SpawnScheduler, SpawnVolume, pick_weighted, sample_cone_direction};
pub use state::{GameEvent, GamePhase, GameState, Spirit, SpiritId, StaminaPool};
pub use tick::{TickInput, tick};
