//! Game state and core simulation types
//!
//! One authority owns a `GameState` and mutates it through [`tick`]; clients
//! only ever observe replicated copies. All state is transient and rebuilt
//! from scratch each session.
//!
//! [`tick`]: super::tick::tick

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::color::RingColor;
use super::difficulty::DifficultyRamp;
use super::hands::Pose;
use super::pairing::{PairArena, PairId, RingToken};
use super::spawn::{SpawnRequest, SpawnScheduler};
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Normal play: pairing, spawning and draining all run
    Playing,
    /// Stamina hit zero; the sim stops mutating
    GameOver,
}

/// Stable identity of a live spirit projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpiritId(pub u32);

/// A networked spirit projectile in flight
#[derive(Debug, Clone)]
pub struct Spirit {
    pub id: SpiritId,
    /// Index into the archetype catalog
    pub archetype: usize,
    /// A full ring of this color captures the spirit
    pub color: RingColor,
    pub pose: Pose,
    pub velocity: Vec3,
    pub scale: f32,
    /// Spin axis scaled by magnitude, radians per second
    pub angular_velocity: Vec3,
    /// Seconds since spawn
    pub age: f32,
}

/// Change notifications for the presentation layer (VFX, audio, haptics).
/// The authority records these during a tick; the embedder drains them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PairCreated {
        pair: PairId,
        color: RingColor,
        position: Vec3,
    },
    PairBroken {
        pair: PairId,
        position: Vec3,
    },
    SpiritSpawned {
        spirit: SpiritId,
        archetype: usize,
        position: Vec3,
    },
    /// A matching full ring caught a spirit. Carries the resolved display
    /// color so the effects layer needs no palette lookup.
    SpiritCaptured {
        spirit: SpiritId,
        ring: PairId,
        color: RingColor,
        rgb: [f32; 3],
        position: Vec3,
    },
    SpiritExpired {
        spirit: SpiritId,
        position: Vec3,
    },
    GameOver,
}

/// Shared stamina pool. Drains passively, credited per capture; empty ends
/// the session.
#[derive(Debug, Clone)]
pub struct StaminaPool {
    pub current: f32,
    pub max: f32,
    pub drain_per_sec: f32,
}

impl StaminaPool {
    pub fn new(max: f32, drain_per_sec: f32) -> Self {
        Self {
            current: max,
            max,
            drain_per_sec,
        }
    }

    /// Passive drain for one timestep
    pub fn drain(&mut self, dt: f32) {
        self.current = (self.current - self.drain_per_sec * dt).clamp(0.0, self.max);
    }

    /// Capture reward, clamped to the pool capacity
    pub fn credit(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    /// Fill fraction in [0, 1] for the presentation layer
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }
}

/// Complete authority-side game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG; every random decision flows through here
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Half-ring tokens, ascending by id
    pub tokens: Vec<RingToken>,
    /// Active pairs and their composite rings
    pub pairs: PairArena,
    /// Live spirits, ascending by id
    pub spirits: Vec<Spirit>,
    pub stamina: StaminaPool,
    pub difficulty: DifficultyRamp,
    pub scheduler: SpawnScheduler,
    next_token_id: u32,
    next_spirit_id: u32,
    tokens_created: u32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh session state. The scheduler is primed so the first tick throws
    /// a spirit immediately instead of waiting out the spawn interval.
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let difficulty = DifficultyRamp::from_tuning(&tuning.difficulty);
        let start = difficulty.outputs();
        let mut scheduler = SpawnScheduler::new(start.spawn_rate, start.speed_range);
        scheduler.prime();

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            tokens: Vec::new(),
            pairs: PairArena::default(),
            spirits: Vec::new(),
            stamina: StaminaPool::new(tuning.stamina.max, tuning.stamina.drain_per_sec),
            difficulty,
            scheduler,
            next_token_id: 0,
            next_spirit_id: 0,
            tokens_created: 0,
            events: Vec::new(),
        }
    }

    /// Allocate the next token id and pick its spawn color. Colors cycle
    /// through the four primaries by creation count, so a fourth player's
    /// hand can end up with a Transparent (wildcard) half ring.
    pub fn alloc_token(&mut self) -> (super::pairing::TokenId, RingColor) {
        let id = super::pairing::TokenId(self.next_token_id);
        self.next_token_id += 1;
        let color = RingColor::PRIMARIES[self.tokens_created as usize % RingColor::PRIMARIES.len()];
        self.tokens_created += 1;
        (id, color)
    }

    /// Materialize a scheduler request into a live spirit
    pub fn spawn_spirit(&mut self, request: &SpawnRequest, tuning: &Tuning) {
        let color = tuning
            .thrower
            .archetypes
            .get(request.archetype)
            .map(|a| a.color)
            .unwrap_or(RingColor::Transparent);

        let id = SpiritId(self.next_spirit_id);
        self.next_spirit_id += 1;

        let rotation = crate::look_rotation(request.direction, Vec3::Y).unwrap_or(Quat::IDENTITY);
        self.spirits.push(Spirit {
            id,
            archetype: request.archetype,
            color,
            pose: Pose::new(request.position, rotation),
            velocity: request.direction * request.speed,
            scale: request.scale,
            angular_velocity: request.angular_velocity,
            age: 0.0,
        });

        self.events.push(GameEvent::SpiritSpawned {
            spirit: id,
            archetype: request.archetype,
            position: request.position,
        });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take this tick's change notifications for the presentation adapter
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamina_drain_and_credit_clamp() {
        let mut pool = StaminaPool::new(100.0, 10.0);
        pool.drain(2.0);
        assert_eq!(pool.current, 80.0);

        pool.credit(50.0);
        assert_eq!(pool.current, 100.0); // clamped to max

        pool.drain(1000.0);
        assert!(pool.is_empty());
        assert_eq!(pool.current, 0.0); // never negative
    }

    #[test]
    fn test_token_colors_cycle_primaries() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        let colors: Vec<RingColor> = (0..5).map(|_| state.alloc_token().1).collect();
        assert_eq!(
            colors,
            vec![
                RingColor::Red,
                RingColor::Yellow,
                RingColor::Blue,
                RingColor::Transparent,
                RingColor::Red,
            ]
        );
    }

    #[test]
    fn test_spawn_spirit_resolves_archetype_color() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        let request = SpawnRequest {
            archetype: 0,
            position: Vec3::new(0.0, 1.0, 4.0),
            direction: Vec3::NEG_Z,
            speed: 2.0,
            scale: 1.0,
            angular_velocity: Vec3::ZERO,
        };
        state.spawn_spirit(&request, &tuning);

        assert_eq!(state.spirits.len(), 1);
        assert_eq!(state.spirits[0].color, tuning.thrower.archetypes[0].color);
        assert_eq!(state.spirits[0].velocity, Vec3::NEG_Z * 2.0);
        assert!(matches!(
            state.drain_events()[0],
            GameEvent::SpiritSpawned { .. }
        ));
    }

    #[test]
    fn test_spawn_spirit_out_of_range_archetype_degrades() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        let request = SpawnRequest {
            archetype: 999,
            position: Vec3::ZERO,
            direction: Vec3::Z,
            speed: 1.0,
            scale: 1.0,
            angular_velocity: Vec3::ZERO,
        };
        state.spawn_spirit(&request, &tuning);
        assert_eq!(state.spirits[0].color, RingColor::Transparent);
    }
}
