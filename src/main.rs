//! Spirit Rings headless driver
//!
//! Runs the authority simulation at the fixed timestep with two synthetic
//! hands sweeping toward and away from each other, and prints the event
//! stream. Useful for balance tuning without a headset: pipe in a tuning
//! JSON file and watch the pairing/spawn cadence.
//!
//! Usage: `spirit-rings [seed] [seconds] [tuning.json]`

use glam::{Quat, Vec3};

use spirit_rings::Tuning;
use spirit_rings::consts::SIM_DT;
use spirit_rings::sim::{GameEvent, GamePhase, GameState, HandId, HandPose, Handedness, TickInput, tick};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json).unwrap_or_else(|e| {
                log::warn!("bad tuning file {path}: {e}, using defaults");
                Tuning::default()
            }),
            Err(e) => {
                log::warn!("cannot read {path}: {e}, using defaults");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    log::info!("session seed {seed}, running {seconds}s at {:.0} Hz", 1.0 / SIM_DT);

    let mut state = GameState::new(seed, &tuning);
    let left = HandId::new(0, Handedness::Left);
    let right = HandId::new(0, Handedness::Right);

    let steps = (seconds / SIM_DT) as u64;
    for step in 0..steps {
        let t = step as f32 * SIM_DT;

        // Hands oscillate between 60 cm apart and touching every 4 seconds
        let half_gap = 0.15 + 0.15 * (t * std::f32::consts::TAU / 4.0).cos();
        let input = TickInput {
            hands: vec![
                (
                    left,
                    HandPose::new(Vec3::new(-half_gap, 1.4, 0.4), Quat::IDENTITY),
                ),
                (
                    right,
                    HandPose::new(Vec3::new(half_gap, 1.4, 0.4), Quat::IDENTITY),
                ),
            ],
        };

        tick(&mut state, &input, &tuning, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::PairCreated { color, .. } => {
                    println!("[{t:6.2}s] full ring formed: {color:?}");
                }
                GameEvent::PairBroken { .. } => println!("[{t:6.2}s] full ring broken"),
                GameEvent::SpiritSpawned { spirit, .. } => {
                    println!("[{t:6.2}s] spirit {spirit:?} thrown");
                }
                GameEvent::SpiritCaptured { spirit, color, .. } => {
                    println!("[{t:6.2}s] spirit {spirit:?} captured ({color:?})");
                }
                GameEvent::SpiritExpired { spirit, .. } => {
                    println!("[{t:6.2}s] spirit {spirit:?} got away");
                }
                GameEvent::GameOver => println!("[{t:6.2}s] stamina out - game over"),
            }
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!(
        "done: {} ticks, {:.0}% stamina left, {} spirits in flight",
        state.time_ticks,
        state.stamina.fraction() * 100.0,
        state.spirits.len()
    );
}
