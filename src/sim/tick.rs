//! Fixed timestep simulation tick
//!
//! One authority-side pass per timestep, run to completion with no
//! suspension points: sync tokens to the tracked hands, form new pairs,
//! maintain existing ones, advance the difficulty ramp, schedule spawns,
//! fly the spirits, resolve captures and drain stamina. Pair creation runs
//! before pair maintenance, and pairs born this tick are exempt from
//! teardown until the next one.

use glam::Quat;
use log::{debug, info};

use super::hands::{HandId, HandPose, ring_pose};
use super::pairing::{self, RingToken, TokenId};
use super::state::{GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Input for a single tick: one pose per currently tracked hand. Hands
/// missing from the list are treated as vanished (disconnect, tracking loss).
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub hands: Vec<(HandId, HandPose)>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning, dt: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.time_ticks += 1;

    sync_tokens(state, input, tuning);

    let created = pairing::create_pairs(
        &mut state.tokens,
        &mut state.pairs,
        &tuning.pairing,
        &mut state.events,
    );
    pairing::maintain_pairs(
        &mut state.tokens,
        &mut state.pairs,
        &tuning.pairing,
        &created,
        &mut state.events,
    );

    // Difficulty rewrites the scheduler's rate and speed range every tick
    let outputs = state.difficulty.advance(dt);
    state.scheduler.spawns_per_second = outputs.spawn_rate;
    state.scheduler.speed_range = outputs.speed_range;

    let requests = state.scheduler.tick(dt, &tuning.thrower, &mut state.rng);
    for request in &requests {
        state.spawn_spirit(request, tuning);
    }

    advance_spirits(state, tuning, dt);
    capture_spirits(state, tuning);

    state.stamina.drain(dt);
    if state.stamina.is_empty() {
        end_session(state);
    }
}

/// Keep the token set in lockstep with the tracked hands: spawn a half ring
/// for every unseen hand, refresh poses for the rest, drop tokens whose hand
/// vanished (force-unpairing them first).
fn sync_tokens(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    let mut hands = input.hands.clone();
    // Deterministic processing order regardless of how the host assembled
    // the list
    hands.sort_by_key(|(id, _)| *id);

    for (hand, pose) in &hands {
        let mounted = ring_pose(pose, hand.side, &tuning.mount);
        if let Some(i) = state.tokens.iter().position(|t| t.hand == *hand) {
            state.tokens[i].pose = mounted;
        } else {
            let (id, color) = state.alloc_token();
            debug!("token {id:?} spawned for {hand:?} with color {color:?}");
            state.tokens.push(RingToken {
                id,
                hand: *hand,
                color,
                visible: true,
                pose: mounted,
                pair: None,
            });
        }
    }

    let vanished: Vec<TokenId> = state
        .tokens
        .iter()
        .filter(|t| !hands.iter().any(|(h, _)| *h == t.hand))
        .map(|t| t.id)
        .collect();

    for id in vanished {
        let pair = state
            .tokens
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| t.pair);
        if let Some(pair) = pair {
            pairing::break_pair(&mut state.tokens, &mut state.pairs, pair, &mut state.events);
        }
        if let Some(i) = state.tokens.iter().position(|t| t.id == id) {
            debug!("token {id:?} removed, hand vanished");
            state.tokens.remove(i);
        }
    }
}

/// Integrate spirit motion and expire the ones that aged out
fn advance_spirits(state: &mut GameState, tuning: &Tuning, dt: f32) {
    for spirit in &mut state.spirits {
        spirit.pose.position += spirit.velocity * dt;
        if spirit.angular_velocity.length_squared() > 0.0 {
            spirit.pose.rotation =
                (Quat::from_scaled_axis(spirit.angular_velocity * dt) * spirit.pose.rotation)
                    .normalize();
        }
        spirit.age += dt;
    }

    let mut i = 0;
    while i < state.spirits.len() {
        if state.spirits[i].age >= tuning.spirits.lifetime {
            let spirit = state.spirits.remove(i);
            debug!("spirit {:?} expired uncaptured", spirit.id);
            state.events.push(GameEvent::SpiritExpired {
                spirit: spirit.id,
                position: spirit.pose.position,
            });
        } else {
            i += 1;
        }
    }
}

/// A full ring of the spirit's color within the capture radius catches it:
/// the spirit despawns, stamina is credited, the effects layer is notified
/// with the resolved display color.
fn capture_spirits(state: &mut GameState, tuning: &Tuning) {
    let radius_sq = tuning.spirits.capture_radius * tuning.spirits.capture_radius;

    let mut captured = Vec::new();
    for (i, spirit) in state.spirits.iter().enumerate() {
        for pair_id in state.pairs.ids() {
            let Some(record) = state.pairs.get(pair_id) else {
                continue;
            };
            if record.color == spirit.color
                && record.pose.position.distance_squared(spirit.pose.position) <= radius_sq
            {
                captured.push((i, pair_id));
                break;
            }
        }
    }

    for (i, ring) in captured.into_iter().rev() {
        let spirit = state.spirits.remove(i);
        state.stamina.credit(tuning.stamina.capture_reward);
        info!(
            "spirit {:?} captured by ring {ring:?} ({:?})",
            spirit.id, spirit.color
        );
        state.events.push(GameEvent::SpiritCaptured {
            spirit: spirit.id,
            ring,
            color: spirit.color,
            rgb: spirit.color.display_rgb(),
            position: spirit.pose.position,
        });
    }
}

/// Stamina ran out: despawn the dynamic objects and stop the sim. The host
/// reacts to the single GameOver event (scene change, scoreboard).
fn end_session(state: &mut GameState) {
    info!("stamina depleted after {} ticks, session over", state.time_ticks);

    state.spirits.clear();
    let pairs: Vec<_> = state.pairs.ids().collect();
    for id in pairs {
        let _ = state.pairs.remove(id);
    }
    for token in &mut state.tokens {
        token.pair = None;
        token.visible = true;
    }

    state.phase = GamePhase::GameOver;
    state.events.push(GameEvent::GameOver);
}
