//! Proximity pairing engine
//!
//! Each tracked hand carries one half-ring token. When the contact points of
//! two unpaired tokens come within the distance threshold the tokens snap
//! into a pair: both halves hide and a composite full ring appears between
//! them, colored by [`RingColor::combine`]. Pairs break when the halves drift
//! apart or when either backing hand vanishes.
//!
//! Pair records live in a small arena addressed by [`PairId`]; each member
//! token holds the handle, so either half resolves to the same record. A
//! token is a member of at most one pair at any time.

use glam::Vec3;
use log::debug;

use super::color::RingColor;
use super::hands::{HandId, Pose};
use super::state::GameEvent;
use crate::look_rotation;
use crate::tuning::PairingTuning;

/// Stable identity of a half-ring token, ascending by creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

/// Handle into the pair arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId(pub u32);

/// One half ring bound to a tracked hand
#[derive(Debug, Clone)]
pub struct RingToken {
    pub id: TokenId,
    pub hand: HandId,
    pub color: RingColor,
    /// Hidden while a member of a pair
    pub visible: bool,
    pub pose: Pose,
    pub pair: Option<PairId>,
}

impl RingToken {
    /// World positions of the two physical ends of the half ring
    pub fn contact_points(&self, tuning: &PairingTuning) -> (Vec3, Vec3) {
        (
            self.pose.transform_point(tuning.contact_point_1),
            self.pose.transform_point(tuning.contact_point_2),
        )
    }
}

/// An active pair of tokens and its composite full ring
#[derive(Debug, Clone)]
pub struct PairRecord {
    pub a: TokenId,
    pub b: TokenId,
    pub color: RingColor,
    /// Transform of the spawned composite full ring
    pub pose: Pose,
}

impl PairRecord {
    /// The other member, or `None` if `id` is not a member
    pub fn partner_of(&self, id: TokenId) -> Option<TokenId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Slot arena for pair records. Handles stay valid until freed; freed slots
/// are recycled for later pairs.
#[derive(Debug, Clone, Default)]
pub struct PairArena {
    slots: Vec<Option<PairRecord>>,
    free: Vec<u32>,
}

impl PairArena {
    pub fn insert(&mut self, record: PairRecord) -> PairId {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(record);
            PairId(index)
        } else {
            self.slots.push(Some(record));
            PairId(self.slots.len() as u32 - 1)
        }
    }

    pub fn get(&self, id: PairId) -> Option<&PairRecord> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: PairId) -> Option<&mut PairRecord> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
    }

    pub fn remove(&mut self, id: PairId) -> Option<PairRecord> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        let record = slot.take();
        if record.is_some() {
            self.free.push(id.0);
        }
        record
    }

    /// Live pair handles in ascending slot order
    pub fn ids(&self) -> impl Iterator<Item = PairId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| PairId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dual-endpoint proximity predicate.
///
/// True when both same-indexed contact pairs are within the threshold, or
/// both cross-indexed pairs are - rings can approach in either rotational
/// alignment. Compares squared distances.
pub fn is_close(a: (Vec3, Vec3), b: (Vec3, Vec3), threshold: f32) -> bool {
    let sq = threshold * threshold;

    let d11 = a.0.distance_squared(b.0);
    let d22 = a.1.distance_squared(b.1);
    let d12 = a.0.distance_squared(b.1);
    let d21 = a.1.distance_squared(b.0);

    (d11 < sq && d22 < sq) || (d12 < sq && d21 < sq)
}

/// Transform of the composite full ring: position midpoint, rotation from the
/// averaged forward/up vectors of the members.
///
/// When the members face opposite directions the raw sum cancels toward zero,
/// so a negative dot product flips to a difference before normalizing. If the
/// result is still degenerate the previous rotation is kept.
pub fn composite_pose(a: &Pose, b: &Pose, previous: &Pose) -> Pose {
    let position = (a.position + b.position) * 0.5;

    let (fa, fb) = (a.forward(), b.forward());
    let (ua, ub) = (a.up(), b.up());

    let avg_forward = if fa.dot(fb) < 0.0 { fa - fb } else { fa + fb } * 0.5;
    let avg_up = if ua.dot(ub) < 0.0 { ua - ub } else { ua + ub } * 0.5;

    let rotation = look_rotation(avg_forward, avg_up).unwrap_or(previous.rotation);

    Pose { position, rotation }
}

fn token_index(tokens: &[RingToken], id: TokenId) -> Option<usize> {
    tokens.iter().position(|t| t.id == id)
}

/// Scan unpaired tokens and create pairs for every close couple.
///
/// Tokens are visited in ascending [`TokenId`] order and the first satisfying
/// couple wins, which makes the tie-break under simultaneous candidates
/// deterministic. Returns the handles created this scan so the maintenance
/// pass can skip them until the next tick.
pub fn create_pairs(
    tokens: &mut [RingToken],
    pairs: &mut PairArena,
    tuning: &PairingTuning,
    events: &mut Vec<GameEvent>,
) -> Vec<PairId> {
    let mut created = Vec::new();

    // O(n^2) over active tokens; n is bounded by players x 2 hands.
    for i in 0..tokens.len() {
        if tokens[i].pair.is_some() {
            continue;
        }
        for j in (i + 1)..tokens.len() {
            if tokens[i].pair.is_some() {
                break;
            }
            if tokens[j].pair.is_some() {
                continue;
            }
            let close = is_close(
                tokens[i].contact_points(tuning),
                tokens[j].contact_points(tuning),
                tuning.distance_threshold,
            );
            if !close {
                continue;
            }

            let color = tokens[i].color.combine(tokens[j].color);
            let pose = composite_pose(&tokens[i].pose, &tokens[j].pose, &Pose::IDENTITY);
            let id = pairs.insert(PairRecord {
                a: tokens[i].id,
                b: tokens[j].id,
                color,
                pose,
            });

            tokens[i].pair = Some(id);
            tokens[i].visible = false;
            tokens[j].pair = Some(id);
            tokens[j].visible = false;

            debug!(
                "pair {:?} formed: {:?} + {:?} -> {:?}",
                id, tokens[i].color, tokens[j].color, color
            );
            events.push(GameEvent::PairCreated {
                pair: id,
                color,
                position: pose.position,
            });
            created.push(id);
        }
    }

    created
}

/// Re-evaluate every existing pair: break the ones whose members vanished or
/// drifted apart, refresh the composite transform of the survivors.
///
/// Pairs listed in `skip` (created this tick) are left untouched so a fresh
/// pair is first revisited on the next tick.
pub fn maintain_pairs(
    tokens: &mut [RingToken],
    pairs: &mut PairArena,
    tuning: &PairingTuning,
    skip: &[PairId],
    events: &mut Vec<GameEvent>,
) {
    // Each composite is reachable from two member tokens but stored once in
    // the arena, so iterating arena slots visits every pair exactly once.
    let ids: Vec<PairId> = pairs.ids().filter(|id| !skip.contains(id)).collect();

    for id in ids {
        let Some(record) = pairs.get(id) else { continue };
        let ia = token_index(tokens, record.a);
        let ib = token_index(tokens, record.b);

        match (ia, ib) {
            (Some(ia), Some(ib))
                if is_close(
                    tokens[ia].contact_points(tuning),
                    tokens[ib].contact_points(tuning),
                    tuning.distance_threshold,
                ) =>
            {
                let (a_pose, b_pose) = (tokens[ia].pose, tokens[ib].pose);
                if let Some(record) = pairs.get_mut(id) {
                    record.pose = composite_pose(&a_pose, &b_pose, &record.pose);
                }
            }
            // Drifted past the threshold, or a member vanished between ticks
            _ => break_pair(tokens, pairs, id, events),
        }
    }
}

/// Destroy a pair: despawn the composite, restore visibility on still-valid
/// members, clear both handles.
pub fn break_pair(
    tokens: &mut [RingToken],
    pairs: &mut PairArena,
    id: PairId,
    events: &mut Vec<GameEvent>,
) {
    let Some(record) = pairs.remove(id) else {
        return;
    };

    for member in [record.a, record.b] {
        if let Some(i) = token_index(tokens, member) {
            tokens[i].pair = None;
            tokens[i].visible = true;
        }
    }

    debug!("pair {:?} broken", id);
    events.push(GameEvent::PairBroken {
        pair: id,
        position: record.pose.position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hands::Handedness;
    use glam::Quat;

    fn tuning() -> PairingTuning {
        PairingTuning {
            distance_threshold: 0.1,
            contact_point_1: Vec3::new(-0.08, 0.0, 0.0),
            contact_point_2: Vec3::new(0.08, 0.0, 0.0),
        }
    }

    fn token(id: u32, color: RingColor, position: Vec3) -> RingToken {
        RingToken {
            id: TokenId(id),
            hand: HandId::new(u64::from(id), Handedness::Left),
            color,
            visible: true,
            pose: Pose::new(position, Quat::IDENTITY),
            pair: None,
        }
    }

    #[test]
    fn test_is_close_same_order() {
        let a = (Vec3::ZERO, Vec3::X);
        let b = (Vec3::new(0.0, 0.05, 0.0), Vec3::new(1.0, 0.05, 0.0));
        assert!(is_close(a, b, 0.1));
    }

    #[test]
    fn test_is_close_crossed_order() {
        let a = (Vec3::ZERO, Vec3::X);
        let b = (Vec3::new(1.0, 0.05, 0.0), Vec3::new(0.0, 0.05, 0.0));
        assert!(is_close(a, b, 0.1));
    }

    #[test]
    fn test_is_close_rejects_single_endpoint_match() {
        // One end touching, the other far away: not a match in either order
        let a = (Vec3::ZERO, Vec3::X);
        let b = (Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        assert!(!is_close(a, b, 0.1));
    }

    #[test]
    fn test_create_pair_hides_members_and_mixes_color() {
        let t = tuning();
        let mut tokens = vec![
            token(0, RingColor::Red, Vec3::ZERO),
            token(1, RingColor::Yellow, Vec3::new(0.01, 0.0, 0.0)),
        ];
        let mut pairs = PairArena::default();
        let mut events = Vec::new();

        let created = create_pairs(&mut tokens, &mut pairs, &t, &mut events);
        assert_eq!(created.len(), 1);

        let record = pairs.get(created[0]).unwrap();
        assert_eq!(record.color, RingColor::Orange);
        assert!(!tokens[0].visible);
        assert!(!tokens[1].visible);
        assert_eq!(tokens[0].pair, tokens[1].pair);
        assert_eq!(record.partner_of(TokenId(0)), Some(TokenId(1)));
        assert_eq!(record.partner_of(TokenId(1)), Some(TokenId(0)));
        assert!(matches!(events[0], GameEvent::PairCreated { .. }));
    }

    #[test]
    fn test_token_never_in_two_pairs() {
        let t = tuning();
        // Three tokens all close together: the lowest-id couple wins, the
        // third stays unpaired.
        let mut tokens = vec![
            token(0, RingColor::Red, Vec3::ZERO),
            token(1, RingColor::Yellow, Vec3::new(0.01, 0.0, 0.0)),
            token(2, RingColor::Blue, Vec3::new(0.02, 0.0, 0.0)),
        ];
        let mut pairs = PairArena::default();
        let mut events = Vec::new();

        let created = create_pairs(&mut tokens, &mut pairs, &t, &mut events);
        assert_eq!(created.len(), 1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(tokens[0].pair, tokens[1].pair);
        assert_eq!(tokens[2].pair, None);
    }

    #[test]
    fn test_maintain_breaks_pair_when_apart() {
        let t = tuning();
        let mut tokens = vec![
            token(0, RingColor::Red, Vec3::ZERO),
            token(1, RingColor::Blue, Vec3::new(0.01, 0.0, 0.0)),
        ];
        let mut pairs = PairArena::default();
        let mut events = Vec::new();
        let created = create_pairs(&mut tokens, &mut pairs, &t, &mut events);

        // Drift apart past the threshold
        tokens[1].pose.position = Vec3::new(1.0, 0.0, 0.0);
        maintain_pairs(&mut tokens, &mut pairs, &t, &[], &mut events);

        assert!(pairs.get(created[0]).is_none());
        assert!(tokens[0].visible);
        assert!(tokens[1].visible);
        assert_eq!(tokens[0].pair, None);
        assert_eq!(tokens[1].pair, None);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PairBroken { .. })));
    }

    #[test]
    fn test_maintain_skips_pairs_created_this_tick() {
        let t = tuning();
        let mut tokens = vec![
            token(0, RingColor::Red, Vec3::ZERO),
            token(1, RingColor::Blue, Vec3::new(0.01, 0.0, 0.0)),
        ];
        let mut pairs = PairArena::default();
        let mut events = Vec::new();
        let created = create_pairs(&mut tokens, &mut pairs, &t, &mut events);

        // Even if the tokens teleport apart within the same tick, a pair
        // created this tick is not torn down until the next one.
        tokens[1].pose.position = Vec3::new(10.0, 0.0, 0.0);
        maintain_pairs(&mut tokens, &mut pairs, &t, &created, &mut events);
        assert!(pairs.get(created[0]).is_some());

        maintain_pairs(&mut tokens, &mut pairs, &t, &[], &mut events);
        assert!(pairs.get(created[0]).is_none());
    }

    #[test]
    fn test_maintain_breaks_pair_on_vanished_member() {
        let t = tuning();
        let mut tokens = vec![
            token(0, RingColor::Red, Vec3::ZERO),
            token(1, RingColor::Blue, Vec3::new(0.01, 0.0, 0.0)),
        ];
        let mut pairs = PairArena::default();
        let mut events = Vec::new();
        let created = create_pairs(&mut tokens, &mut pairs, &t, &mut events);

        // Hand disconnect removed token 1 between ticks
        let mut remaining: Vec<RingToken> = vec![tokens[0].clone()];
        maintain_pairs(&mut remaining, &mut pairs, &t, &[], &mut events);

        assert!(pairs.get(created[0]).is_none());
        assert!(remaining[0].visible);
        assert_eq!(remaining[0].pair, None);
    }

    #[test]
    fn test_composite_pose_midpoint_and_average() {
        let a = Pose::new(Vec3::ZERO, Quat::IDENTITY);
        let b = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let pose = composite_pose(&a, &b, &Pose::IDENTITY);

        assert!((pose.position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!((pose.forward() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_composite_pose_antiparallel_correction() {
        // b faces the opposite way: naive averaging cancels the forward
        // vectors, the corrected difference keeps a usable axis.
        let a = Pose::new(Vec3::ZERO, Quat::IDENTITY);
        let b = Pose::new(
            Vec3::new(0.1, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::PI),
        );
        let pose = composite_pose(&a, &b, &Pose::IDENTITY);

        // Forward stays aligned with a's forward axis rather than collapsing
        assert!(pose.forward().length() > 0.9);
        assert!(pose.forward().dot(Vec3::Z).abs() > 0.9);
    }

    #[test]
    fn test_arena_recycles_slots() {
        let mut arena = PairArena::default();
        let record = PairRecord {
            a: TokenId(0),
            b: TokenId(1),
            color: RingColor::Orange,
            pose: Pose::IDENTITY,
        };
        let first = arena.insert(record.clone());
        assert!(arena.remove(first).is_some());
        let second = arena.insert(record);
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
    }
}
