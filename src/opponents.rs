//! Decision Search: scripted opponents and the Monte-Carlo move picker
//!
//! The search bot enumerates legal moves, then for each trial plays the
//! battle forward on a cloned state with an independently seeded RNG and
//! scores the end position. Per-trial seeding (base seed + trial index)
//! keeps whole searches reproducible while trials stay decorrelated.

use core::sync::atomic::{AtomicBool, Ordering};

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::battle::{resolve, Move};
use crate::error::{BattleError, BattleResult, ConfigField, MoveRejection};
use crate::legality;
use crate::rng::{BattleRng, XorShiftRng};
use crate::state::{BattleState, Player, Slot, LINEUP_SIZE};

/// Upper bound on Monte-Carlo trials per decision
pub const MAX_ITERATIONS: u32 = 1000;
/// Upper bound on playout length, in moves
pub const MAX_PLAYOUT_DEPTH: u32 = 100;

/// Flat bonus for a decided game, dwarfing any HP differential
const WIN_SCORE: i64 = 1_000_000;

/// What drives a non-human side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BotKind {
    /// Stands there and guards; the practice dummy
    Scarecrow,
    /// Greedy one-ply heuristic
    RuleBased,
    /// Monte-Carlo playout search
    Search,
}

/// Search budget knobs, host-configurable within fixed bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Monte-Carlo trials per decision, 1..=1000
    pub iterations: u32,
    /// Moves to play out past the candidate move, 1..=100
    pub playout_depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            playout_depth: 20,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> BattleResult<()> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(BattleError::InvalidConfig {
                field: ConfigField::Iterations,
                value: self.iterations,
            });
        }
        if self.playout_depth == 0 || self.playout_depth > MAX_PLAYOUT_DEPTH {
            return Err(BattleError::InvalidConfig {
                field: ConfigField::PlayoutDepth,
                value: self.playout_depth,
            });
        }
        Ok(())
    }
}

/// Enumerate every turn-consuming move the side to move could legally
/// submit, in a stable order: attacks and ultimates per (actor, target)
/// pair ascending, then guards. Switches are not candidates; the search
/// folds them into attack moves directly.
pub fn legal_moves(state: &BattleState) -> Vec<Move> {
    let player = state.player_to_move();
    let mut moves = Vec::new();
    if state.turn == 0 || state.gameover.is_some() {
        return moves;
    }
    for from in 0..LINEUP_SIZE as u8 {
        if legality::can_select(state, player, from) {
            for to in 0..LINEUP_SIZE as u8 {
                if !legality::can_target(state, player, to) {
                    continue;
                }
                moves.push(Move::Attack { from, to });
                if legality::can_ultimate(state, player, from, to) {
                    moves.push(Move::Ultimate { from, to });
                }
            }
        }
        if legality::can_guard(state, player, from) {
            moves.push(Move::Guard { index: from });
        }
    }
    moves
}

/// One-ply greedy policy: ultimate on the lowest-HP reachable enemy when
/// one is ready, else attack, else the first legal move.
pub fn rule_based_move(state: &BattleState) -> Option<Move> {
    let player = state.player_to_move();
    let candidates = legal_moves(state);
    let lowest_target = |filter: &dyn Fn(&Move) -> Option<(u8, u8)>| -> Option<Move> {
        candidates
            .iter()
            .filter_map(|m| filter(m).map(|(from, to)| (*m, from, to)))
            .min_by_key(|&(_, _, to)| {
                state
                    .character(Slot::new(player.opponent(), to))
                    .map(|c| c.current_hp)
                    .unwrap_or(i32::MAX)
            })
            .map(|(m, _, _)| m)
    };
    lowest_target(&|m| match m {
        Move::Ultimate { from, to } => Some((*from, *to)),
        _ => None,
    })
    .or_else(|| {
        lowest_target(&|m| match m {
            Move::Attack { from, to } => Some((*from, *to)),
            _ => None,
        })
    })
    .or_else(|| candidates.first().copied())
}

/// The scarecrow just guards with its first able member.
pub fn scarecrow_move(state: &BattleState) -> Option<Move> {
    legal_moves(state).into_iter().find_map(|m| match m {
        Move::Guard { .. } => Some(m),
        _ => None,
    })
}

/// Move selection for a configured bot side. `None` means the bot has no
/// legal move to offer (the battle is over or not started).
pub fn bot_move(
    kind: BotKind,
    state: &BattleState,
    config: &SearchConfig,
    seed: u64,
    cancel: &AtomicBool,
) -> BattleResult<Option<Move>> {
    match kind {
        BotKind::Scarecrow => Ok(scarecrow_move(state)),
        BotKind::RuleBased => Ok(rule_based_move(state)),
        BotKind::Search => choose_move(state, config, seed, cancel).map(Some),
    }
}

/// Position score from `player`'s point of view: decided games dominate,
/// otherwise the difference in surviving HP plus shield.
fn score_state(state: &BattleState, player: Player) -> i64 {
    if let Some(winner) = state.gameover {
        return if winner == player { WIN_SCORE } else { -WIN_SCORE };
    }
    let side_total = |side: Player| -> i64 {
        state
            .living_indices(side)
            .iter()
            .filter_map(|&i| state.character(Slot::new(side, i)))
            .map(|c| (c.current_hp + c.shield) as i64)
            .sum()
    };
    side_total(player) - side_total(player.opponent())
}

/// Play random legal moves forward until the game decides or the depth
/// budget runs out.
fn random_playout(state: &mut BattleState, depth: u32, rng: &mut XorShiftRng) {
    for _ in 0..depth {
        if state.gameover.is_some() {
            return;
        }
        let candidates = legal_moves(state);
        if candidates.is_empty() {
            return;
        }
        let mv = candidates[rng.gen_range(candidates.len())];
        let player = state.player_to_move();
        if resolve(state, player, &mv, rng).is_err() {
            return;
        }
    }
}

/// Pick a move for the side to move by Monte-Carlo playouts.
///
/// Trials are dealt round-robin across candidates, so with
/// `iterations = 1` exactly one candidate is tried and returned.
/// `cancel` is polled between trials; a cancelled search returns the best
/// candidate found so far.
pub fn choose_move(
    state: &BattleState,
    config: &SearchConfig,
    seed: u64,
    cancel: &AtomicBool,
) -> BattleResult<Move> {
    config.validate()?;
    let player = state.player_to_move();
    let candidates = legal_moves(state);
    if candidates.is_empty() {
        return Err(BattleError::IllegalMove {
            player,
            reason: MoveRejection::BattleOver,
        });
    }

    let mut totals = vec![0i64; candidates.len()];
    let mut visits = vec![0u32; candidates.len()];
    for trial in 0..config.iterations {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("search cancelled after {} trials", trial);
            break;
        }
        let pick = trial as usize % candidates.len();
        let mv = candidates[pick];
        let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(trial as u64));
        let mut playout = state.clone();
        if resolve(&mut playout, player, &mv, &mut rng).is_err() {
            continue;
        }
        random_playout(&mut playout, config.playout_depth, &mut rng);
        totals[pick] += score_state(&playout, player);
        visits[pick] += 1;
    }

    // Best average score; unvisited candidates lose to any visited one,
    // ties break toward the lower index
    let mut best = 0;
    let mut best_score = i64::MIN;
    for (i, (&total, &count)) in totals.iter().zip(visits.iter()).enumerate() {
        if count == 0 {
            continue;
        }
        let avg = total / count as i64;
        if avg > best_score {
            best_score = avg;
            best = i;
        }
    }
    Ok(candidates[best])
}
