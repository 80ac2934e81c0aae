//! Legality Checker: the single gate every move passes before resolution
//!
//! The resolver calls `check` first and refuses to touch the state on a
//! rejection; the UI calls the `can_*` predicates to grey out buttons. Both
//! paths share the same rules so they can never disagree.

use crate::battle::Move;
use crate::error::MoveRejection;
use crate::skills::ActionKind;
use crate::state::{BattleState, Player, Slot};

/// Full legality check for a move issued by `player`.
pub fn check(state: &BattleState, player: Player, mv: &Move) -> Result<(), MoveRejection> {
    if state.turn == 0 {
        return Err(MoveRejection::BattleNotStarted);
    }
    if state.gameover.is_some() {
        return Err(MoveRejection::BattleOver);
    }
    if state.player_to_move() != player {
        return Err(MoveRejection::NotYourTurn);
    }
    match mv {
        Move::SwitchMember { index } => select_check(state, Slot::new(player, *index)),
        Move::SwitchTarget { index } => target_check(state, player, *index),
        Move::Attack { from, to } => {
            select_check(state, Slot::new(player, *from))?;
            target_check(state, player, *to)
        }
        Move::Ultimate { from, to } => {
            let slot = Slot::new(player, *from);
            select_check(state, slot)?;
            target_check(state, player, *to)?;
            ultimate_check(state, slot)
        }
        // Guarding is always open to a living character, even an
        // incapacitated one, so a side can never be left without a legal
        // move. The guard effect itself is suppressed while incapacitated.
        Move::Guard { index } => living_check(state, Slot::new(player, *index)),
    }
}

fn living_check(state: &BattleState, slot: Slot) -> Result<(), MoveRejection> {
    let character = state
        .character(slot)
        .ok_or(MoveRejection::NoSuchCharacter)?;
    if character.is_fallen() {
        return Err(MoveRejection::CharacterFallen);
    }
    Ok(())
}

/// A character can act (or be selected) if it exists, lives, and is not
/// slept or paralyzed.
fn select_check(state: &BattleState, slot: Slot) -> Result<(), MoveRejection> {
    living_check(state, slot)?;
    if state.effects.has_action(slot, &ActionKind::Sleep)
        || state.effects.has_action(slot, &ActionKind::Paralysis)
    {
        return Err(MoveRejection::CharacterIncapacitated);
    }
    Ok(())
}

/// A slot on the opposing side can be targeted if it holds a living
/// character and no other enemy is taunting.
fn target_check(state: &BattleState, player: Player, index: u8) -> Result<(), MoveRejection> {
    let slot = Slot::new(player.opponent(), index);
    let character = state
        .character(slot)
        .ok_or(MoveRejection::NoSuchCharacter)?;
    if character.is_fallen() {
        return Err(MoveRejection::TargetFallen);
    }
    if let Some(taunting) = state.effects.taunt_source(player.opponent()) {
        if taunting != index {
            return Err(MoveRejection::TargetTaunted);
        }
    }
    Ok(())
}

fn ultimate_check(state: &BattleState, slot: Slot) -> Result<(), MoveRejection> {
    let character = state
        .character(slot)
        .ok_or(MoveRejection::NoSuchCharacter)?;
    if character.skills.ultimate.is_empty() || character.ultimate_cd > 0 {
        return Err(MoveRejection::UltimateOnCooldown);
    }
    if state.effects.has_action(slot, &ActionKind::Silence) {
        return Err(MoveRejection::Silenced);
    }
    Ok(())
}

/// Whether the character at `index` on `player`'s side may become the
/// acting member.
pub fn can_select(state: &BattleState, player: Player, index: u8) -> bool {
    select_check(state, Slot::new(player, index)).is_ok()
}

/// Whether `player` may point its target at enemy slot `index`.
pub fn can_target(state: &BattleState, player: Player, index: u8) -> bool {
    target_check(state, player, index).is_ok()
}

/// Whether the character at `index` may guard (alive, even if
/// incapacitated).
pub fn can_guard(state: &BattleState, player: Player, index: u8) -> bool {
    living_check(state, Slot::new(player, index)).is_ok()
}

/// Whether a normal attack from `from` against `to` would be accepted.
pub fn can_attack(state: &BattleState, player: Player, from: u8, to: u8) -> bool {
    check(state, player, &Move::Attack { from, to }).is_ok()
}

/// Whether an ultimate from `from` against `to` would be accepted.
pub fn can_ultimate(state: &BattleState, player: Player, from: u8, to: u8) -> bool {
    check(state, player, &Move::Ultimate { from, to }).is_ok()
}
