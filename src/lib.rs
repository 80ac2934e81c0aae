//! Deterministic turn-based battle engine for team RPG fights.
//!
//! The host owns a single [`BattleState`] value and drives it through
//! [`start_battle`] and [`resolve`]; every accepted move returns the
//! events it produced. All randomness flows through an injected
//! [`BattleRng`], so a battle replays exactly from its seed.

mod battle;
mod characters;
mod effects;
mod error;
mod legality;
mod opponents;
mod rng;
mod skills;
mod state;

#[cfg(test)]
mod tests;

pub use battle::{resolve, start_battle, BattleEvent, Move, MAX_TRIGGER_DEPTH};
pub use characters::{
    builtin_catalog, find_character, load_catalog, scarecrow, CharacterData, CharacterId,
};
pub use effects::{EffectInstance, EffectLedger};
pub use error::{BattleError, BattleResult, ConfigField, MoveRejection};
pub use legality::{can_attack, can_guard, can_select, can_target, can_ultimate};
pub use opponents::{
    bot_move, choose_move, legal_moves, rule_based_move, scarecrow_move, BotKind, SearchConfig,
    MAX_ITERATIONS, MAX_PLAYOUT_DEPTH,
};
pub use rng::{BattleRng, XorShiftRng};
pub use skills::*;
pub use state::{BattleState, CharacterState, Player, PerPlayer, Slot, LINEUP_SIZE};
