//! Error types for battle operations
//!
//! Enum-based errors so the host can match on them and show the right
//! notice; no String-typed error paths in the engine itself.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::state::Player;

/// Why the legality gate rejected a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveRejection {
    /// The battle has not been started yet (turn counter is still 0)
    BattleNotStarted,
    /// The battle was already started
    BattleAlreadyStarted,
    /// A winner has been decided; no further moves are legal
    BattleOver,
    /// The move was issued for the side that is not to move
    NotYourTurn,
    /// No character occupies the given lineup slot
    NoSuchCharacter,
    /// The character has fallen and cannot act
    CharacterFallen,
    /// The character is slept or paralyzed
    CharacterIncapacitated,
    /// The targeted character has fallen
    TargetFallen,
    /// A taunt forces a different target
    TargetTaunted,
    /// The ultimate's cooldown has not reached zero
    UltimateOnCooldown,
    /// The character is silenced and cannot use its ultimate
    Silenced,
}

/// Which search knob was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigField {
    Iterations,
    PlayoutDepth,
}

/// Errors surfaced by the battle engine.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleError {
    /// An action the legality predicates would have rejected reached the
    /// resolver. The state is guaranteed untouched.
    IllegalMove {
        player: Player,
        reason: MoveRejection,
    },
    /// A search budget knob is zero or above its bound.
    InvalidConfig { field: ConfigField, value: u32 },
    /// A skill definition violates the kind/condition consistency rules.
    /// Detected when a catalog or lineup is loaded; fatal to battle start.
    DataIntegrity { character: u32, detail: String },
}

/// Result type alias for battle operations
pub type BattleResult<T> = Result<T, BattleError>;
