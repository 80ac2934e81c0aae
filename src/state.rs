//! Battle state: the single value the host owns, snapshots and replaces
//!
//! The engine never retains state internally; every operation takes the
//! state in and leaves a fully materialized value behind, so the host's
//! undo/redo can swap snapshots wholesale.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::battle::BattleEvent;
use crate::characters::{CharacterData, CharacterId};
use crate::effects::EffectLedger;
use crate::error::{BattleError, BattleResult};
use crate::skills::{Attribute, Role, SkillSet};

/// Maximum characters per side
pub const LINEUP_SIZE: usize = 5;

/// One of the two battling sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// A pair of values, one per side
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerPlayer<T> {
    pub one: T,
    pub two: T,
}

impl<T> PerPlayer<T> {
    pub fn get(&self, player: Player) -> &T {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }

    pub fn get_mut(&mut self, player: Player) -> &mut T {
        match player {
            Player::One => &mut self.one,
            Player::Two => &mut self.two,
        }
    }
}

/// A lineup slot address: side + index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub player: Player,
    pub index: u8,
}

impl Slot {
    pub fn new(player: Player, index: u8) -> Self {
        Self { player, index }
    }
}

/// A character as it exists inside a battle
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    pub id: CharacterId,
    pub attribute: Attribute,
    pub role: Role,
    pub atk: i32,
    pub max_hp: i32,
    pub current_hp: i32,
    /// Damage-absorbing pool consumed before HP
    pub shield: i32,
    /// Turns until the ultimate is ready again (0 = ready)
    pub ultimate_cd: u8,
    pub skills: SkillSet,
}

impl CharacterState {
    pub fn from_data(data: &CharacterData) -> Self {
        Self {
            id: data.id,
            attribute: data.attribute,
            role: data.role,
            atk: data.atk,
            max_hp: data.max_hp,
            current_hp: data.max_hp,
            shield: 0,
            ultimate_cd: 0,
            skills: data.skills.clone(),
        }
    }

    pub fn is_fallen(&self) -> bool {
        self.current_hp <= 0
    }
}

/// The complete battle state
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleState {
    /// Ordered lineups; slots may be empty before team selection
    pub lineups: PerPlayer<Vec<Option<CharacterState>>>,
    /// Currently selected acting member per side
    pub selected: PerPlayer<u8>,
    /// Currently selected enemy target per side
    pub target: PerPlayer<u8>,
    /// 0 = pre-battle; odd turns belong to player one
    pub turn: u32,
    /// Set exactly once; halts all further actions
    pub gameover: Option<Player>,
    pub effects: EffectLedger,
    /// Append-only event log for UI playback
    pub log: Vec<BattleEvent>,
}

impl BattleState {
    pub fn new() -> Self {
        Self {
            lineups: PerPlayer {
                one: Vec::new(),
                two: Vec::new(),
            },
            selected: PerPlayer { one: 0, two: 0 },
            target: PerPlayer { one: 0, two: 0 },
            turn: 0,
            gameover: None,
            effects: EffectLedger::new(),
            log: Vec::new(),
        }
    }

    /// Validate and install a side's team. Only legal before battle start.
    pub fn set_lineup(&mut self, player: Player, team: &[CharacterData]) -> BattleResult<()> {
        if self.turn != 0 {
            return Err(BattleError::IllegalMove {
                player,
                reason: crate::error::MoveRejection::BattleAlreadyStarted,
            });
        }
        for data in team {
            data.validate()?;
        }
        *self.lineups.get_mut(player) = team
            .iter()
            .take(LINEUP_SIZE)
            .map(|d| Some(CharacterState::from_data(d)))
            .collect();
        *self.selected.get_mut(player) = 0;
        *self.target.get_mut(player) = 0;
        Ok(())
    }

    /// The side whose move it is. Meaningless before battle start.
    pub fn player_to_move(&self) -> Player {
        if self.turn % 2 == 1 {
            Player::One
        } else {
            Player::Two
        }
    }

    /// Round number shared by a pair of turns: (1, 2) -> 1, (3, 4) -> 2, ...
    pub fn round(&self) -> u32 {
        (self.turn + 1) / 2
    }

    pub fn character(&self, slot: Slot) -> Option<&CharacterState> {
        self.lineups
            .get(slot.player)
            .get(slot.index as usize)
            .and_then(|s| s.as_ref())
    }

    pub fn character_mut(&mut self, slot: Slot) -> Option<&mut CharacterState> {
        self.lineups
            .get_mut(slot.player)
            .get_mut(slot.index as usize)
            .and_then(|s| s.as_mut())
    }

    /// Indices of characters on a side that have not fallen
    pub fn living_indices(&self, player: Player) -> Vec<u8> {
        self.lineups
            .get(player)
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(c) if !c.is_fallen() => Some(i as u8),
                _ => None,
            })
            .collect()
    }

    /// True when a side has no living characters left
    pub fn side_defeated(&self, player: Player) -> bool {
        self.living_indices(player).is_empty()
    }

    /// True when a living ally of the attribute exists on the side
    pub fn attribute_present(&self, player: Player, attribute: Attribute) -> bool {
        self.living_indices(player)
            .iter()
            .any(|&i| match self.character(Slot::new(player, i)) {
                Some(c) => c.attribute == attribute,
                None => false,
            })
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new()
    }
}
