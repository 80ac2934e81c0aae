//! Effect Ledger: the live collection of time-bounded modifiers
//!
//! Effects are attached to characters by lineup index + side, never by
//! pointer, since slots can fall or be replaced across turns. The ledger
//! only tracks effect records; HP and shield mutation stays in the
//! resolver.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::skills::{ActionKind, EffectKind, Skill, SkillBasis, SkillKind, SkillPhase};
use crate::state::{Player, Slot};

/// A skill-derived runtime modifier record
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectInstance {
    pub kind: SkillKind,
    pub phase: SkillPhase,
    /// Permille magnitude per stack; 0 for pure status markers
    pub value: i32,
    pub basis: Option<SkillBasis>,
    pub source: Slot,
    pub owner: Slot,
    /// Turns left; None = indefinite
    pub remaining: Option<u8>,
    /// Configured duration, used to refresh on re-trigger
    pub duration: Option<u8>,
    pub stack: u8,
    pub max_stack: Option<u8>,
    /// Turn counter when the effect landed; durations only start counting
    /// down after this turn has ended
    pub applied_turn: u32,
}

impl EffectInstance {
    /// Build a ledger record from the skill that fired
    pub fn from_skill(skill: &Skill, source: Slot, owner: Slot, turn: u32) -> Self {
        Self {
            kind: skill.kind.clone(),
            phase: skill.phase,
            value: skill.value.unwrap_or(0),
            basis: skill.basis,
            source,
            owner,
            remaining: skill.duration,
            duration: skill.duration,
            stack: 1,
            max_stack: skill.max_stack,
            applied_turn: turn,
        }
    }

    /// Same skill applied by the same caster to the same character: the
    /// only case that stacks instead of inserting. Matching the kind alone
    /// is not enough; two distinct skills of the same kind must keep
    /// separate entries with their own values and caps.
    fn same_skill(&self, other: &EffectInstance) -> bool {
        self.kind == other.kind
            && self.source == other.source
            && self.owner == other.owner
            && self.value == other.value
            && self.basis == other.basis
            && self.phase == other.phase
            && self.duration == other.duration
            && self.max_stack == other.max_stack
    }

    fn is_debuff(&self) -> bool {
        matches!(self.kind, SkillKind::Effect(_)) && self.value < 0
    }

    fn is_abnormal(&self) -> bool {
        matches!(&self.kind, SkillKind::Action(a) if a.is_abnormal())
    }
}

/// Live effects for the whole battle
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectLedger {
    entries: Vec<EffectInstance>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a new instance, or stack-and-refresh when the same skill from
    /// the same source is still live on the same character and a stack cap
    /// is configured. Returns the resulting stack count.
    pub fn apply(&mut self, effect: EffectInstance) -> u8 {
        if effect.max_stack.is_some() {
            if let Some(existing) = self.entries.iter_mut().find(|e| e.same_skill(&effect)) {
                let cap = existing.max_stack.unwrap_or(u8::MAX);
                existing.stack = existing.stack.saturating_add(1).min(cap);
                existing.remaining = existing.duration;
                return existing.stack;
            }
        }
        let stack = effect.stack;
        self.entries.push(effect);
        stack
    }

    /// Decrement durations of everything owned by `player`'s characters,
    /// removing what reaches zero. Effects applied during the turn that is
    /// ending are left alone, so a self-buff cast this turn survives into
    /// the opponent's turn. Indefinite effects never expire here.
    /// Returns the removed records.
    pub fn tick_turn_end(&mut self, player: Player, turn: u32) -> Vec<EffectInstance> {
        for e in self.entries.iter_mut() {
            if e.owner.player == player && e.applied_turn < turn {
                if let Some(r) = e.remaining.as_mut() {
                    *r = r.saturating_sub(1);
                }
            }
        }
        self.drain(|e| e.owner.player == player && e.remaining == Some(0))
    }

    /// Remove everything matching the predicate, returning the removals
    pub fn drain<F: Fn(&EffectInstance) -> bool>(&mut self, pred: F) -> Vec<EffectInstance> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if pred(&self.entries[i]) {
                removed.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Drop every effect attached to a character (used when it falls)
    pub fn clear_for_character(&mut self, owner: Slot) {
        self.entries.retain(|e| e.owner != owner);
    }

    /// Remove abnormal statuses from a character
    pub fn clear_abnormal(&mut self, owner: Slot) -> Vec<EffectInstance> {
        self.drain(|e| e.owner == owner && e.is_abnormal())
    }

    /// Remove negative modifiers from a character
    pub fn clear_debuffs(&mut self, owner: Slot) -> Vec<EffectInstance> {
        self.drain(|e| e.owner == owner && e.is_debuff())
    }

    /// Summed permille of live modifiers of a kind on a character, scaled
    /// linearly by stack count
    pub fn modifier(&self, owner: Slot, kind: EffectKind) -> i32 {
        self.entries
            .iter()
            .filter(|e| e.owner == owner && e.kind == SkillKind::Effect(kind))
            .map(|e| e.value * e.stack as i32)
            .sum()
    }

    /// Summed permille of live status-action markers of a kind (guard)
    pub fn action_value(&self, owner: Slot, kind: &ActionKind) -> i32 {
        self.entries
            .iter()
            .filter(|e| matches!(&e.kind, SkillKind::Action(a) if a == kind) && e.owner == owner)
            .map(|e| e.value * e.stack as i32)
            .sum()
    }

    /// Whether a status-action marker of the kind is live on the character
    pub fn has_action(&self, owner: Slot, kind: &ActionKind) -> bool {
        self.entries
            .iter()
            .any(|e| e.owner == owner && matches!(&e.kind, SkillKind::Action(a) if a == kind))
    }

    /// Whether an effect of the kind is live on the character
    pub fn has_effect(&self, owner: Slot, kind: EffectKind) -> bool {
        self.entries
            .iter()
            .any(|e| e.owner == owner && e.kind == SkillKind::Effect(kind))
    }

    /// Index of the character taunting on `side`, if a taunt is live.
    /// With several live taunts the most recently applied one wins.
    pub fn taunt_source(&self, side: Player) -> Option<u8> {
        self.entries
            .iter()
            .rev()
            .find(|e| {
                e.owner.player == side && matches!(e.kind, SkillKind::Action(ActionKind::Taunt))
            })
            .map(|e| e.owner.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
