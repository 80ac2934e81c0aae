//! Skill Model: static, declarative skill definitions
//!
//! Skills are pure data. The kind/condition pairings the data model allows
//! are encoded as tagged variants where possible (a turn-based trigger
//! carries its cadence, an ultimate carries its cooldown); everything the
//! type system cannot express is checked by `Skill::validate` before a
//! battle may start.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Permille scale: 1000 = 100%. All magnitudes and probabilities use it.
pub const PERMILLE: i32 = 1000;

/// Elemental attribute of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Fire,
    Water,
    Wind,
    Light,
    Dark,
}

/// Combat role of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Attacker,
    Protector,
    Healer,
    Obstructer,
    Support,
}

/// What event a skill listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillCondition {
    /// Any attack action by the owner (normal or ultimate)
    Attack,
    /// A normal attack by the owner
    NormalAttack,
    /// An ultimate by the owner
    Ultimate,
    /// A guard action by the owner
    Guard,
    /// The owner was attacked
    Attacked,
    /// The owner was healed
    Healed,
    /// Fires every `every` rounds of the owner's side
    TurnBased { every: u8 },
    /// Fires once when the battle starts
    BattleBegin,
    /// Owner HP is above the given fraction of max HP
    HpAbove { permille: i32 },
    /// Owner HP is below the given fraction of max HP
    HpBelow { permille: i32 },
    /// A living ally of the given attribute exists
    ExistCharacter { attribute: Attribute },
}

/// Secondary gate checked in addition to the main condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecondaryCondition {
    HpAbove { permille: i32 },
    HpBelow { permille: i32 },
    ExistCharacter { attribute: Attribute },
}

/// Lifecycle phase within a turn at which a skill fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillPhase {
    TurnBegin,
    BeforeAction,
    OnAction,
    AfterAction,
    ActionEnd,
    TurnEnd,
}

/// Target-selection rule
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillTarget {
    SelfTarget,
    /// Every living ally including the caster
    Team,
    TeamExceptSelf,
    /// The living ally with the lowest current HP
    TeamLowestHp,
    /// The acting side's currently selected enemy target
    SingleEnemy,
    AllEnemies,
    /// Living allies of an elemental attribute
    OfAttribute(Attribute),
    /// Living allies of a combat role
    OfRole(Role),
    /// The leftmost living enemy
    Leftmost,
    /// Explicit ally lineup indices
    Indices(Vec<u8>),
}

/// Which stat a magnitude is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillBasis {
    SelfAtk,
    TargetAtk,
    TargetMaxHp,
    TargetCurrentHp,
    /// The damage just dealt by the action this skill reacts to
    Damage,
}

/// Action kinds: skills that do something when they fire
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    NormalAttack,
    /// Cooldown is part of the variant: an ultimate without one cannot exist
    Ultimate { cooldown: u8 },
    CounterStrike,
    FollowUpAttack,
    /// Ignores every modifier and the shield pool
    RealDamage,
    Guard,
    Heal,
    Shield,
    /// Adjust the target's current ultimate cooldown by `value` turns
    ChangeCd,
    /// Remove sleep/silence/paralysis/taunt from the targets
    ClearAbnormal,
    /// Remove negative stat/damage modifiers from the targets
    ClearDebuff,
    Taunt,
    Sleep,
    Silence,
    Paralysis,
}

impl ActionKind {
    /// Kinds resolved through the damage pipeline
    pub fn deals_damage(&self) -> bool {
        matches!(
            self,
            ActionKind::NormalAttack
                | ActionKind::Ultimate { .. }
                | ActionKind::CounterStrike
                | ActionKind::FollowUpAttack
                | ActionKind::RealDamage
        )
    }

    /// Status afflictions that live in the ledger until they expire
    pub fn is_abnormal(&self) -> bool {
        matches!(
            self,
            ActionKind::Taunt | ActionKind::Sleep | ActionKind::Silence | ActionKind::Paralysis
        )
    }
}

/// Effect kinds: time-bounded modifiers living in the effect ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Modifies the owner's effective attack stat
    AttackPower,
    /// Modifies normal-attack damage dealt by the owner
    NormalAttackDamage,
    /// Modifies ultimate damage dealt by the owner
    UltimateDamage,
    /// Modifies damage taken by the owner
    Damaged,
    /// Modifies normal-attack damage taken by the owner
    NormalAttackDamaged,
    /// Modifies ultimate damage taken by the owner
    UltimateDamaged,
    /// Modifies damage taken by the owner from attackers of the attribute
    AttributeDamaged(Attribute),
    /// Widens the owner's guard reduction
    GuardEffect,
    /// Modifies heals cast by the owner
    HealEffect,
    /// Modifies heals received by the owner
    Healed,
    /// Modifies shields cast by the owner
    ShieldEffect,
    /// Modifies shields received by the owner
    Shielded,
    /// The owner's cooldowns do not count down
    CdFrozen,
    ImmuneSleep,
    ImmuneSilence,
    ImmuneParalysis,
}

impl EffectKind {
    /// True if `value` is required for the kind to mean anything
    fn needs_value(&self) -> bool {
        !matches!(
            self,
            EffectKind::CdFrozen
                | EffectKind::ImmuneSleep
                | EffectKind::ImmuneSilence
                | EffectKind::ImmuneParalysis
        )
    }
}

/// Discriminates action skills from pure-effect skills
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillKind {
    Action(ActionKind),
    Effect(EffectKind),
}

/// A single skill definition. Immutable once authored.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub kind: SkillKind,
    pub condition: SkillCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryCondition>,
    /// Magnitude in permille of the basis stat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<SkillBasis>,
    pub target: SkillTarget,
    pub phase: SkillPhase,
    /// Turns the produced effect lives; None = for the whole battle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stack: Option<u8>,
    /// Trigger probability in permille; None = always
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possibility: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u8>,
    /// Nested skill fired together with this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Box<Skill>>,
}

impl Skill {
    pub fn action(
        kind: ActionKind,
        condition: SkillCondition,
        target: SkillTarget,
        phase: SkillPhase,
    ) -> Self {
        Self::new(SkillKind::Action(kind), condition, target, phase)
    }

    pub fn effect(
        kind: EffectKind,
        condition: SkillCondition,
        target: SkillTarget,
        phase: SkillPhase,
    ) -> Self {
        Self::new(SkillKind::Effect(kind), condition, target, phase)
    }

    fn new(kind: SkillKind, condition: SkillCondition, target: SkillTarget, phase: SkillPhase) -> Self {
        Self {
            kind,
            condition,
            secondary: None,
            value: None,
            basis: None,
            target,
            phase,
            duration: None,
            max_stack: None,
            possibility: None,
            repeat: None,
            extra: None,
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_basis(mut self, basis: SkillBasis) -> Self {
        self.basis = Some(basis);
        self
    }

    pub fn with_secondary(mut self, secondary: SecondaryCondition) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_duration(mut self, turns: u8) -> Self {
        self.duration = Some(turns);
        self
    }

    pub fn with_max_stack(mut self, cap: u8) -> Self {
        self.max_stack = Some(cap);
        self
    }

    pub fn with_possibility(mut self, permille: i32) -> Self {
        self.possibility = Some(permille);
        self
    }

    pub fn with_repeat(mut self, times: u8) -> Self {
        self.repeat = Some(times);
        self
    }

    pub fn with_extra(mut self, extra: Skill) -> Self {
        self.extra = Some(Box::new(extra));
        self
    }

    /// Check the kind/field pairings the type system cannot express.
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        match &self.kind {
            SkillKind::Action(action) => {
                if action.deals_damage()
                    || matches!(action, ActionKind::Heal | ActionKind::Shield)
                {
                    if self.value.is_none() {
                        return Err(format!("{:?} requires a value", action));
                    }
                    if self.basis.is_none() {
                        return Err(format!("{:?} requires a basis", action));
                    }
                }
                if matches!(action, ActionKind::ChangeCd) && self.value.is_none() {
                    return Err("changeCd requires a value".into());
                }
                if matches!(action, ActionKind::Ultimate { cooldown: 0 }) {
                    return Err("ultimate cooldown must be nonzero".into());
                }
            }
            SkillKind::Effect(effect) => {
                if effect.needs_value() && self.value.is_none() {
                    return Err(format!("effect {:?} requires a value", effect));
                }
            }
        }
        if let SkillCondition::TurnBased { every: 0 } = self.condition {
            return Err("turn-based cadence must be nonzero".into());
        }
        if let Some(p) = self.possibility {
            if p <= 0 || p > PERMILLE {
                return Err(format!("possibility {} out of (0, 1000]", p));
            }
        }
        if self.repeat == Some(0) {
            return Err("repeat must be nonzero".into());
        }
        if self.duration == Some(0) {
            return Err("duration must be nonzero".into());
        }
        if self.max_stack == Some(0) {
            return Err("maxStack must be nonzero".into());
        }
        if let SkillTarget::Indices(indices) = &self.target {
            if indices.is_empty() {
                return Err("explicit target index list is empty".into());
            }
        }
        if let Some(extra) = &self.extra {
            extra.validate()?;
        }
        Ok(())
    }
}

/// A character's full set of skills
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSet {
    pub normal_attack: Vec<Skill>,
    pub ultimate: Vec<Skill>,
    pub passive: Vec<Skill>,
}

impl SkillSet {
    /// The cooldown carried by the ultimate part of the set, if any
    pub fn ultimate_cooldown(&self) -> Option<u8> {
        self.ultimate.iter().find_map(|s| match &s.kind {
            SkillKind::Action(ActionKind::Ultimate { cooldown }) => Some(*cooldown),
            _ => None,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        for skill in self
            .normal_attack
            .iter()
            .chain(self.ultimate.iter())
            .chain(self.passive.iter())
        {
            skill.validate()?;
        }
        if !self.normal_attack.is_empty()
            && !self
                .normal_attack
                .iter()
                .any(|s| matches!(s.kind, SkillKind::Action(ActionKind::NormalAttack)))
        {
            return Err("normal attack set has no normalAttack action".into());
        }
        if !self.ultimate.is_empty() && self.ultimate_cooldown().is_none() {
            return Err("ultimate set has no ultimate action with a cooldown".into());
        }
        Ok(())
    }
}
