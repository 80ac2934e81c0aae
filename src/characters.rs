//! Character catalog: base stats and skill sets keyed by character id
//!
//! The catalog is read-only input to the battle engine. A built-in starter
//! cast is provided for the companion tool's default teams; external
//! catalogs load from JSON and are validated before any battle starts.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::{BattleError, BattleResult};
use crate::skills::{
    ActionKind, Attribute, EffectKind, Role, Skill, SkillBasis, SkillCondition, SkillPhase,
    SkillSet, SkillTarget,
};

/// Unique identifier for characters
pub type CharacterId = u32;

/// Static character definition: identity, base stats, skills
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    pub id: CharacterId,
    pub name: String,
    pub attribute: Attribute,
    pub role: Role,
    pub atk: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub skills: SkillSet,
}

impl CharacterData {
    pub fn new(
        id: CharacterId,
        name: &str,
        attribute: Attribute,
        role: Role,
        atk: i32,
        max_hp: i32,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            attribute,
            role,
            atk,
            max_hp,
            skills: SkillSet::default(),
        }
    }

    pub fn with_skills(mut self, skills: SkillSet) -> Self {
        self.skills = skills;
        self
    }

    /// Full load-time check; a failure blocks battle start
    pub fn validate(&self) -> BattleResult<()> {
        if self.max_hp <= 0 || self.atk < 0 {
            return Err(BattleError::DataIntegrity {
                character: self.id,
                detail: "non-positive max HP or negative attack".to_string(),
            });
        }
        self.skills
            .validate()
            .map_err(|detail| BattleError::DataIntegrity {
                character: self.id,
                detail,
            })
    }
}

/// Find a character definition by id
pub fn find_character(catalog: &[CharacterData], id: CharacterId) -> Option<&CharacterData> {
    catalog.iter().find(|c| c.id == id)
}

/// Parse and validate an external JSON catalog
pub fn load_catalog(json: &str) -> BattleResult<Vec<CharacterData>> {
    let catalog: Vec<CharacterData> =
        serde_json::from_str(json).map_err(|e| BattleError::DataIntegrity {
            character: 0,
            detail: e.to_string(),
        })?;
    for data in &catalog {
        data.validate()?;
    }
    Ok(catalog)
}

/// A zero-attack practice dummy for the "scarecrow" enemy option
pub fn scarecrow() -> CharacterData {
    CharacterData::new(999, "Scarecrow", Attribute::Light, Role::Protector, 0, 10_000)
}

fn basic_normal_attack(permille: i32) -> Vec<Skill> {
    vec![Skill::action(
        ActionKind::NormalAttack,
        SkillCondition::NormalAttack,
        SkillTarget::SingleEnemy,
        SkillPhase::OnAction,
    )
    .with_value(permille)
    .with_basis(SkillBasis::SelfAtk)]
}

/// The built-in starter cast
pub fn builtin_catalog() -> Vec<CharacterData> {
    vec![
        CharacterData::new(1, "Ember Duelist", Attribute::Fire, Role::Attacker, 120, 900)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(1000),
                ultimate: vec![Skill::action(
                    ActionKind::Ultimate { cooldown: 4 },
                    SkillCondition::Ultimate,
                    SkillTarget::AllEnemies,
                    SkillPhase::OnAction,
                )
                .with_value(1800)
                .with_basis(SkillBasis::SelfAtk)],
                passive: vec![Skill::effect(
                    EffectKind::AttackPower,
                    SkillCondition::BattleBegin,
                    SkillTarget::SelfTarget,
                    SkillPhase::TurnBegin,
                )
                .with_value(100)],
            }),
        CharacterData::new(2, "Tide Cleric", Attribute::Water, Role::Healer, 90, 1000)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(800),
                ultimate: vec![
                    Skill::action(
                        ActionKind::Ultimate { cooldown: 3 },
                        SkillCondition::Ultimate,
                        SkillTarget::Team,
                        SkillPhase::OnAction,
                    )
                    .with_value(1200)
                    .with_basis(SkillBasis::SelfAtk),
                    Skill::action(
                        ActionKind::ClearAbnormal,
                        SkillCondition::Ultimate,
                        SkillTarget::Team,
                        SkillPhase::AfterAction,
                    ),
                ],
                passive: vec![Skill::action(
                    ActionKind::Heal,
                    SkillCondition::TurnBased { every: 2 },
                    SkillTarget::TeamLowestHp,
                    SkillPhase::TurnEnd,
                )
                .with_value(600)
                .with_basis(SkillBasis::SelfAtk)],
            }),
        CharacterData::new(3, "Gale Trickster", Attribute::Wind, Role::Obstructer, 100, 850)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(900),
                ultimate: vec![
                    Skill::action(
                        ActionKind::Ultimate { cooldown: 4 },
                        SkillCondition::Ultimate,
                        SkillTarget::SingleEnemy,
                        SkillPhase::OnAction,
                    )
                    .with_value(1000)
                    .with_basis(SkillBasis::SelfAtk),
                    Skill::action(
                        ActionKind::Sleep,
                        SkillCondition::Ultimate,
                        SkillTarget::SingleEnemy,
                        SkillPhase::AfterAction,
                    )
                    .with_duration(1),
                ],
                passive: vec![Skill::action(
                    ActionKind::CounterStrike,
                    SkillCondition::Attacked,
                    SkillTarget::SingleEnemy,
                    SkillPhase::ActionEnd,
                )
                .with_value(600)
                .with_basis(SkillBasis::SelfAtk)
                .with_possibility(500)],
            }),
        CharacterData::new(4, "Aegis Warden", Attribute::Light, Role::Protector, 80, 1400)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(800),
                ultimate: vec![Skill::action(
                    ActionKind::Ultimate { cooldown: 3 },
                    SkillCondition::Ultimate,
                    SkillTarget::SingleEnemy,
                    SkillPhase::OnAction,
                )
                .with_value(700)
                .with_basis(SkillBasis::SelfAtk)
                .with_extra(
                    Skill::action(
                        ActionKind::Shield,
                        SkillCondition::Ultimate,
                        SkillTarget::Team,
                        SkillPhase::AfterAction,
                    )
                    .with_value(800)
                    .with_basis(SkillBasis::SelfAtk),
                )],
                passive: vec![
                    Skill::action(
                        ActionKind::Taunt,
                        SkillCondition::BattleBegin,
                        SkillTarget::SelfTarget,
                        SkillPhase::TurnBegin,
                    )
                    .with_duration(2),
                    Skill::effect(
                        EffectKind::Damaged,
                        SkillCondition::BattleBegin,
                        SkillTarget::SelfTarget,
                        SkillPhase::TurnBegin,
                    )
                    .with_value(-100),
                ],
            }),
        CharacterData::new(5, "Night Reaper", Attribute::Dark, Role::Attacker, 130, 800)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(1000),
                ultimate: vec![Skill::action(
                    ActionKind::Ultimate { cooldown: 5 },
                    SkillCondition::Ultimate,
                    SkillTarget::SingleEnemy,
                    SkillPhase::OnAction,
                )
                .with_value(300)
                .with_basis(SkillBasis::TargetCurrentHp)],
                passive: vec![Skill::action(
                    ActionKind::FollowUpAttack,
                    SkillCondition::NormalAttack,
                    SkillTarget::SingleEnemy,
                    SkillPhase::AfterAction,
                )
                .with_value(500)
                .with_basis(SkillBasis::SelfAtk)
                .with_possibility(400)],
            }),
        CharacterData::new(6, "Dawn Chanter", Attribute::Light, Role::Support, 95, 950)
            .with_skills(SkillSet {
                normal_attack: basic_normal_attack(800),
                ultimate: vec![
                    Skill::action(
                        ActionKind::Ultimate { cooldown: 4 },
                        SkillCondition::Ultimate,
                        SkillTarget::SingleEnemy,
                        SkillPhase::OnAction,
                    )
                    .with_value(900)
                    .with_basis(SkillBasis::SelfAtk),
                    Skill::effect(
                        EffectKind::AttackPower,
                        SkillCondition::Ultimate,
                        SkillTarget::Team,
                        SkillPhase::AfterAction,
                    )
                    .with_value(150)
                    .with_duration(3),
                ],
                passive: vec![Skill::effect(
                    EffectKind::AttackPower,
                    SkillCondition::Attack,
                    SkillTarget::SelfTarget,
                    SkillPhase::ActionEnd,
                )
                .with_value(50)
                .with_max_stack(3)],
            }),
    ]
}
