mod effects;
mod resolve;

use crate::battle::{resolve, start_battle, BattleEvent, Move};
use crate::characters::CharacterData;
use crate::rng::XorShiftRng;
use crate::skills::*;
use crate::state::{BattleState, Player, Slot};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

fn basic_attack(permille: i32) -> Vec<Skill> {
    vec![Skill::action(
        ActionKind::NormalAttack,
        SkillCondition::NormalAttack,
        SkillTarget::SingleEnemy,
        SkillPhase::OnAction,
    )
    .with_value(permille)
    .with_basis(SkillBasis::SelfAtk)]
}

/// A plain attacker with a 100% ATK normal attack and nothing else
fn striker(id: u32, atk: i32, hp: i32) -> CharacterData {
    CharacterData::new(id, "Striker", Attribute::Fire, Role::Attacker, atk, hp).with_skills(
        SkillSet {
            normal_attack: basic_attack(1000),
            ultimate: vec![],
            passive: vec![],
        },
    )
}

/// A skill-less punching bag
fn sandbag(id: u32, hp: i32) -> CharacterData {
    CharacterData::new(id, "Sandbag", Attribute::Light, Role::Protector, 0, hp)
}

fn with_passive(data: CharacterData, passive: Skill) -> CharacterData {
    let mut skills = data.skills.clone();
    skills.passive.push(passive);
    data.with_skills(skills)
}

fn with_ultimate(data: CharacterData, ultimate: Vec<Skill>) -> CharacterData {
    let mut skills = data.skills.clone();
    skills.ultimate = ultimate;
    data.with_skills(skills)
}

/// Lineups installed but the battle not yet started
fn prepare(one: &[CharacterData], two: &[CharacterData]) -> BattleState {
    let mut state = BattleState::new();
    state.set_lineup(Player::One, one).unwrap();
    state.set_lineup(Player::Two, two).unwrap();
    state
}

/// Lineups installed and the battle started; player one to move
fn start(one: &[CharacterData], two: &[CharacterData]) -> BattleState {
    let mut state = prepare(one, two);
    let mut rng = XorShiftRng::seed_from_u64(1);
    start_battle(&mut state, &mut rng).unwrap();
    state
}

/// Resolve one move with a fixed-seed RNG, panicking on rejection
fn play(state: &mut BattleState, player: Player, mv: Move) -> Vec<BattleEvent> {
    let mut rng = XorShiftRng::seed_from_u64(7);
    resolve(state, player, &mv, &mut rng).unwrap()
}

fn hp_of(state: &BattleState, player: Player, index: u8) -> i32 {
    state
        .character(Slot::new(player, index))
        .map(|c| c.current_hp)
        .unwrap()
}

fn damage_amounts(events: &[BattleEvent]) -> Vec<i32> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::Damage { amount, .. } => Some(*amount),
            _ => None,
        })
        .collect()
}
