use crate::effects::{EffectInstance, EffectLedger};
use crate::tests::*;

fn slot(player: Player, index: u8) -> Slot {
    Slot::new(player, index)
}

fn buff(value: i32, duration: Option<u8>, max_stack: Option<u8>, turn: u32) -> EffectInstance {
    let mut skill = Skill::effect(
        EffectKind::AttackPower,
        SkillCondition::BattleBegin,
        SkillTarget::SelfTarget,
        SkillPhase::TurnBegin,
    )
    .with_value(value);
    skill.duration = duration;
    skill.max_stack = max_stack;
    EffectInstance::from_skill(&skill, slot(Player::One, 0), slot(Player::One, 0), turn)
}

#[test]
fn test_stack_caps_and_refreshes() {
    let mut ledger = EffectLedger::new();
    for _ in 0..5 {
        ledger.apply(buff(50, Some(3), Some(3), 1));
    }
    assert_eq!(ledger.len(), 1);
    // Value scales linearly with stacks, capped at the configured maximum
    assert_eq!(
        ledger.modifier(slot(Player::One, 0), EffectKind::AttackPower),
        150
    );
}

#[test]
fn test_distinct_skills_of_same_kind_keep_separate_entries() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(50, None, Some(3), 1));
    ledger.apply(buff(200, None, Some(2), 1));

    // Same kind, source and owner, but different magnitudes and caps:
    // these are different skills and must not fold into one entry
    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger.modifier(slot(Player::One, 0), EffectKind::AttackPower),
        250
    );

    // Each still stacks against its own entry
    ledger.apply(buff(50, None, Some(3), 1));
    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger.modifier(slot(Player::One, 0), EffectKind::AttackPower),
        300
    );
}

#[test]
fn test_unstackable_duplicates_coexist() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(100, None, None, 1));
    ledger.apply(buff(100, None, None, 1));
    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger.modifier(slot(Player::One, 0), EffectKind::AttackPower),
        200
    );
}

#[test]
fn test_duration_tick_and_grace_turn() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(100, Some(1), None, 3));

    // The turn the effect landed does not count against its duration
    assert!(ledger.tick_turn_end(Player::One, 3).is_empty());
    assert_eq!(ledger.len(), 1);

    // Ticking the other side never touches it
    assert!(ledger.tick_turn_end(Player::Two, 4).is_empty());

    let expired = ledger.tick_turn_end(Player::One, 5);
    assert_eq!(expired.len(), 1);
    assert!(ledger.is_empty());
}

#[test]
fn test_indefinite_effects_never_expire() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(100, None, None, 1));
    for turn in 2..50 {
        assert!(ledger.tick_turn_end(Player::One, turn).is_empty());
    }
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_clear_abnormal_leaves_modifiers() {
    let mut ledger = EffectLedger::new();
    let owner = slot(Player::Two, 1);
    let sleep = Skill::action(
        ActionKind::Sleep,
        SkillCondition::Ultimate,
        SkillTarget::SingleEnemy,
        SkillPhase::AfterAction,
    )
    .with_duration(2);
    ledger.apply(EffectInstance::from_skill(
        &sleep,
        slot(Player::One, 0),
        owner,
        1,
    ));
    ledger.apply(buff(-100, None, None, 1));

    let removed = ledger.clear_abnormal(owner);
    assert_eq!(removed.len(), 1);
    assert!(!ledger.has_action(owner, &ActionKind::Sleep));
    // The debuff on the other character is untouched
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_clear_debuffs_keeps_buffs() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(100, None, None, 1));
    ledger.apply(buff(-50, None, None, 1));
    let removed = ledger.clear_debuffs(slot(Player::One, 0));
    assert_eq!(removed.len(), 1);
    assert_eq!(
        ledger.modifier(slot(Player::One, 0), EffectKind::AttackPower),
        100
    );
}

#[test]
fn test_taunt_source() {
    let mut ledger = EffectLedger::new();
    assert_eq!(ledger.taunt_source(Player::Two), None);
    let taunt = Skill::action(
        ActionKind::Taunt,
        SkillCondition::BattleBegin,
        SkillTarget::SelfTarget,
        SkillPhase::TurnBegin,
    )
    .with_duration(2);
    let owner = slot(Player::Two, 3);
    ledger.apply(EffectInstance::from_skill(&taunt, owner, owner, 1));
    assert_eq!(ledger.taunt_source(Player::Two), Some(3));
    assert_eq!(ledger.taunt_source(Player::One), None);
}

#[test]
fn test_latest_taunt_takes_over() {
    let mut ledger = EffectLedger::new();
    let taunt = Skill::action(
        ActionKind::Taunt,
        SkillCondition::BattleBegin,
        SkillTarget::SelfTarget,
        SkillPhase::TurnBegin,
    )
    .with_duration(3);
    let first = slot(Player::Two, 1);
    let second = slot(Player::Two, 3);
    ledger.apply(EffectInstance::from_skill(&taunt, first, first, 1));
    ledger.apply(EffectInstance::from_skill(&taunt, second, second, 2));

    // With two live taunts the newer one redirects targeting
    assert_eq!(ledger.taunt_source(Player::Two), Some(3));

    // When it drops, the earlier taunt is in charge again
    ledger.clear_for_character(second);
    assert_eq!(ledger.taunt_source(Player::Two), Some(1));
}

#[test]
fn test_clear_for_character_drops_everything() {
    let mut ledger = EffectLedger::new();
    ledger.apply(buff(100, None, None, 1));
    ledger.apply(buff(-50, Some(2), None, 1));
    ledger.clear_for_character(slot(Player::One, 0));
    assert!(ledger.is_empty());
}
