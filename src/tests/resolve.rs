use crate::error::{BattleError, MoveRejection};
use crate::tests::*;

#[test]
fn test_basic_attack_arithmetic() {
    let mut state = start(&[striker(1, 100, 1000)], &[sandbag(2, 1000)]);
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });

    // 100 ATK at 100% with no modifiers lands for exactly 100
    assert_eq!(damage_amounts(&events), vec![100]);
    assert_eq!(hp_of(&state, Player::Two, 0), 900);
}

#[test]
fn test_switches_do_not_consume_turn() {
    let mut state = start(
        &[striker(1, 10, 100), striker(2, 10, 100)],
        &[sandbag(3, 100), sandbag(4, 100)],
    );
    play(&mut state, Player::One, Move::SwitchMember { index: 1 });
    play(&mut state, Player::One, Move::SwitchTarget { index: 1 });
    assert_eq!(state.turn, 1);
    assert_eq!(*state.selected.get(Player::One), 1);
    assert_eq!(*state.target.get(Player::One), 1);

    play(&mut state, Player::One, Move::Attack { from: 1, to: 1 });
    assert_eq!(state.turn, 2);
}

#[test]
fn test_shield_absorbs_before_hp() {
    let shielded = with_passive(
        sandbag(2, 1000),
        Skill::action(
            ActionKind::Shield,
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_value(600)
        .with_basis(SkillBasis::TargetMaxHp),
    );
    // Shield of 60% of 1000 max HP = 600
    let mut state = start(&[striker(1, 1000, 1000)], &[shielded]);
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });

    let absorbed = events
        .iter()
        .find_map(|e| match e {
            BattleEvent::Damage {
                shield_absorbed, ..
            } => Some(*shield_absorbed),
            _ => None,
        })
        .unwrap();
    assert_eq!(absorbed, 600);
    assert_eq!(hp_of(&state, Player::Two, 0), 600);
    assert_eq!(
        state
            .character(Slot::new(Player::Two, 0))
            .unwrap()
            .shield,
        0
    );
}

#[test]
fn test_guard_halves_incoming_damage() {
    let mut state = start(&[striker(1, 100, 1000)], &[striker(2, 100, 1000)]);
    play(&mut state, Player::One, Move::Guard { index: 0 });
    let events = play(&mut state, Player::Two, Move::Attack { from: 0, to: 0 });

    assert_eq!(damage_amounts(&events), vec![50]);
    assert_eq!(hp_of(&state, Player::One, 0), 950);

    // The guard is gone by the guarding side's next turn end
    play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    let events = play(&mut state, Player::Two, Move::Attack { from: 0, to: 0 });
    assert_eq!(damage_amounts(&events), vec![100]);
}

#[test]
fn test_attribute_vulnerability_keys_on_attacker_attribute() {
    let vulnerable = with_passive(
        sandbag(2, 1000),
        Skill::effect(
            EffectKind::AttributeDamaged(Attribute::Fire),
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_value(500),
    );

    // A fire attacker pays the +50% elemental penalty
    let mut state = start(&[striker(1, 100, 1000)], &[vulnerable.clone()]);
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert_eq!(damage_amounts(&events), vec![150]);

    // A water attacker with the same stats lands plain damage
    let water = CharacterData::new(3, "Torrent", Attribute::Water, Role::Attacker, 100, 1000)
        .with_skills(SkillSet {
            normal_attack: basic_attack(1000),
            ultimate: vec![],
            passive: vec![],
        });
    let mut state = start(&[water], &[vulnerable]);
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert_eq!(damage_amounts(&events), vec![100]);
}

#[test]
fn test_incoming_modifier_is_per_action_class() {
    let warded = with_passive(
        sandbag(2, 10_000),
        Skill::effect(
            EffectKind::NormalAttackDamaged,
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_value(-500),
    );
    let attacker = with_ultimate(
        striker(1, 100, 10_000),
        vec![Skill::action(
            ActionKind::Ultimate { cooldown: 2 },
            SkillCondition::Ultimate,
            SkillTarget::SingleEnemy,
            SkillPhase::OnAction,
        )
        .with_value(2000)
        .with_basis(SkillBasis::SelfAtk)],
    );
    let mut state = start(&[attacker], &[warded]);

    // The ward halves normal hits only
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert_eq!(damage_amounts(&events), vec![50]);

    // The ultimate is a different action class and lands in full
    play(&mut state, Player::Two, Move::Attack { from: 0, to: 0 });
    let events = play(&mut state, Player::One, Move::Ultimate { from: 0, to: 0 });
    assert_eq!(damage_amounts(&events), vec![200]);
}

#[test]
fn test_shield_received_modifier() {
    // The effect lands before the battle-begin shield of the same holder
    let bulwark = with_passive(
        with_passive(
            sandbag(2, 1000),
            Skill::effect(
                EffectKind::Shielded,
                SkillCondition::BattleBegin,
                SkillTarget::SelfTarget,
                SkillPhase::TurnBegin,
            )
            .with_value(1000),
        ),
        Skill::action(
            ActionKind::Shield,
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_value(500)
        .with_basis(SkillBasis::TargetMaxHp),
    );
    let state = start(&[striker(1, 10, 100)], &[bulwark]);
    assert_eq!(
        state.character(Slot::new(Player::Two, 0)).unwrap().shield,
        1000
    );
}

#[test]
fn test_ultimate_cooldown_counts_down() {
    let attacker = with_ultimate(
        striker(1, 100, 10_000),
        vec![Skill::action(
            ActionKind::Ultimate { cooldown: 2 },
            SkillCondition::Ultimate,
            SkillTarget::SingleEnemy,
            SkillPhase::OnAction,
        )
        .with_value(2000)
        .with_basis(SkillBasis::SelfAtk)],
    );
    let mut state = start(&[attacker], &[sandbag(2, 100_000)]);
    play(&mut state, Player::One, Move::Ultimate { from: 0, to: 0 });
    assert_eq!(
        state.character(Slot::new(Player::One, 0)).unwrap().ultimate_cd,
        2
    );

    // cd ticks at the start of each of the owner's turns
    play(&mut state, Player::Two, Move::Guard { index: 0 });
    assert_eq!(
        state.character(Slot::new(Player::One, 0)).unwrap().ultimate_cd,
        1
    );
    play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    play(&mut state, Player::Two, Move::Guard { index: 0 });
    assert_eq!(
        state.character(Slot::new(Player::One, 0)).unwrap().ultimate_cd,
        0
    );
    assert!(crate::legality::can_ultimate(&state, Player::One, 0, 0));
}

#[test]
fn test_real_damage_pierces_shield() {
    let shielded = with_passive(
        sandbag(2, 1000),
        Skill::action(
            ActionKind::Shield,
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_value(1000)
        .with_basis(SkillBasis::TargetMaxHp),
    );
    let piercer = with_ultimate(
        striker(1, 100, 1000),
        vec![
            Skill::action(
                ActionKind::Ultimate { cooldown: 3 },
                SkillCondition::Ultimate,
                SkillTarget::SingleEnemy,
                SkillPhase::OnAction,
            )
            .with_value(1000)
            .with_basis(SkillBasis::SelfAtk),
            Skill::action(
                ActionKind::RealDamage,
                SkillCondition::Ultimate,
                SkillTarget::SingleEnemy,
                SkillPhase::AfterAction,
            )
            .with_value(300)
            .with_basis(SkillBasis::TargetMaxHp),
        ],
    );
    let mut state = start(&[piercer], &[shielded]);
    let events = play(&mut state, Player::One, Move::Ultimate { from: 0, to: 0 });

    // Ultimate hit (100) eats shield; real damage (300) goes straight to HP
    assert_eq!(damage_amounts(&events), vec![100, 300]);
    assert_eq!(hp_of(&state, Player::Two, 0), 700);
}

#[test]
fn test_gameover_is_monotonic() {
    let mut state = start(&[striker(1, 500, 1000)], &[sandbag(2, 100)]);
    let events = play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert!(events
        .iter()
        .any(|e| matches!(e, BattleEvent::GameOver { winner: Player::One })));
    assert_eq!(state.gameover, Some(Player::One));

    // No further moves are accepted once a winner is decided
    let mut rng = XorShiftRng::seed_from_u64(7);
    let err = crate::battle::resolve(
        &mut state,
        Player::Two,
        &Move::Guard { index: 0 },
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BattleError::IllegalMove {
            reason: MoveRejection::BattleOver,
            ..
        }
    ));
    // Exactly one game-over event in the whole log
    let overs = state
        .log
        .iter()
        .filter(|e| matches!(e, BattleEvent::GameOver { .. }))
        .count();
    assert_eq!(overs, 1);
}

#[test]
fn test_fallen_character_loses_effects() {
    let buffed = with_passive(
        with_passive(
            sandbag(2, 100),
            Skill::effect(
                EffectKind::AttackPower,
                SkillCondition::BattleBegin,
                SkillTarget::SelfTarget,
                SkillPhase::TurnBegin,
            )
            .with_value(100),
        ),
        Skill::action(
            ActionKind::Taunt,
            SkillCondition::BattleBegin,
            SkillTarget::SelfTarget,
            SkillPhase::TurnBegin,
        )
        .with_duration(5),
    );
    let mut state = start(&[striker(1, 500, 1000)], &[buffed, sandbag(3, 1000)]);
    assert_eq!(state.effects.len(), 2);

    play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert!(state.effects.is_empty());
    // With the taunter down, the other slot becomes targetable
    assert_eq!(state.effects.taunt_source(Player::Two), None);
}

#[test]
fn test_heal_clamps_at_max_hp() {
    let healer = with_ultimate(
        with_passive(
            striker(1, 100, 1000),
            Skill::action(
                ActionKind::Heal,
                SkillCondition::TurnBased { every: 1 },
                SkillTarget::SelfTarget,
                SkillPhase::TurnEnd,
            )
            .with_value(5000)
            .with_basis(SkillBasis::SelfAtk),
        ),
        vec![],
    );
    let mut state = start(&[healer], &[striker(2, 30, 1000)]);
    // Take a scratch, then overheal at turn end
    play(&mut state, Player::One, Move::Guard { index: 0 });
    play(&mut state, Player::Two, Move::Attack { from: 0, to: 0 });
    play(&mut state, Player::One, Move::Attack { from: 0, to: 0 });
    assert_eq!(hp_of(&state, Player::One, 0), 1000);
}
