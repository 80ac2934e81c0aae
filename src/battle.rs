//! Combat Resolver: turn lifecycle, skill firing, and the damage pipeline
//!
//! Every mutation of battle state happens here, behind the legality gate.
//! Resolution is event-sourced: each accepted move returns the ordered
//! `BattleEvent`s it produced, and the same events are appended to the
//! state's log for UI playback.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::effects::EffectInstance;
use crate::error::{BattleError, BattleResult};
use crate::legality;
use crate::rng::BattleRng;
use crate::skills::{
    ActionKind, EffectKind, SecondaryCondition, Skill, SkillBasis, SkillCondition, SkillKind,
    SkillPhase, SkillTarget, PERMILLE,
};
use crate::state::{BattleState, Player, Slot};

/// Bound on nested skill triggering (extras firing extras)
pub const MAX_TRIGGER_DEPTH: u8 = 8;

/// Fraction of incoming damage a plain guard absorbs, in permille
const GUARD_REDUCTION: i32 = 500;

/// A move a player can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Move {
    /// Change the acting member; does not consume the turn
    SwitchMember { index: u8 },
    /// Change the enemy target; does not consume the turn
    SwitchTarget { index: u8 },
    Attack { from: u8, to: u8 },
    Ultimate { from: u8, to: u8 },
    Guard { index: u8 },
}

/// One observable step of battle resolution
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleEvent {
    BattleStart,
    TurnStart { turn: u32, player: Player },
    TurnEnd { turn: u32, player: Player },
    MemberSwitched { player: Player, index: u8 },
    TargetSwitched { player: Player, index: u8 },
    SkillTriggered { slot: Slot, kind: SkillKind },
    Damage {
        slot: Slot,
        amount: i32,
        shield_absorbed: i32,
        remaining_hp: i32,
    },
    Healed { slot: Slot, amount: i32, remaining_hp: i32 },
    ShieldGained { slot: Slot, amount: i32 },
    EffectApplied { slot: Slot, kind: SkillKind, stack: u8 },
    EffectExpired { slot: Slot, kind: SkillKind },
    StatusResisted { slot: Slot, kind: ActionKind },
    CooldownChanged { slot: Slot, cd: u8 },
    Guarded { slot: Slot },
    CharacterFallen { slot: Slot },
    GameOver { winner: Player },
}

/// Which kind of action is being performed, for condition matching and
/// outgoing-damage modifier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionCategory {
    Normal,
    Ultimate,
    Guard,
}

const ACTION_PHASES: [SkillPhase; 4] = [
    SkillPhase::BeforeAction,
    SkillPhase::OnAction,
    SkillPhase::AfterAction,
    SkillPhase::ActionEnd,
];

/// Start a prepared battle: fire battle-begin passives on both sides,
/// then open player one's first turn.
pub fn start_battle(
    state: &mut BattleState,
    rng: &mut dyn BattleRng,
) -> BattleResult<Vec<BattleEvent>> {
    if state.turn != 0 {
        return Err(BattleError::IllegalMove {
            player: state.player_to_move(),
            reason: crate::error::MoveRejection::BattleAlreadyStarted,
        });
    }
    for player in [Player::One, Player::Two] {
        if state.lineups.get(player).is_empty() {
            return Err(BattleError::DataIntegrity {
                character: 0,
                detail: "a side has no lineup".to_string(),
            });
        }
    }

    let mut events = vec![BattleEvent::BattleStart];
    for player in [Player::One, Player::Two] {
        for index in state.living_indices(player) {
            let slot = Slot::new(player, index);
            let passives = match state.character(slot) {
                Some(c) => c.skills.passive.clone(),
                None => continue,
            };
            let foe = default_enemy(state, player);
            for skill in &passives {
                if skill.condition == SkillCondition::BattleBegin {
                    fire_skill(state, slot, skill, foe, &mut 0, rng, &mut events, 0);
                }
            }
        }
    }

    state.turn = 1;
    events.push(BattleEvent::TurnStart {
        turn: 1,
        player: Player::One,
    });
    fire_ambient(state, Player::One, SkillPhase::TurnBegin, rng, &mut events);

    state.log.extend(events.iter().cloned());
    Ok(events)
}

/// Resolve one move for `player`. Rejected moves leave the state
/// untouched; accepted actions run to completion and advance the turn.
pub fn resolve(
    state: &mut BattleState,
    player: Player,
    mv: &Move,
    rng: &mut dyn BattleRng,
) -> BattleResult<Vec<BattleEvent>> {
    legality::check(state, player, mv)
        .map_err(|reason| BattleError::IllegalMove { player, reason })?;

    let mut events = Vec::new();
    match mv {
        Move::SwitchMember { index } => {
            *state.selected.get_mut(player) = *index;
            events.push(BattleEvent::MemberSwitched {
                player,
                index: *index,
            });
        }
        Move::SwitchTarget { index } => {
            *state.target.get_mut(player) = *index;
            events.push(BattleEvent::TargetSwitched {
                player,
                index: *index,
            });
        }
        Move::Attack { from, to } => {
            *state.selected.get_mut(player) = *from;
            *state.target.get_mut(player) = *to;
            perform_action(state, player, ActionCategory::Normal, rng, &mut events);
            end_turn(state, player, rng, &mut events);
        }
        Move::Ultimate { from, to } => {
            *state.selected.get_mut(player) = *from;
            *state.target.get_mut(player) = *to;
            perform_action(state, player, ActionCategory::Ultimate, rng, &mut events);
            end_turn(state, player, rng, &mut events);
        }
        Move::Guard { index } => {
            *state.selected.get_mut(player) = *index;
            perform_action(state, player, ActionCategory::Guard, rng, &mut events);
            end_turn(state, player, rng, &mut events);
        }
    }

    state.log.extend(events.iter().cloned());
    Ok(events)
}

/// The acting side's current enemy target, used as the reference target
/// for passives that fire outside an explicit attack.
fn default_enemy(state: &BattleState, player: Player) -> Slot {
    Slot::new(player.opponent(), *state.target.get(player))
}

fn perform_action(
    state: &mut BattleState,
    player: Player,
    category: ActionCategory,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
) {
    let actor = Slot::new(player, *state.selected.get(player));
    let enemy = default_enemy(state, player);

    // An incapacitated character can only struggle: the turn passes but
    // no guard effect is raised
    if category == ActionCategory::Guard
        && (state.effects.has_action(actor, &ActionKind::Sleep)
            || state.effects.has_action(actor, &ActionKind::Paralysis))
    {
        return;
    }

    let (mut parts, passives) = match state.character(actor) {
        Some(c) => {
            let parts = match category {
                ActionCategory::Normal => c.skills.normal_attack.clone(),
                ActionCategory::Ultimate => c.skills.ultimate.clone(),
                ActionCategory::Guard => vec![guard_skill()],
            };
            (parts, c.skills.passive.clone())
        }
        None => return,
    };

    if category == ActionCategory::Ultimate {
        if let Some(cooldown) = state
            .character(actor)
            .and_then(|c| c.skills.ultimate_cooldown())
        {
            if let Some(c) = state.character_mut(actor) {
                c.ultimate_cd = cooldown;
            }
            events.push(BattleEvent::CooldownChanged {
                slot: actor,
                cd: cooldown,
            });
        }
    }

    // Attacker passives reacting to its own action
    parts.extend(passives.iter().filter(|s| reacts_to(s, category)).cloned());

    // Defender passives reacting to being attacked fire after the
    // attacker's parts of the same phase, and only while the defender
    // still stands.
    let defender_reactions: Vec<Skill> = if category != ActionCategory::Guard {
        state
            .character(enemy)
            .map(|c| {
                c.skills
                    .passive
                    .iter()
                    .filter(|s| s.condition == SkillCondition::Attacked)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut last_damage = 0;
    for phase in ACTION_PHASES {
        if state.gameover.is_some() {
            break;
        }
        for skill in parts.iter().filter(|s| s.phase == phase) {
            fire_skill(state, actor, skill, enemy, &mut last_damage, rng, events, 0);
            if state.gameover.is_some() {
                return;
            }
        }
        let defender_alive = state.character(enemy).map(|c| !c.is_fallen()).unwrap_or(false);
        if defender_alive && last_damage > 0 {
            for skill in defender_reactions.iter().filter(|s| s.phase == phase) {
                fire_skill(state, enemy, skill, actor, &mut last_damage, rng, events, 0);
                if state.gameover.is_some() {
                    return;
                }
            }
        }
    }
}

fn reacts_to(skill: &Skill, category: ActionCategory) -> bool {
    match skill.condition {
        SkillCondition::Attack => {
            matches!(category, ActionCategory::Normal | ActionCategory::Ultimate)
        }
        SkillCondition::NormalAttack => category == ActionCategory::Normal,
        SkillCondition::Ultimate => category == ActionCategory::Ultimate,
        SkillCondition::Guard => category == ActionCategory::Guard,
        _ => false,
    }
}

/// The implicit skill behind the guard move
fn guard_skill() -> Skill {
    Skill::action(
        ActionKind::Guard,
        SkillCondition::Guard,
        SkillTarget::SelfTarget,
        SkillPhase::OnAction,
    )
    .with_value(GUARD_REDUCTION)
    .with_duration(1)
}

/// Fire one skill: gate it, pick targets, and dispatch per kind.
/// `main_target` is the slot the surrounding action is aimed at; for a
/// defender's reaction it is the attacker.
#[allow(clippy::too_many_arguments)]
fn fire_skill(
    state: &mut BattleState,
    caster: Slot,
    skill: &Skill,
    main_target: Slot,
    last_damage: &mut i32,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
    depth: u8,
) {
    if depth > MAX_TRIGGER_DEPTH || state.gameover.is_some() {
        return;
    }
    let alive = state
        .character(caster)
        .map(|c| !c.is_fallen())
        .unwrap_or(false);
    if !alive {
        return;
    }
    if !secondary_holds(state, caster, skill.secondary) {
        return;
    }
    if let Some(p) = skill.possibility {
        if !rng.chance(p) {
            log::debug!("skill {:?} missed its possibility roll", skill.kind);
            return;
        }
    }

    for _ in 0..skill.repeat.unwrap_or(1) {
        if state.gameover.is_some() {
            break;
        }
        events.push(BattleEvent::SkillTriggered {
            slot: caster,
            kind: skill.kind.clone(),
        });
        let targets = select_targets(state, caster, &skill.target, main_target);
        match &skill.kind {
            SkillKind::Action(action) => {
                for target in targets {
                    apply_action(
                        state, caster, skill, action, target, last_damage, rng, events, depth,
                    );
                    if state.gameover.is_some() {
                        break;
                    }
                }
            }
            SkillKind::Effect(_) => {
                for target in targets {
                    let instance = EffectInstance::from_skill(skill, caster, target, state.turn);
                    let stack = state.effects.apply(instance);
                    events.push(BattleEvent::EffectApplied {
                        slot: target,
                        kind: skill.kind.clone(),
                        stack,
                    });
                }
            }
        }
    }

    if let Some(extra) = &skill.extra {
        fire_skill(state, caster, extra, main_target, last_damage, rng, events, depth + 1);
    }
}

fn secondary_holds(state: &BattleState, caster: Slot, secondary: Option<SecondaryCondition>) -> bool {
    let Some(cond) = secondary else {
        return true;
    };
    match cond {
        SecondaryCondition::HpAbove { permille } => hp_fraction_above(state, caster, permille),
        SecondaryCondition::HpBelow { permille } => !hp_fraction_above(state, caster, permille),
        SecondaryCondition::ExistCharacter { attribute } => {
            state.attribute_present(caster.player, attribute)
        }
    }
}

fn hp_fraction_above(state: &BattleState, slot: Slot, permille: i32) -> bool {
    match state.character(slot) {
        Some(c) => c.current_hp as i64 * PERMILLE as i64 > c.max_hp as i64 * permille as i64,
        None => false,
    }
}

fn select_targets(
    state: &BattleState,
    caster: Slot,
    rule: &SkillTarget,
    main_target: Slot,
) -> Vec<Slot> {
    let allies = caster.player;
    let enemies = caster.player.opponent();
    match rule {
        SkillTarget::SelfTarget => vec![caster],
        SkillTarget::Team => state
            .living_indices(allies)
            .into_iter()
            .map(|i| Slot::new(allies, i))
            .collect(),
        SkillTarget::TeamExceptSelf => state
            .living_indices(allies)
            .into_iter()
            .filter(|&i| i != caster.index)
            .map(|i| Slot::new(allies, i))
            .collect(),
        SkillTarget::TeamLowestHp => state
            .living_indices(allies)
            .into_iter()
            .min_by_key(|&i| {
                state
                    .character(Slot::new(allies, i))
                    .map(|c| c.current_hp)
                    .unwrap_or(i32::MAX)
            })
            .map(|i| vec![Slot::new(allies, i)])
            .unwrap_or_default(),
        SkillTarget::SingleEnemy => {
            let target_alive = main_target.player == enemies
                && state
                    .character(main_target)
                    .map(|c| !c.is_fallen())
                    .unwrap_or(false);
            if target_alive {
                vec![main_target]
            } else {
                // Fall through to the leftmost living enemy
                state
                    .living_indices(enemies)
                    .first()
                    .map(|&i| vec![Slot::new(enemies, i)])
                    .unwrap_or_default()
            }
        }
        SkillTarget::AllEnemies => state
            .living_indices(enemies)
            .into_iter()
            .map(|i| Slot::new(enemies, i))
            .collect(),
        SkillTarget::OfAttribute(attribute) => state
            .living_indices(allies)
            .into_iter()
            .map(|i| Slot::new(allies, i))
            .filter(|&s| state.character(s).map(|c| c.attribute == *attribute).unwrap_or(false))
            .collect(),
        SkillTarget::OfRole(role) => state
            .living_indices(allies)
            .into_iter()
            .map(|i| Slot::new(allies, i))
            .filter(|&s| state.character(s).map(|c| c.role == *role).unwrap_or(false))
            .collect(),
        SkillTarget::Leftmost => state
            .living_indices(enemies)
            .first()
            .map(|&i| vec![Slot::new(enemies, i)])
            .unwrap_or_default(),
        SkillTarget::Indices(indices) => indices
            .iter()
            .map(|&i| Slot::new(allies, i))
            .filter(|&s| state.character(s).map(|c| !c.is_fallen()).unwrap_or(false))
            .collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_action(
    state: &mut BattleState,
    caster: Slot,
    skill: &Skill,
    action: &ActionKind,
    target: Slot,
    last_damage: &mut i32,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
    depth: u8,
) {
    match action {
        a if a.deals_damage() => {
            let dealt = deal_damage(state, caster, skill, a, target, *last_damage, events);
            *last_damage = dealt;
        }
        ActionKind::Heal => heal(state, caster, skill, target, *last_damage, rng, events, depth),
        ActionKind::Shield => {
            let base = basis_amount(state, caster, skill, target, *last_damage);
            let cast =
                scale(base, PERMILLE + state.effects.modifier(caster, EffectKind::ShieldEffect));
            let amount =
                scale(cast, PERMILLE + state.effects.modifier(target, EffectKind::Shielded))
                    .max(0);
            if let Some(c) = state.character_mut(target) {
                c.shield += amount;
            }
            events.push(BattleEvent::ShieldGained {
                slot: target,
                amount,
            });
        }
        ActionKind::Guard => {
            let widen = state.effects.modifier(caster, EffectKind::GuardEffect);
            let reduction = scale(skill.value.unwrap_or(GUARD_REDUCTION), PERMILLE + widen);
            let mut instance = EffectInstance::from_skill(skill, caster, target, state.turn);
            instance.value = -reduction;
            state.effects.apply(instance);
            events.push(BattleEvent::Guarded { slot: target });
        }
        ActionKind::ChangeCd => {
            // Value counts whole turns here, not permille
            let delta = skill.value.unwrap_or(0);
            let cd = state
                .character(target)
                .map(|c| (c.ultimate_cd as i32 + delta).clamp(0, u8::MAX as i32) as u8);
            if let Some(cd) = cd {
                if let Some(c) = state.character_mut(target) {
                    c.ultimate_cd = cd;
                }
                events.push(BattleEvent::CooldownChanged { slot: target, cd });
            }
        }
        ActionKind::ClearAbnormal => {
            for removed in state.effects.clear_abnormal(target) {
                events.push(BattleEvent::EffectExpired {
                    slot: target,
                    kind: removed.kind,
                });
            }
        }
        ActionKind::ClearDebuff => {
            for removed in state.effects.clear_debuffs(target) {
                events.push(BattleEvent::EffectExpired {
                    slot: target,
                    kind: removed.kind,
                });
            }
        }
        ActionKind::Taunt | ActionKind::Sleep | ActionKind::Silence | ActionKind::Paralysis => {
            apply_status(state, caster, skill, action, target, events);
        }
        // Damage kinds are matched by the guard above
        _ => {}
    }
}

fn apply_status(
    state: &mut BattleState,
    caster: Slot,
    skill: &Skill,
    action: &ActionKind,
    target: Slot,
    events: &mut Vec<BattleEvent>,
) {
    let immunity = match action {
        ActionKind::Sleep => Some(EffectKind::ImmuneSleep),
        ActionKind::Silence => Some(EffectKind::ImmuneSilence),
        ActionKind::Paralysis => Some(EffectKind::ImmuneParalysis),
        _ => None,
    };
    if let Some(kind) = immunity {
        if state.effects.has_effect(target, kind) {
            events.push(BattleEvent::StatusResisted {
                slot: target,
                kind: action.clone(),
            });
            return;
        }
    }
    let instance = EffectInstance::from_skill(skill, caster, target, state.turn);
    let stack = state.effects.apply(instance);
    events.push(BattleEvent::EffectApplied {
        slot: target,
        kind: skill.kind.clone(),
        stack,
    });
}

/// Integer permille scaling with i64 intermediates
fn scale(amount: i32, permille: i32) -> i32 {
    (amount as i64 * permille as i64 / PERMILLE as i64) as i32
}

fn basis_amount(
    state: &BattleState,
    caster: Slot,
    skill: &Skill,
    target: Slot,
    last_damage: i32,
) -> i32 {
    let stat = match skill.basis {
        Some(SkillBasis::SelfAtk) => effective_atk(state, caster),
        Some(SkillBasis::TargetAtk) => state.character(target).map(|c| c.atk).unwrap_or(0),
        Some(SkillBasis::TargetMaxHp) => state.character(target).map(|c| c.max_hp).unwrap_or(0),
        Some(SkillBasis::TargetCurrentHp) => {
            state.character(target).map(|c| c.current_hp).unwrap_or(0)
        }
        Some(SkillBasis::Damage) => last_damage,
        None => 0,
    };
    scale(stat, skill.value.unwrap_or(0))
}

/// Base attack scaled by live attack-power modifiers
fn effective_atk(state: &BattleState, slot: Slot) -> i32 {
    let atk = state.character(slot).map(|c| c.atk).unwrap_or(0);
    scale(atk, PERMILLE + state.effects.modifier(slot, EffectKind::AttackPower)).max(0)
}

/// Run the damage pipeline for one hit and return the amount dealt
fn deal_damage(
    state: &mut BattleState,
    caster: Slot,
    skill: &Skill,
    action: &ActionKind,
    target: Slot,
    last_damage: i32,
    events: &mut Vec<BattleEvent>,
) -> i32 {
    let base = basis_amount(state, caster, skill, target, last_damage);
    let (amount, pierce) = if matches!(action, ActionKind::RealDamage) {
        // Real damage skips every modifier and the shield pool
        (base.max(0), true)
    } else {
        let (outgoing_kind, incoming_kind) = match action {
            ActionKind::Ultimate { .. } => {
                (EffectKind::UltimateDamage, EffectKind::UltimateDamaged)
            }
            _ => (EffectKind::NormalAttackDamage, EffectKind::NormalAttackDamaged),
        };
        let outgoing = scale(base, PERMILLE + state.effects.modifier(caster, outgoing_kind));
        let elemental = match state.character(caster).map(|c| c.attribute) {
            Some(attribute) => state
                .effects
                .modifier(target, EffectKind::AttributeDamaged(attribute)),
            None => 0,
        };
        let incoming_mod = state.effects.modifier(target, EffectKind::Damaged)
            + state.effects.modifier(target, incoming_kind)
            + elemental
            + state.effects.action_value(target, &ActionKind::Guard);
        (scale(outgoing, PERMILLE + incoming_mod).max(0), false)
    };
    apply_damage(state, target, amount, pierce, events);
    amount
}

fn apply_damage(
    state: &mut BattleState,
    target: Slot,
    amount: i32,
    pierce: bool,
    events: &mut Vec<BattleEvent>,
) {
    let Some(c) = state.character_mut(target) else {
        return;
    };
    let shield_absorbed = if pierce { 0 } else { amount.min(c.shield) };
    c.shield -= shield_absorbed;
    c.current_hp = (c.current_hp - (amount - shield_absorbed)).max(0);
    let remaining_hp = c.current_hp;
    let fell = c.is_fallen();
    events.push(BattleEvent::Damage {
        slot: target,
        amount,
        shield_absorbed,
        remaining_hp,
    });
    if fell {
        state.effects.clear_for_character(target);
        events.push(BattleEvent::CharacterFallen { slot: target });
        if state.side_defeated(target.player) && state.gameover.is_none() {
            let winner = target.player.opponent();
            state.gameover = Some(winner);
            events.push(BattleEvent::GameOver { winner });
            log::debug!("battle over, winner {:?}", winner);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn heal(
    state: &mut BattleState,
    caster: Slot,
    skill: &Skill,
    target: Slot,
    last_damage: i32,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
    depth: u8,
) {
    let base = basis_amount(state, caster, skill, target, last_damage);
    let cast = scale(base, PERMILLE + state.effects.modifier(caster, EffectKind::HealEffect));
    let amount = scale(cast, PERMILLE + state.effects.modifier(target, EffectKind::Healed)).max(0);
    let healed = match state.character_mut(target) {
        Some(c) if !c.is_fallen() => {
            c.current_hp = (c.current_hp + amount).min(c.max_hp);
            Some(c.current_hp)
        }
        _ => None,
    };
    let Some(remaining_hp) = healed else {
        return;
    };
    events.push(BattleEvent::Healed {
        slot: target,
        amount,
        remaining_hp,
    });
    // The healed character's own reactions, e.g. a buff on being healed
    let reactions: Vec<Skill> = state
        .character(target)
        .map(|c| {
            c.skills
                .passive
                .iter()
                .filter(|s| s.condition == SkillCondition::Healed)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    for reaction in &reactions {
        let mut damage = 0;
        fire_skill(state, target, reaction, caster, &mut damage, rng, events, depth + 1);
    }
}

/// Close the acting side's turn and open the other side's
fn end_turn(
    state: &mut BattleState,
    player: Player,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
) {
    fire_ambient(state, player, SkillPhase::TurnEnd, rng, events);
    for expired in state.effects.tick_turn_end(player, state.turn) {
        events.push(BattleEvent::EffectExpired {
            slot: expired.owner,
            kind: expired.kind,
        });
    }
    events.push(BattleEvent::TurnEnd {
        turn: state.turn,
        player,
    });
    if state.gameover.is_some() {
        return;
    }

    state.turn += 1;
    let next = state.player_to_move();
    events.push(BattleEvent::TurnStart {
        turn: state.turn,
        player: next,
    });
    for index in state.living_indices(next) {
        let slot = Slot::new(next, index);
        if state.effects.has_effect(slot, EffectKind::CdFrozen) {
            continue;
        }
        let cd = state.character(slot).map(|c| c.ultimate_cd).unwrap_or(0);
        if cd > 0 {
            if let Some(c) = state.character_mut(slot) {
                c.ultimate_cd = cd - 1;
            }
            events.push(BattleEvent::CooldownChanged { slot, cd: cd - 1 });
        }
    }
    fire_ambient(state, next, SkillPhase::TurnBegin, rng, events);
}

/// Fire the turn-boundary passives of `player`'s living characters for
/// one lifecycle phase: turn cadence and HP-threshold conditions.
fn fire_ambient(
    state: &mut BattleState,
    player: Player,
    phase: SkillPhase,
    rng: &mut dyn BattleRng,
    events: &mut Vec<BattleEvent>,
) {
    let round = state.round();
    for index in state.living_indices(player) {
        let slot = Slot::new(player, index);
        let passives = match state.character(slot) {
            Some(c) => c.skills.passive.clone(),
            None => continue,
        };
        let foe = default_enemy(state, player);
        for skill in passives.iter().filter(|s| s.phase == phase) {
            let fires = match skill.condition {
                SkillCondition::TurnBased { every } => every > 0 && round % every as u32 == 0,
                SkillCondition::HpAbove { permille } => hp_fraction_above(state, slot, permille),
                SkillCondition::HpBelow { permille } => !hp_fraction_above(state, slot, permille),
                SkillCondition::ExistCharacter { attribute } => {
                    state.attribute_present(player, attribute)
                }
                _ => false,
            };
            if fires {
                fire_skill(state, slot, skill, foe, &mut 0, rng, events, 0);
            }
            if state.gameover.is_some() {
                return;
            }
        }
    }
}
