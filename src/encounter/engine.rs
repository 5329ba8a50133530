//! Fixed-tick encounter loop.
//!
//! The loop owns the enemy side and borrows the hero party each tick call,
//! so encounters can be created and destroyed freely while heroes persist.
//! Host time arrives as arbitrary `dt` slices; the accumulator converts them
//! into fixed simulation ticks so behavior does not depend on call cadence.

use crate::combat::outcome::AttackResolution;
use crate::combat::resolver::resolve_attack;
use crate::combatant::{Combatant, Hand};
use crate::constants::{
    MAX_TICK_ACCUMULATOR_SECONDS, TICK_INTERVAL_SECONDS,
};
use crate::data::GameData;
use crate::encounter::ability::{AbilityKind, AbilityState};
use crate::encounter::summary::{EncounterSummary, RewardBundle, Victor};
use crate::loot::roll_rewards;
use crate::stage::blueprint::RewardScaling;
use rand::Rng;

// Guards fixed-point comparisons against f64 drift from repeated
// subtraction of the tick interval.
const TIMER_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    Idle,
    Running,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterEventKind {
    Attack(AttackResolution),
    Splash {
        source_id: String,
        ability_id: String,
        damage_per_target: f64,
        targets: Vec<String>,
    },
    AuraHeal {
        source_id: String,
        ability_id: String,
        healed: Vec<(String, f64)>,
    },
    Completed {
        victor: Victor,
    },
}

/// One event with its simulation timestamp, buffered until the host drains.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterEvent {
    pub timestamp: f64,
    pub kind: EncounterEventKind,
}

/// Per-combatant swing and ability timers for one encounter.
#[derive(Debug, Clone)]
struct CombatSchedule {
    combatant_id: String,
    main_cooldown: f64,
    off_cooldown: f64,
    abilities: Vec<AbilityState>,
}

impl CombatSchedule {
    fn for_combatant(combatant: &Combatant) -> Self {
        Self {
            combatant_id: combatant.id.clone(),
            main_cooldown: 0.0,
            off_cooldown: 0.0,
            abilities: combatant
                .abilities
                .iter()
                .cloned()
                .map(AbilityState::new)
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct EncounterLoop {
    state: EncounterState,
    paused: bool,
    accumulator: f64,
    enemies: Vec<Combatant>,
    source_schedules: Vec<CombatSchedule>,
    target_schedules: Vec<CombatSchedule>,
    group_rewards: RewardScaling,
    loot_table_id: String,
    summary: EncounterSummary,
    events: Vec<EncounterEvent>,
}

impl EncounterLoop {
    pub fn new(enemies: Vec<Combatant>, group_rewards: RewardScaling, loot_table_id: String) -> Self {
        let target_schedules = enemies.iter().map(CombatSchedule::for_combatant).collect();
        Self {
            state: EncounterState::Idle,
            paused: false,
            accumulator: 0.0,
            enemies,
            source_schedules: Vec::new(),
            target_schedules,
            group_rewards,
            loot_table_id,
            summary: EncounterSummary::default(),
            events: Vec::new(),
        }
    }

    /// Arms the loop against the given party. No-op unless Idle; a completed
    /// encounter can never restart.
    pub fn start(&mut self, party: &[Combatant]) {
        if self.state != EncounterState::Idle {
            return;
        }
        self.source_schedules = party.iter().map(CombatSchedule::for_combatant).collect();
        self.state = EncounterState::Running;
        self.summary.running = true;
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EncounterState::Running && !self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes from the exact timers pause left behind.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn victor(&self) -> Victor {
        self.summary.victor
    }

    pub fn summary(&self) -> &EncounterSummary {
        &self.summary
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    /// Mutable access for host-driven effects on the enemy side (the boss
    /// enrage path).
    pub fn enemies_mut(&mut self) -> &mut [Combatant] {
        &mut self.enemies
    }

    pub fn drain_events(&mut self) -> Vec<EncounterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forces the encounter to end with the given victor and no rewards.
    /// Used by the boss timer; a completed encounter is left untouched.
    pub fn force_resolve(&mut self, victor: Victor) {
        if self.state == EncounterState::Complete {
            return;
        }
        self.finalize(victor, RewardBundle::default());
    }

    /// Feeds `dt` seconds of host time into the loop and runs every whole
    /// fixed tick that fits. Negative `dt` is treated as zero; the
    /// accumulator is capped so a huge gap cannot stall the caller.
    pub fn tick(
        &mut self,
        dt: f64,
        party: &mut [Combatant],
        data: &GameData,
        rng: &mut impl Rng,
    ) -> Victor {
        if !self.is_running() {
            return self.summary.victor;
        }
        self.accumulator = (self.accumulator + dt.max(0.0)).min(MAX_TICK_ACCUMULATOR_SECONDS);
        while self.accumulator + TIMER_EPSILON >= TICK_INTERVAL_SECONDS
            && self.state == EncounterState::Running
        {
            self.accumulator -= TICK_INTERVAL_SECONDS;
            self.step(party, data, rng);
        }
        self.summary.victor
    }

    fn step(&mut self, party: &mut [Combatant], data: &GameData, rng: &mut impl Rng) {
        self.summary.elapsed_seconds += TICK_INTERVAL_SECONDS;
        let timestamp = self.summary.elapsed_seconds;

        fire_auras(
            &mut self.source_schedules,
            party,
            timestamp,
            &mut self.events,
        );
        fire_auras(
            &mut self.target_schedules,
            &mut self.enemies,
            timestamp,
            &mut self.events,
        );

        // Source side acts first.
        let (swings, damage) = side_swings(
            &mut self.source_schedules,
            party,
            &mut self.enemies,
            timestamp,
            &mut self.events,
            rng,
        );
        self.summary.swings += swings;
        self.summary.source_damage_dealt += damage;
        if self.check_victory(party, data, rng) {
            return;
        }

        let (swings, damage) = side_swings(
            &mut self.target_schedules,
            &self.enemies,
            party,
            timestamp,
            &mut self.events,
            rng,
        );
        self.summary.swings += swings;
        self.summary.target_damage_dealt += damage;
        self.check_victory(party, data, rng);
    }

    fn check_victory(&mut self, party: &[Combatant], data: &GameData, rng: &mut impl Rng) -> bool {
        let source_alive = party.iter().any(|c| c.is_alive());
        let target_alive = self.enemies.iter().any(|c| c.is_alive());

        // A mutual wipe counts against the initiating side.
        let victor = if !source_alive {
            Victor::Target
        } else if !target_alive {
            Victor::Source
        } else {
            return false;
        };

        let rewards = if victor == Victor::Source {
            roll_rewards(
                data,
                &self.loot_table_id,
                self.group_rewards.experience,
                self.group_rewards.gold,
                rng,
            )
        } else {
            RewardBundle::default()
        };
        self.finalize(victor, rewards);
        true
    }

    fn finalize(&mut self, victor: Victor, rewards: RewardBundle) {
        self.state = EncounterState::Complete;
        self.summary.running = false;
        self.summary.victor = victor;
        self.summary.rewards = rewards;
        self.events.push(EncounterEvent {
            timestamp: self.summary.elapsed_seconds,
            kind: EncounterEventKind::Completed { victor },
        });
    }
}

/// Advances ability timers for one side and fires any ready healing auras
/// on their allies.
fn fire_auras(
    schedules: &mut [CombatSchedule],
    allies: &mut [Combatant],
    timestamp: f64,
    events: &mut Vec<EncounterEvent>,
) {
    for schedule in schedules.iter_mut() {
        let owner_alive = allies
            .iter()
            .find(|c| c.id == schedule.combatant_id)
            .map(|c| c.is_alive())
            .unwrap_or(false);

        for ability in &mut schedule.abilities {
            ability.tick_down(TICK_INTERVAL_SECONDS);
            if !owner_alive || !ability.aura_ready() {
                continue;
            }
            let AbilityKind::HealingAura { heal_percent, .. } = ability.definition.kind else {
                continue;
            };
            let mut healed = Vec::new();
            for ally in allies.iter_mut() {
                if !ally.is_alive() {
                    continue;
                }
                let amount = ally.heal_percent(heal_percent);
                if amount > 0.0 {
                    healed.push((ally.id.clone(), amount));
                }
            }
            ability.trigger();
            events.push(EncounterEvent {
                timestamp,
                kind: EncounterEventKind::AuraHeal {
                    source_id: schedule.combatant_id.clone(),
                    ability_id: ability.definition.id.clone(),
                    healed,
                },
            });
        }
    }
}

/// Runs one tick's worth of swings for one side. A hand swings when its
/// cooldown has elapsed; delays shorter than the tick interval yield several
/// swings per tick. Returns (swings, damage dealt).
fn side_swings(
    schedules: &mut [CombatSchedule],
    attackers: &[Combatant],
    defenders: &mut [Combatant],
    timestamp: f64,
    events: &mut Vec<EncounterEvent>,
    rng: &mut impl Rng,
) -> (u64, f64) {
    let mut swings = 0u64;
    let mut damage = 0.0f64;

    for schedule in schedules.iter_mut() {
        let Some(attacker) = attackers.iter().find(|c| c.id == schedule.combatant_id) else {
            continue;
        };
        if !attacker.is_alive() {
            continue;
        }

        for hand in [Hand::Main, Hand::Off] {
            if attacker.hand(hand).is_none() {
                continue;
            }
            // Worked on as a local so `schedule` stays free for splash.
            let mut cooldown = match hand {
                Hand::Main => schedule.main_cooldown,
                Hand::Off => schedule.off_cooldown,
            };
            cooldown -= TICK_INTERVAL_SECONDS;

            while cooldown < -TIMER_EPSILON {
                let Some(target_index) = defenders.iter().position(|c| c.is_alive()) else {
                    cooldown = 0.0;
                    break;
                };
                let resolution =
                    resolve_attack(attacker, &mut defenders[target_index], hand, rng);
                swings += 1;
                damage += resolution.damage;
                let landed_damage = resolution.damage;
                let landed = resolution.outcome.landed();
                events.push(EncounterEvent {
                    timestamp,
                    kind: EncounterEventKind::Attack(resolution),
                });

                if landed {
                    damage += splash(
                        schedule,
                        target_index,
                        landed_damage,
                        defenders,
                        timestamp,
                        events,
                    );
                }
                cooldown += attacker.attack_delay(hand);
            }

            match hand {
                Hand::Main => schedule.main_cooldown = cooldown,
                Hand::Off => schedule.off_cooldown = cooldown,
            }
        }
    }
    (swings, damage)
}

/// After a landed hit, an off-cooldown area ability splashes a fraction of
/// that hit onto additional living defenders. Returns splash damage dealt.
fn splash(
    schedule: &mut CombatSchedule,
    primary_index: usize,
    hit_damage: f64,
    defenders: &mut [Combatant],
    timestamp: f64,
    events: &mut Vec<EncounterEvent>,
) -> f64 {
    let Some(ability) = schedule.abilities.iter_mut().find(|a| {
        matches!(a.definition.kind, AbilityKind::AreaDamage { .. }) && a.cooldown_clear()
    }) else {
        return 0.0;
    };
    let AbilityKind::AreaDamage {
        splash_percent,
        max_targets,
        ..
    } = ability.definition.kind
    else {
        return 0.0;
    };

    let splash_damage = hit_damage * splash_percent;
    if splash_damage <= 0.0 {
        return 0.0;
    }

    let mut targets = Vec::new();
    for (index, defender) in defenders.iter_mut().enumerate() {
        if index == primary_index || !defender.is_alive() {
            continue;
        }
        if targets.len() >= max_targets {
            break;
        }
        defender.apply_damage(splash_damage);
        targets.push(defender.id.clone());
    }
    if targets.is_empty() {
        return 0.0;
    }

    let total = splash_damage * targets.len() as f64;
    ability.trigger();
    events.push(EncounterEvent {
        timestamp,
        kind: EncounterEventKind::Splash {
            source_id: schedule.combatant_id.clone(),
            ability_id: ability.definition.id.clone(),
            damage_per_target: splash_damage,
            targets,
        },
    });
    total
}
