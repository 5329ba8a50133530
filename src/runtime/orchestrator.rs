//! Top-level runtime state machine.
//!
//! Owns the hero, the inventory ledger, long-term progression and the
//! current encounter, and drives the wave and stage lifecycle from the
//! host's `tick` calls. All host reads go through cloned snapshots; all
//! mutation goes through orchestrator methods.

use crate::combatant::Combatant;
use crate::constants::{
    BOSS_AUGMENT_GEM_CHANCE, BOSS_AUGMENT_GEM_ID, BOSS_BONUS_GOLD_PER_STAGE,
    BOSS_SHARDS_PER_CLEAR, BOSS_SHARD_MATERIAL_ID, ENCOUNTER_GROUP_SIZE, SNAPSHOT_VERSION,
};
use crate::combatant::CharacterProgressSnapshot;
use crate::data::{DataError, DataSource, GameData};
use crate::encounter::engine::EncounterLoop;
use crate::encounter::summary::{RewardBundle, Victor};
use crate::events::{EnemyStatus, EngineHooks, StateSnapshot, WavePhase};
use crate::inventory::ledger::InventoryLedger;
use crate::inventory::types::{InventorySnapshot, MutationFlags, MutationOutcome};
use crate::runtime::progression::{Progression, ProgressionSnapshot};
use crate::stage::blueprint::{BossConfig, EnemySpawn, RewardScaling, StageBlueprint};
use crate::stage::generator::generate_stage;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::warn;

/// Everything needed to continue a run in a fresh process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub character: CharacterProgressSnapshot,
    pub inventory: InventorySnapshot,
    pub progression: ProgressionSnapshot,
}

pub struct RuntimeOrchestrator {
    data: GameData,
    hero_definition_id: String,
    hero: Combatant,
    ledger: InventoryLedger,
    progression: Progression,
    stage_number: u32,
    wave_number: u32,
    phase: WavePhase,
    auto_start: bool,
    blueprints: BTreeMap<u32, StageBlueprint>,
    loot_table_id: String,
    wave_queue: VecDeque<EnemySpawn>,
    current_group: Vec<EnemySpawn>,
    current_wave_is_boss: bool,
    boss_config: Option<BossConfig>,
    boss_timer: Option<f64>,
    enraged: bool,
    encounter: Option<EncounterLoop>,
}

impl RuntimeOrchestrator {
    pub fn new(source: &dyn DataSource, hero_id: &str) -> Result<Self, DataError> {
        let data = source.load()?;
        let definition = data.hero(hero_id)?;

        // Abilities named by an evolution tier stay locked until that tier
        // is reached.
        let locked: HashSet<&String> = definition
            .evolution
            .tiers
            .iter()
            .flat_map(|t| &t.unlocks)
            .collect();
        let abilities = definition
            .abilities
            .iter()
            .filter(|a| !locked.contains(&a.id))
            .cloned()
            .collect();

        let hero = Combatant::new(
            definition.id.clone(),
            definition.name.clone(),
            definition.base,
            definition.formulas,
            definition.leveling.clone(),
            definition.evolution.clone(),
            definition.main_hand,
            definition.off_hand,
            abilities,
        );

        Ok(Self {
            hero_definition_id: hero_id.to_string(),
            hero,
            data,
            ledger: InventoryLedger::new(),
            progression: Progression::new(),
            stage_number: 1,
            wave_number: 1,
            phase: WavePhase::Preparing,
            auto_start: true,
            blueprints: BTreeMap::new(),
            loot_table_id: String::new(),
            wave_queue: VecDeque::new(),
            current_group: Vec::new(),
            current_wave_is_boss: false,
            boss_config: None,
            boss_timer: None,
            enraged: false,
            encounter: None,
        })
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn hero(&self) -> &Combatant {
        &self.hero
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn stage_number(&self) -> u32 {
        self.stage_number
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn set_auto_start(&mut self, auto_start: bool) {
        self.auto_start = auto_start;
    }

    pub fn state_snapshot(&self) -> StateSnapshot {
        let enemies = self
            .encounter
            .as_ref()
            .map(|e| {
                e.enemies()
                    .iter()
                    .map(|c| EnemyStatus {
                        name: c.name.clone(),
                        health: c.health(),
                        max_health: c.max_health(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        StateSnapshot {
            stage_number: self.stage_number,
            wave_number: self.wave_number,
            waves_in_stage: self.data.stage_config.waves_per_stage,
            phase: self.phase,
            is_boss_wave: self.current_wave_is_boss,
            boss_timer_remaining: self.boss_timer,
            hero_name: self.hero.name.clone(),
            hero_level: self.hero.level(),
            hero_health: self.hero.health(),
            hero_max_health: self.hero.max_health(),
            hero_mana: self.hero.mana(),
            hero_experience: self.hero.experience(),
            hero_xp_to_next: self.hero.xp_to_next_level(),
            gold: self.ledger.gold(),
            highest_stage_cleared: self.progression.highest_stage_cleared(),
            enemies,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Advances the run by `dt` seconds of host time. Phase transitions,
    /// auto-started waves and encounter simulation all happen here.
    pub fn tick(&mut self, dt: f64, hooks: &mut impl EngineHooks, rng: &mut impl Rng) {
        let mut changed = false;

        match self.phase {
            WavePhase::Won => {
                self.wave_number += 1;
                self.phase = WavePhase::Preparing;
                changed = true;
            }
            WavePhase::Lost => {
                if self.current_wave_is_boss {
                    self.wave_number = 1;
                    hooks.on_log("Driven back to the start of the stage.");
                }
                self.phase = WavePhase::Preparing;
                changed = true;
            }
            _ => {}
        }

        if self.phase == WavePhase::Preparing && self.auto_start && !self.next_wave_is_boss() {
            self.begin_wave(hooks);
            changed = true;
        }

        if self.phase == WavePhase::InProgress {
            changed |= self.run_encounter(dt, hooks, rng);
        }

        if changed {
            hooks.on_state_changed(&self.state_snapshot());
        }
    }

    /// Explicitly starts the pending wave. Needed for boss waves, which are
    /// never auto-started.
    pub fn start_wave(&mut self, hooks: &mut impl EngineHooks) {
        if self.phase != WavePhase::Preparing {
            return;
        }
        self.begin_wave(hooks);
        hooks.on_state_changed(&self.state_snapshot());
    }

    /// Leaves the StageCleared pause and moves to the next stage.
    pub fn resume(&mut self, hooks: &mut impl EngineHooks) {
        if self.phase != WavePhase::StageCleared {
            return;
        }
        self.stage_number += 1;
        self.wave_number = 1;
        self.hero.restore_vitals();
        self.phase = WavePhase::Preparing;
        hooks.on_log(&format!("Pressing on to stage {}.", self.stage_number));
        hooks.on_state_changed(&self.state_snapshot());
    }

    fn blueprint(&mut self) -> &StageBlueprint {
        let hero_level = self.hero.level();
        let stage_number = self.stage_number;
        self.blueprints
            .entry(stage_number)
            .or_insert_with(|| generate_stage(stage_number, hero_level, &self.data))
    }

    fn next_wave_is_boss(&mut self) -> bool {
        let wave_number = self.wave_number;
        self.blueprint()
            .wave(wave_number)
            .map(|w| w.is_boss)
            .unwrap_or(false)
    }

    fn begin_wave(&mut self, hooks: &mut impl EngineHooks) {
        let wave_number = self.wave_number;
        let blueprint = self.blueprint();
        let loot_table_id = blueprint.loot_table_id.clone();
        let Some(wave) = blueprint.wave(wave_number).cloned() else {
            warn!(wave = wave_number, "wave missing from blueprint");
            return;
        };

        self.loot_table_id = loot_table_id;
        self.wave_queue = wave.spawns.into();
        self.current_wave_is_boss = wave.is_boss;
        self.boss_config = wave.boss;
        self.boss_timer = wave.boss.map(|b| b.timer_seconds);
        self.enraged = false;
        self.next_group();
        self.phase = WavePhase::InProgress;

        if wave.is_boss {
            hooks.on_log(&format!("The stage {} boss appears!", self.stage_number));
        } else {
            hooks.on_log(&format!(
                "Stage {}, wave {} begins.",
                self.stage_number, self.wave_number
            ));
        }
    }

    /// Dequeues the next enemy group and arms a fresh encounter against it.
    fn next_group(&mut self) {
        let mut group = Vec::new();
        let mut rewards = RewardScaling::default();
        while group.len() < ENCOUNTER_GROUP_SIZE {
            let Some(spawn) = self.wave_queue.pop_front() else {
                break;
            };
            rewards.experience += spawn.rewards.experience;
            rewards.gold += spawn.rewards.gold;
            group.push(spawn);
        }

        let enemies = group.iter().map(|s| s.spawn()).collect();
        let mut encounter = EncounterLoop::new(enemies, rewards, self.loot_table_id.clone());
        encounter.start(std::slice::from_ref(&self.hero));
        self.current_group = group;
        self.encounter = Some(encounter);
    }

    /// Rebuilds the current encounter from the current group. Used when a
    /// mutation invalidates in-flight combat state.
    fn rebuild_encounter(&mut self) {
        let enemies: Vec<Combatant> = self.current_group.iter().map(|s| s.spawn()).collect();
        let mut rewards = RewardScaling::default();
        for spawn in &self.current_group {
            rewards.experience += spawn.rewards.experience;
            rewards.gold += spawn.rewards.gold;
        }
        let mut encounter = EncounterLoop::new(enemies, rewards, self.loot_table_id.clone());
        encounter.start(std::slice::from_ref(&self.hero));
        self.encounter = Some(encounter);
        self.boss_timer = self.boss_config.map(|b| b.timer_seconds);
        self.enraged = false;
    }

    fn run_encounter(
        &mut self,
        dt: f64,
        hooks: &mut impl EngineHooks,
        rng: &mut impl Rng,
    ) -> bool {
        let Some(encounter) = self.encounter.as_mut() else {
            return false;
        };

        let mut victor = encounter.tick(
            dt,
            std::slice::from_mut(&mut self.hero),
            &self.data,
            rng,
        );

        let events = encounter.drain_events();
        if !events.is_empty() {
            hooks.on_encounter_events(&events);
        }

        // Enrage arms once, at or below the configured health ratio.
        if let Some(config) = self.boss_config {
            if !self.enraged && victor == Victor::None {
                if let Some(boss) = encounter.enemies_mut().first_mut() {
                    if boss.is_alive()
                        && boss.health() / boss.max_health() <= config.enrage_threshold
                    {
                        boss.apply_attack_multiplier(config.enrage_attack_multiplier);
                        self.enraged = true;
                        hooks.on_log("The boss enrages!");
                    }
                }
            }
        }

        if victor == Victor::None {
            if let Some(timer) = self.boss_timer.as_mut() {
                *timer -= dt;
                if *timer <= 0.0 {
                    encounter.force_resolve(Victor::Target);
                    hooks.on_log("The boss outlasted the assault.");
                    victor = Victor::Target;
                }
            }
        }

        if victor != Victor::None {
            self.complete_encounter(hooks, rng);
        }
        true
    }

    fn complete_encounter(&mut self, hooks: &mut impl EngineHooks, rng: &mut impl Rng) {
        let Some(encounter) = self.encounter.take() else {
            return;
        };
        let summary = encounter.summary().clone();
        hooks.on_encounter_complete(&summary);

        match summary.victor {
            Victor::Source => {
                self.grant_rewards(&summary.rewards, hooks);
                if !self.wave_queue.is_empty() {
                    hooks.on_log("More enemies approach.");
                    self.next_group();
                } else if self.current_wave_is_boss {
                    self.handle_boss_clear(hooks, rng);
                } else {
                    hooks.on_log("Wave cleared.");
                    self.phase = WavePhase::Won;
                }
            }
            Victor::Target | Victor::None => {
                self.hero.restore_vitals();
                self.phase = WavePhase::Lost;
                hooks.on_log(&format!("{} falls. Regrouping.", self.hero.name));
            }
        }
    }

    fn grant_rewards(&mut self, rewards: &RewardBundle, hooks: &mut impl EngineHooks) {
        if rewards.is_empty() {
            return;
        }
        if rewards.experience > 0 {
            let levels = self.hero.add_experience(rewards.experience);
            if levels > 0 {
                hooks.on_log(&format!(
                    "{} reached level {}.",
                    self.hero.name,
                    self.hero.level()
                ));
            }
        }
        self.ledger.collect_rewards(rewards, &self.data.catalog);
        hooks.on_log(&format!(
            "Gained {} experience and {} gold.",
            rewards.experience, rewards.gold
        ));
        for drop in &rewards.items {
            let name = self
                .data
                .catalog
                .definition(&drop.item_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| drop.item_id.clone());
            hooks.on_log(&format!("Found {} x{}.", name, drop.quantity));
        }
    }

    fn handle_boss_clear(&mut self, hooks: &mut impl EngineHooks, rng: &mut impl Rng) {
        let stage = self.stage_number;

        let bonus_gold = BOSS_BONUS_GOLD_PER_STAGE * stage as u64;
        self.ledger.add_gold(bonus_gold);
        self.ledger
            .add_material(BOSS_SHARD_MATERIAL_ID, BOSS_SHARDS_PER_CLEAR);
        hooks.on_log(&format!(
            "Boss bounty: {} gold and {} {}.",
            bonus_gold, BOSS_SHARDS_PER_CLEAR, BOSS_SHARD_MATERIAL_ID
        ));
        if rng.gen::<f64>() < BOSS_AUGMENT_GEM_CHANCE {
            self.ledger.add_consumable(BOSS_AUGMENT_GEM_ID, 1);
            hooks.on_log("The boss dropped an augment gem!");
        }

        if self.progression.record_clear(stage) {
            self.progression.apply_to(&mut self.hero);
            hooks.on_log(&format!(
                "First clear of stage {}! Permanent power increased.",
                stage
            ));
        }

        self.boss_timer = None;
        self.boss_config = None;
        self.phase = WavePhase::StageCleared;
        hooks.on_log(&format!("Stage {} cleared.", stage));
    }

    // ── Inventory and character operations ───────────────────────────────

    pub fn equip_item(&mut self, instance_id: &str) -> MutationOutcome {
        let outcome = self.ledger.equip(&self.data.catalog, instance_id);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn unequip_item(&mut self, instance_id: &str) -> MutationOutcome {
        let outcome = self.ledger.unequip(&self.data.catalog, instance_id);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn upgrade_item(&mut self, instance_id: &str) -> MutationOutcome {
        let outcome = self.ledger.upgrade(&self.data.catalog, instance_id);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn salvage_item(&mut self, instance_id: &str) -> MutationOutcome {
        let outcome = self.ledger.salvage(&self.data.catalog, instance_id);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn socket_item(&mut self, instance_id: &str, augment_id: &str) -> MutationOutcome {
        let outcome = self.ledger.socket(&self.data.catalog, instance_id, augment_id);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn craft(&mut self, recipe_id: &str) -> MutationOutcome {
        let Some(recipe) = self.data.recipe(recipe_id).cloned() else {
            return MutationOutcome::failure("Unknown recipe.");
        };
        let outcome = self.ledger.craft(&self.data.catalog, &recipe);
        self.honor_flags(outcome.flags);
        outcome
    }

    pub fn use_consumable(&mut self, item_id: &str) -> MutationOutcome {
        let outcome = self
            .ledger
            .use_consumable(&self.data.catalog, item_id, &mut self.hero);
        self.honor_flags(outcome.flags);
        outcome
    }

    /// Advances the hero to the next evolution tier if the level gate is
    /// met, granting any abilities that tier unlocks.
    pub fn advance_evolution(&mut self) -> MutationOutcome {
        let next_tier = self.hero.evolution_tier() + 1;
        let Some(tier) = self.hero.evolution_profile().tier(next_tier).cloned() else {
            return MutationOutcome::failure("No further evolutions available.");
        };
        if self.hero.level() < tier.required_level {
            return MutationOutcome::failure(format!(
                "Evolution to {} requires level {}.",
                tier.name, tier.required_level
            ));
        }

        let unlocked = self.hero.set_evolution_tier(next_tier);
        let mut messages = vec![format!("Evolved into {}.", tier.name)];
        if let Ok(definition) = self.data.hero(&self.hero_definition_id) {
            for ability_id in &unlocked {
                if let Some(ability) = definition.abilities.iter().find(|a| &a.id == ability_id) {
                    messages.push(format!("Unlocked {}.", ability.name));
                    self.hero.abilities.push(ability.clone());
                }
            }
        }

        let flags = MutationFlags {
            hero_needs_refresh: true,
            reset_encounter: true,
            ..MutationFlags::default()
        };
        self.honor_flags(flags);
        MutationOutcome {
            success: true,
            messages,
            flags,
        }
    }

    fn honor_flags(&mut self, flags: MutationFlags) {
        if flags.hero_needs_refresh {
            self.refresh_hero_equipment();
        }
        if flags.reset_encounter && self.phase == WavePhase::InProgress {
            self.rebuild_encounter();
        }
    }

    /// Re-syncs the hero's equipment deltas from the ledger.
    fn refresh_hero_equipment(&mut self) {
        self.hero.clear_equipment();
        let entries: Vec<_> = self
            .ledger
            .equipped_items()
            .map(|(slot, item)| {
                (
                    slot,
                    item.instance_id.clone(),
                    item.effective_bonuses(&self.data.catalog),
                )
            })
            .collect();
        for (slot, instance_id, bonuses) in entries {
            self.hero.equip_item(slot, instance_id, bonuses);
        }
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn save(&self) -> SaveState {
        SaveState {
            version: SNAPSHOT_VERSION,
            character: self.hero.serialize_progress(),
            inventory: self.ledger.snapshot(),
            progression: self.progression.snapshot(),
        }
    }

    /// Restores a save into this run: character progress, inventory and
    /// progression, with the permanent multiplier and equipment re-applied.
    /// The run resumes at the first uncleared stage.
    pub fn restore_save(&mut self, save: &SaveState) {
        self.hero.restore_progress(&save.character);
        self.ledger.restore(&save.inventory);
        self.progression.restore(&save.progression);
        self.progression.apply_to(&mut self.hero);
        self.refresh_hero_equipment();

        self.stage_number = self.progression.highest_stage_cleared() + 1;
        self.wave_number = 1;
        self.phase = WavePhase::Preparing;
        self.encounter = None;
        self.wave_queue.clear();
        self.current_group.clear();
        self.current_wave_is_boss = false;
        self.boss_config = None;
        self.boss_timer = None;
        self.enraged = false;
        self.blueprints.clear();
    }
}
