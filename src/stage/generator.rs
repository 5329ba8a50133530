//! Deterministic stage generation.
//!
//! Generation uses no RNG: pool picks come from a seed mixed out of the
//! stage, wave and slot numbers, so identical inputs always produce the
//! identical blueprint. The orchestrator caches blueprints by stage number.

use crate::combatant::{AttributeType, HandProfile};
use crate::constants::{
    DEFAULT_LOOT_TABLE_ID, LOW_LEVEL_THRESHOLD, MEDIUM_TIER_STAGE_DIVISOR,
    MID_LEVEL_THRESHOLD, MIN_ATTACK_DELAY_SECONDS, WAVE_COUNT_HIGH_LEVEL_FLOOR,
    WAVE_COUNT_LOW_LEVEL_CAP, WAVE_COUNT_MID_LEVEL_CAP, WAVE_COUNT_STAGE_WINDOW,
};
use crate::data::{EnemyDefinition, EnemyTier, GameData};
use crate::stage::blueprint::{
    BossConfig, EnemySpawn, RewardScaling, StageBlueprint, WaveBlueprint,
};
use crate::stage::scaling::back_solve_primaries;

/// Share of an enemy's target attack delivered through attack power; the
/// rest becomes the hand's variance range, so mean damage matches the curve.
const POWER_SHARE: f64 = 0.8;

const SMALL_SALT: u64 = 0x5e;
const MEDIUM_SALT: u64 = 0x6d;
const BOSS_SALT: u64 = 0xb0;

/// Enemies per normal wave, gated by hero level so early heroes never face
/// packs.
pub fn enemy_count(stage_number: u32, hero_level: u32, data: &GameData) -> u32 {
    let cfg = &data.stage_config;
    let scaled = cfg.base_enemy_count
        + (stage_number.saturating_sub(1) / WAVE_COUNT_STAGE_WINDOW) * cfg.count_per_five_stages;
    if hero_level < LOW_LEVEL_THRESHOLD {
        WAVE_COUNT_LOW_LEVEL_CAP
    } else if hero_level < MID_LEVEL_THRESHOLD {
        scaled.min(WAVE_COUNT_MID_LEVEL_CAP)
    } else {
        scaled.max(WAVE_COUNT_HIGH_LEVEL_FLOOR)
    }
}

/// Medium-tier slots in a wave of `count` enemies.
pub fn medium_slots(stage_number: u32, count: u32) -> u32 {
    (stage_number / MEDIUM_TIER_STAGE_DIVISOR).min(count)
}

// FNV-1a over the slot coordinates.
fn slot_seed(stage: u32, wave: u32, slot: u32, salt: u64) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for value in [stage as u64, wave as u64, slot as u64, salt] {
        hash ^= value;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn pick<'a>(
    pool: &'a [EnemyDefinition],
    stage: u32,
    wave: u32,
    slot: u32,
    salt: u64,
) -> &'a EnemyDefinition {
    let index = (slot_seed(stage, wave, slot, salt) % pool.len() as u64) as usize;
    &pool[index]
}

fn build_spawn(
    definition: &EnemyDefinition,
    tier: EnemyTier,
    stage: u32,
    data: &GameData,
) -> EnemySpawn {
    let scaling = &data.scaling;
    let tier_mult = match tier {
        EnemyTier::Small => 1.0,
        EnemyTier::Medium => scaling.medium_multiplier,
        EnemyTier::Boss => 1.0,
    };
    let (health_mult, attack_mult, reward_mult) = match tier {
        EnemyTier::Boss => (
            scaling.boss.health_multiplier,
            scaling.boss.attack_multiplier,
            scaling.boss.reward_multiplier,
        ),
        _ => (tier_mult, tier_mult, tier_mult),
    };

    let target_health = scaling.health.value(stage) * health_mult;
    let target_attack = scaling.attack.value(stage) * attack_mult;
    let target_defense = scaling.defense.value(stage) * tier_mult;
    let interval = scaling
        .attack_interval
        .value(stage)
        .max(MIN_ATTACK_DELAY_SECONDS);

    let mut primaries = definition.base;
    let solved = back_solve_primaries(
        &definition.formulas,
        target_health,
        target_attack * POWER_SHARE,
        target_defense,
    );
    for attr in [
        AttributeType::Vitality,
        AttributeType::Strength,
        AttributeType::Defense,
    ] {
        primaries.set(attr, solved.get(attr));
    }

    EnemySpawn {
        definition_id: definition.id.clone(),
        name: definition.name.clone(),
        tier,
        primaries,
        formulas: definition.formulas,
        hand: HandProfile {
            min_damage: 0.0,
            max_damage: target_attack * (1.0 - POWER_SHARE) * 2.0,
            delay_seconds: interval,
        },
        abilities: definition.abilities.clone(),
        rewards: RewardScaling {
            experience: (scaling.xp.value(stage) * reward_mult).round() as u64,
            gold: (scaling.gold.value(stage) * reward_mult).round() as u64,
        },
    }
}

fn normal_wave(stage: u32, wave: u32, hero_level: u32, data: &GameData) -> WaveBlueprint {
    let count = enemy_count(stage, hero_level, data);
    let medium = medium_slots(stage, count);

    let mut spawns = Vec::with_capacity(count as usize);
    for slot in 0..count {
        let (tier, pool, salt) = if slot < medium {
            (EnemyTier::Medium, &data.enemy_pools.medium, MEDIUM_SALT)
        } else {
            (EnemyTier::Small, &data.enemy_pools.small, SMALL_SALT)
        };
        let definition = pick(pool, stage, wave, slot, salt);
        spawns.push(build_spawn(definition, tier, stage, data));
    }

    WaveBlueprint {
        wave_number: wave,
        is_boss: false,
        spawns,
        boss: None,
    }
}

fn boss_wave(stage: u32, wave: u32, data: &GameData) -> WaveBlueprint {
    let definition = pick(&data.enemy_pools.boss, stage, wave, 0, BOSS_SALT);
    let spawn = build_spawn(definition, EnemyTier::Boss, stage, data);
    let boss = &data.scaling.boss;

    WaveBlueprint {
        wave_number: wave,
        is_boss: true,
        spawns: vec![spawn],
        boss: Some(BossConfig {
            timer_seconds: boss.timer_seconds,
            enrage_threshold: boss.enrage_threshold,
            enrage_attack_multiplier: boss.enrage_attack_multiplier,
        }),
    }
}

/// Generates the full blueprint for a stage. Pure: the same stage number,
/// hero level and data bundle always yield the same blueprint.
pub fn generate_stage(stage_number: u32, hero_level: u32, data: &GameData) -> StageBlueprint {
    let stage_number = stage_number.max(1);
    let waves_per_stage = data.stage_config.waves_per_stage.max(1);

    let mut waves = Vec::with_capacity(waves_per_stage as usize);
    for wave in 1..waves_per_stage {
        waves.push(normal_wave(stage_number, wave, hero_level, data));
    }
    waves.push(boss_wave(stage_number, waves_per_stage, data));

    let loot_table_id = data
        .stage_config
        .loot_table_overrides
        .get(&stage_number)
        .cloned()
        .unwrap_or_else(|| DEFAULT_LOOT_TABLE_ID.to_string());

    StageBlueprint {
        stage_number,
        waves,
        loot_table_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Attributes, DerivedStatFormulas, EvolutionProfile, LevelingProfile};
    use crate::data::{EnemyPools, HeroDefinition, ItemCatalog, StageGenConfig};
    use crate::stage::scaling::EnemyScalingConfig;

    fn enemy(id: &str) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            name: id.to_string(),
            base: Attributes::uniform(5.0),
            formulas: DerivedStatFormulas::default(),
            abilities: vec![],
        }
    }

    fn data() -> GameData {
        GameData {
            heroes: vec![HeroDefinition {
                id: "hero".to_string(),
                name: "Hero".to_string(),
                base: Attributes::uniform(10.0),
                formulas: DerivedStatFormulas::default(),
                leveling: LevelingProfile::default(),
                evolution: EvolutionProfile::default(),
                main_hand: None,
                off_hand: None,
                abilities: vec![],
            }],
            enemy_pools: EnemyPools {
                small: vec![enemy("rat"), enemy("wolf"), enemy("bandit")],
                medium: vec![enemy("ogre"), enemy("golem")],
                boss: vec![enemy("dragon"), enemy("lich")],
            },
            scaling: EnemyScalingConfig::default(),
            stage_config: StageGenConfig::default(),
            loot_tables: vec![],
            catalog: ItemCatalog::default(),
            recipes: vec![],
        }
    }

    #[test]
    fn test_enemy_count_gated_by_hero_level() {
        let data = data();
        // base 3, +1 per five stages: stage 11 scales to 5.
        assert_eq!(enemy_count(11, 9, &data), 1);
        assert_eq!(enemy_count(11, 14, &data), 2);
        assert_eq!(enemy_count(11, 20, &data), 5);
    }

    #[test]
    fn test_enemy_count_floor_at_high_level() {
        let mut data = data();
        data.stage_config.base_enemy_count = 1;
        data.stage_config.count_per_five_stages = 0;
        assert_eq!(enemy_count(1, 20, &data), 3);
    }

    #[test]
    fn test_medium_slots() {
        assert_eq!(medium_slots(1, 3), 0);
        assert_eq!(medium_slots(9, 3), 0);
        assert_eq!(medium_slots(10, 3), 1);
        assert_eq!(medium_slots(25, 5), 2);
        // Never more mediums than enemies.
        assert_eq!(medium_slots(90, 2), 2);
    }

    #[test]
    fn test_stage_eleven_layout() {
        let data = data();
        let blueprint = generate_stage(11, 20, &data);

        assert_eq!(blueprint.wave_count(), 5);
        let first = blueprint.wave(1).unwrap();
        assert_eq!(first.spawns.len(), 5);
        let mediums = first
            .spawns
            .iter()
            .filter(|s| s.tier == EnemyTier::Medium)
            .count();
        assert_eq!(mediums, 1);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let data = data();
        let a = generate_stage(7, 20, &data);
        let b = generate_stage(7, 20, &data);

        assert_eq!(a.wave_count(), b.wave_count());
        for (wa, wb) in a.waves.iter().zip(&b.waves) {
            let ids_a: Vec<_> = wa.spawns.iter().map(|s| &s.definition_id).collect();
            let ids_b: Vec<_> = wb.spawns.iter().map(|s| &s.definition_id).collect();
            assert_eq!(ids_a, ids_b);
        }
    }

    #[test]
    fn test_last_wave_is_boss_with_config() {
        let data = data();
        let blueprint = generate_stage(3, 20, &data);
        let boss = blueprint.boss_wave().unwrap();

        assert_eq!(boss.wave_number, 5);
        assert_eq!(boss.spawns.len(), 1);
        assert_eq!(boss.spawns[0].tier, EnemyTier::Boss);
        let config = boss.boss.unwrap();
        assert_eq!(config.timer_seconds, data.scaling.boss.timer_seconds);
    }

    #[test]
    fn test_boss_outscales_normals() {
        let data = data();
        let blueprint = generate_stage(5, 20, &data);
        let normal = blueprint.wave(1).unwrap().spawns[0].spawn();
        let boss = blueprint.boss_wave().unwrap().spawns[0].spawn();

        assert!(boss.max_health() > normal.max_health());
        assert!(boss.attack_power() > normal.attack_power());
    }

    #[test]
    fn test_mean_damage_tracks_attack_curve() {
        let data = data();
        let blueprint = generate_stage(4, 20, &data);
        let spawn = &blueprint.wave(1).unwrap().spawns[0];
        let enemy = spawn.spawn();

        let (min, max) = enemy.damage_range(crate::combatant::Hand::Main);
        let mean = (min + max) / 2.0;
        let target = data.scaling.attack.value(4);
        assert!((mean - target).abs() / target < 0.05);
    }

    #[test]
    fn test_loot_table_override() {
        let mut data = data();
        data.stage_config
            .loot_table_overrides
            .insert(2, "cave_loot".to_string());

        assert_eq!(generate_stage(2, 20, &data).loot_table_id, "cave_loot");
        assert_eq!(
            generate_stage(3, 20, &data).loot_table_id,
            DEFAULT_LOOT_TABLE_ID
        );
    }

    #[test]
    fn test_higher_stage_enemies_are_stronger() {
        let data = data();
        let low = generate_stage(1, 20, &data).waves[0].spawns[0].spawn();
        let high = generate_stage(20, 20, &data).waves[0].spawns[0].spawn();

        assert!(high.max_health() > low.max_health());
        assert!(high.attack_power() > low.attack_power());
    }
}
