// Tick and timing
pub const TICK_INTERVAL_SECONDS: f64 = 0.1;
pub const MIN_ATTACK_DELAY_SECONDS: f64 = 0.2;
/// Largest backlog of simulation time one `tick` call will work through.
pub const MAX_TICK_ACCUMULATOR_SECONDS: f64 = 10.0;

// XP and leveling
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;

// Attack resolution
pub const CRIT_DAMAGE_MULTIPLIER: f64 = 2.0;
pub const ARMOR_MITIGATION_CONSTANT: f64 = 100.0;
pub const MIN_HIT_DAMAGE: f64 = 1.0;
pub const MIN_STAT_MULTIPLIER: f64 = 0.01;

// Character attributes
pub const NUM_ATTRIBUTES: usize = 8;

// Encounter composition
pub const ENCOUNTER_GROUP_SIZE: usize = 3;

// Stage generation
pub const WAVE_COUNT_STAGE_WINDOW: u32 = 5;
pub const MEDIUM_TIER_STAGE_DIVISOR: u32 = 10;
pub const WAVE_COUNT_LOW_LEVEL_CAP: u32 = 1;
pub const WAVE_COUNT_MID_LEVEL_CAP: u32 = 2;
pub const WAVE_COUNT_HIGH_LEVEL_FLOOR: u32 = 3;
pub const LOW_LEVEL_THRESHOLD: u32 = 10;
pub const MID_LEVEL_THRESHOLD: u32 = 15;

// Loot
pub const DEFAULT_LOOT_TABLE_ID: &str = "default";

// Item economy
pub const UPGRADE_BONUS_PER_LEVEL: f64 = 0.10;
pub const SALVAGE_UPGRADE_BONUS_PER_LEVEL: f64 = 1.0;

// Boss bonus rewards
pub const BOSS_BONUS_GOLD_PER_STAGE: u64 = 25;
pub const BOSS_SHARD_MATERIAL_ID: &str = "boss_shard";
pub const BOSS_SHARDS_PER_CLEAR: u32 = 2;
pub const BOSS_AUGMENT_GEM_CHANCE: f64 = 0.15;
pub const BOSS_AUGMENT_GEM_ID: &str = "augment_gem";

// Progression
/// Permanent stat bonus granted the first time each stage's boss falls.
pub const FIRST_CLEAR_STAT_BONUS: f64 = 0.05;

// Snapshot versioning
pub const SNAPSHOT_VERSION: u32 = 1;
