//! Horde Run audit tool
//!
//! Reproduces every seeded outcome (level content, shop offers, gold and
//! coin rolls, boss loot) from the integers logged by the game.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;

use horde_run::sim::{
    generate_level, group_reward_at, roll_boss_loot, roll_shop_offers, seeds, LootTable,
};
use horde_run::Tuning;

/// Reproduce seeded game outcomes from logged inputs
#[derive(Parser)]
#[command(name = "horde-run")]
#[command(about = "Audit tool for Horde Run seeded outcomes", long_about = None)]
#[command(version)]
struct Cli {
    /// Tuning JSON (defaults are used when omitted)
    #[arg(long, global = true, value_name = "FILE")]
    tuning: Option<PathBuf>,

    /// Print JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every sub-seed derived for a context
    Seeds {
        #[arg(long, allow_hyphen_values = true)]
        seed: i32,
        #[arg(long, default_value_t = 1)]
        level: i32,
        #[arg(long, default_value_t = 0)]
        reroll: i32,
    },

    /// Generate a level's content
    Level {
        #[arg(long, allow_hyphen_values = true)]
        seed: i32,
        #[arg(long, default_value_t = 1)]
        level: i32,
        /// Treat --seed as the level stream seed instead of the run's base seed
        #[arg(long)]
        raw: bool,
    },

    /// Roll the shop offers for a level and reroll count
    Shop {
        #[arg(long, allow_hyphen_values = true)]
        seed: i32,
        #[arg(long, default_value_t = 1)]
        level: i32,
        #[arg(long, default_value_t = 0)]
        reroll: i32,
        /// Loot table JSON
        #[arg(long, value_name = "FILE")]
        table: PathBuf,
    },

    /// Roll the gold and coin checks of a defeated enemy group
    Gold {
        #[arg(long, allow_hyphen_values = true)]
        seed: i32,
        #[arg(long, default_value_t = 1)]
        level: i32,
        /// World X of the group
        #[arg(long, allow_hyphen_values = true)]
        x: f32,
        /// World Z of the group
        #[arg(long, allow_hyphen_values = true)]
        z: f32,
        /// Enemies in the group
        #[arg(long)]
        count: i32,
    },

    /// Roll the boss loot of a level
    BossLoot {
        #[arg(long, allow_hyphen_values = true)]
        seed: i32,
        #[arg(long, default_value_t = 1)]
        level: i32,
        /// Loot table JSON
        #[arg(long, value_name = "FILE")]
        table: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    match cli.command {
        Command::Seeds {
            seed,
            level,
            reroll,
        } => {
            let report = serde_json::json!({
                "base_seed": seed,
                "level_seed": seeds::level_seed(seed, level),
                "shop_seed": seeds::shop_seed(seed, level, reroll),
                "boss_loot_seed": seeds::boss_loot_seed(seed, level),
            });
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("level seed:     {}", report["level_seed"]);
                println!("shop seed:      {}", report["shop_seed"]);
                println!("boss loot seed: {}", report["boss_loot_seed"]);
            }
        }

        Command::Level { seed, level, raw } => {
            let stream_seed = if raw { seed } else { seeds::level_seed(seed, level) };
            let data = generate_level(level, stream_seed);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("level {} (stream seed {})", data.level_index, stream_seed);
                for (i, segment) in data.segments.iter().enumerate() {
                    println!(
                        "  segment {}: [{}] | [{}]  enemies {}",
                        i,
                        segment.left.label(),
                        segment.right.label(),
                        segment.enemy_count
                    );
                }
                println!(
                    "  boss {:?}: hp {} damage {}",
                    data.boss.pattern, data.boss.hp, data.boss.damage
                );
            }
        }

        Command::Shop {
            seed,
            level,
            reroll,
            table,
        } => {
            let table = load_table(&table)?;
            let offers = roll_shop_offers(
                &table,
                seed,
                level,
                reroll,
                tuning.shop_offer_count,
                &tuning,
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&offers)?);
            } else {
                println!("shop seed {}", seeds::shop_seed(seed, level, reroll));
                for offer in &offers {
                    println!(
                        "  {} ({}) - {} gold",
                        offer.item.id,
                        offer.item.rarity.as_str(),
                        offer.price
                    );
                }
            }
        }

        Command::Gold {
            seed,
            level,
            x,
            z,
            count,
        } => {
            let position = Vec3::new(x, 0.0, z);
            let reward = group_reward_at(seed, level, position, count, &tuning);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reward)?);
            } else {
                let (qx, qz) = seeds::quantize_position(position);
                println!("quantized ({}, {}) -> seed {}", qx, qz, reward.seed);
                println!(
                    "  power +{}  gold +{}  coin {}",
                    reward.power,
                    reward.gold,
                    if reward.coin { "yes" } else { "no" }
                );
            }
        }

        Command::BossLoot { seed, level, table } => {
            let table = load_table(&table)?;
            let item = roll_boss_loot(&table, seed, level, tuning.boss_loot_drop_chance);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("boss loot seed {}", seeds::boss_loot_seed(seed, level));
                match item {
                    Some(item) => println!("  dropped {} ({})", item.id, item.rarity.as_str()),
                    None => println!("  no drop"),
                }
            }
        }
    }

    Ok(())
}

fn load_table(path: &Path) -> Result<LootTable> {
    LootTable::load(path).with_context(|| format!("loading loot table from {}", path.display()))
}
