//! gmscreen - command-line combat tracker
//!
//! Every command loads the save file, applies one operation, and writes the
//! save back.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gmscreen::combat::{
    CombatEncounter, CombatParticipant, EncounterManager, LogKind, RandomDice, StatusCondition,
};
use gmscreen::persist::SaveStore;
use gmscreen::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Game master's combat tracker
#[derive(Parser, Debug)]
#[command(name = "gmscreen", version, about = "Track initiative, turns and conditions")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Save file to use instead of the configured one
    #[arg(short, long, global = true)]
    save: Option<PathBuf>,

    /// Seed the dice for a reproducible run
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a dice expression such as 3d6+2
    Roll { expression: String },
    /// Create a new encounter
    New { name: String },
    /// List encounters, or show one in detail
    Show { encounter: Option<String> },
    /// Add a participant to an encounter
    Add {
        encounter: String,
        id: String,
        name: String,
        #[arg(long)]
        reflexes: Option<i32>,
        #[arg(long, default_value_t = 40)]
        hp: i32,
        #[arg(long)]
        npc: bool,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a participant
    Remove { encounter: String, participant: String },
    /// Roll initiative and start combat
    Start { encounter: String },
    /// Advance to the next turn
    Next { encounter: String },
    /// Step back one turn
    Prev { encounter: String },
    /// Pause combat
    Pause { encounter: String },
    /// Resume a paused combat
    Resume { encounter: String },
    /// End combat, keeping the log
    End { encounter: String },
    /// Damage a participant
    Damage {
        encounter: String,
        participant: String,
        amount: i32,
    },
    /// Heal a participant
    Heal {
        encounter: String,
        participant: String,
        amount: i32,
    },
    /// Apply a condition; persistent unless --rounds is given
    Condition {
        encounter: String,
        participant: String,
        name: String,
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long = "effect")]
        effects: Vec<String>,
    },
    /// Remove a condition by id
    Clear {
        encounter: String,
        participant: String,
        condition: String,
    },
    /// Print the combat log
    Log { encounter: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let save_path = args.save.clone().unwrap_or_else(|| config.save_path.clone());
    let store = SaveStore::new(save_path, config.max_save_bytes);

    let manager = match args.seed {
        Some(seed) => {
            EncounterManager::with_dice(RandomDice::seeded(seed), config.dice_history_limit)
        }
        None => EncounterManager::from_config(&config),
    };
    if let Some(save) = store
        .load()
        .await
        .with_context(|| format!("failed to read {}", store.path().display()))?
    {
        manager.restore(save);
    }

    run(&manager, args.command)?;

    store
        .save(&manager.to_save_file())
        .await
        .with_context(|| format!("failed to write {}", store.path().display()))?;
    Ok(())
}

/// Resolve an encounter by id or name
fn lookup(manager: &EncounterManager, key: &str) -> Result<String> {
    match manager.find(key) {
        Some(encounter) => Ok(encounter.id().to_string()),
        None => bail!("no encounter named or with id {key:?}"),
    }
}

fn run(manager: &EncounterManager, command: Command) -> Result<()> {
    let encounter = match command {
        Command::Roll { expression } => {
            let result = manager.roll_dice(&expression)?;
            println!("{result}");
            return Ok(());
        }
        Command::New { name } => manager.create_encounter(&name),
        Command::Show { encounter: None } => {
            for encounter in manager.list() {
                println!(
                    "{}  {}  ({} participants, {})",
                    encounter.id(),
                    encounter.name,
                    encounter.participants().len(),
                    status(&encounter)
                );
            }
            return Ok(());
        }
        Command::Show {
            encounter: Some(key),
        } => {
            let id = lookup(manager, &key)?;
            manager
                .get(&id)
                .with_context(|| format!("encounter {id} disappeared"))?
        }
        Command::Add {
            encounter,
            id,
            name,
            reflexes,
            hp,
            npc,
            color,
        } => {
            let mut participant = if npc {
                CombatParticipant::npc(id, name, hp)
            } else {
                CombatParticipant::new(id, name, hp)
            };
            if let Some(reflexes) = reflexes {
                participant = participant.with_reflexes(reflexes);
            }
            if let Some(color) = color {
                participant = participant.with_color(color);
            }
            manager.add_participant(&lookup(manager, &encounter)?, participant)?
        }
        Command::Remove {
            encounter,
            participant,
        } => manager.remove_participant(&lookup(manager, &encounter)?, &participant)?,
        Command::Start { encounter } => manager.start_combat(&lookup(manager, &encounter)?)?,
        Command::Next { encounter } => manager.next_turn(&lookup(manager, &encounter)?)?,
        Command::Prev { encounter } => manager.previous_turn(&lookup(manager, &encounter)?)?,
        Command::Pause { encounter } => manager.pause_combat(&lookup(manager, &encounter)?)?,
        Command::Resume { encounter } => manager.resume_combat(&lookup(manager, &encounter)?)?,
        Command::End { encounter } => manager.end_combat(&lookup(manager, &encounter)?)?,
        Command::Damage {
            encounter,
            participant,
            amount,
        } => manager.apply_damage(&lookup(manager, &encounter)?, &participant, amount)?,
        Command::Heal {
            encounter,
            participant,
            amount,
        } => manager.heal(&lookup(manager, &encounter)?, &participant, amount)?,
        Command::Condition {
            encounter,
            participant,
            name,
            rounds,
            effects,
        } => {
            let mut condition = match rounds {
                Some(rounds) => StatusCondition::timed(name, rounds),
                None => StatusCondition::persistent(name),
            };
            for effect in effects {
                condition = condition.with_effect(effect);
            }
            manager.add_condition(&lookup(manager, &encounter)?, &participant, condition)?
        }
        Command::Clear {
            encounter,
            participant,
            condition,
        } => manager.remove_condition(&lookup(manager, &encounter)?, &participant, &condition)?,
        Command::Log { encounter } => {
            let id = lookup(manager, &encounter)?;
            let encounter = manager
                .get(&id)
                .with_context(|| format!("encounter {id} disappeared"))?;
            for entry in encounter.log().entries() {
                let marker = match entry.kind {
                    LogKind::Action => ">",
                    LogKind::Damage => "!",
                    LogKind::Status => "~",
                    LogKind::System => "#",
                };
                println!(
                    "{} R{:<3} {} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.round,
                    marker,
                    entry.action
                );
            }
            return Ok(());
        }
    };

    print_encounter(&encounter);
    Ok(())
}

fn status(encounter: &CombatEncounter) -> String {
    match (encounter.is_active(), encounter.is_paused()) {
        (true, true) => format!("round {}, paused", encounter.round()),
        (true, false) => format!("round {}", encounter.round()),
        (false, _) => "not in combat".to_string(),
    }
}

fn print_encounter(encounter: &CombatEncounter) {
    println!("{} [{}] - {}", encounter.name, encounter.id(), status(encounter));

    let acting = encounter.current_participant().map(|p| p.id.as_str());
    for participant in encounter.participants() {
        let marker = if Some(participant.id.as_str()) == acting {
            ">"
        } else if participant.has_acted {
            "."
        } else {
            " "
        };
        let mut flags = Vec::new();
        if participant.is_npc {
            flags.push("NPC".to_string());
        }
        if participant.seriously_wounded() {
            flags.push("seriously wounded".to_string());
        }
        for condition in participant.conditions.iter() {
            match condition.duration {
                Some(rounds) if !condition.is_persistent => {
                    flags.push(format!("{} ({}r) [{}]", condition.name, rounds, condition.id))
                }
                _ => flags.push(format!("{} [{}]", condition.name, condition.id)),
            }
        }
        println!(
            "{} {:>3}  {:<20} {:>4}/{:<4} {}  {}",
            marker,
            participant.initiative,
            participant.name,
            participant.hit_points(),
            participant.max_hit_points(),
            participant.id,
            flags.join(", ")
        );
    }
}
