//! Arise - command line front-end
//!
//! Thin presentation layer over the library: every command loads the
//! snapshot, calls one engine operation and prints the result.

use std::io::{self, Write};
use std::path::PathBuf;

use arise::core::config::AppConfig;
use arise::core::error::{ChatError, Result};
use arise::core::types::{QuestId, StatType};
use arise::llm::client::LlmClient;
use arise::llm::mentor::MentorSession;
use arise::persistence::{FileStore, SnapshotAdapter};
use arise::progression::{ProfileUpdate, ProgressionEngine, XP_PER_LEVEL};
use arise::quest::{parse_date, QuestDraft};
use arise::views::{daily_goal, quest_log, CalendarMonth, Milestone, StatChart};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Arise - level up your life one quest at a time
#[derive(Parser, Debug)]
#[command(name = "arise")]
#[command(about = "Track quests, earn stat XP, climb ranks")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true, default_value = "arise.toml")]
    config: PathBuf,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage quests
    #[command(subcommand)]
    Quest(QuestCommand),
    /// Show stat XP
    Stats,
    /// Show or edit the profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show quests on a month grid
    Calendar {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Talk to Ash, the mentor
    Chat,
    /// Wipe all progress
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum QuestCommand {
    /// Add a quest
    Add {
        name: String,
        /// Academics, Intelligence, Strength, Endurance or Discipline
        #[arg(long, short)]
        stat: StatType,
        /// 1-10, also the XP reward
        #[arg(long, short, default_value_t = 1)]
        difficulty: i64,
        /// Target date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List active quests, hardest first
    List,
    /// Complete a quest and collect its XP
    Done { id: String },
    /// Delete a quest without reward
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arise=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(Some(&args.config))?;
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }

    let store = FileStore::new(config.storage.data_dir.clone());
    let adapter = SnapshotAdapter::with_key(store, config.storage.key.clone());
    let mut engine =
        ProgressionEngine::load_with_profile(adapter, &config.profile);

    match args.command {
        Command::Quest(cmd) => run_quest(&mut engine, cmd)?,
        Command::Stats => print_stats(&engine),
        Command::Profile(ProfileCommand::Show) => print_profile(&engine),
        Command::Profile(ProfileCommand::Set { name, age }) => {
            engine.update_user_profile(ProfileUpdate { name, age })?;
            print_profile(&engine);
        }
        Command::Calendar { month } => print_calendar(&engine, month.as_deref())?,
        Command::Chat => run_chat(&config, &engine.profile().name)?,
        Command::Reset { yes } => {
            if yes {
                engine.reset(&config.profile);
                println!("All progress reset.");
            } else {
                println!("Refusing to reset without --yes");
            }
        }
    }

    Ok(())
}

type Engine = ProgressionEngine<FileStore>;

fn run_quest(engine: &mut Engine, cmd: QuestCommand) -> Result<()> {
    match cmd {
        QuestCommand::Add {
            name,
            stat,
            difficulty,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive().to_string());
            let id = engine.add_quest(QuestDraft::new(name, stat, difficulty, date))?;
            println!("Quest added: {id}");
        }
        QuestCommand::List => {
            let quests = quest_log(engine.quests());
            if quests.is_empty() {
                println!("No active quests. The system awaits your input.");
            }
            for quest in quests {
                println!(
                    "[{:>2}] {:<40} {:<12} {}  ({})",
                    quest.difficulty.value(),
                    quest.name,
                    quest.stat,
                    quest.date,
                    quest.id
                );
            }
        }
        QuestCommand::Done { id } => match engine.complete_quest(&QuestId::from(id)) {
            Some(done) => {
                println!(
                    "Completed \"{}\": +{} {} XP",
                    done.quest.name, done.xp_gained, done.stat
                );
                if done.leveled_up() {
                    println!("LEVEL UP! Now level {}", done.level);
                }
                if done.ranked_up() {
                    println!("RANK UP! Now rank {}", done.rank);
                }
            }
            None => println!("No such quest; nothing to do."),
        },
        QuestCommand::Delete { id } => {
            match engine.delete_quest(&QuestId::from(id)) {
                Some(quest) => println!("Deleted \"{}\".", quest.name),
                None => println!("No such quest; nothing to do."),
            }
        }
    }
    Ok(())
}

fn print_stats(engine: &Engine) {
    let chart = StatChart::from_stats(engine.stats());
    for point in &chart.points {
        let width = (point.value * 30 / chart.scale) as usize;
        println!(
            "{} {:<13} {:>6}  {}",
            point.label,
            point.stat.name(),
            point.value,
            "#".repeat(width)
        );
    }
    let weakest = engine.stats().min();
    println!(
        "Next level when every stat reaches {} XP",
        (weakest / XP_PER_LEVEL + 1) * XP_PER_LEVEL
    );
}

fn print_profile(engine: &Engine) {
    let profile = engine.profile();
    let milestone = Milestone::for_total_xp(profile.total_xp);
    println!("{} (age {})", profile.name, profile.age);
    println!("Level {}  Rank {}", profile.level, profile.rank);
    println!("Total XP {}", profile.total_xp);
    println!(
        "Milestone {}%  - {} XP to next milestone",
        milestone.percent, milestone.remaining
    );
    if let Some(next) = profile.rank.next() {
        println!(
            "{} XP to rank {}",
            next.min_xp().saturating_sub(profile.total_xp),
            next
        );
    }
}

fn print_calendar(engine: &Engine, month: Option<&str>) -> Result<()> {
    let today = Local::now().date_naive();
    let first = match month {
        Some(month) => parse_date(&format!("{month}-01"))?,
        None => today.with_day(1).unwrap_or(today),
    };
    let Some(grid) = CalendarMonth::build(first.year(), first.month(), today, engine.quests())
    else {
        return Ok(());
    };

    println!("{}", first.format("%B %Y"));
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    let mut line = "    ".repeat(grid.leading_blanks as usize);
    for (i, cell) in grid.days.iter().enumerate() {
        let marker = if cell.is_today {
            '*'
        } else if cell.quests.is_empty() {
            ' '
        } else {
            '!'
        };
        line.push_str(&format!("{:>3}{}", cell.date.day(), marker));
        if (grid.leading_blanks as usize + i + 1) % 7 == 0 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }

    println!();
    println!("Daily goal: {}", daily_goal(today));
    for cell in grid.days_with_quests() {
        for quest in &cell.quests {
            println!("  {}  {} [{}]", cell.date, quest.name, quest.stat);
        }
    }
    Ok(())
}

fn run_chat(config: &AppConfig, user_name: &str) -> Result<()> {
    let client = LlmClient::from_config(&config.mentor)?;
    tracing::info!(model = client.model(), "mentor ready");

    // Create the async runtime for LLM calls
    let rt = Runtime::new()?;
    let session = MentorSession::new(client, user_name);

    for message in session.transcript() {
        println!("Ash: {}", message.text);
    }
    println!("(type 'quit' to leave)");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input == "quit" || input == "q" {
            break;
        }

        match rt.block_on(session.send(input)) {
            Ok(reply) => println!("\nAsh: {}\n", reply.text),
            Err(ChatError::EmptyMessage) => continue,
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}
