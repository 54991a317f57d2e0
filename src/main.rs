use clap::{Parser, Subcommand};
use review_engine::database::{AttemptStore, ItemStore, MetricsStore, SqliteStore};
use review_engine::scheduler::format_interval;
use review_engine::stats::{build_schedule, summarize};
use review_engine::{
    AttemptFilter, Clock, EngineConfig, Grade, ReviewError, ReviewSession, Scheduler,
    SessionStores, StrategyKind,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "review", about = "Spaced repetition reviews from the command line")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "review.toml")]
    config: PathBuf,

    /// Overrides database_path from the config
    #[arg(long)]
    database: Option<PathBuf>,

    /// Learner the attempts and metrics belong to
    #[arg(short, long, default_value = "guest")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add sample vocabulary
    Seed,
    /// Add a card
    Add {
        term: String,
        definition: String,
        #[arg(long, default_value = "vocabulary")]
        category: String,
        #[arg(long, default_value = "level-based")]
        strategy: StrategyKind,
    },
    /// List items due now
    Due {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Review due items interactively
    Study {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show how many items fall due today, this week and next week
    Schedule {
        #[arg(long)]
        category: Option<String>,
    },
    /// Summarize review history
    Stats {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show learner metrics
    Metrics,
    /// Advance the simulated date by one day
    NextDay,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let mut config = EngineConfig::load(&cli.config)?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    let scheduler = Scheduler::new(&config);

    match cli.command {
        Commands::Seed => {
            let samples = [
                ("cześć", "hello"),
                ("dziękuję", "thank you"),
                ("proszę", "please"),
            ];
            for (term, definition) in samples {
                add_card(
                    &store,
                    &scheduler,
                    term,
                    definition,
                    "vocabulary",
                    StrategyKind::LevelBased,
                )?;
            }
            println!("Sample data created!");
        }
        Commands::Add {
            term,
            definition,
            category,
            strategy,
        } => {
            add_card(&store, &scheduler, &term, &definition, &category, strategy)?;
            println!("Added '{}' to {}", term, category);
        }
        Commands::Due { limit, category } => {
            let now = store.now();
            let limit = limit.unwrap_or(config.session.default_limit);
            let due = store.list_due_items(now, limit, category.as_deref())?;
            println!("{} item(s) due on {}", due.len(), now.format("%Y-%m-%d"));
            for item in due {
                println!("  - {} [{}, {}]", item.id, item.category, item.strategy);
            }
        }
        Commands::Study { limit, category } => {
            study(&store, &config, &cli.user, limit, category.as_deref())?;
        }
        Commands::Schedule { category } => {
            let items = store.list_items(category.as_deref())?;
            let schedule = build_schedule(&items, store.now());
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        Commands::Stats { category } => {
            let filter = category.map(AttemptFilter::category).unwrap_or_default();
            let attempts = store.list_attempts(&cli.user, &filter)?;
            println!("{}", serde_json::to_string_pretty(&summarize(&attempts))?);
        }
        Commands::Metrics => {
            let metrics = store.get_user_metrics(&cli.user)?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::NextDay => {
            let today = store.advance_day()?;
            println!("{}", today.format("%Y-%m-%d"));
        }
    }

    Ok(())
}

fn add_card(
    store: &SqliteStore,
    scheduler: &Scheduler,
    term: &str,
    definition: &str,
    category: &str,
    strategy: StrategyKind,
) -> Result<(), Box<dyn std::error::Error>> {
    if store.get_item(term).is_ok() {
        log::info!("Item '{}' already exists, skipping", term);
        return Ok(());
    }
    let content = serde_json::json!({ "term": term, "definition": definition });
    store.upsert_item(&scheduler.new_item(term, category, strategy, content))?;
    Ok(())
}

fn study(
    store: &Arc<SqliteStore>,
    config: &EngineConfig,
    user: &str,
    limit: Option<usize>,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = Scheduler::new(config);
    let mut session = ReviewSession::new(
        user,
        SessionStores::shared(store.clone()),
        store.clone(),
        config,
    );

    if session.start(limit, category)? == 0 {
        println!("Nothing is due. Come back tomorrow!");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(item) = session.current_item().cloned() {
        let term = item.content.get("term").and_then(|v| v.as_str()).unwrap_or(&item.id);
        println!();
        println!("Round {}: {}", session.round_number(), term);

        let preview = scheduler.preview(&item, store.now())?;
        let prompt = match item.strategy {
            StrategyKind::LevelBased => format!(
                "[0] again ({})  [1] hard ({})  [2] easy ({})",
                format_interval(preview.again),
                format_interval(preview.hard),
                format_interval(preview.easy)
            ),
            StrategyKind::EaseFactor => format!(
                "[0] again ({})  [1-2] hard ({})  [3] good ({})  [4] easy ({})",
                format_interval(preview.again),
                format_interval(preview.hard),
                format_interval(preview.good),
                format_interval(preview.easy)
            ),
        };
        print!("Press Enter to reveal, q to quit > ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        if line?.trim() == "q" {
            break;
        }
        if let Some(definition) = item.content.get("definition").and_then(|v| v.as_str()) {
            println!("Answer: {}", definition);
        }

        print!("{} > ", prompt);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let Ok(value) = line?.trim().parse::<u8>() else {
            println!("Please enter a number");
            continue;
        };
        let grade = match item.strategy {
            StrategyKind::LevelBased => Grade::Rating(value),
            StrategyKind::EaseFactor => Grade::Quality(value),
        };

        match session.submit(grade) {
            Ok(outcome) => {
                println!(
                    "{} -> next review in {}",
                    outcome.status.as_str(),
                    format_interval(outcome.item.interval_days)
                );
                if !outcome.persisted {
                    println!("(could not save this review)");
                }
            }
            Err(ReviewError::Validation(message)) => println!("{}", message),
            Err(e) => return Err(e.into()),
        }
    }

    let summary = session.finish();
    println!();
    println!(
        "Reviewed {} item(s), {} correct. Streak: {} day(s)",
        summary.reviewed, summary.correct, summary.metrics.streak
    );
    if !summary.unsynced.is_empty() {
        println!("Not saved: {}", summary.unsynced.join(", "));
    }
    if !summary.metrics_persisted {
        println!("(could not save your progress metrics)");
    }
    Ok(())
}
