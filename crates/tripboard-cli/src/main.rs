use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tripboard_core::{ensure_skeleton_config, load_config, TripPlanner, TripboardConfig};
use tripboard_schema::{SegmentDraft, TripDateRange};
use tripboard_server::state::AppState;
use tripboard_store::SqliteStore;
use uuid::Uuid;

mod render;

#[derive(Parser)]
#[command(name = "tripboard", version, about = "Plan trips as a sequence of stays")]
struct Cli {
    #[arg(
        long,
        default_value = "~/.tripboard",
        help = "Project root directory (contains config/, data/ and logs/)"
    )]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Write a default config/main.yaml")]
    Init,
    #[command(about = "Validate config files")]
    Validate,
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, help = "Override the configured server port")]
        port: Option<u16>,
    },
    #[command(subcommand, about = "Trip management")]
    Trip(TripCommands),
    #[command(subcommand, about = "Segment management")]
    Segment(SegmentCommands),
}

#[derive(Subcommand)]
enum TripCommands {
    #[command(about = "List all trips")]
    List,
    #[command(about = "Create a trip")]
    Create {
        #[arg(help = "Trip title")]
        title: String,
        #[arg(help = "First day (YYYY-MM-DD)")]
        start: String,
        #[arg(help = "Last day (YYYY-MM-DD)")]
        end: String,
    },
    #[command(about = "Show a trip itinerary with TBD gaps")]
    Show {
        #[arg(help = "Trip ID")]
        trip_id: String,
    },
    #[command(about = "Change trip dates, clamping or dropping segments")]
    Dates {
        #[arg(help = "Trip ID")]
        trip_id: String,
        #[arg(help = "New first day (YYYY-MM-DD)")]
        start: String,
        #[arg(help = "New last day (YYYY-MM-DD)")]
        end: String,
        #[arg(long, help = "Only print what would change")]
        dry_run: bool,
    },
    #[command(about = "Delete a trip and its segments")]
    Delete {
        #[arg(help = "Trip ID")]
        trip_id: String,
    },
}

#[derive(Subcommand)]
enum SegmentCommands {
    #[command(about = "Add a segment to a trip")]
    Add {
        #[arg(help = "Trip ID")]
        trip_id: String,
        #[arg(help = "Place name")]
        place: String,
        #[arg(help = "First day (YYYY-MM-DD)")]
        start: String,
        #[arg(help = "Last day (YYYY-MM-DD)")]
        end: String,
        #[arg(long, help = "Free-form notes")]
        notes: Option<String>,
    },
    #[command(about = "Change a segment's place, dates or notes")]
    Update {
        #[arg(help = "Segment ID")]
        segment_id: String,
        #[arg(help = "Place name")]
        place: String,
        #[arg(help = "First day (YYYY-MM-DD)")]
        start: String,
        #[arg(help = "Last day (YYYY-MM-DD)")]
        end: String,
        #[arg(long, help = "Free-form notes")]
        notes: Option<String>,
    },
    #[command(about = "Remove a segment")]
    Remove {
        #[arg(help = "Segment ID")]
        segment_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Expand ~ to home directory
    if cli.root.starts_with("~") {
        if let Some(home) = std::env::var_os("HOME") {
            cli.root = PathBuf::from(home).join(cli.root.strip_prefix("~").unwrap_or(&cli.root));
        }
    }

    let log_dir = cli.root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tripboard.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Init => {
            let config_dir = cli.root.join("config");
            if ensure_skeleton_config(&config_dir)? {
                tracing::info!(config_dir = %config_dir.display(), "wrote skeleton config");
                println!("Wrote {}", config_dir.join("main.yaml").display());
            } else {
                println!("Config already present in {}", config_dir.display());
            }
        }
        Commands::Validate => {
            let config = load_config(&cli.root.join("config"))?;
            println!(
                "Config valid. Serving on {}, database at {}.",
                config.server.addr(),
                config.database_path(&cli.root).display()
            );
        }
        Commands::Serve { port } => {
            let mut config = load_config(&cli.root.join("config"))?;
            if let Some(port) = port {
                config.server.port = port;
            }
            let store = open_store(&cli.root, &config)?;
            tracing::info!(
                root = %cli.root.display(),
                env = %config.app.env,
                "starting {}",
                config.app.name
            );
            tripboard_server::serve(AppState::new(Arc::new(store)), &config.server.addr()).await?;
        }
        Commands::Trip(cmd) => {
            let planner = open_planner(&cli.root)?;
            match cmd {
                TripCommands::List => {
                    let trips = planner.list_trips().await?;
                    if trips.is_empty() {
                        println!("No trips yet.");
                    } else {
                        print!("{}", render::trip_table(&trips));
                    }
                }
                TripCommands::Create { title, start, end } => {
                    let trip = planner
                        .create_trip(&title, TripDateRange::parse(&start, &end)?)
                        .await?;
                    println!("Created trip {} ({}).", trip.id, trip.dates);
                }
                TripCommands::Show { trip_id } => {
                    let itinerary = planner.itinerary(parse_id(&trip_id)?).await?;
                    print!("{}", render::itinerary(&itinerary));
                }
                TripCommands::Dates {
                    trip_id,
                    start,
                    end,
                    dry_run,
                } => {
                    let trip_id = parse_id(&trip_id)?;
                    let dates = TripDateRange::parse(&start, &end)?;
                    let plan = if dry_run {
                        planner.preview_trip_dates(trip_id, dates).await?
                    } else {
                        let plan = planner.update_trip_dates(trip_id, dates).await?;
                        tracing::info!(
                            %trip_id,
                            %dates,
                            clamped = plan.clamped.len(),
                            deleted = plan.deleted.len(),
                            "trip dates changed from cli"
                        );
                        plan
                    };
                    print!("{}", render::plan(&plan));
                }
                TripCommands::Delete { trip_id } => {
                    planner.delete_trip(parse_id(&trip_id)?).await?;
                    println!("Trip '{trip_id}' deleted.");
                }
            }
        }
        Commands::Segment(cmd) => {
            let planner = open_planner(&cli.root)?;
            match cmd {
                SegmentCommands::Add {
                    trip_id,
                    place,
                    start,
                    end,
                    notes,
                } => {
                    let draft = SegmentDraft {
                        place_name: place,
                        dates: TripDateRange::parse(&start, &end)?,
                        notes,
                    };
                    let segment = planner.create_segment(parse_id(&trip_id)?, draft).await?;
                    println!(
                        "Added {} ({}) as segment {}.",
                        segment.place_name, segment.dates, segment.id
                    );
                }
                SegmentCommands::Update {
                    segment_id,
                    place,
                    start,
                    end,
                    notes,
                } => {
                    let draft = SegmentDraft {
                        place_name: place,
                        dates: TripDateRange::parse(&start, &end)?,
                        notes,
                    };
                    let segment = planner.update_segment(parse_id(&segment_id)?, draft).await?;
                    println!(
                        "Updated segment {}: {} ({}).",
                        segment.id, segment.place_name, segment.dates
                    );
                }
                SegmentCommands::Remove { segment_id } => {
                    planner.delete_segment(parse_id(&segment_id)?).await?;
                    println!("Segment '{segment_id}' removed.");
                }
            }
        }
    }

    Ok(())
}

fn open_store(root: &Path, config: &TripboardConfig) -> Result<SqliteStore> {
    let db_path = config.database_path(root);
    SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))
}

fn open_planner(root: &Path) -> Result<TripPlanner> {
    let config = load_config(&root.join("config"))?;
    let store = open_store(root, &config)?;
    Ok(TripPlanner::new(Arc::new(store)))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("invalid id: {raw}"))
}
