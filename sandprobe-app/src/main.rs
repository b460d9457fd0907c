use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sandprobe_app::render::{self, to_json};
use sandprobe_app::{logging, process_env, secret_env_report, AppConfig, StatePanel};
use sandprobe_harvest::{build_catalog, BaseDirs, Harvester, PathResolver, Platform, TokioFilesystem};
use sandprobe_store::{increment, StateStore};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "sandprobe",
    version,
    about = "Report which sensitive user files this process can reach"
)]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, global = true, help = "Path to a YAML config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "trace, debug, info, warn or error")]
    log_level: Option<String>,
    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Probe every catalog target and report each outcome
    Harvest {
        #[arg(long, help = "linux, darwin or win32 (default: this OS)")]
        platform: Option<String>,
        #[arg(long, help = "Probe a conventional layout under this home instead")]
        home: Option<PathBuf>,
    },
    /// Show the named per-user directories
    Paths {
        #[arg(long)]
        platform: Option<String>,
    },
    /// Report which secret-bearing environment variables are set
    Env,
    /// Manage the persisted counter record
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum StateCommands {
    Path,
    Load,
    Save {
        #[arg(long, allow_negative_numbers = true)]
        counter: i64,
        #[arg(long, help = "Defaults to now")]
        timestamp: Option<String>,
    },
    Increment,
    Delete,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let level = logging::effective_level(cli.log_level.as_deref(), cli.verbose, config.level()?)?;
    logging::init(level);

    let env = process_env();

    match cli.command {
        Commands::Harvest { platform, home } => {
            let resolver = resolver_for(platform.as_deref(), home)?;
            let catalog = build_catalog(
                resolver.platform(),
                resolver.dirs(),
                &env,
                &config.app_ids(),
            );
            let report = Harvester::new(TokioFilesystem)
                .with_max_listing(config.max_listing)
                .run(catalog)
                .await;
            if cli.json {
                println!("{}", to_json(true, &report)?);
            } else {
                print!("{}", render::report_text(&report));
            }
        }
        Commands::Paths { platform } => {
            let resolver = resolver_for(platform.as_deref(), None)?;
            let rows = render::path_rows(&resolver);
            if cli.json {
                println!("{}", to_json(true, &rows)?);
            } else {
                print!("{}", render::paths_text(&rows));
            }
        }
        Commands::Env => {
            let secrets = secret_env_report(&env, &config.secret_env_vars);
            if cli.json {
                println!("{}", to_json(true, &secrets)?);
            } else {
                print!("{}", render::secrets_text(&secrets));
            }
        }
        Commands::State { command } => {
            let path = config
                .state_path(BaseDirs::discover)
                .context("Failed to resolve the state file path")?;
            let store = StateStore::new(path)?;
            let panel = run_state(&store, command).await;
            if cli.json {
                println!("{}", to_json(!panel.is_error(), &panel)?);
            } else if panel.is_error() {
                eprint!("{}", panel.render());
            } else {
                print!("{}", panel.render());
            }
            if panel.is_error() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolver_for(platform: Option<&str>, home: Option<PathBuf>) -> Result<PathResolver> {
    let platform = match platform {
        Some(tag) => tag.parse::<Platform>()?,
        None => Platform::current(),
    };
    let dirs = match home {
        Some(home) => BaseDirs::rooted_at(&platform, home),
        None => BaseDirs::discover().context("Failed to resolve user directories")?,
    };
    Ok(PathResolver::new(platform, dirs))
}

async fn run_state(store: &StateStore, command: StateCommands) -> StatePanel {
    let mut panel = StatePanel::new(store);
    if matches!(command, StateCommands::Path) {
        return panel;
    }
    panel.refresh(store).await;

    match command {
        StateCommands::Path | StateCommands::Load => {}
        StateCommands::Save { counter, timestamp } => {
            let candidate = serde_json::json!({
                "counter": counter,
                "timestamp": timestamp.unwrap_or_else(sandprobe_store::now_timestamp),
            });
            match store.save_value(&candidate).await {
                Ok(saved) => {
                    panel.refresh(store).await;
                    if !panel.is_error() {
                        panel.succeed(format!("saved at {}", saved.saved_at));
                    }
                }
                Err(e) => panel.fail(&e),
            }
        }
        StateCommands::Increment => match increment(store).await {
            Ok(record) => {
                panel.refresh(store).await;
                if !panel.is_error() {
                    panel.succeed(format!("incremented to {}", record.counter));
                }
            }
            Err(e) => panel.fail(&e),
        },
        StateCommands::Delete => match store.delete().await {
            Ok(deleted) => {
                panel.refresh(store).await;
                if !panel.is_error() {
                    let message = if deleted.deleted {
                        "deleted"
                    } else {
                        "nothing to delete"
                    };
                    panel.succeed(message);
                }
            }
            Err(e) => panel.fail(&e),
        },
    }
    panel
}
