use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobmarket_core::JobId;
use jobmarket_node::{load_script, logging, parse_account, MarketService, NodeConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "./jobmarket.toml";

#[derive(Parser)]
#[command(name = "jobmarket")]
#[command(about = "Token-denominated job market with escrow and inactivity depreciation", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output directory for configuration
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Execute a JSON command script against the stored market
    Run {
        /// Script file
        #[arg(short, long)]
        script: PathBuf,

        /// Data directory override
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Stop at the first rejected command
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show market statistics and accounts
    Status {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Show one job
    Job {
        id: u64,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Preview the depreciation an account would pay right now
    Quote {
        /// Account label or hex id
        account: String,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<NodeConfig> {
    // Priority order: CLI args > ENV vars > Config file > Defaults
    let mut config = match path {
        Some(path) => NodeConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => NodeConfig::from_file(Path::new(DEFAULT_CONFIG))?,
        None => NodeConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn wall_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    if let Err(e) = logging::init_logging(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("jobmarket=info"))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Init { output } => {
            std::fs::create_dir_all(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let path = output.join("jobmarket.toml");
            NodeConfig::default().save_to_file(&path)?;
            info!(path = %path.display(), "🧬 Wrote default configuration");
            Ok(())
        }

        Commands::Run {
            script,
            data_dir,
            fail_fast,
        } => {
            if let Some(dir) = data_dir {
                config.node.data_dir = dir;
            }
            let commands = load_script(&script)?;
            let service = MarketService::load_or_init(&config).await?;

            info!(
                node = %config.node.name,
                script = %script.display(),
                commands = commands.len(),
                "🚀 Running script"
            );

            let mut events = service.subscribe();
            let mut rejected = 0usize;
            for (index, command) in commands.into_iter().enumerate() {
                let name = command.name();
                match service.execute(command, wall_clock()).await {
                    Ok(outcome) => {
                        println!("[{}] {} -> {}", index, name, serde_json::to_string(&outcome)?)
                    }
                    Err(e) => {
                        rejected += 1;
                        println!("[{}] {} -> error: {}", index, name, e);
                        if fail_fast {
                            break;
                        }
                    }
                }
                while let Ok(event) = events.try_recv() {
                    println!("    event {}", serde_json::to_string(&event)?);
                }
            }

            service.persist().await?;
            if rejected > 0 {
                warn!(rejected, "⚠️ Some commands were rejected");
            }
            info!("✅ Script finished");
            Ok(())
        }

        Commands::Status { data_dir } => {
            if let Some(dir) = data_dir {
                config.node.data_dir = dir;
            }
            let service = MarketService::load_or_init(&config).await?;
            print_json(&service.stats().await)?;
            print_json(&service.accounts().await)
        }

        Commands::Job { id, data_dir } => {
            if let Some(dir) = data_dir {
                config.node.data_dir = dir;
            }
            let service = MarketService::load_or_init(&config).await?;
            let job = service
                .job(JobId(id))
                .await
                .with_context(|| format!("job {} not found", JobId(id)))?;
            print_json(&job)
        }

        Commands::Quote { account, data_dir } => {
            if let Some(dir) = data_dir {
                config.node.data_dir = dir;
            }
            let account = parse_account(&account)?;
            let service = MarketService::load_or_init(&config).await?;
            print_json(&service.quote(account, wall_clock()).await?)
        }
    }
}
