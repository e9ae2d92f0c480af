//! Squad CLI - launches a team of simulator agents.
//!
//! Single binary that provides:
//! - `squad run` - connect every roster slot and play until Ctrl-C
//! - `squad check` - validate config and roster, print resolved homes
//! - `squad init` - scaffold `squad.yaml` and a roster file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use squad_core::config::CONFIG_FILE;
use squad_core::{Role, Roster, Strategy, Team, TeamConfig};

#[derive(Parser)]
#[command(name = "squad")]
#[command(about = "Multi-agent team client for a 2D soccer simulator", version)]
struct Cli {
    /// Project directory holding squad.yaml and the roster file
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the team and play until interrupted
    Run {
        /// Simulator address (host:port)
        #[arg(long)]
        server: Option<String>,

        /// Team name sent with init
        #[arg(long)]
        team: Option<String>,

        /// Number of agents to launch
        #[arg(long)]
        players: Option<u8>,

        /// Decision strategy: wander, hybrid or policy
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Roster file with home positions
        #[arg(long)]
        positions: Option<PathBuf>,

        /// Seed for the wander strategy
        #[arg(long)]
        seed: Option<u64>,

        /// External decision provider command (everything after the flag)
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        policy_cmd: Option<Vec<String>>,
    },

    /// Validate configuration and show every agent's home
    Check {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write default configuration files
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Some(Commands::Run {
            server,
            team,
            players,
            strategy,
            positions,
            seed,
            policy_cmd,
        }) => {
            let mut config = load_config(&project_root)?;
            if let Some(server) = server {
                config.server = server;
            }
            if let Some(team) = team {
                config.team_name = team;
            }
            if let Some(players) = players {
                config.players = players;
            }
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if let Some(positions) = positions {
                config.positions = positions;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(cmd) = policy_cmd {
                config.policy.command = cmd;
            }
            config.resolve_paths(&project_root);
            run_team(config).await
        }
        Some(Commands::Check { json }) => {
            let mut config = load_config(&project_root)?;
            config.resolve_paths(&project_root);
            check(config, json)
        }
        Some(Commands::Init) => init_project(&project_root),
        None => {
            println!("Squad - simulator team client");
            println!();
            println!("Usage: squad <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run    Connect the team and play");
            println!("  check  Validate configuration");
            println!("  init   Write default configuration files");
            println!();
            println!("Run 'squad --help' for more information.");
            Ok(())
        }
    }
}

fn load_config(project_root: &Path) -> Result<TeamConfig> {
    TeamConfig::load_from_project(project_root)
        .with_context(|| format!("Failed to load config from {}", project_root.display()))
}

async fn run_team(config: TeamConfig) -> Result<()> {
    tracing::info!(
        server = %config.server,
        team = %config.team_name,
        strategy = %config.strategy,
        provider = config.policy.enabled(),
        "Starting team"
    );

    let team = Team::from_config(config).context("Configuration error, no agents launched")?;
    let exits = team.run().await;

    let failed = exits.iter().filter(|(_, r)| r.is_err()).count();
    tracing::info!(ended = exits.len(), failed, "Team stopped");
    if team.all_failed(&exits) {
        anyhow::bail!("all {failed} agents failed");
    }
    Ok(())
}

#[derive(Serialize)]
struct AgentPlan {
    slot: u8,
    role: Role,
    x: f64,
    y: f64,
}

fn check(config: TeamConfig, json: bool) -> Result<()> {
    let team = Team::from_config(config)?;
    let plans: Vec<AgentPlan> = team
        .roster()
        .iter()
        .map(|(slot, home)| AgentPlan {
            slot,
            role: Role::from_uniform(slot),
            x: home.x,
            y: home.y,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    let config = team.config();
    println!("Squad Configuration");
    println!("===================");
    println!();
    println!("Server:   {}", config.server);
    println!("Team:     {}", config.team_name);
    println!("Strategy: {}", config.strategy);
    println!(
        "Provider: {}",
        if config.policy.enabled() {
            config.policy.command.join(" ")
        } else {
            "none".to_string()
        }
    );
    println!();
    println!("Homes (left side; mirrored on the right):");
    for plan in &plans {
        println!(
            "  {:>2} {:<10} ({:>6.2}, {:>6.2})",
            plan.slot, plan.role, plan.x, plan.y
        );
    }
    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    std::fs::create_dir_all(project_root)?;

    let config_path = project_root.join(CONFIG_FILE);
    if !config_path.exists() {
        std::fs::write(&config_path, TeamConfig::default_yaml())?;
    }

    let roster_path = project_root.join(&TeamConfig::default().positions);
    if !roster_path.exists() {
        std::fs::write(&roster_path, Roster::default_formation().to_json()?)?;
    }

    println!("Initialized squad project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  {CONFIG_FILE} - team configuration");
    println!("  {} - home positions", roster_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Start the simulator");
    println!("  2. Run: squad run");

    Ok(())
}
