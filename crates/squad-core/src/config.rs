//! Team configuration loading and management.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decision::Strategy;

/// Relative path of the team config inside a project directory.
pub const CONFIG_FILE: &str = "squad.yaml";

/// Largest roster the simulator accepts per side.
pub const MAX_PLAYERS: u8 = 11;

/// Startup configuration failures. These are the only errors that stop the
/// whole team; nothing is launched when one occurs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("roster file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("roster {} has no home position for slot {slot}", .path.display())]
    IncompleteRoster { path: PathBuf, slot: u8 },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Team configuration, loaded from `squad.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Simulator address (`host:port`)
    pub server: String,

    /// Team name sent in the init command
    pub team_name: String,

    /// Number of agents to launch (slots 1..=players)
    pub players: u8,

    /// Decision strategy for every agent
    pub strategy: Strategy,

    /// Roster file with home positions (relative to the project root)
    pub positions: PathBuf,

    /// Upper bound on a single receive
    pub recv_timeout_ms: u64,

    /// How long to wait for the init reply
    pub handshake_timeout_ms: u64,

    /// Delay between agent launches
    pub spawn_stagger_ms: u64,

    /// Initial move-to-home burst
    pub positioning: PositioningConfig,

    /// External decision provider
    pub policy: PolicyConfig,

    /// Seed for the wander strategy's randomness
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// Move commands sent after the handshake
    pub repeats: usize,

    /// Pause between them
    pub pause_ms: u64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            repeats: 6,
            pause_ms: 80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Provider command line; empty means no provider
    pub command: Vec<String>,

    /// Per-call budget before falling back
    pub timeout_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_ms: 50,
        }
    }
}

impl PolicyConfig {
    pub fn enabled(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:6000".to_string(),
            team_name: "MY_TEAM".to_string(),
            players: MAX_PLAYERS,
            strategy: Strategy::default(),
            positions: PathBuf::from("conf_file.conf"),
            recv_timeout_ms: 500,
            handshake_timeout_ms: 5_000,
            spawn_stagger_ms: 120,
            positioning: PositioningConfig::default(),
            policy: PolicyConfig::default(),
            seed: None,
        }
    }
}

impl TeamConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from project root (looks for squad.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.positions = project_root.join(&self.positions);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::Invalid(format!(
                "players must be between 1 and {MAX_PLAYERS}, got {}",
                self.players
            )));
        }
        let name_ok = !self.team_name.is_empty()
            && !self
                .team_name
                .chars()
                .any(|c| c.is_whitespace() || c == '(' || c == ')');
        if !name_ok {
            return Err(ConfigError::Invalid(format!(
                "team name `{}` must be a single token without parentheses",
                self.team_name
            )));
        }
        if self.recv_timeout_ms == 0 {
            return Err(ConfigError::Invalid("recv_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Resolve `server` once, before any agent is launched.
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| {
                ConfigError::Invalid(format!("cannot resolve server address `{}`", self.server))
            })
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn spawn_stagger(&self) -> Duration {
        Duration::from_millis(self.spawn_stagger_ms)
    }

    pub fn positioning_pause(&self) -> Duration {
        Duration::from_millis(self.positioning.pause_ms)
    }

    /// Default config file contents written by `squad init`.
    pub fn default_yaml() -> &'static str {
        r#"# Squad team configuration

server: "127.0.0.1:6000"
team_name: MY_TEAM
players: 11

# wander | hybrid | policy
strategy: hybrid

positions: conf_file.conf

recv_timeout_ms: 500
handshake_timeout_ms: 5000
spawn_stagger_ms: 120

positioning:
  repeats: 6
  pause_ms: 80

policy:
  # e.g. ["python3", "serve_policy.py"]
  command: []
  timeout_ms: 50
"#
    }
}
