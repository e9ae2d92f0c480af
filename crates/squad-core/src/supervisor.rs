//! Team supervisor - spawns one independent agent task per roster slot.
//!
//! After spawn the supervisor only waits: agents share nothing but the
//! read-only roster, and a failing agent never takes its siblings down.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::agent::{AgentError, AgentLoop, AgentSettings};
use crate::channel::UdpTransport;
use crate::config::{ConfigError, TeamConfig};
use crate::policy::{CommandProvider, DecisionProvider, NoProvider};
use crate::roster::Roster;

/// What an agent task returns when it ends.
pub type AgentExit = (u8, Result<(), AgentError>);

pub struct Team {
    config: TeamConfig,
    server: SocketAddr,
    roster: Arc<Roster>,
}

impl Team {
    pub fn new(config: TeamConfig, server: SocketAddr, roster: Roster) -> Self {
        Self {
            config,
            server,
            roster: Arc::new(roster),
        }
    }

    /// Validate the config, resolve the server and load the roster. Any
    /// failure here is fatal and no agent is launched.
    pub fn from_config(config: TeamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let server = config.server_addr()?;
        let roster = Roster::load(&config.positions, config.players)?;
        Ok(Self::new(config, server, roster))
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Launch every agent, staggered so the server is not flooded with inits.
    pub async fn spawn(&self) -> JoinSet<AgentExit> {
        let mut agents = JoinSet::new();
        for slot in 1..=self.config.players {
            let server = self.server;
            let settings = AgentSettings::from_config(&self.config);
            let roster = Arc::clone(&self.roster);
            let provider = self.provider_for(slot);

            agents.spawn(
                async move {
                    let result = run_agent(slot, server, settings, roster, provider).await;
                    (slot, result)
                }
                .instrument(tracing::info_span!("agent", slot)),
            );
            tokio::time::sleep(self.config.spawn_stagger()).await;
        }
        tracing::info!(
            players = self.config.players,
            strategy = %self.config.strategy,
            "Team started"
        );
        agents
    }

    /// Run until `shutdown` resolves or every agent has ended.
    pub async fn run_until<F>(&self, shutdown: F) -> Vec<AgentExit>
    where
        F: Future<Output = ()>,
    {
        let mut agents = self.spawn().await;
        let mut exits = Vec::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(running = agents.len(), "Stopping team");
                    agents.abort_all();
                    break;
                }
                joined = agents.join_next() => match joined {
                    Some(Ok(exit)) => {
                        if let Err(e) = &exit.1 {
                            tracing::warn!(slot = exit.0, error = %e, "Agent stopped");
                        }
                        exits.push(exit);
                    }
                    Some(Err(e)) if e.is_cancelled() => {}
                    Some(Err(e)) => tracing::error!(error = %e, "Agent task panicked"),
                    None => {
                        tracing::info!("All agents stopped");
                        break;
                    }
                }
            }
        }

        // Let aborted tasks release their sockets.
        while agents.join_next().await.is_some() {}
        exits
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) -> Vec<AgentExit> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// True when every agent ended on its own with an error, i.e. nothing
    /// was stopped by shutdown and nothing is left playing.
    pub fn all_failed(&self, exits: &[AgentExit]) -> bool {
        exits.len() == usize::from(self.config.players)
            && exits.iter().all(|(_, result)| result.is_err())
    }

    fn provider_for(&self, slot: u8) -> Box<dyn DecisionProvider> {
        let policy = &self.config.policy;
        if policy.enabled() {
            tracing::debug!(slot, command = ?policy.command, "Using external decision provider");
            Box::new(CommandProvider::new(&policy.command, policy.timeout()))
        } else {
            Box::new(NoProvider)
        }
    }
}

async fn run_agent(
    slot: u8,
    server: SocketAddr,
    settings: AgentSettings,
    roster: Arc<Roster>,
    provider: Box<dyn DecisionProvider>,
) -> Result<(), AgentError> {
    let transport = UdpTransport::bind(server).await?;
    tracing::info!(slot, local = ?transport.local_addr(), "Sending init");
    AgentLoop::new(slot, settings, roster, transport, provider)
        .run()
        .await
}
