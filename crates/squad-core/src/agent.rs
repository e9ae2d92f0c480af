//! Agent lifecycle - handshake, initial positioning, then the tick loop.
//!
//! `Uninitialized -> Handshaking -> Positioning -> Active -> Terminated`,
//! never backwards. A failed handshake or a dead socket ends this agent only.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::channel::{CommandChannel, Transport, TransportError};
use crate::command::{Command, Plan};
use crate::config::TeamConfig;
use crate::decision::{DecisionArbiter, Strategy, TickOutcome};
use crate::field::Point;
use crate::identity::AgentIdentity;
use crate::policy::{DecisionProvider, NoProvider};
use crate::roster::Roster;
use crate::telemetry;

/// Used only if the roster has neither the uniform nor the slot.
const FALLBACK_HOME: Point = Point::new(-40.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Uninitialized,
    Handshaking,
    Positioning,
    Active,
    Terminated,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Handshaking => "handshaking",
            Self::Positioning => "positioning",
            Self::Active => "active",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("slot {slot}: no init reply within {waited:?}")]
    HandshakeTimeout { slot: u8, waited: Duration },

    #[error("slot {slot}: cannot {action} while {state}")]
    InvalidState {
        slot: u8,
        action: &'static str,
        state: AgentState,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Per-agent knobs, taken from the team config.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub team_name: String,
    pub strategy: Strategy,
    pub recv_timeout: Duration,
    pub handshake_timeout: Duration,
    pub positioning_repeats: usize,
    pub positioning_pause: Duration,
    pub seed: Option<u64>,
}

impl AgentSettings {
    pub fn from_config(config: &TeamConfig) -> Self {
        Self {
            team_name: config.team_name.clone(),
            strategy: config.strategy,
            recv_timeout: config.recv_timeout(),
            handshake_timeout: config.handshake_timeout(),
            positioning_repeats: config.positioning.repeats,
            positioning_pause: config.positioning_pause(),
            seed: config.seed,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&TeamConfig::default())
    }
}

/// One agent: its channel, its roster view and, once identified, its arbiter.
pub struct AgentLoop<T> {
    slot: u8,
    settings: AgentSettings,
    roster: Arc<Roster>,
    channel: CommandChannel<T>,
    state: AgentState,
    provider: Option<Box<dyn DecisionProvider>>,
    arbiter: Option<DecisionArbiter>,
    ticks: u64,
}

impl<T: Transport> AgentLoop<T> {
    pub fn new(
        slot: u8,
        settings: AgentSettings,
        roster: Arc<Roster>,
        transport: T,
        provider: Box<dyn DecisionProvider>,
    ) -> Self {
        Self {
            slot,
            settings,
            roster,
            channel: CommandChannel::new(transport),
            state: AgentState::Uninitialized,
            provider: Some(provider),
            arbiter: None,
            ticks: 0,
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn arbiter(&self) -> Option<&DecisionArbiter> {
        self.arbiter.as_ref()
    }

    pub fn arbiter_mut(&mut self) -> Option<&mut DecisionArbiter> {
        self.arbiter.as_mut()
    }

    pub fn channel(&self) -> &CommandChannel<T> {
        &self.channel
    }

    /// Full lifecycle. Only returns when the agent terminates.
    pub async fn run(mut self) -> Result<(), AgentError> {
        self.handshake().await?;
        self.position().await?;
        loop {
            self.step().await?;
        }
    }

    /// Send init and wait for the server to assign side and uniform.
    pub async fn handshake(&mut self) -> Result<AgentIdentity, AgentError> {
        self.expect_state(AgentState::Uninitialized, "handshake")?;
        self.state = AgentState::Handshaking;

        self.channel
            .send(&Command::Init {
                team: self.settings.team_name.clone(),
            })
            .await;

        let started = Instant::now();
        let deadline = started + self.settings.handshake_timeout;
        // Replies may arrive split over several datagrams.
        let mut buffer = String::new();

        let (side, uniform) = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.state = AgentState::Terminated;
                return Err(AgentError::HandshakeTimeout {
                    slot: self.slot,
                    waited: started.elapsed(),
                });
            }

            let message = match self
                .channel
                .recv(remaining.min(self.settings.recv_timeout))
                .await
            {
                Ok(message) => message,
                Err(e) => {
                    self.state = AgentState::Terminated;
                    return Err(e.into());
                }
            };
            buffer.push_str(&message);

            if let Some(found) = telemetry::parse_handshake(&buffer) {
                break found;
            }
        };

        let canonical = self.roster.home(uniform, self.slot).unwrap_or_else(|| {
            tracing::warn!(slot = self.slot, uniform, "No roster entry, using fallback home");
            FALLBACK_HOME
        });
        let identity = AgentIdentity::new(uniform, side, canonical);

        let provider = self
            .provider
            .take()
            .unwrap_or_else(|| Box::new(NoProvider));
        let mut arbiter =
            DecisionArbiter::new(identity, self.settings.strategy, provider, Instant::now());
        if let Some(seed) = self.settings.seed {
            arbiter = arbiter.with_seed(seed);
        }
        self.arbiter = Some(arbiter);

        tracing::info!(
            slot = self.slot,
            uniform,
            side = %side,
            role = %identity.role(),
            home_x = identity.home.x,
            home_y = identity.home.y,
            "Init detected"
        );
        self.state = AgentState::Positioning;
        Ok(identity)
    }

    /// Repeat move-to-home a few times; there is no ack on this channel.
    pub async fn position(&mut self) -> Result<(), AgentError> {
        self.expect_state(AgentState::Positioning, "position")?;
        let home = self.home();

        let mut plan = Plan::new();
        for _ in 0..self.settings.positioning_repeats {
            plan = plan.move_to(home).pause(self.settings.positioning_pause);
        }
        self.channel.execute(&plan).await;

        tracing::info!(slot = self.slot, x = home.x, y = home.y, "Moved to home position");
        self.state = AgentState::Active;
        Ok(())
    }

    /// One tick: receive (bounded), decide, send.
    pub async fn step(&mut self) -> Result<TickOutcome, AgentError> {
        self.expect_state(AgentState::Active, "tick")?;

        let message = match self.channel.recv(self.settings.recv_timeout).await {
            Ok(message) => message,
            Err(e) => {
                self.state = AgentState::Terminated;
                tracing::warn!(slot = self.slot, error = %e, "Channel failed, agent stopping");
                return Err(e.into());
            }
        };

        let Some(arbiter) = self.arbiter.as_mut() else {
            return Err(AgentError::InvalidState {
                slot: self.slot,
                action: "tick",
                state: self.state,
            });
        };
        let outcome = arbiter.tick(&message, Instant::now()).await;
        tracing::trace!(
            slot = self.slot,
            tick = self.ticks,
            branch = outcome.branch.name(),
            "Tick"
        );

        self.channel.execute(&outcome.plan).await;
        self.ticks += 1;
        Ok(outcome)
    }

    fn home(&self) -> Point {
        self.arbiter
            .as_ref()
            .map(|a| a.identity().home)
            .unwrap_or(FALLBACK_HOME)
    }

    fn expect_state(&self, expected: AgentState, action: &'static str) -> Result<(), AgentError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AgentError::InvalidState {
                slot: self.slot,
                action,
                state: self.state,
            })
        }
    }
}
