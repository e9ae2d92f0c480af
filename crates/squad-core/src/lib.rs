//! Squad Core - per-agent decision loop for a simulated team.
//!
//! Each agent owns a datagram endpoint, a position estimate and a home
//! assignment. Every tick it parses telemetry, applies the safety overrides,
//! then picks between an external decision provider and rule-based tactical
//! movement. The supervisor spawns one independent loop per roster slot.

#![forbid(unsafe_code)]

pub mod agent;
pub mod channel;
pub mod command;
pub mod config;
pub mod decision;
pub mod field;
pub mod identity;
pub mod policy;
pub mod roster;
pub mod safety;
pub mod supervisor;
pub mod tactics;
pub mod telemetry;
pub mod tracker;

pub use agent::{AgentError, AgentLoop, AgentSettings, AgentState};
pub use channel::{CommandChannel, Transport, TransportError, UdpTransport};
pub use command::{Command, Plan, Step};
pub use config::{ConfigError, TeamConfig};
pub use decision::{Branch, DecisionArbiter, Strategy, TickOutcome};
pub use field::{FieldBounds, Point, FIELD};
pub use identity::{AgentIdentity, Role, Side};
pub use policy::{ActionCode, CommandProvider, DecisionProvider, NoProvider, Observation, PolicyError};
pub use roster::Roster;
pub use safety::{Edge, Override, SafetyArbiter};
pub use supervisor::{AgentExit, Team};
pub use tactics::target;
pub use telemetry::Telemetry;
pub use tracker::PositionEstimate;
