//! Decision providers - the external micro-control policy seam.
//!
//! The policy itself is opaque: it maps a 7-float observation to one of five
//! action codes. It may be slow, non-deterministic or missing entirely, so
//! every caller must be ready to fall back.

mod command;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Plan;
use crate::field::Point;
use crate::tracker::PositionEstimate;

pub use command::CommandProvider;

/// Normaliser applied to the distance-from-home feature.
const HOME_DISTANCE_SCALE: f64 = 60.0;

/// Feature vector handed to the provider:
/// `[self_x, self_y, ball_x, ball_y, ball_x - self_x, ball_y - self_y, dist_home / 60]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(pub [f32; 7]);

impl Observation {
    pub fn new(estimate: &PositionEstimate, home: Point) -> Self {
        let own = estimate.own;
        let ball = estimate.ball;
        Self([
            own.x as f32,
            own.y as f32,
            ball.x as f32,
            ball.y as f32,
            (ball.x - own.x) as f32,
            (ball.y - own.y) as f32,
            (own.distance(home) / HOME_DISTANCE_SCALE) as f32,
        ])
    }
}

/// Discrete action returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCode {
    ChaseBall = 0,
    Sprint = 1,
    TurnLeft = 2,
    TurnRight = 3,
    ReturnHome = 4,
}

impl ActionCode {
    pub const ALL: [ActionCode; 5] = [
        Self::ChaseBall,
        Self::Sprint,
        Self::TurnLeft,
        Self::TurnRight,
        Self::ReturnHome,
    ];

    /// Fixed command sequence for this action.
    pub fn plan(self, ball: Point, home: Point) -> Plan {
        match self {
            Self::ChaseBall => Plan::new().move_to(ball).dash(60.0),
            Self::Sprint => Plan::new().dash(75.0),
            Self::TurnLeft => Plan::new().turn(-30.0).dash(40.0),
            Self::TurnRight => Plan::new().turn(30.0).dash(40.0),
            Self::ReturnHome => Plan::new().move_to(home).dash(55.0),
        }
    }
}

impl TryFrom<i64> for ActionCode {
    type Error = PolicyError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::ChaseBall),
            1 => Ok(Self::Sprint),
            2 => Ok(Self::TurnLeft),
            3 => Ok(Self::TurnRight),
            4 => Ok(Self::ReturnHome),
            other => Err(PolicyError::InvalidAction(other)),
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("decision provider unavailable")]
    Unavailable,

    #[error("failed to spawn decision provider `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decision provider i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decision provider timed out")]
    Timeout,

    #[error("malformed decision provider reply: {0}")]
    Malformed(String),

    #[error("action code {0} out of range")]
    InvalidAction(i64),
}

/// Capability: map an observation to an action.
#[async_trait]
pub trait DecisionProvider: Send {
    async fn predict(&mut self, observation: &Observation) -> Result<ActionCode, PolicyError>;

    /// Whether a call could possibly succeed.
    fn is_available(&self) -> bool {
        true
    }
}

/// Provider used when no policy is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProvider;

#[async_trait]
impl DecisionProvider for NoProvider {
    async fn predict(&mut self, _observation: &Observation) -> Result<ActionCode, PolicyError> {
        Err(PolicyError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}
