//! Decision arbiter - one tick of the agent's control loop.
//!
//! Order per tick:
//! 1. fold the inbound message into the position estimate
//! 2. safety overrides (return-home, then boundary)
//! 3. strategy: provider, tactical movement or scripted wander
//!
//! Exactly one branch fires per tick and only its commands are emitted.

mod wander;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::command::Plan;
use crate::identity::{AgentIdentity, Role};
use crate::policy::{ActionCode, DecisionProvider, Observation, PolicyError};
use crate::safety::{Override, SafetyArbiter};
use crate::tactics;
use crate::tracker::PositionEstimate;

/// Any role this close to the ball hands control to the provider.
const GATE_ANY: f64 = 7.0;
/// Midfielders and forwards hand over from further out.
const GATE_PRESSING: f64 = 20.0;
const GATE_KEEPER: f64 = 6.0;

/// Below this distance the provider fallback chases the ball.
const FALLBACK_CHASE: f64 = 10.0;

const PRESS_DISTANCE: f64 = 8.0;
const ARRIVED: f64 = 3.0;
const ALIGNED: f64 = 0.5;
const CHASE_DASH: f64 = 60.0;
const FINE_DASH: f64 = 20.0;

const PROVIDER_PAUSE: Duration = Duration::from_millis(90);
const TACTICAL_PAUSE: Duration = Duration::from_millis(120);

/// How an agent plays once the safety checks pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Random motion around home; never consults a provider.
    Wander,
    /// Provider near the ball, role tactics elsewhere.
    #[default]
    Hybrid,
    /// Provider every tick.
    Policy,
}

impl Strategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "wander" | "random" => Some(Self::Wander),
            "hybrid" | "433" => Some(Self::Hybrid),
            "policy" | "rl" => Some(Self::Policy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wander => "wander",
            Self::Hybrid => "hybrid",
            Self::Policy => "policy",
        }
    }

    /// Pause after a boundary correction before the next tick.
    pub fn boundary_pause(&self) -> Duration {
        match self {
            Self::Wander => Duration::from_millis(180),
            Self::Hybrid | Self::Policy => Duration::from_millis(120),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown strategy `{s}`"))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which branch produced a tick's commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Safety(Override),
    /// The provider answered with this action.
    Provider(ActionCode),
    /// The provider was consulted but was missing or failed.
    ProviderFallback,
    Press,
    MoveToTarget,
    FineAdjust,
    Wander,
}

impl Branch {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Safety(Override::ReturnHome) => "return_home",
            Self::Safety(Override::Boundary(_)) => "boundary",
            Self::Provider(_) => "provider",
            Self::ProviderFallback => "provider_fallback",
            Self::Press => "press",
            Self::MoveToTarget => "move_to_target",
            Self::FineAdjust => "fine_adjust",
            Self::Wander => "wander",
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub branch: Branch,
    pub plan: Plan,
}

impl TickOutcome {
    fn new(branch: Branch, plan: Plan) -> Self {
        Self { branch, plan }
    }
}

/// Owns everything one agent decides with. Nothing here is shared.
pub struct DecisionArbiter {
    identity: AgentIdentity,
    role: Role,
    strategy: Strategy,
    safety: SafetyArbiter,
    estimate: PositionEstimate,
    provider: Box<dyn DecisionProvider>,
    rng: StdRng,
}

impl DecisionArbiter {
    pub fn new(
        identity: AgentIdentity,
        strategy: Strategy,
        provider: Box<dyn DecisionProvider>,
        now: Instant,
    ) -> Self {
        let role = identity.role();
        Self {
            identity,
            role,
            strategy,
            safety: SafetyArbiter::new(role, identity.home, strategy.boundary_pause()),
            estimate: PositionEstimate::at_home(identity.home, now),
            provider,
            rng: StdRng::from_entropy(),
        }
    }

    /// Make the wander strategy reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed ^ u64::from(self.identity.uniform));
        self
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn estimate(&self) -> &PositionEstimate {
        &self.estimate
    }

    pub fn estimate_mut(&mut self) -> &mut PositionEstimate {
        &mut self.estimate
    }

    /// Run one tick against `message` (empty when the receive timed out).
    pub async fn tick(&mut self, message: &str, now: Instant) -> TickOutcome {
        self.estimate.update(message, now);

        if let Some((fired, plan)) = self.safety.check(&mut self.estimate, now) {
            return TickOutcome::new(Branch::Safety(fired), plan);
        }

        match self.strategy {
            Strategy::Wander => {
                let from_home = self.estimate.own.distance(self.identity.home);
                TickOutcome::new(
                    Branch::Wander,
                    wander::plan(&mut self.rng, self.role, from_home),
                )
            }
            // Without a provider the hybrid plays pure tactics.
            Strategy::Hybrid if self.provider.is_available() && self.gate_applies() => {
                self.consult_provider().await
            }
            Strategy::Hybrid => self.tactical(),
            Strategy::Policy => self.consult_provider().await,
        }
    }

    /// Whether the provider should take over micro-control this tick.
    pub fn gate_applies(&self) -> bool {
        let d = self.estimate.distance_to_ball();
        d < GATE_ANY
            || (self.role.presses() && d < GATE_PRESSING)
            || (self.role == Role::Goalkeeper && d < GATE_KEEPER)
    }

    async fn consult_provider(&mut self) -> TickOutcome {
        if !self.provider.is_available() {
            return self.provider_fallback();
        }

        let observation = Observation::new(&self.estimate, self.identity.home);
        match self.provider.predict(&observation).await {
            Ok(action) => {
                let plan = action
                    .plan(self.estimate.ball, self.identity.home)
                    .pause(PROVIDER_PAUSE);
                TickOutcome::new(Branch::Provider(action), plan)
            }
            Err(PolicyError::Unavailable) => self.provider_fallback(),
            Err(e) => {
                tracing::debug!(
                    uniform = self.identity.uniform,
                    error = %e,
                    "Decision provider failed"
                );
                self.provider_fallback()
            }
        }
    }

    fn provider_fallback(&self) -> TickOutcome {
        let plan = if self.estimate.distance_to_ball() < FALLBACK_CHASE {
            Plan::new().move_to(self.estimate.ball).dash(CHASE_DASH)
        } else {
            Plan::new().move_to(self.identity.home)
        };
        TickOutcome::new(Branch::ProviderFallback, plan.pause(TACTICAL_PAUSE))
    }

    fn tactical(&self) -> TickOutcome {
        let own = self.estimate.own;
        let ball = self.estimate.ball;
        let target = tactics::target(self.role, self.identity.home, ball);
        let to_target = own.distance(target);

        let pressing = self.role.presses() && self.estimate.distance_to_ball() < PRESS_DISTANCE;
        let (branch, plan) = if pressing {
            (Branch::Press, Plan::new().move_to(ball).dash(CHASE_DASH))
        } else if to_target > ARRIVED {
            let power = (40.0 + to_target).clamp(30.0, 80.0);
            (Branch::MoveToTarget, Plan::new().move_to(target).dash(power))
        } else {
            let angle = if to_target > ALIGNED {
                own.bearing_to(target)
            } else {
                0.0
            };
            (Branch::FineAdjust, Plan::new().turn(angle).dash(FINE_DASH))
        };
        TickOutcome::new(branch, plan.pause(TACTICAL_PAUSE))
    }
}
