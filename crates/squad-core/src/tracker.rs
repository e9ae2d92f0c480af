//! Position tracker - the agent's last known self/ball estimate.

use std::time::{Duration, Instant};

use crate::field::Point;
use crate::telemetry::Telemetry;

/// Self-localisation older than this is considered stale.
pub const STALE_AFTER: Duration = Duration::from_secs(2);

/// Latest self and ball positions plus the self-position staleness clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEstimate {
    pub own: Point,
    pub ball: Point,
    last_update: Instant,
}

impl PositionEstimate {
    /// Start at home rather than the origin so the first tick does not see a
    /// huge phantom distance from home. The ball defaults to the centre spot.
    pub fn at_home(home: Point, now: Instant) -> Self {
        Self {
            own: home,
            ball: Point::default(),
            last_update: now,
        }
    }

    /// Apply a raw inbound message. Returns the parsed telemetry.
    pub fn update(&mut self, message: &str, now: Instant) -> Telemetry {
        let telemetry = Telemetry::parse(message);
        self.apply(&telemetry, now);
        telemetry
    }

    /// Apply already parsed telemetry.
    ///
    /// Only a self-position refreshes the clock; ball sightings do not say
    /// anything about how well the agent knows where it is.
    pub fn apply(&mut self, telemetry: &Telemetry, now: Instant) {
        if let Some(own) = telemetry.own {
            self.own = own;
            self.last_update = now;
        }
        if let Some(ball) = telemetry.ball {
            self.ball = ball;
        }
    }

    /// Overwrite the self estimate, treating it as ground truth.
    pub fn reset_to(&mut self, own: Point, now: Instant) {
        self.own = own;
        self.last_update = now;
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_update) > STALE_AFTER
    }

    pub fn distance_to_ball(&self) -> f64 {
        self.own.distance(self.ball)
    }
}
