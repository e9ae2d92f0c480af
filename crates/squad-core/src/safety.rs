//! Safety arbiter - return-home and boundary overrides.
//!
//! Runs before any tactical or provider logic. Either override pre-empts the
//! rest of the tick; return-home is checked first, and at most one boundary
//! correction is emitted per tick (x edges before y edges).

use std::time::{Duration, Instant};

use crate::command::Plan;
use crate::field::{FieldBounds, Point, FIELD};
use crate::identity::Role;
use crate::tracker::PositionEstimate;

/// Distance from an edge at which the boundary override fires.
pub const EDGE_MARGIN: f64 = 3.0;

const RETURN_BURST: usize = 3;
const RETURN_DASH: f64 = 60.0;
const RETURN_STEP_PAUSE: Duration = Duration::from_millis(120);
const RETURN_SETTLE_PAUSE: Duration = Duration::from_millis(150);

const BOUNDARY_DASH_FRESH: f64 = 50.0;
const BOUNDARY_DASH_STALE: f64 = 35.0;

/// Field edge the agent is too close to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    XMin,
    XMax,
    YMin,
    YMax,
}

impl Edge {
    /// Turn that points the agent back into the field.
    pub fn inward_turn(&self) -> f64 {
        match self {
            Self::XMin => 45.0,
            Self::XMax => -45.0,
            Self::YMin => 90.0,
            Self::YMax => -90.0,
        }
    }
}

/// Which override fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    ReturnHome,
    Boundary(Edge),
}

#[derive(Debug, Clone)]
pub struct SafetyArbiter {
    role: Role,
    home: Point,
    field: FieldBounds,
    boundary_pause: Duration,
}

impl SafetyArbiter {
    pub fn new(role: Role, home: Point, boundary_pause: Duration) -> Self {
        Self {
            role,
            home,
            field: FIELD,
            boundary_pause,
        }
    }

    pub fn needs_return_home(&self, own: Point) -> bool {
        own.distance(self.home) > self.role.home_range()
    }

    /// First violated edge, x axis before y axis.
    pub fn edge_violation(&self, own: Point) -> Option<Edge> {
        let f = &self.field;
        if own.x < f.x_min + EDGE_MARGIN {
            Some(Edge::XMin)
        } else if own.x > f.x_max - EDGE_MARGIN {
            Some(Edge::XMax)
        } else if own.y < f.y_min + EDGE_MARGIN {
            Some(Edge::YMin)
        } else if own.y > f.y_max - EDGE_MARGIN {
            Some(Edge::YMax)
        } else {
            None
        }
    }

    /// Run both checks. When the return-home override fires the estimate is
    /// reset to home, since the forced move is taken as ground truth.
    pub fn check(
        &self,
        estimate: &mut PositionEstimate,
        now: Instant,
    ) -> Option<(Override, Plan)> {
        if self.needs_return_home(estimate.own) {
            estimate.reset_to(self.home, now);
            return Some((Override::ReturnHome, self.return_home_plan()));
        }

        let edge = self.edge_violation(estimate.own)?;
        let power = if estimate.is_stale(now) {
            BOUNDARY_DASH_STALE
        } else {
            BOUNDARY_DASH_FRESH
        };
        let plan = Plan::new()
            .turn(edge.inward_turn())
            .dash(power)
            .pause(self.boundary_pause);
        Some((Override::Boundary(edge), plan))
    }

    fn return_home_plan(&self) -> Plan {
        let power = RETURN_DASH.min(self.role.recovery_dash_cap());
        let mut plan = Plan::new();
        for _ in 0..RETURN_BURST {
            plan = plan
                .move_to(self.home)
                .dash(power)
                .pause(RETURN_STEP_PAUSE);
        }
        plan.pause(RETURN_SETTLE_PAUSE)
    }
}
