//! Role-conditioned tactical targeting.

use crate::field::{Point, FIELD};
use crate::identity::Role;

/// Targets are kept this far inside the touchlines.
pub const TARGET_INSET: f64 = 1.0;

/// Desired on-field point for `role`, given its home and the ball.
///
/// Pure and deterministic. The goalkeeper always holds home; every other
/// role is clamped into the inset field.
pub fn target(role: Role, home: Point, ball: Point) -> Point {
    let raw = match role {
        Role::Goalkeeper => return home,
        // Stays behind the ball while following its lateral drift.
        Role::Defender => Point::new(
            (home.x + ball.x) * 0.45,
            home.y + (ball.x - home.x) * 0.05 + (ball.y - home.y) * 0.2,
        ),
        Role::Midfielder => Point::new(
            ball.x * 0.6 + home.x * 0.4,
            ball.y * 0.7 + home.y * 0.3,
        ),
        Role::Forward => Point::new(
            ball.x * 0.8 + home.x * 0.2,
            ball.y * 0.9 + home.y * 0.1,
        ),
    };
    FIELD.clamp_inset(raw, TARGET_INSET)
}
