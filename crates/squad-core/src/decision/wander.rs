//! Scripted random motion around home.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

use crate::command::Plan;
use crate::identity::Role;

/// Inside this radius the agent drifts more gently.
const NEAR_HOME: f64 = 6.0;
const TURN_TO_DASH: Duration = Duration::from_millis(70);
const SETTLE_MS: RangeInclusive<u64> = 350..=1000;

/// One wander step: random turn, short pause, random dash, random settle.
pub fn plan(rng: &mut impl Rng, role: Role, distance_from_home: f64) -> Plan {
    let keeper = role == Role::Goalkeeper;
    let (angle, power) = if distance_from_home < NEAR_HOME {
        let power = if keeper { 5.0..=40.0 } else { 10.0..=55.0 };
        (rng.gen_range(-60.0..=60.0), rng.gen_range(power))
    } else if keeper {
        (rng.gen_range(-20.0..=20.0), rng.gen_range(10.0..=45.0))
    } else {
        (rng.gen_range(-40.0..=40.0), rng.gen_range(15.0..=70.0))
    };

    Plan::new()
        .turn(angle)
        .pause(TURN_TO_DASH)
        .dash(power)
        .pause(Duration::from_millis(rng.gen_range(SETTLE_MS)))
}
