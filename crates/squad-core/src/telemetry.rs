//! Telemetry parser - pulls the few tokens the agent consumes out of raw
//! server text.
//!
//! Recognised tokens (case-insensitive):
//! - `(mypos <x> <y>)`
//! - `(ball <x> <y> ...)`, trailing fields ignored
//! - `(init <l|r> <uniform>`
//!
//! Anything that fails to match or to parse as a number is simply absent from
//! the result; the parser never errors.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MAX_PLAYERS;
use crate::field::Point;
use crate::identity::Side;

static MYPOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(mypos\s+([\-0-9.]+)\s+([\-0-9.]+)\)").unwrap());
static BALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(ball\s+([\-0-9.]+)\s+([\-0-9.]+)").unwrap());
static INIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(init\s+([lr])\s+(\d+)").unwrap());

/// Positions found in a single inbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Telemetry {
    pub own: Option<Point>,
    pub ball: Option<Point>,
}

impl Telemetry {
    pub fn parse(message: &str) -> Self {
        Self {
            own: capture_point(&MYPOS, message),
            ball: capture_point(&BALL, message),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.own.is_none() && self.ball.is_none()
    }
}

/// Extract `(side, uniform)` from a handshake reply, if present.
///
/// Replies with a uniform outside `1..=MAX_PLAYERS` are skipped so a later
/// valid reply in the same buffer can still match.
pub fn parse_handshake(buffer: &str) -> Option<(Side, u8)> {
    INIT.captures_iter(buffer).find_map(|caps| {
        let side = caps[1].chars().next().and_then(Side::from_letter)?;
        let uniform = caps[2]
            .parse::<u64>()
            .ok()
            .and_then(|n| u8::try_from(n).ok())
            .filter(|n| (1..=MAX_PLAYERS).contains(n));
        if uniform.is_none() {
            tracing::warn!(uniform = &caps[2], "Ignoring init reply with invalid uniform");
        }
        Some((side, uniform?))
    })
}

fn capture_point(re: &Regex, message: &str) -> Option<Point> {
    let caps = re.captures(message)?;
    let x = caps[1].parse::<f64>().ok()?;
    let y = caps[2].parse::<f64>().ok()?;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point::new(x, y))
}
