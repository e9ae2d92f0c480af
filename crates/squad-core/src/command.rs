//! Wire commands and the per-tick command plans built from them.

use std::fmt;
use std::time::Duration;

use crate::field::Point;

/// An outbound command. `Display` renders the exact wire text.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init { team: String },
    Move(Point),
    Dash(f64),
    Turn(f64),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init { team } => write!(f, "(init {team})"),
            Self::Move(p) => write!(f, "(move {:.2} {:.2})", p.x, p.y),
            Self::Dash(power) => write!(f, "(dash {power:.1})"),
            Self::Turn(angle) => write!(f, "(turn {angle:.1})"),
        }
    }
}

/// One element of a plan: send a command or wait.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Send(Command),
    Pause(Duration),
}

/// Ordered sequence of sends and pauses produced by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(mut self, command: Command) -> Self {
        self.steps.push(Step::Send(command));
        self
    }

    pub fn move_to(self, p: Point) -> Self {
        self.send(Command::Move(p))
    }

    pub fn dash(self, power: f64) -> Self {
        self.send(Command::Dash(power))
    }

    pub fn turn(self, angle: f64) -> Self {
        self.send(Command::Turn(angle))
    }

    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Pause(duration));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Just the commands, in send order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.steps.iter().filter_map(|s| match s {
            Step::Send(c) => Some(c),
            Step::Pause(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total time spent pausing.
    pub fn duration(&self) -> Duration {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Pause(d) => *d,
                Step::Send(_) => Duration::ZERO,
            })
            .sum()
    }
}
