//! Agent identity - uniform number, side, role and home position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::Point;

/// Team half assigned by the server during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Parse the handshake side letter (`l`/`r`, any case).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'l' => Some(Self::Left),
            'r' => Some(Self::Right),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::Left => 'l',
            Self::Right => 'r',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Tactical role, derived from the uniform number (4-3-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    pub fn from_uniform(uniform: u8) -> Self {
        match uniform {
            1 => Self::Goalkeeper,
            2..=5 => Self::Defender,
            6..=8 => Self::Midfielder,
            _ => Self::Forward,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Goalkeeper => "goalkeeper",
            Self::Defender => "defender",
            Self::Midfielder => "midfielder",
            Self::Forward => "forward",
        }
    }

    /// Distance from home beyond which the return-home override fires.
    pub fn home_range(&self) -> f64 {
        match self {
            Self::Goalkeeper => 18.0,
            _ => 45.0,
        }
    }

    /// Upper bound on the dash power used while recovering to home.
    pub fn recovery_dash_cap(&self) -> f64 {
        match self {
            Self::Goalkeeper => 40.0,
            _ => 70.0,
        }
    }

    /// Whether this role presses the ball from mid range.
    pub fn presses(&self) -> bool {
        matches!(self, Self::Midfielder | Self::Forward)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Who an agent is once the handshake completed. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentIdentity {
    pub uniform: u8,
    pub side: Side,
    pub home: Point,
}

impl AgentIdentity {
    /// Build an identity from the canonical (left-side) roster home.
    ///
    /// The roster only encodes one half, so right-side agents get x mirrored.
    pub fn new(uniform: u8, side: Side, canonical_home: Point) -> Self {
        let home = match side {
            Side::Left => canonical_home,
            Side::Right => Point::new(-canonical_home.x, canonical_home.y),
        };
        Self {
            uniform,
            side,
            home,
        }
    }

    pub fn role(&self) -> Role {
        Role::from_uniform(self.uniform)
    }
}
