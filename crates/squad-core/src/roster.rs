//! Roster - canonical home positions per slot.
//!
//! File format (JSON):
//!
//! ```json
//! { "data": [ { "1": { "x": -50.0, "y": 0.0 }, "2": { "x": -35, "y": -20 } } ] }
//! ```
//!
//! Coordinates describe the left half; right-side agents mirror them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::field::Point;

#[derive(Debug, Deserialize, Serialize)]
struct RosterFile {
    data: Vec<BTreeMap<String, Entry>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Entry {
    x: Coord,
    y: Coord,
}

/// Coordinates are sometimes written as strings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum Coord {
    Number(f64),
    Text(String),
}

impl Coord {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Read-only map from slot number to canonical home.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    homes: BTreeMap<u8, Point>,
}

impl Roster {
    /// Load a roster and require an entry for every slot `1..=players`.
    pub fn load(path: &Path, players: u8) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, players).map_err(|e| match e {
            RosterParseError::Json(message) => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            RosterParseError::Missing(slot) => ConfigError::IncompleteRoster {
                path: path.to_path_buf(),
                slot,
            },
        })
    }

    fn parse(content: &str, players: u8) -> Result<Self, RosterParseError> {
        let file: RosterFile =
            serde_json::from_str(content).map_err(|e| RosterParseError::Json(e.to_string()))?;
        let table = file.data.into_iter().next().unwrap_or_default();

        let mut homes = BTreeMap::new();
        for slot in 1..=players {
            let point = table
                .get(&slot.to_string())
                .and_then(|e| Some(Point::new(e.x.value()?, e.y.value()?)))
                .ok_or(RosterParseError::Missing(slot))?;
            homes.insert(slot, point);
        }
        Ok(Self { homes })
    }

    /// Home for an agent: by uniform number, else by the slot it was launched for.
    pub fn home(&self, uniform: u8, slot: u8) -> Option<Point> {
        self.homes
            .get(&uniform)
            .or_else(|| self.homes.get(&slot))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Point)> + '_ {
        self.homes.iter().map(|(slot, p)| (*slot, *p))
    }

    /// A 4-3-3 shape on the left half, used by `squad init`.
    pub fn default_formation() -> Self {
        let homes = [
            (1, -50.0, 0.0),
            (2, -35.0, -20.0),
            (3, -38.0, -7.0),
            (4, -38.0, 7.0),
            (5, -35.0, 20.0),
            (6, -22.0, -12.0),
            (7, -24.0, 0.0),
            (8, -22.0, 12.0),
            (9, -8.0, -20.0),
            (10, -6.0, 0.0),
            (11, -8.0, 20.0),
        ]
        .into_iter()
        .map(|(slot, x, y)| (slot, Point::new(x, y)))
        .collect();
        Self { homes }
    }

    /// Serialize into the roster file format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let table = self
            .homes
            .iter()
            .map(|(slot, p)| {
                (
                    slot.to_string(),
                    Entry {
                        x: Coord::Number(p.x),
                        y: Coord::Number(p.y),
                    },
                )
            })
            .collect();
        serde_json::to_string_pretty(&RosterFile { data: vec![table] })
    }
}

#[derive(Debug)]
enum RosterParseError {
    Json(String),
    Missing(u8),
}
