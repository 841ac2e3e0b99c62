//! Ports: directional leaves and the collections that hold them.
//!
//! A [`PortSet`] groups the ports of a component. A [`PortVec`] is an
//! ordered run of ports inside a port set, all constrained by the vector's
//! declared [`Direction`] and the configured [`DirectionPolicy`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod port;
pub mod port_set;
pub mod port_vec;

pub use port::Port;
pub use port_set::PortSet;
pub use port_vec::{PortVec, PortVecView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// Rule a [`PortVec`] applies to the direction of each port it admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionPolicy {
    /// Ports must point the other way from the vector; a port whose
    /// direction equals the vector's is rejected.
    #[default]
    Opposite,
    /// Ports must share the vector's direction.
    Same,
}

impl DirectionPolicy {
    /// Returns the reason a port is rejected, or `None` if it is admitted.
    pub fn violation(self, vec_direction: Direction, port_direction: Direction) -> Option<String> {
        match self {
            DirectionPolicy::Opposite if port_direction == vec_direction => Some(format!(
                "port direction {} equals the port vec direction; ports must be {}",
                port_direction,
                vec_direction.opposite()
            )),
            DirectionPolicy::Same if port_direction != vec_direction => Some(format!(
                "port direction {} differs from the port vec direction {}",
                port_direction, vec_direction
            )),
            _ => None,
        }
    }
}

impl FromStr for DirectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opposite" => Ok(DirectionPolicy::Opposite),
            "same" => Ok(DirectionPolicy::Same),
            other => Err(format!(
                "unknown direction policy {other:?}, expected \"opposite\" or \"same\""
            )),
        }
    }
}
