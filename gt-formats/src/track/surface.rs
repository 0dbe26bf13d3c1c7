//! Road surface types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Surface type byte stored in each road face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoadSurface {
    Tarmac = 1,
    Guide = 2,
    Green = 3,
    Sand = 4,
    Gravel = 5,
    Dirt = 6,
    Water = 7,
    Stone = 8,
    Wood = 9,
    Pave = 10,
    Guide1 = 11,
    Guide2 = 12,
    Guide3 = 13,
    Pebble = 14,
    Beach = 15,
}

impl RoadSurface {
    pub const ALL: [RoadSurface; 15] = [
        Self::Tarmac,
        Self::Guide,
        Self::Green,
        Self::Sand,
        Self::Gravel,
        Self::Dirt,
        Self::Water,
        Self::Stone,
        Self::Wood,
        Self::Pave,
        Self::Guide1,
        Self::Guide2,
        Self::Guide3,
        Self::Pebble,
        Self::Beach,
    ];

    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|surface| *surface as u8 == raw)
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Canonical upper-case name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tarmac => "TARMAC",
            Self::Guide => "GUIDE",
            Self::Green => "GREEN",
            Self::Sand => "SAND",
            Self::Gravel => "GRAVEL",
            Self::Dirt => "DIRT",
            Self::Water => "WATER",
            Self::Stone => "STONE",
            Self::Wood => "WOOD",
            Self::Pave => "PAVE",
            Self::Guide1 => "GUIDE1",
            Self::Guide2 => "GUIDE2",
            Self::Guide3 => "GUIDE3",
            Self::Pebble => "PEBBLE",
            Self::Beach => "BEACH",
        }
    }

    /// Name for any raw byte; unknown values render as `UNKNOWN<n>`.
    pub fn name_of(raw: u8) -> String {
        match Self::from_raw(raw) {
            Some(surface) => surface.as_str().to_string(),
            None => format!("UNKNOWN{}", raw),
        }
    }
}

impl fmt::Display for RoadSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadSurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|surface| surface.as_str() == s)
            .ok_or_else(|| format!("unknown road surface '{}'", s))
    }
}
