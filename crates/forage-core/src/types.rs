//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Unique identifier for an organism instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org-{}", self.0)
    }
}

/// Identifier of the founder an organism descends from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineageId(pub u64);

impl From<OrganismId> for LineageId {
    fn from(founder: OrganismId) -> Self {
        Self(founder.0)
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lineage-{}", self.0)
    }
}

/// 2D position or displacement in the world
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(&self, other: Vec2) -> f64 {
        (*self - other).length_squared()
    }

    /// Clamp both coordinates into the half-open field `[0, size)`
    pub fn clamp_to_field(&self, size: f64) -> Self {
        Self {
            x: clamp_coord(self.x, size),
            y: clamp_coord(self.y, size),
        }
    }

    pub fn in_field(&self, size: f64) -> bool {
        (0.0..size).contains(&self.x) && (0.0..size).contains(&self.y)
    }
}

/// Largest representable value strictly below `size`; degenerate fields collapse to 0
fn field_upper_bound(size: f64) -> f64 {
    if size > 0.0 {
        f64::from_bits(size.to_bits() - 1)
    } else {
        0.0
    }
}

fn clamp_coord(value: f64, size: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else if value >= size {
        field_upper_bound(size)
    } else {
        value
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Cardinal direction for wandering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit displacement, with y growing downwards like screen coordinates
    pub fn to_delta(&self) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0.0, -1.0),
            Direction::South => Vec2::new(0.0, 1.0),
            Direction::East => Vec2::new(1.0, 0.0),
            Direction::West => Vec2::new(-1.0, 0.0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// Heritable organism traits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Distance covered per tick
    pub speed: f64,
    /// Body size; scales energy capacity and metabolic cost
    pub size: f64,
    /// Radius within which food is detected
    pub sensory_range: f64,
}

impl Traits {
    pub fn new(speed: f64, size: f64, sensory_range: f64) -> Self {
        Self {
            speed,
            size,
            sensory_range,
        }
    }
}
