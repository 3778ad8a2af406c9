//! Read-only view of the world handed to renderers and reporters.

use crate::food::{FoodField, FoodSlot};
use crate::organism::Organism;
use forage_core::{LineageId, OrganismId, TraitSummary, Vec2};
use serde::{Deserialize, Serialize};

/// Display data for one organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismView {
    pub id: OrganismId,
    pub lineage: LineageId,
    pub generation: u32,
    pub position: Vec2,
    pub size: f64,
    pub speed: f64,
    pub sensory_range: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub health: f64,
}

impl From<&Organism> for OrganismView {
    fn from(org: &Organism) -> Self {
        Self {
            id: org.id,
            lineage: org.lineage,
            generation: org.generation,
            position: org.position,
            size: org.traits.size,
            speed: org.traits.speed,
            sensory_range: org.traits.sensory_range,
            energy: org.energy,
            max_energy: org.max_energy(),
            health: org.health,
        }
    }
}

/// Display data for one food slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodView {
    pub position: Vec2,
    pub available: bool,
}

impl From<&FoodSlot> for FoodView {
    fn from(slot: &FoodSlot) -> Self {
        Self {
            position: slot.position,
            available: slot.available,
        }
    }
}

/// State of the world between two ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub organisms: Vec<OrganismView>,
    pub food: Vec<FoodView>,
    pub population: usize,
    pub available_food: usize,
    pub trait_summary: Option<TraitSummary>,
}

impl Snapshot {
    pub fn capture(tick: u64, organisms: &[Organism], food: &FoodField) -> Self {
        Self {
            tick,
            organisms: organisms.iter().map(OrganismView::from).collect(),
            food: food.slots().iter().map(FoodView::from).collect(),
            population: organisms.len(),
            available_food: food.available_count(),
            trait_summary: TraitSummary::from_traits(organisms.iter().map(|o| &o.traits)),
        }
    }
}
