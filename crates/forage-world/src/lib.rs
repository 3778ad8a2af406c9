//! World simulation engine.
//!
//! This module implements the 2D field where organisms forage, reproduce and die.

pub mod food;
pub mod mutation;
pub mod organism;
pub mod simulation;
pub mod snapshot;

pub use food::{FoodField, FoodSlot};
pub use mutation::{MutationConfig, Mutator};
pub use organism::{Heading, Offspring, Organism, StepOutcome};
pub use simulation::{RunSummary, Simulation, TickReport};
pub use snapshot::{FoodView, OrganismView, Snapshot};
