//! Organism state and the per-tick behavior sequence.
//!
//! A tick runs in two halves so the simulation can order them across the whole
//! population: [`Organism::advance`] perceives and moves against a shared view of
//! the food field, then [`Organism::settle`] feeds, pays the metabolic cost,
//! reproduces and reports survival. [`Organism::step`] runs both back to back.

use crate::food::FoodField;
use crate::mutation::Mutator;
use forage_core::{
    Direction, LineageId, OrganismId, SimulationConfig, Traits, Vec2, WanderPolicy,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// An organism in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub lineage: LineageId,
    pub generation: u32,
    pub birth_tick: u64,
    pub age: u64,
    pub offspring_count: u32,
    pub position: Vec2,
    pub traits: Traits,
    pub energy: f64,
    pub health: f64,
    pub min_reproduction_energy: f64,
    pub energy_transfer_ratio: f64,
    max_energy: f64,
    /// Next wander axis under [`WanderPolicy::Alternating`]; `true` = horizontal
    wander_toggle: bool,
}

/// Where an organism headed during the movement half of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heading {
    /// Toward the food slot with this index
    Food(usize),
    Wander(Direction),
}

/// A newborn produced by reproduction, ready to be inserted into the population
#[derive(Debug, Clone, PartialEq)]
pub struct Offspring {
    pub parent: OrganismId,
    pub lineage: LineageId,
    pub generation: u32,
    pub position: Vec2,
    pub traits: Traits,
    pub energy: f64,
    pub health: f64,
    pub min_reproduction_energy: f64,
    pub energy_transfer_ratio: f64,
    pub max_energy: f64,
}

/// Result of the settlement half of a tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub alive: bool,
    /// Energy eaten this tick
    pub fed: f64,
    pub offspring: Option<Offspring>,
}

impl Organism {
    /// A founder with the configured initial traits
    pub fn founder(id: OrganismId, position: Vec2, config: &SimulationConfig) -> Self {
        let pop = &config.population;
        let traits = pop.founder_traits();
        let max_energy = config.energy.max_energy(traits.size);

        Self {
            id,
            lineage: LineageId::from(id),
            generation: 0,
            birth_tick: 0,
            age: 0,
            offspring_count: 0,
            position,
            traits,
            energy: max_energy * pop.initial_energy_fraction,
            health: pop.health,
            min_reproduction_energy: config.min_reproduction_energy(traits.size),
            energy_transfer_ratio: pop.energy_transfer_ratio,
            max_energy,
            wander_toggle: true,
        }
    }

    pub fn from_offspring(id: OrganismId, offspring: Offspring, birth_tick: u64) -> Self {
        Self {
            id,
            lineage: offspring.lineage,
            generation: offspring.generation,
            birth_tick,
            age: 0,
            offspring_count: 0,
            position: offspring.position,
            traits: offspring.traits,
            energy: offspring.energy,
            health: offspring.health,
            min_reproduction_energy: offspring.min_reproduction_energy,
            energy_transfer_ratio: offspring.energy_transfer_ratio,
            max_energy: offspring.max_energy,
            wander_toggle: true,
        }
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0 && self.energy > 0.0
    }

    /// Run one full tick for this organism alone
    pub fn step(
        &mut self,
        food: &mut FoodField,
        config: &SimulationConfig,
        mutator: &Mutator,
        rng: &mut ChaCha8Rng,
    ) -> StepOutcome {
        self.advance(food, config, rng);
        self.settle(food, config, mutator, rng)
    }

    /// Perceive the nearest food in range and move toward it, or wander
    pub fn advance(
        &mut self,
        food: &FoodField,
        config: &SimulationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Heading {
        let heading = match food.nearest_available_within(self.position, self.traits.sensory_range)
        {
            Some((index, target)) => {
                self.move_towards(target);
                Heading::Food(index)
            }
            None => {
                let dir = self.pick_wander_direction(config.behavior.wander, rng);
                self.position = self.position + dir.to_delta() * self.traits.speed;
                Heading::Wander(dir)
            }
        };

        self.position = self.position.clamp_to_field(config.world.grid_size);
        heading
    }

    /// Feed, pay the metabolic cost, maybe reproduce, then check survival
    pub fn settle(
        &mut self,
        food: &mut FoodField,
        config: &SimulationConfig,
        mutator: &Mutator,
        rng: &mut ChaCha8Rng,
    ) -> StepOutcome {
        let fed = food.consume(self.position, config.energy.feeding_radius);
        self.energy = (self.energy + fed).min(self.max_energy);

        self.metabolize(config);
        self.age += 1;

        let offspring = if self.is_alive() {
            self.try_reproduce(config, mutator, rng)
        } else {
            None
        };

        // a parent that does not survive the tick takes its offspring with it
        let alive = self.is_alive();
        StepOutcome {
            alive,
            fed,
            offspring: offspring.filter(|_| alive),
        }
    }

    fn move_towards(&mut self, target: Vec2) {
        let delta = target - self.position;
        let distance = delta.length();

        if distance <= self.traits.speed {
            self.position = target;
        } else {
            self.position = self.position + delta * (self.traits.speed / distance);
        }
    }

    fn pick_wander_direction(&mut self, policy: WanderPolicy, rng: &mut ChaCha8Rng) -> Direction {
        match policy {
            WanderPolicy::Random => Direction::all()[rng.gen_range(0..4)],
            WanderPolicy::Alternating => {
                let positive = rng.gen::<bool>();
                let dir = match (self.wander_toggle, positive) {
                    (true, true) => Direction::East,
                    (true, false) => Direction::West,
                    (false, true) => Direction::South,
                    (false, false) => Direction::North,
                };
                self.wander_toggle = !self.wander_toggle;
                dir
            }
        }
    }

    fn metabolize(&mut self, config: &SimulationConfig) {
        let energy = &config.energy;
        self.energy = (self.energy - energy.metabolic_cost(&self.traits)).max(0.0);

        if self.energy < energy.low_energy_threshold {
            let deficit = energy.low_energy_threshold - self.energy;
            self.health -= energy.health_decay_per_deficit * deficit;
        }
    }

    fn try_reproduce(
        &mut self,
        config: &SimulationConfig,
        mutator: &Mutator,
        rng: &mut ChaCha8Rng,
    ) -> Option<Offspring> {
        if self.energy <= self.min_reproduction_energy {
            return None;
        }

        let probability = config.reproduction.probability;
        if probability < 1.0 && rng.gen::<f64>() >= probability {
            return None;
        }

        let transfer = self.energy * self.energy_transfer_ratio;
        if transfer <= 0.0 {
            return None;
        }
        self.energy -= transfer;
        self.offspring_count += 1;

        let traits = mutator.mutate(&self.traits, rng);
        let max_energy = config.energy.max_energy(traits.size);

        trace!(
            organism_id = %self.id,
            transfer = transfer,
            parent_energy = self.energy,
            child_size = traits.size,
            "Organism reproduced"
        );

        Some(Offspring {
            parent: self.id,
            lineage: self.lineage,
            generation: self.generation + 1,
            position: self.position,
            traits,
            energy: transfer.min(max_energy),
            health: config.reproduction.offspring_health,
            min_reproduction_energy: config.min_reproduction_energy(traits.size),
            energy_transfer_ratio: self.energy_transfer_ratio,
            max_energy,
        })
    }
}
