//! Configuration types for the simulation.

use crate::{Error, Result, Traits};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square field; coordinates live in `[0, grid_size)`
    pub grid_size: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { grid_size: 1000.0 }
    }
}

/// Food field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Number of food slots in the field
    pub capacity: usize,
    /// Maximum number of depleted slots restored per respawn
    pub respawn_rate: usize,
    /// Ticks between respawns
    pub respawn_interval: u64,
    /// Energy held by a freshly spawned food item
    pub nominal_energy: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            respawn_rate: 40,
            respawn_interval: 14,
            nominal_energy: 10.0,
        }
    }
}

/// Initial population and founder traits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub initial_size: usize,
    pub speed: f64,
    pub size: f64,
    pub sensory_range: f64,
    /// Founder energy as a fraction of its max energy
    pub initial_energy_fraction: f64,
    pub health: f64,
    /// Reproduction threshold as a fraction of max energy
    pub reproduction_energy_fraction: f64,
    /// Fraction of the parent's energy handed to each offspring
    pub energy_transfer_ratio: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_size: 120,
            speed: 3.5,
            size: 10.0,
            sensory_range: 40.0,
            // 150 energy at the default size
            initial_energy_fraction: 150.0 / 3500.0,
            health: 90.0,
            reproduction_energy_fraction: 0.5,
            energy_transfer_ratio: 0.5,
        }
    }
}

impl PopulationConfig {
    pub fn founder_traits(&self) -> Traits {
        Traits::new(self.speed, self.size, self.sensory_range)
    }
}

/// Energy, metabolism and health decay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// `max_energy = size² × energy_per_size_sq`
    pub energy_per_size_sq: f64,
    /// Metabolic cost per unit of speed
    pub speed_cost: f64,
    /// Metabolic cost per unit of size
    pub size_cost: f64,
    /// Below this energy an organism starts losing health
    pub low_energy_threshold: f64,
    /// Health lost per unit of energy below the threshold
    pub health_decay_per_deficit: f64,
    /// Radius within which an organism eats food
    pub feeding_radius: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            energy_per_size_sq: 35.0,
            speed_cost: 0.1,
            size_cost: 0.01,
            low_energy_threshold: 10.0,
            health_decay_per_deficit: 0.1,
            feeding_radius: 5.0,
        }
    }
}

impl EnergyConfig {
    pub fn max_energy(&self, size: f64) -> f64 {
        size * size * self.energy_per_size_sq
    }

    pub fn metabolic_cost(&self, traits: &Traits) -> f64 {
        self.speed_cost * traits.speed + self.size_cost * traits.size
    }
}

/// Offspring generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    /// Gaussian sigma as a fraction of the trait value
    pub mutation_rate: f64,
    pub min_speed: f64,
    pub min_size: f64,
    pub min_sensory_range: f64,
    /// Health every offspring starts with
    pub offspring_health: f64,
    /// Chance per tick that an eligible organism reproduces (1.0 = always)
    pub probability: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.02,
            min_speed: 0.1,
            min_size: 1.0,
            min_sensory_range: 1.0,
            offspring_health: 90.0,
            probability: 1.0,
        }
    }
}

/// How an organism with nothing in sight picks a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WanderPolicy {
    /// Any of the four cardinal directions, uniformly
    #[default]
    Random,
    /// Horizontal and vertical steps alternate; the sign is random
    Alternating,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub wander: WanderPolicy,
}

/// Full configuration of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub food: FoodConfig,
    pub population: PopulationConfig,
    pub energy: EnergyConfig,
    pub reproduction: ReproductionConfig,
    pub behavior: BehaviorConfig,
    /// Stop `run` early once the population is extinct
    pub stop_on_extinction: bool,
    /// Ticks between population metric events (0 disables them)
    pub metrics_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            food: FoodConfig::default(),
            population: PopulationConfig::default(),
            energy: EnergyConfig::default(),
            reproduction: ReproductionConfig::default(),
            behavior: BehaviorConfig::default(),
            stop_on_extinction: false,
            metrics_interval: 100,
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reproduction threshold for an organism of the given size
    pub fn min_reproduction_energy(&self, size: f64) -> f64 {
        self.energy.max_energy(size) * self.population.reproduction_energy_fraction
    }

    /// Check every parameter once, before a run starts
    pub fn validate(&self) -> Result<()> {
        positive("world.grid_size", self.world.grid_size)?;

        if self.food.respawn_interval == 0 {
            return Err(Error::Validation(
                "food.respawn_interval must be at least 1".to_string(),
            ));
        }
        positive("food.nominal_energy", self.food.nominal_energy)?;

        let pop = &self.population;
        non_negative("population.speed", pop.speed)?;
        positive("population.size", pop.size)?;
        non_negative("population.sensory_range", pop.sensory_range)?;
        fraction("population.initial_energy_fraction", pop.initial_energy_fraction)?;
        positive("population.health", pop.health)?;
        non_negative(
            "population.reproduction_energy_fraction",
            pop.reproduction_energy_fraction,
        )?;
        fraction("population.energy_transfer_ratio", pop.energy_transfer_ratio)?;

        let energy = &self.energy;
        positive("energy.energy_per_size_sq", energy.energy_per_size_sq)?;
        non_negative("energy.speed_cost", energy.speed_cost)?;
        non_negative("energy.size_cost", energy.size_cost)?;
        non_negative("energy.low_energy_threshold", energy.low_energy_threshold)?;
        non_negative("energy.health_decay_per_deficit", energy.health_decay_per_deficit)?;
        non_negative("energy.feeding_radius", energy.feeding_radius)?;

        let repro = &self.reproduction;
        non_negative("reproduction.mutation_rate", repro.mutation_rate)?;
        positive("reproduction.min_speed", repro.min_speed)?;
        positive("reproduction.min_size", repro.min_size)?;
        positive("reproduction.min_sensory_range", repro.min_sensory_range)?;
        positive("reproduction.offspring_health", repro.offspring_health)?;
        fraction("reproduction.probability", repro.probability)?;

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be non-negative and finite, got {}",
            name, value
        )))
    }
}

fn fraction(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}
