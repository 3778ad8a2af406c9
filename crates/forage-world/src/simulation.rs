//! Simulation engine driving the food field and the population tick by tick.

use crate::food::{random_position, FoodField};
use crate::mutation::{MutationConfig, Mutator};
use crate::organism::Organism;
use crate::snapshot::Snapshot;
use forage_core::{Error, OrganismId, Result, SimulationConfig, TraitSummary};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

pub struct Simulation {
    config: SimulationConfig,
    food: FoodField,
    organisms: Vec<Organism>,
    mutator: Mutator,
    rng: ChaCha8Rng,
    tick: u64,
    next_id: u64,
    total_births: u64,
    total_deaths: u64,
    peak_population: usize,
    extinct_at: Option<u64>,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Index of the tick that was just run
    pub tick: u64,
    pub population: usize,
    pub births: usize,
    pub deaths: usize,
    pub food_eaten: f64,
    pub available_food: usize,
    pub respawned: usize,
}

/// Totals over a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub final_tick: u64,
    pub final_population: usize,
    pub peak_population: usize,
    pub total_births: u64,
    pub total_deaths: u64,
    pub extinct_at: Option<u64>,
    pub lineages_alive: usize,
    pub available_food: usize,
    pub trait_summary: Option<TraitSummary>,
}

impl Simulation {
    /// Seed the field and the founding population from `config`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid_size = config.world.grid_size;
        let food = FoodField::new(&config.food, grid_size, &mut rng)?;

        let organisms: Vec<Organism> = (0..config.population.initial_size as u64)
            .map(|id| {
                let position = random_position(grid_size, &mut rng);
                Organism::founder(OrganismId(id), position, &config)
            })
            .collect();

        info!(
            seed = config.seed,
            population = organisms.len(),
            food_slots = food.capacity(),
            grid_size = grid_size,
            "Simulation created"
        );

        Ok(Self::assemble(config, food, organisms, rng))
    }

    /// Start from an explicit field and population
    pub fn with_state(
        config: SimulationConfig,
        food: FoodField,
        organisms: Vec<Organism>,
    ) -> Result<Self> {
        config.validate()?;
        if food.grid_size() != config.world.grid_size {
            return Err(Error::Validation(format!(
                "food field grid_size {} does not match world grid_size {}",
                food.grid_size(),
                config.world.grid_size
            )));
        }
        if food.nominal_energy() != config.food.nominal_energy {
            return Err(Error::Validation(format!(
                "food field nominal_energy {} does not match configured {}",
                food.nominal_energy(),
                config.food.nominal_energy
            )));
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, food, organisms, rng))
    }

    fn assemble(
        config: SimulationConfig,
        food: FoodField,
        organisms: Vec<Organism>,
        rng: ChaCha8Rng,
    ) -> Self {
        let mutator = Mutator::new(MutationConfig::from(&config.reproduction));
        let next_id = organisms.iter().map(|o| o.id.0 + 1).max().unwrap_or(0);
        let peak_population = organisms.len();

        Self {
            config,
            food,
            organisms,
            mutator,
            rng,
            tick: 0,
            next_id,
            total_births: 0,
            total_deaths: 0,
            peak_population,
            extinct_at: None,
        }
    }

    /// Run up to `ticks` ticks, stopping early on extinction if configured
    #[instrument(skip(self), fields(seed = self.config.seed))]
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        info!("Starting simulation for {} ticks", ticks);

        let mut ticks_run = 0;
        for _ in 0..ticks {
            if self.config.stop_on_extinction && self.organisms.is_empty() {
                info!(tick = self.tick, "Population extinct, stopping early");
                break;
            }
            self.step();
            ticks_run += 1;
        }

        let summary = self.summary(ticks_run);
        info!(
            event = "run_summary",
            ticks_run = summary.ticks_run,
            final_tick = summary.final_tick,
            final_population = summary.final_population,
            peak_population = summary.peak_population,
            total_births = summary.total_births,
            total_deaths = summary.total_deaths,
            lineages_alive = summary.lineages_alive,
            "Run complete"
        );
        summary
    }

    /// Advance the world by exactly one tick.
    ///
    /// Every organism first decides and moves against the food field as it was
    /// before the tick. Feeding and the rest of the sequence are then settled in
    /// population order, so an earlier organism wins food both could reach.
    pub fn step(&mut self) -> TickReport {
        let tick = self.tick;

        for org in &mut self.organisms {
            org.advance(&self.food, &self.config, &mut self.rng);
        }

        let population = std::mem::take(&mut self.organisms);
        let mut next = Vec::with_capacity(population.len());
        let mut newborns = Vec::new();
        let mut food_eaten = 0.0;
        let mut deaths = 0;

        for mut org in population {
            let outcome = org.settle(&mut self.food, &self.config, &self.mutator, &mut self.rng);
            food_eaten += outcome.fed;

            if let Some(child) = outcome.offspring {
                newborns.push(child);
            }

            if outcome.alive {
                next.push(org);
            } else {
                deaths += 1;
                debug!(
                    event = "organism_death",
                    organism_id = %org.id,
                    lineage = %org.lineage,
                    tick = tick,
                    age = org.age,
                    energy = org.energy,
                    health = org.health,
                    offspring_count = org.offspring_count,
                    "Organism died"
                );
            }
        }

        let births = newborns.len();
        for child in newborns {
            let id = self.allocate_id();
            debug!(
                event = "organism_birth",
                organism_id = %id,
                parent_id = %child.parent,
                generation = child.generation,
                tick = tick,
                energy = child.energy,
                speed = child.traits.speed,
                size = child.traits.size,
                sensory_range = child.traits.sensory_range,
                "Organism born"
            );
            next.push(Organism::from_offspring(id, child, tick));
        }
        self.organisms = next;

        let respawned = if tick % self.config.food.respawn_interval == 0 {
            self.food.respawn(self.config.food.respawn_rate, &mut self.rng)
        } else {
            0
        };

        self.tick += 1;
        self.total_births += births as u64;
        self.total_deaths += deaths as u64;
        self.peak_population = self.peak_population.max(self.organisms.len());

        if self.organisms.is_empty() && deaths > 0 && self.extinct_at.is_none() {
            self.extinct_at = Some(tick);
            info!(
                event = "extinction",
                tick = tick,
                total_births = self.total_births,
                total_deaths = self.total_deaths,
                "Population went extinct"
            );
        }

        let interval = self.config.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_population_metrics();
        }

        TickReport {
            tick,
            population: self.organisms.len(),
            births,
            deaths,
            food_eaten,
            available_food: self.food.available_count(),
            respawned,
        }
    }

    fn allocate_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next_id);
        self.next_id += 1;
        id
    }

    fn emit_population_metrics(&self) {
        let population = self.organisms.len();
        let avg_energy = if population > 0 {
            self.organisms.iter().map(|o| o.energy).sum::<f64>() / population as f64
        } else {
            0.0
        };
        let max_generation = self.organisms.iter().map(|o| o.generation).max().unwrap_or(0);
        let summary = TraitSummary::from_traits(self.organisms.iter().map(|o| &o.traits));

        info!(
            event = "population_metrics",
            tick = self.tick,
            population = population,
            available_food = self.food.available_count(),
            avg_energy = avg_energy,
            max_generation = max_generation,
            avg_speed = summary.map(|s| s.speed.mean).unwrap_or(0.0),
            avg_size = summary.map(|s| s.size.mean).unwrap_or(0.0),
            avg_sensory_range = summary.map(|s| s.sensory_range.mean).unwrap_or(0.0),
            total_births = self.total_births,
            total_deaths = self.total_deaths,
            "Population metrics snapshot"
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.tick, &self.organisms, &self.food)
    }

    pub fn summary(&self, ticks_run: u64) -> RunSummary {
        let lineages: HashSet<_> = self.organisms.iter().map(|o| o.lineage).collect();

        RunSummary {
            ticks_run,
            final_tick: self.tick,
            final_population: self.organisms.len(),
            peak_population: self.peak_population,
            total_births: self.total_births,
            total_deaths: self.total_deaths,
            extinct_at: self.extinct_at,
            lineages_alive: lineages.len(),
            available_food: self.food.available_count(),
            trait_summary: TraitSummary::from_traits(self.organisms.iter().map(|o| &o.traits)),
        }
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    pub fn food(&self) -> &FoodField {
        &self.food
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodSlot;
    use forage_core::{Vec2, WorldConfig};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn small_config(seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig {
            seed,
            world: WorldConfig { grid_size: 200.0 },
            ..Default::default()
        };
        config.food.capacity = 80;
        config.population.initial_size = 20;
        config
    }

    fn empty_field(grid_size: f64) -> FoodField {
        FoodField::from_slots(grid_size, 10.0, Vec::new()).unwrap()
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.population(), 120);
        assert_eq!(sim.food().capacity(), 500);
        assert_eq!(sim.food().available_count(), 500);
        assert_eq!(sim.tick(), 0);

        for org in sim.organisms() {
            assert!(org.position.in_field(1000.0));
        }
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut config = SimulationConfig::default();
        config.world.grid_size = -1.0;
        assert!(matches!(Simulation::new(config), Err(Error::Validation(_))));

        let mut config = SimulationConfig::default();
        config.food.respawn_interval = 0;
        let result = Simulation::with_state(config, empty_field(1000.0), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_lone_organism_without_food_wanders() {
        let mut config = SimulationConfig::default();
        config.population.initial_size = 1;
        let mut org = Organism::founder(OrganismId(0), Vec2::new(500.0, 500.0), &config);
        org.energy = org.max_energy();
        org.min_reproduction_energy = org.max_energy();
        let start = org.position;

        let mut sim = Simulation::with_state(config, empty_field(1000.0), vec![org]).unwrap();
        let report = sim.step();
        assert_eq!(report.births, 0);
        assert_eq!(report.population, 1);

        let org = &sim.organisms()[0];
        let moved = org.position - start;
        assert!((moved.length() - 3.5).abs() < 1e-12);
        assert!(moved.x == 0.0 || moved.y == 0.0);
        assert!((org.energy - (3500.0 - 0.45)).abs() < 1e-9);
        assert_eq!(org.health, 90.0);
    }

    #[test]
    fn test_lone_organism_with_zero_threshold_reproduces() {
        let config = SimulationConfig::default();
        let mut org = Organism::founder(OrganismId(0), Vec2::new(500.0, 500.0), &config);
        org.energy = org.max_energy();
        org.min_reproduction_energy = 0.0;

        let mut sim = Simulation::with_state(config, empty_field(1000.0), vec![org]).unwrap();
        let report = sim.step();
        assert_eq!(report.births, 1);
        assert_eq!(sim.population(), 2);

        let parent = &sim.organisms()[0];
        let child = &sim.organisms()[1];
        assert_eq!(parent.id, OrganismId(0));
        assert_eq!(child.id, OrganismId(1));
        assert_eq!(child.position, parent.position);
        assert!((parent.energy - (3500.0 - 0.45) * 0.5).abs() < 1e-9);
        assert!((parent.energy + child.energy - (3500.0 - 0.45)).abs() < 1e-9);
    }

    #[test]
    fn test_forced_death_empties_population() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        for org in &mut sim.organisms {
            org.health = 0.0;
        }

        let report = sim.step();
        assert_eq!(report.deaths, 20);
        assert_eq!(report.population, 0);
        assert_eq!(sim.summary(1).extinct_at, Some(0));

        let report = sim.step();
        assert_eq!(report.population, 0);
        let snapshot = sim.snapshot();
        assert!(snapshot.organisms.is_empty());
        assert_eq!(snapshot.population, 0);
        assert!(snapshot.trait_summary.is_none());
        assert_eq!(snapshot.tick, 2);
    }

    #[test]
    fn test_well_fed_organisms_forced_dead_leave_no_offspring() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        for org in &mut sim.organisms {
            org.health = 0.0;
            org.energy = org.max_energy();
        }

        let report = sim.step();
        assert_eq!(report.deaths, 20);
        assert_eq!(report.births, 0);
        assert_eq!(report.population, 0);
        assert_eq!(sim.summary(1).total_births, 0);
    }

    #[test]
    fn test_mismatched_food_field_is_rejected() {
        let config = SimulationConfig::default();
        let result = Simulation::with_state(config.clone(), empty_field(500.0), Vec::new());
        assert!(matches!(result, Err(Error::Validation(_))));

        let food = FoodField::from_slots(1000.0, 25.0, Vec::new()).unwrap();
        let result = Simulation::with_state(config, food, Vec::new());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_start_is_not_an_extinction() {
        let mut config = SimulationConfig::default();
        config.population.initial_size = 0;
        let mut sim = Simulation::new(config).unwrap();

        let summary = sim.run(3);
        assert_eq!(summary.ticks_run, 3);
        assert_eq!(summary.final_population, 0);
        assert_eq!(summary.extinct_at, None);
    }

    #[test]
    fn test_respawn_runs_on_interval() {
        let mut config = SimulationConfig::default();
        config.population.initial_size = 0;
        config.food.respawn_rate = 40;

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut food = FoodField::new(&config.food, 1000.0, &mut rng).unwrap();
        for index in 0..460 {
            food.deplete(index);
        }

        let mut sim = Simulation::with_state(config, food, Vec::new()).unwrap();

        // tick 0 respawns
        let report = sim.step();
        assert_eq!(report.respawned, 40);
        assert_eq!(sim.food().depleted_count(), 420);
        assert_eq!(sim.food().available_count(), 80);

        // ticks 1..=13 do not
        for _ in 1..14 {
            assert_eq!(sim.step().respawned, 0);
        }
        assert_eq!(sim.food().depleted_count(), 420);

        // tick 14 does
        assert_eq!(sim.step().respawned, 40);
        assert_eq!(sim.food().depleted_count(), 380);
    }

    #[test]
    fn test_contested_food_goes_to_first_organism() {
        let mut config = SimulationConfig::default();
        config.world.grid_size = 100.0;
        let first = Organism::founder(OrganismId(0), Vec2::new(50.0, 50.0), &config);
        let second = Organism::founder(OrganismId(1), Vec2::new(52.0, 50.0), &config);
        let food = FoodField::from_slots(
            100.0,
            10.0,
            vec![FoodSlot::new(Vec2::new(51.0, 50.0), 10.0)],
        )
        .unwrap();

        let mut sim = Simulation::with_state(config, food, vec![first, second]).unwrap();
        let report = sim.step();
        assert_eq!(report.food_eaten, 10.0);

        // both saw the slot before the tick and moved onto it
        let orgs = sim.organisms();
        assert_eq!(orgs[0].position, Vec2::new(51.0, 50.0));
        assert_eq!(orgs[1].position, Vec2::new(51.0, 50.0));
        assert!(orgs[0].energy > orgs[1].energy);
        assert!((orgs[0].energy - orgs[1].energy - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = Simulation::new(small_config(99)).unwrap();
        let mut b = Simulation::new(small_config(99)).unwrap();

        for _ in 0..60 {
            assert_eq!(a.step(), b.step());
        }

        let (sa, sb) = (a.snapshot(), b.snapshot());
        assert_eq!(sa.organisms, sb.organisms);
        assert_eq!(sa.food, sb.food);
    }

    #[test]
    fn test_run_stops_on_extinction() {
        let mut config = small_config(3);
        config.stop_on_extinction = true;
        let mut sim = Simulation::new(config).unwrap();
        for org in &mut sim.organisms {
            org.energy = 0.1;
        }

        let summary = sim.run(100);
        assert_eq!(summary.ticks_run, 1);
        assert_eq!(summary.final_population, 0);
        assert_eq!(summary.extinct_at, Some(0));
        assert_eq!(summary.total_deaths, 20);
        assert_eq!(summary.lineages_alive, 0);
    }

    #[test]
    fn test_run_summary_tracks_population() {
        let mut sim = Simulation::new(small_config(4)).unwrap();
        let summary = sim.run(30);

        assert_eq!(summary.ticks_run, 30);
        assert_eq!(summary.final_tick, 30);
        assert_eq!(summary.final_population, sim.population());
        assert!(summary.peak_population >= 20);
        assert_eq!(
            summary.final_population as u64,
            20 + summary.total_births - summary.total_deaths
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_energy_bounded_and_health_never_rises(seed in any::<u64>()) {
            let mut config = small_config(seed);
            // enough energy to breed within the window
            config.population.initial_energy_fraction = 0.9;
            let mut sim = Simulation::new(config).unwrap();
            let mut last_health: HashMap<OrganismId, f64> = HashMap::new();

            for _ in 0..40 {
                sim.step();
                for org in sim.organisms() {
                    prop_assert!(org.energy >= 0.0);
                    prop_assert!(org.energy <= org.max_energy());
                    prop_assert!(org.position.in_field(200.0));
                    prop_assert!(org.traits.size >= 1.0 && org.traits.speed >= 0.1);
                    if let Some(prev) = last_health.get(&org.id) {
                        prop_assert!(org.health <= *prev);
                    }
                }
                last_health = sim.organisms().iter().map(|o| (o.id, o.health)).collect();
            }
        }
    }
}
