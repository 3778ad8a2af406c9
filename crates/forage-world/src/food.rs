//! Fixed-capacity food field.
//!
//! Food lives in a dense vector of slots that is allocated once. Eating flips a
//! slot to unavailable, respawning flips it back at a fresh random position, so
//! the field never grows or shrinks during a run.

use forage_core::{Error, FoodConfig, Result, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// One recyclable food slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodSlot {
    pub position: Vec2,
    pub energy: f64,
    pub available: bool,
}

impl FoodSlot {
    pub fn new(position: Vec2, energy: f64) -> Self {
        Self {
            position,
            energy,
            available: true,
        }
    }

    pub fn depleted(position: Vec2, energy: f64) -> Self {
        Self {
            position,
            energy,
            available: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodField {
    grid_size: f64,
    nominal_energy: f64,
    slots: Vec<FoodSlot>,
}

impl FoodField {
    /// Create a field with every slot available at a uniformly random position
    pub fn new(config: &FoodConfig, grid_size: f64, rng: &mut ChaCha8Rng) -> Result<Self> {
        check_field_params(grid_size, config.nominal_energy)?;

        let slots = (0..config.capacity)
            .map(|_| FoodSlot::new(random_position(grid_size, rng), config.nominal_energy))
            .collect();

        Ok(Self {
            grid_size,
            nominal_energy: config.nominal_energy,
            slots,
        })
    }

    /// Create a field from explicit slots
    pub fn from_slots(grid_size: f64, nominal_energy: f64, slots: Vec<FoodSlot>) -> Result<Self> {
        check_field_params(grid_size, nominal_energy)?;

        if let Some(index) = slots.iter().position(|s| !s.position.in_field(grid_size)) {
            return Err(Error::Validation(format!(
                "food slot {} lies outside the field",
                index
            )));
        }

        Ok(Self {
            grid_size,
            nominal_energy,
            slots,
        })
    }

    /// Eat every available slot strictly within `radius` of `position`.
    ///
    /// Returns the summed energy of the slots eaten, or 0 when none qualifies.
    pub fn consume(&mut self, position: Vec2, radius: f64) -> f64 {
        let radius_sq = radius * radius;
        let mut gained = 0.0;

        for slot in self.slots.iter_mut().filter(|s| s.available) {
            if slot.position.distance_squared(position) < radius_sq {
                slot.available = false;
                gained += slot.energy;
            }
        }

        gained
    }

    /// Restore up to `rate` depleted slots, lowest index first.
    ///
    /// Returns how many slots were restored.
    pub fn respawn(&mut self, rate: usize, rng: &mut ChaCha8Rng) -> usize {
        let grid_size = self.grid_size;
        let nominal_energy = self.nominal_energy;
        let mut restored = 0;

        for slot in self.slots.iter_mut().filter(|s| !s.available).take(rate) {
            slot.position = random_position(grid_size, rng);
            slot.energy = nominal_energy;
            slot.available = true;
            restored += 1;
        }

        restored
    }

    /// Nearest available slot strictly within `range`; ties go to the lower index
    pub fn nearest_available_within(&self, position: Vec2, range: f64) -> Option<(usize, Vec2)> {
        let range_sq = range * range;
        let mut best: Option<(usize, f64)> = None;

        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.available {
                continue;
            }
            let dist_sq = slot.position.distance_squared(position);
            if dist_sq >= range_sq {
                continue;
            }
            match best {
                Some((_, best_sq)) if best_sq <= dist_sq => {}
                _ => best = Some((index, dist_sq)),
            }
        }

        best.map(|(index, _)| (index, self.slots[index].position))
    }

    /// Mark a slot as eaten without granting its energy to anyone
    pub fn deplete(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.available => {
                slot.available = false;
                true
            }
            _ => false,
        }
    }

    pub fn slots(&self) -> &[FoodSlot] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|s| s.available).count()
    }

    pub fn depleted_count(&self) -> usize {
        self.capacity() - self.available_count()
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn nominal_energy(&self) -> f64 {
        self.nominal_energy
    }
}

fn check_field_params(grid_size: f64, nominal_energy: f64) -> Result<()> {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Err(Error::Validation(format!(
            "grid size must be positive and finite, got {}",
            grid_size
        )));
    }
    if !(nominal_energy.is_finite() && nominal_energy > 0.0) {
        return Err(Error::Validation(format!(
            "nominal food energy must be positive and finite, got {}",
            nominal_energy
        )));
    }
    Ok(())
}

pub(crate) fn random_position(grid_size: f64, rng: &mut ChaCha8Rng) -> Vec2 {
    Vec2::new(rng.gen_range(0.0..grid_size), rng.gen_range(0.0..grid_size))
}
