//! Population statistics for display and run summaries.

use crate::Traits;
use serde::{Deserialize, Serialize};

/// Running mean / min / max of one quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Stat {
    fn first(value: f64) -> Self {
        Self {
            mean: value,
            min: value,
            max: value,
        }
    }

    /// Fold in the `n`-th sample (1-based) using an incremental mean
    fn update(&mut self, value: f64, n: usize) {
        self.mean += (value - self.mean) / n as f64;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Trait distribution over a population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitSummary {
    pub count: usize,
    pub speed: Stat,
    pub size: Stat,
    pub sensory_range: Stat,
}

impl TraitSummary {
    /// Summarize a population; `None` when it is empty
    pub fn from_traits<'a, I>(traits: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Traits>,
    {
        let mut iter = traits.into_iter();
        let first = iter.next()?;

        let mut summary = Self {
            count: 1,
            speed: Stat::first(first.speed),
            size: Stat::first(first.size),
            sensory_range: Stat::first(first.sensory_range),
        };

        for t in iter {
            summary.count += 1;
            summary.speed.update(t.speed, summary.count);
            summary.size.update(t.size, summary.count);
            summary.sensory_range.update(t.sensory_range, summary.count);
        }

        Some(summary)
    }
}
