//! Population statistics collected over a run.

use crate::types::Species;
use serde::{Deserialize, Serialize};

/// Counts recorded at the end of one generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number, starting at 1 for the first completed tick
    pub generation: u64,
    /// Live prey after the tick
    pub prey: usize,
    /// Live predators after the tick
    pub predators: usize,
    /// Cells holding grass after regrowth
    pub grass: usize,
    /// Offspring added during the tick
    pub births: usize,
    /// Organisms removed for starvation
    pub starved: usize,
    /// Prey removed by predators
    pub eaten: usize,
}

impl GenerationStats {
    pub fn count(&self, species: Species) -> usize {
        match species {
            Species::Prey => self.prey,
            Species::Predator => self.predators,
        }
    }

    pub fn total_population(&self) -> usize {
        self.prey + self.predators
    }

    pub fn is_extinct(&self) -> bool {
        self.total_population() == 0
    }
}

/// Time series of per-generation counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationHistory {
    pub generations: Vec<GenerationStats>,
}

impl PopulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.generations.last()
    }

    /// Population of one species, one entry per generation
    pub fn series(&self, species: Species) -> Vec<usize> {
        self.generations.iter().map(|s| s.count(species)).collect()
    }

    /// Largest population reached by a species, with the generation it occurred in
    pub fn peak(&self, species: Species) -> Option<(u64, usize)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.count(species)))
            .max_by_key(|&(generation, count)| (count, std::cmp::Reverse(generation)))
    }

    /// First generation at which a species had no live members
    pub fn extinction(&self, species: Species) -> Option<u64> {
        self.generations
            .iter()
            .find(|s| s.count(species) == 0)
            .map(|s| s.generation)
    }

    pub fn total_births(&self) -> usize {
        self.generations.iter().map(|s| s.births).sum()
    }

    pub fn total_starved(&self) -> usize {
        self.generations.iter().map(|s| s.starved).sum()
    }

    pub fn total_eaten(&self) -> usize {
        self.generations.iter().map(|s| s.eaten).sum()
    }
}
