//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Largest accepted grid side; cell indices stay within `i32`
pub const MAX_GRID_SIZE: i32 = 46_340;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of the square, toroidal grid
    pub grid_size: i32,
    /// Probability that an empty cell regrows grass each generation (0.0 to 1.0)
    pub grass_rate: f64,
    /// Probability that a cell starts with grass (0.0 to 1.0)
    pub initial_grass_density: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 25,
            grass_rate: 0.03,
            initial_grass_density: 1.0,
        }
    }
}

/// Constants shared by every organism of one species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTraits {
    /// Largest litter a single reproduction event can produce
    pub max_offspring: u32,
    /// Consecutive hungry generations that kill an organism
    pub starvation_threshold: u32,
    /// Food needed since the last litter before reproducing again; 0 means always eligible
    pub reproduction_threshold: u32,
}

impl SpeciesTraits {
    pub fn prey() -> Self {
        Self {
            max_offspring: 2,
            starvation_threshold: 5,
            reproduction_threshold: 1,
        }
    }

    pub fn predator() -> Self {
        Self {
            max_offspring: 1,
            starvation_threshold: 12,
            reproduction_threshold: 2,
        }
    }

    pub fn validate(&self, species: Species) -> Result<()> {
        if self.max_offspring == 0 {
            return Err(Error::InvalidConfig(format!(
                "{} max_offspring must be positive",
                species
            )));
        }
        if self.starvation_threshold == 0 {
            return Err(Error::InvalidConfig(format!(
                "{} starvation_threshold must be positive",
                species
            )));
        }
        Ok(())
    }
}

/// Initial population, placed uniformly at random
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub initial_prey: usize,
    pub initial_predators: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_prey: 100,
            initial_predators: 15,
        }
    }
}

/// How a predator resolves a cell holding several prey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredationPolicy {
    /// Eat every co-located prey; the meal size is the number eaten
    #[default]
    EatAll,
    /// Eat only the earliest-inserted co-located prey
    EatOne,
}

/// What counts towards reproduction eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatiationMode {
    /// Food accumulates until a litter is produced
    #[default]
    Cumulative,
    /// Only food eaten during the current generation counts
    LastMeal,
}

/// How organisms move during the move phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Each axis moves by -1, 0 or +1 uniformly
    #[default]
    RandomWalk,
    /// Nobody moves
    Frozen,
}

/// Rule variants, fixed for the lifetime of a simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    pub predation: PredationPolicy,
    pub satiation: SatiationMode,
    pub movement: MovementMode,
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Prey constants
    pub prey: SpeciesTraits,
    /// Predator constants
    pub predator: SpeciesTraits,
    /// Initial population
    pub population: PopulationConfig,
    /// Rule variants
    #[serde(default)]
    pub rules: RuleConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            prey: SpeciesTraits::prey(),
            predator: SpeciesTraits::predator(),
            population: PopulationConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Traits table for a species
    pub fn traits(&self, species: Species) -> SpeciesTraits {
        match species {
            Species::Prey => self.prey,
            Species::Predator => self.predator,
        }
    }

    /// Reject configurations that would make a run meaningless.
    ///
    /// Values are never clamped: a misconfigured experiment fails here.
    pub fn validate(&self) -> Result<()> {
        if self.world.grid_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid_size must be positive, got {}",
                self.world.grid_size
            )));
        }
        if self.world.grid_size > MAX_GRID_SIZE {
            return Err(Error::InvalidConfig(format!(
                "grid_size must be at most {}, got {}",
                MAX_GRID_SIZE, self.world.grid_size
            )));
        }
        check_probability("grass_rate", self.world.grass_rate)?;
        check_probability("initial_grass_density", self.world.initial_grass_density)?;
        for species in Species::all() {
            self.traits(species).validate(species)?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
