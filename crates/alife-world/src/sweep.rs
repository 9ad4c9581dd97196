//! Parameter sweeps: several independent simulations run back to back.

use crate::simulation::Simulation;
use alife_core::{PopulationHistory, Result, SimulationConfig, Species};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One configuration to run as part of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRun {
    pub label: String,
    pub config: SimulationConfig,
}

/// A batch of runs sharing a generation budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepJob {
    pub generations: u64,
    pub runs: Vec<SweepRun>,
}

impl SweepJob {
    pub fn new(generations: u64) -> Self {
        Self {
            generations,
            runs: Vec::new(),
        }
    }

    pub fn add_run(&mut self, label: impl Into<String>, config: SimulationConfig) -> &mut Self {
        self.runs.push(SweepRun {
            label: label.into(),
            config,
        });
        self
    }

    /// Replicate one configuration over several seeds
    pub fn with_seeds(generations: u64, base: &SimulationConfig, seeds: &[u64]) -> Self {
        let mut job = Self::new(generations);
        for &seed in seeds {
            let config = SimulationConfig {
                seed,
                ..base.clone()
            };
            job.add_run(format!("seed-{}", seed), config);
        }
        job
    }

    /// Run every configuration in its own simulation.
    ///
    /// Fails on the first run whose configuration is invalid or whose tick is abandoned.
    pub fn execute(self) -> Result<Vec<SweepOutcome>> {
        let generations = self.generations;
        let total = self.runs.len();

        self.runs
            .into_iter()
            .enumerate()
            .map(|(i, run)| -> Result<SweepOutcome> {
                info!(label = %run.label, "Sweep run {}/{}", i + 1, total);

                let seed = run.config.seed;
                let mut simulation = Simulation::new(run.config)?;
                let history = simulation.run(generations)?;

                Ok(SweepOutcome {
                    label: run.label,
                    seed,
                    final_prey: simulation.population_count(Species::Prey),
                    final_predators: simulation.population_count(Species::Predator),
                    history,
                })
            })
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Result of a single sweep run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub label: String,
    pub seed: u64,
    pub final_prey: usize,
    pub final_predators: usize,
    pub history: PopulationHistory,
}

impl SweepOutcome {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
