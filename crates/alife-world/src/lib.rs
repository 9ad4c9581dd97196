//! World simulation engine.
//!
//! This module implements the toroidal grass field where prey graze, predators
//! hunt, and both breed and starve one generation at a time.

pub mod grid;
pub mod organism;
pub mod spatial;
pub mod simulation;
pub mod sweep;

pub use grid::ResourceGrid;
pub use organism::{Organism, OrganismView};
pub use spatial::SpatialIndex;
pub use simulation::Simulation;
pub use sweep::{SweepJob, SweepOutcome, SweepRun};
