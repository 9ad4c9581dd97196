//! Per-generation lookup from cell to the prey standing on it.
//!
//! Rebuilt from scratch after movement each generation, so predators resolve
//! their meal in O(1) per query instead of scanning every prey.

use crate::organism::Organism;
use alife_core::{Position, Species};
use std::collections::{HashMap, VecDeque};

/// Map from occupied cell to population indices of live prey, in insertion order
#[derive(Debug, Default)]
pub struct SpatialIndex {
    cells: HashMap<Position, VecDeque<usize>>,
    len: usize,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every live prey in `population`, keyed by its current position
    pub fn build(population: &[Organism]) -> Self {
        let mut index = Self::new();
        for (i, organism) in population.iter().enumerate() {
            if organism.is_alive() && organism.species == Species::Prey {
                index.insert(organism.position, i);
            }
        }
        index
    }

    pub fn insert(&mut self, pos: Position, entry: usize) {
        self.cells.entry(pos).or_default().push_back(entry);
        self.len += 1;
    }

    /// Entries at `pos` not yet taken, earliest first
    pub fn prey_at(&self, pos: Position) -> impl Iterator<Item = usize> + '_ {
        self.cells.get(&pos).into_iter().flatten().copied()
    }

    /// Remove and return the earliest-inserted entry at `pos`
    pub fn take_first(&mut self, pos: Position) -> Option<usize> {
        let entries = self.cells.get_mut(&pos)?;
        let entry = entries.pop_front();
        if entries.is_empty() {
            self.cells.remove(&pos);
        }
        if entry.is_some() {
            self.len -= 1;
        }
        entry
    }

    /// Remove and return every entry at `pos`, earliest first
    pub fn take_all(&mut self, pos: Position) -> Vec<usize> {
        let entries: Vec<usize> = self.cells.remove(&pos).map(Vec::from).unwrap_or_default();
        self.len -= entries.len();
        entries
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alife_core::{OrganismId, SpeciesTraits};

    fn organism(id: u64, species: Species, x: i32, y: i32) -> Organism {
        let traits = match species {
            Species::Prey => SpeciesTraits::prey(),
            Species::Predator => SpeciesTraits::predator(),
        };
        Organism::new(OrganismId(id), species, traits, Position::new(x, y), 0).unwrap()
    }

    #[test]
    fn test_build_indexes_only_live_prey() {
        let mut dead = organism(3, Species::Prey, 1, 1);
        dead.kill();
        let population = vec![
            organism(0, Species::Prey, 1, 1),
            organism(1, Species::Predator, 1, 1),
            organism(2, Species::Prey, 4, 2),
            dead,
            organism(4, Species::Prey, 1, 1),
        ];

        let index = SpatialIndex::build(&population);
        assert_eq!(index.len(), 3);
        assert_eq!(index.occupied_cells(), 2);
        assert_eq!(index.prey_at(Position::new(1, 1)).collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(index.prey_at(Position::new(4, 2)).collect::<Vec<_>>(), vec![2]);
        assert_eq!(index.prey_at(Position::new(0, 0)).count(), 0);
    }

    #[test]
    fn test_take_first_follows_insertion_order() {
        let mut index = SpatialIndex::new();
        let pos = Position::new(2, 2);
        index.insert(pos, 7);
        index.insert(pos, 3);
        index.insert(pos, 9);

        assert_eq!(index.take_first(pos), Some(7));
        assert_eq!(index.take_first(pos), Some(3));
        assert_eq!(index.len(), 1);
        assert_eq!(index.take_first(pos), Some(9));
        assert_eq!(index.take_first(pos), None);
        assert!(index.is_empty());
        assert_eq!(index.occupied_cells(), 0);
    }

    #[test]
    fn test_take_all_empties_cell() {
        let mut index = SpatialIndex::new();
        let pos = Position::new(0, 5);
        index.insert(pos, 1);
        index.insert(pos, 4);
        index.insert(Position::new(1, 5), 2);

        assert_eq!(index.take_all(pos), vec![1, 4]);
        assert!(index.take_all(pos).is_empty());
        assert_eq!(index.len(), 1);
        assert_eq!(index.take_first(Position::new(1, 5)), Some(2));
    }
}
