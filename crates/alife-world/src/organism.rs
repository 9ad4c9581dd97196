//! Organism state and lifecycle rules.

use alife_core::{OrganismId, Position, Result, Species, SpeciesTraits};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An organism in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub species: Species,
    pub position: Position,
    /// Generations in a row without food
    pub hunger: u32,
    /// Food eaten since the last litter
    pub satiation: u32,
    pub born_at: u64,
    alive: bool,
    traits: SpeciesTraits,
}

impl Organism {
    pub fn new(
        id: OrganismId,
        species: Species,
        traits: SpeciesTraits,
        position: Position,
        born_at: u64,
    ) -> Result<Self> {
        traits.validate(species)?;

        Ok(Self {
            id,
            species,
            position,
            hunger: 0,
            satiation: 0,
            born_at,
            alive: true,
            traits,
        })
    }

    pub fn traits(&self) -> &SpeciesTraits {
        &self.traits
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the organism dead. There is no way back.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_starving(&self) -> bool {
        self.hunger >= self.traits.starvation_threshold
    }

    /// Random walk: each axis moves by -1, 0 or +1, wrapping at the edges
    pub fn step<R: Rng>(&mut self, rng: &mut R, grid_size: i32) {
        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        self.step_by(dx, dy, grid_size);
    }

    pub fn step_by(&mut self, dx: i32, dy: i32, grid_size: i32) {
        self.position = self.position.add(dx, dy).wrap(grid_size);
    }

    /// Record a meal. Eating nothing is what makes an organism hungrier.
    pub fn feed(&mut self, amount: u32) {
        if amount > 0 {
            self.hunger = 0;
            self.satiation = self.satiation.saturating_add(amount);
        } else {
            self.hunger = self.hunger.saturating_add(1);
        }
    }

    pub fn can_reproduce(&self) -> bool {
        self.satiation >= self.traits.reproduction_threshold
    }

    /// Produce a litter of co-located offspring if enough food was eaten.
    ///
    /// The litter size is uniform in `[1, max_offspring]`. Reproducing spends the
    /// parent's whole satiation regardless of litter size. `next_id` is advanced
    /// once per offspring.
    pub fn reproduce<R: Rng>(
        &mut self,
        rng: &mut R,
        next_id: &mut u64,
        generation: u64,
    ) -> Vec<Organism> {
        if !self.can_reproduce() {
            return Vec::new();
        }

        self.satiation = 0;
        let litter = rng.gen_range(1..=self.traits.max_offspring);

        (0..litter)
            .map(|_| {
                let id = OrganismId(*next_id);
                *next_id += 1;
                Organism {
                    id,
                    hunger: 0,
                    satiation: 0,
                    born_at: generation,
                    ..self.clone()
                }
            })
            .collect()
    }

    pub fn view(&self) -> OrganismView {
        OrganismView::from(self)
    }
}

/// What the outside world may see of an organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismView {
    pub id: OrganismId,
    pub species: Species,
    pub x: i32,
    pub y: i32,
}

impl From<&Organism> for OrganismView {
    fn from(org: &Organism) -> Self {
        Self {
            id: org.id,
            species: org.species,
            x: org.position.x,
            y: org.position.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alife_core::Error;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rabbit(position: Position) -> Organism {
        Organism::new(OrganismId(1), Species::Prey, SpeciesTraits::prey(), position, 0).unwrap()
    }

    #[test]
    fn test_organism_creation() {
        let organism = rabbit(Position::new(5, 5));

        assert_eq!(organism.species, Species::Prey);
        assert_eq!(organism.position, Position::new(5, 5));
        assert_eq!(organism.hunger, 0);
        assert_eq!(organism.satiation, 0);
        assert!(organism.is_alive());
        assert!(!organism.is_starving());
    }

    #[test]
    fn test_invalid_traits_fail_fast() {
        let traits = SpeciesTraits {
            starvation_threshold: 0,
            ..SpeciesTraits::predator()
        };
        let result = Organism::new(OrganismId(1), Species::Predator, traits, Position::new(0, 0), 0);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_step_wraps_from_origin() {
        let mut organism = rabbit(Position::new(0, 0));
        organism.step_by(-1, -1, 10);
        assert_eq!(organism.position, Position::new(9, 9));

        organism.step_by(1, 1, 10);
        assert_eq!(organism.position, Position::new(0, 0));
    }

    #[test]
    fn test_random_step_moves_at_most_one_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut organism = rabbit(Position::new(4, 4));

        for _ in 0..200 {
            let before = organism.position;
            organism.step(&mut rng, 10);
            assert!(organism.position.in_bounds(10));
            let dx = (organism.position.x - before.x).rem_euclid(10);
            let dy = (organism.position.y - before.y).rem_euclid(10);
            assert!(matches!(dx, 0 | 1 | 9));
            assert!(matches!(dy, 0 | 1 | 9));
        }
    }

    #[test]
    fn test_feeding() {
        let mut organism = rabbit(Position::new(0, 0));

        organism.feed(0);
        organism.feed(0);
        assert_eq!(organism.hunger, 2);
        assert_eq!(organism.satiation, 0);

        organism.feed(1);
        assert_eq!(organism.hunger, 0);
        assert_eq!(organism.satiation, 1);

        organism.feed(3);
        assert_eq!(organism.satiation, 4);
    }

    #[test]
    fn test_starvation_threshold() {
        let mut organism = rabbit(Position::new(0, 0));
        for _ in 0..4 {
            organism.feed(0);
        }
        assert!(!organism.is_starving());

        organism.feed(0);
        assert!(organism.is_starving());
    }

    #[test]
    fn test_hunger_saturates() {
        let traits = SpeciesTraits {
            starvation_threshold: u32::MAX,
            ..SpeciesTraits::prey()
        };
        let mut organism =
            Organism::new(OrganismId(1), Species::Prey, traits, Position::new(0, 0), 0).unwrap();
        organism.hunger = u32::MAX;
        organism.feed(0);
        assert_eq!(organism.hunger, u32::MAX);
    }

    #[test]
    fn test_reproduction_requires_satiation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut next_id = 10;
        let mut organism = Organism::new(
            OrganismId(1),
            Species::Predator,
            SpeciesTraits::predator(),
            Position::new(2, 2),
            0,
        )
        .unwrap();

        organism.feed(1);
        assert!(organism.reproduce(&mut rng, &mut next_id, 1).is_empty());
        assert_eq!(organism.satiation, 1);
        assert_eq!(next_id, 10);

        organism.feed(1);
        let litter = organism.reproduce(&mut rng, &mut next_id, 2);
        assert_eq!(litter.len(), 1);
        assert_eq!(organism.satiation, 0);
        assert_eq!(next_id, 11);

        let child = &litter[0];
        assert_eq!(child.id, OrganismId(10));
        assert_eq!(child.species, Species::Predator);
        assert_eq!(child.position, organism.position);
        assert_eq!(child.hunger, 0);
        assert_eq!(child.satiation, 0);
        assert_eq!(child.born_at, 2);
        assert_eq!(child.traits(), organism.traits());
        assert!(child.is_alive());
    }

    #[test]
    fn test_litter_size_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut next_id = 0;
        let traits = SpeciesTraits {
            max_offspring: 3,
            ..SpeciesTraits::prey()
        };
        let mut organism =
            Organism::new(OrganismId(1), Species::Prey, traits, Position::new(0, 0), 0).unwrap();

        let mut sizes = std::collections::HashSet::new();
        for _ in 0..200 {
            organism.feed(1);
            let litter = organism.reproduce(&mut rng, &mut next_id, 1);
            assert!((1..=3).contains(&litter.len()));
            sizes.insert(litter.len());
        }
        assert_eq!(sizes.len(), 3);
    }

    #[test]
    fn test_zero_threshold_breeds_without_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut next_id = 0;
        let traits = SpeciesTraits {
            reproduction_threshold: 0,
            ..SpeciesTraits::prey()
        };
        let mut organism =
            Organism::new(OrganismId(1), Species::Prey, traits, Position::new(0, 0), 0).unwrap();

        assert!(organism.can_reproduce());
        assert!(!organism.reproduce(&mut rng, &mut next_id, 1).is_empty());
        assert!(organism.can_reproduce());
    }

    #[test]
    fn test_offspring_start_with_no_hunger() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut next_id = 2;
        let mut organism = rabbit(Position::new(1, 1));
        organism.feed(1);
        organism.hunger = 3;

        let litter = organism.reproduce(&mut rng, &mut next_id, 4);
        assert!(!litter.is_empty());
        assert!(litter.iter().all(|child| child.hunger == 0));
        assert_eq!(organism.hunger, 3);
    }

    #[test]
    fn test_kill_is_terminal() {
        let mut organism = rabbit(Position::new(0, 0));
        organism.kill();
        organism.feed(1);
        organism.kill();
        assert!(!organism.is_alive());
    }

    #[test]
    fn test_view() {
        let organism = rabbit(Position::new(3, 4));
        let view = organism.view();
        assert_eq!(view.id, organism.id);
        assert_eq!(view.species, Species::Prey);
        assert_eq!((view.x, view.y), (3, 4));
    }
}
