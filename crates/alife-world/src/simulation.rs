//! Simulation engine: one generation at a time over the whole field.

use crate::grid::ResourceGrid;
use crate::organism::{Organism, OrganismView};
use crate::spatial::SpatialIndex;
use alife_core::{
    Error, GenerationStats, MovementMode, OrganismId, PopulationHistory, Position,
    PredationPolicy, Result, RuleConfig, SatiationMode, SimulationConfig, Species,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, instrument, trace, warn, Level};

/// How often `run` reports progress
const REPORT_INTERVAL: u64 = 100;

pub struct Simulation {
    config: SimulationConfig,
    world: World,
    rng: ChaCha8Rng,
    generation: u64,
}

/// Everything a generation mutates. Cloned before each tick so a failed tick
/// can be thrown away.
#[derive(Debug, Clone)]
struct World {
    grid: ResourceGrid,
    population: Vec<Organism>,
    next_id: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = ResourceGrid::from_config(&config.world, &mut rng);

        let mut sim = Self {
            config,
            world: World {
                grid,
                population: Vec::new(),
                next_id: 0,
            },
            rng,
            generation: 0,
        };

        // Spawn initial organisms
        let size = sim.config.world.grid_size;
        let initial = [
            (Species::Prey, sim.config.population.initial_prey),
            (Species::Predator, sim.config.population.initial_predators),
        ];
        for (species, count) in initial {
            for _ in 0..count {
                let pos = Position::new(sim.rng.gen_range(0..size), sim.rng.gen_range(0..size));
                sim.add_organism(species, pos)?;
            }
        }

        debug!(
            seed = sim.config.seed,
            grid_size = size,
            prey = sim.population_count(Species::Prey),
            predators = sim.population_count(Species::Predator),
            grass = sim.world.grid.count_present(),
            "Simulation created"
        );

        Ok(sim)
    }

    /// Place a new organism with its species' configured traits
    pub fn add_organism(&mut self, species: Species, position: Position) -> Result<OrganismId> {
        let id = OrganismId(self.world.next_id);
        let organism = Organism::new(
            id,
            species,
            self.config.traits(species),
            position.wrap(self.config.world.grid_size),
            self.generation,
        )?;
        self.world.next_id += 1;
        self.world.population.push(organism);
        Ok(id)
    }

    /// Advance the simulation by exactly one generation.
    ///
    /// The tick runs on a copy of the current state. If any post-tick check
    /// fails the copy is dropped, the error is returned and the simulation stays
    /// at the previous generation.
    pub fn generation(&mut self) -> Result<GenerationStats> {
        let generation = self.generation + 1;
        let mut world = self.world.clone();
        let mut rng = self.rng.clone();

        let stats = world
            .advance(&self.config, &mut rng, generation)
            .and_then(|stats| world.verify(self.config.world.grid_size).map(|_| stats));

        match stats {
            Ok(stats) => {
                self.world = world;
                self.rng = rng;
                self.generation = generation;

                debug!(
                    generation,
                    prey = stats.prey,
                    predators = stats.predators,
                    grass = stats.grass,
                    births = stats.births,
                    starved = stats.starved,
                    eaten = stats.eaten,
                    "Generation complete"
                );
                Ok(stats)
            }
            Err(e) => {
                warn!(generation, error = %e, "Generation abandoned, keeping previous state");
                Err(e)
            }
        }
    }

    /// Run up to `generations` ticks, stopping early once everything is dead
    #[instrument(skip(self), fields(seed = self.config.seed))]
    pub fn run(&mut self, generations: u64) -> Result<PopulationHistory> {
        info!("Starting simulation for {} generations", generations);

        let mut history = PopulationHistory::new();
        for _ in 0..generations {
            let stats = self.generation()?;
            history.record(stats);

            if stats.generation % REPORT_INTERVAL == 0 {
                info!(
                    "Generation {}/{}: {} prey, {} predators alive",
                    stats.generation, generations, stats.prey, stats.predators
                );
                self.emit_population_metrics(&stats);
            }

            if stats.is_extinct() {
                info!(generation = stats.generation, "All organisms are dead, stopping early");
                break;
            }
        }

        self.emit_run_summary(&history);
        Ok(history)
    }

    fn emit_population_metrics(&self, stats: &GenerationStats) {
        event!(
            Level::INFO,
            gauge_name = "population_prey",
            gauge_value = stats.prey,
            generation = stats.generation,
            "Prey gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "population_predators",
            gauge_value = stats.predators,
            generation = stats.generation,
            "Predator gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "grass_cells",
            gauge_value = stats.grass,
            generation = stats.generation,
            "Grass gauge"
        );
    }

    fn emit_run_summary(&self, history: &PopulationHistory) {
        let (prey_peak_generation, prey_peak) = history.peak(Species::Prey).unwrap_or((0, 0));
        let (predator_peak_generation, predator_peak) =
            history.peak(Species::Predator).unwrap_or((0, 0));

        info!(
            event = "run_summary",
            final_generation = self.generation,
            final_prey = self.population_count(Species::Prey),
            final_predators = self.population_count(Species::Predator),
            prey_peak,
            prey_peak_generation,
            predator_peak,
            predator_peak_generation,
            prey_extinct_at = ?history.extinction(Species::Prey),
            predators_extinct_at = ?history.extinction(Species::Predator),
            total_births = history.total_births(),
            total_starved = history.total_starved(),
            total_eaten = history.total_eaten(),
            "🏁 Run complete"
        );
    }

    /// Read-only view of the grass field
    pub fn resource_snapshot(&self) -> &ResourceGrid {
        &self.world.grid
    }

    /// Species and position of every live organism
    pub fn population_snapshot(&self) -> Vec<OrganismView> {
        self.world
            .population
            .iter()
            .filter(|o| o.is_alive())
            .map(OrganismView::from)
            .collect()
    }

    pub fn population_count(&self, species: Species) -> usize {
        self.world
            .population
            .iter()
            .filter(|o| o.is_alive() && o.species == species)
            .count()
    }

    pub fn population(&self) -> &[Organism] {
        &self.world.population
    }

    /// Number of completed generations
    pub fn generation_count(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl World {
    /// Apply the five phases in order. Each phase finishes before the next one starts.
    fn advance<R: Rng>(
        &mut self,
        config: &SimulationConfig,
        rng: &mut R,
        generation: u64,
    ) -> Result<GenerationStats> {
        self.move_phase(&config.rules, rng, config.world.grid_size);
        let eaten = self.forage_phase(config.rules.predation);
        let births = self.reproduce_phase(rng, generation);
        let starved = self.cull_phase(generation);
        self.regrow_phase(config.world.grass_rate, rng);

        Ok(GenerationStats {
            generation,
            prey: self.count(Species::Prey),
            predators: self.count(Species::Predator),
            grass: self.grid.count_present(),
            births,
            starved,
            eaten,
        })
    }

    fn move_phase<R: Rng>(&mut self, rules: &RuleConfig, rng: &mut R, grid_size: i32) {
        for organism in self.population.iter_mut().filter(|o| o.is_alive()) {
            if rules.satiation == SatiationMode::LastMeal {
                organism.satiation = 0;
            }
            if rules.movement == MovementMode::RandomWalk {
                organism.step(rng, grid_size);
            }
        }
    }

    /// Prey graze, then predators hunt the prey left standing. Returns prey eaten.
    fn forage_phase(&mut self, policy: PredationPolicy) -> usize {
        for organism in &mut self.population {
            if organism.is_alive() && organism.species == Species::Prey {
                let amount = self.grid.consume(organism.position);
                organism.feed(u32::from(amount));
            }
        }

        let mut index = SpatialIndex::build(&self.population);
        let mut eaten = 0;

        for i in 0..self.population.len() {
            let hunter = &self.population[i];
            if !hunter.is_alive() || hunter.species != Species::Predator {
                continue;
            }
            let pos = hunter.position;
            let hunter_id = hunter.id;

            let victims = match policy {
                PredationPolicy::EatAll => index.take_all(pos),
                PredationPolicy::EatOne => index.take_first(pos).into_iter().collect(),
            };

            for &victim in &victims {
                let prey = &mut self.population[victim];
                prey.kill();
                trace!(organism_id = %prey.id, predator_id = %hunter_id, "Prey eaten");
            }

            eaten += victims.len();
            self.population[i].feed(victims.len() as u32);
        }

        eaten
    }

    /// Offspring join the population only after every parent was considered,
    /// so nobody born this generation reproduces this generation.
    fn reproduce_phase<R: Rng>(&mut self, rng: &mut R, generation: u64) -> usize {
        let mut born = Vec::new();
        for parent in self.population.iter_mut().filter(|o| o.is_alive()) {
            let litter = parent.reproduce(rng, &mut self.next_id, generation);
            if !litter.is_empty() {
                trace!(
                    parent_id = %parent.id,
                    species = %parent.species,
                    litter = litter.len(),
                    "Litter born"
                );
            }
            born.extend(litter);
        }

        let births = born.len();
        self.population.extend(born);
        births
    }

    /// Kill the starving, then drop every dead organism. Returns the number starved.
    fn cull_phase(&mut self, generation: u64) -> usize {
        let mut starved = 0;
        for organism in self.population.iter_mut().filter(|o| o.is_alive()) {
            if organism.is_starving() {
                organism.kill();
                starved += 1;
                trace!(
                    organism_id = %organism.id,
                    species = %organism.species,
                    lifetime = generation - organism.born_at,
                    "Organism starved"
                );
            }
        }

        self.population.retain(|o| o.is_alive());
        starved
    }

    fn regrow_phase<R: Rng>(&mut self, grass_rate: f64, rng: &mut R) {
        self.grid.regrow(grass_rate, rng);
    }

    fn count(&self, species: Species) -> usize {
        self.population
            .iter()
            .filter(|o| o.is_alive() && o.species == species)
            .count()
    }

    /// Post-tick checks. A failure means a rule was broken, not that the ecosystem collapsed.
    fn verify(&self, grid_size: i32) -> Result<()> {
        for organism in &self.population {
            if !organism.is_alive() {
                return Err(Error::InvariantViolation(format!(
                    "dead organism {} survived the cull",
                    organism.id
                )));
            }
            if !organism.position.in_bounds(grid_size) {
                return Err(Error::InvariantViolation(format!(
                    "organism {} at {} is outside a {}x{} grid",
                    organism.id, organism.position, grid_size, grid_size
                )));
            }
            if organism.is_starving() {
                return Err(Error::InvariantViolation(format!(
                    "organism {} has hunger {} at starvation threshold {}",
                    organism.id,
                    organism.hunger,
                    organism.traits().starvation_threshold
                )));
            }
        }

        if let Some((pos, value)) = self.grid.iter().find(|&(_, value)| value > 1) {
            return Err(Error::InvariantViolation(format!(
                "grid cell {} holds {}",
                pos, value
            )));
        }

        Ok(())
    }
}
