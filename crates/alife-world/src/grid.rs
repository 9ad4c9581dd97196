//! 2D toroidal resource grid.

use alife_core::{Position, WorldConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Square toroidal grid of grass, one unit (0 or 1) per cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrid {
    size: i32,
    cells: Vec<u8>,
}

impl ResourceGrid {
    /// Grid with every cell depleted
    pub fn new(size: i32) -> Self {
        Self {
            size,
            cells: vec![0; size as usize * size as usize],
        }
    }

    /// Grid with every cell holding grass
    pub fn full(size: i32) -> Self {
        let mut grid = Self::new(size);
        grid.fill(1);
        grid
    }

    /// Create a grid from world configuration
    pub fn from_config<R: Rng>(config: &WorldConfig, rng: &mut R) -> Self {
        let mut grid = Self::new(config.grid_size);
        for cell in &mut grid.cells {
            if rng.gen::<f64>() < config.initial_grass_density {
                *cell = 1;
            }
        }
        grid
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Get the unit count at position (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> u8 {
        self.cells[self.pos_to_index(pos)]
    }

    /// Set the unit count at position; any non-zero value means present
    pub fn set(&mut self, pos: Position, value: u8) {
        let index = self.pos_to_index(pos);
        self.cells[index] = value.min(1);
    }

    pub fn fill(&mut self, value: u8) {
        self.cells.fill(value.min(1));
    }

    /// Take whatever grass is at `pos`, leaving the cell depleted
    pub fn consume(&mut self, pos: Position) -> u8 {
        let index = self.pos_to_index(pos);
        std::mem::take(&mut self.cells[index])
    }

    /// Each cell independently regrows with probability `p`.
    ///
    /// Cells are never lowered, so the result is `max(current, sample)`.
    pub fn regrow<R: Rng>(&mut self, p: f64, rng: &mut R) {
        debug_assert!((0.0..=1.0).contains(&p), "regrowth probability {} outside [0, 1]", p);
        for cell in &mut self.cells {
            let sample = u8::from(rng.gen::<f64>() < p);
            *cell = (*cell).max(sample);
        }
    }

    /// Number of cells currently holding grass
    pub fn count_present(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }

    /// Row-major cell values
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        let wrapped = pos.wrap(self.size);
        wrapped.y as usize * self.size as usize + wrapped.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let size = self.size as usize;
        Position::new((index % size) as i32, (index / size) as i32)
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &value)| (self.index_to_pos(i), value))
    }
}
