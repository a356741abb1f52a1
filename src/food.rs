use rand::Rng;

use crate::snake::Snake;
use crate::{Coords, Grid};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    position: Coords,
}

impl Food {
    pub fn new(position: Coords) -> Self {
        Food { position }
    }

    pub fn position(&self) -> Coords {
        self.position
    }

    /// Uniform over the whole grid, snake cells included.
    pub fn set_new_position<R: Rng>(&mut self, grid: &Grid, rng: &mut R) {
        self.position = (rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
    }

    pub fn is_on_snake(&self, snake: &Snake) -> bool {
        snake.body().contains(&self.position)
    }
}
