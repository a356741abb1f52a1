use std::time::Duration;

use crate::snake::Direction;
use crate::{Coords, Grid};

const CANVAS_WIDTH_PX: u32 = 900;
const CANVAS_HEIGHT_PX: u32 = 600;
const BLOCK_SIZE_PX: u32 = 30;
const TICK_INTERVAL_MS: u64 = 100;

const INITIAL_BODY: [Coords; 5] = [(6, 4), (5, 4), (4, 4), (3, 4), (2, 4)];
const INITIAL_FOOD: Coords = (10, 10);

/// Everything a game is (re)started from.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: Grid,
    pub tick_interval: Duration,
    /// Head first.
    pub initial_body: Vec<Coords>,
    pub initial_direction: Direction,
    pub initial_food: Coords,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid: Grid::from_pixels(CANVAS_WIDTH_PX, CANVAS_HEIGHT_PX, BLOCK_SIZE_PX),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            initial_body: INITIAL_BODY.to_vec(),
            initial_direction: Direction::Right,
            initial_food: INITIAL_FOOD,
        }
    }
}
