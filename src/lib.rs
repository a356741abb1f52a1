//! Core of a grid based snake game.
//!
//! Nothing in here touches the terminal: the binary wires a renderer and a
//! key reader to [`game::SnakeGame`], which owns all the state.

pub mod clock;
pub mod config;
pub mod food;
pub mod game;
pub mod snake;

pub type GridInt = i16;
pub type Coords = (GridInt, GridInt);

/// Playfield dimensions, in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: GridInt,
    pub height: GridInt,
}

impl Grid {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        Grid { width, height }
    }

    /// Grid for a canvas of `width_px × height_px` split into square blocks.
    pub fn from_pixels(width_px: u32, height_px: u32, block_px: u32) -> Self {
        Grid::new((width_px / block_px) as GridInt, (height_px / block_px) as GridInt)
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.0 >= 0 && pos.0 < self.width && pos.1 >= 0 && pos.1 < self.height
    }

    pub fn cells(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }
}
