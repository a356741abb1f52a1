use std::collections::VecDeque;

use log::debug;

use crate::food::Food;
use crate::{Coords, Grid, GridInt};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Directions the snake may switch to while heading `self`.
    pub fn allowed_turns(self) -> [Direction; 2] {
        match self {
            Up | Down => [Left, Right],
            Left | Right => [Up, Down],
        }
    }
}

/// What a single `advance` did to the body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub new_head: Coords,
    pub old_head: Coords,
    /// `None` when the snake grew this step.
    pub old_tail: Option<Coords>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Itself,
}

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Coords>,
    direction: Direction,
    just_ate: bool,
}

impl Snake {
    /// `body` is head first and must not be empty.
    pub fn new(body: impl IntoIterator<Item = Coords>, direction: Direction) -> Self {
        let body: VecDeque<Coords> = body.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body, direction, just_ate: false }
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        *self.body.front().expect("snake body is never empty")
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn just_ate(&self) -> bool {
        self.just_ate
    }

    /// Moves one cell along the current direction. Never bounds checked, an
    /// out of grid head is caught by `check_collision`.
    pub fn advance(&mut self) -> Step {
        let old_head = self.head();
        let (dx, dy) = self.direction.delta();
        let new_head = (old_head.0 + dx, old_head.1 + dy);

        self.body.push_front(new_head);

        let old_tail = if self.just_ate {
            self.just_ate = false;
            None
        } else {
            self.body.pop_back()
        };

        Step { new_head, old_head, old_tail }
    }

    /// Returns whether the new direction was taken. Reversals are dropped.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction {
            return true;
        }

        if self.direction.allowed_turns().contains(&new_direction) {
            self.direction = new_direction;
            true
        } else {
            debug!("Ignoring reversal from {:?} to {:?}", self.direction, new_direction);
            false
        }
    }

    /// Keep the tail on the next `advance`.
    pub fn grow(&mut self) {
        self.just_ate = true;
    }

    pub fn collision(&self, grid: &Grid) -> Option<Collision> {
        let head = self.head();

        if !grid.contains(head) {
            Some(Collision::Wall)
        } else if self.body.iter().skip(1).any(|pos| *pos == head) {
            Some(Collision::Itself)
        } else {
            None
        }
    }

    pub fn check_collision(&self, grid: &Grid) -> bool {
        self.collision(grid).is_some()
    }

    pub fn eating_apple(&self, food: &Food) -> bool {
        self.head() == food.position()
    }
}
