use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::clock::TickTimer;
use crate::config::GameConfig;
use crate::food::Food;
use crate::snake::{Collision, Direction, Snake};
use crate::{Coords, Grid};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    GameOver,
}

/// Intent from the outside world, applied between ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    Restart,
}

pub type InputSender = Sender<Input>;

/// Read-only view handed to the renderer.
#[derive(Debug)]
pub struct Frame<'a> {
    pub grid: Grid,
    pub body: &'a VecDeque<Coords>,
    pub direction: Direction,
    pub food: Coords,
    pub score: u32,
    pub over: bool,
}

pub trait RenderSink {
    /// Called after every tick that leaves the snake alive, and once more
    /// with `frame.over` set when it dies.
    fn draw(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;
}

/// Owns one game: snake, food, score and the tick schedule.
///
/// Everything is mutated from `pump`, which takes `&mut self`, so a tick can
/// never start while another is running. Other parts of the program only get
/// an [`InputSender`].
pub struct SnakeGame<R: Rng = ThreadRng> {
    config: GameConfig,
    snake: Snake,
    food: Food,
    score: u32,
    phase: Phase,
    timer: TickTimer,
    rng: R,
    inputs: Receiver<Input>,
    sender: InputSender,
}

impl SnakeGame<ThreadRng> {
    pub fn new(config: GameConfig) -> Self {
        SnakeGame::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> SnakeGame<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        let (sender, inputs) = channel();
        let snake = Snake::new(config.initial_body.iter().copied(), config.initial_direction);
        let food = Food::new(config.initial_food);

        SnakeGame {
            config,
            snake,
            food,
            score: 0,
            phase: Phase::Ready,
            timer: TickTimer::new(),
            rng,
            inputs,
            sender,
        }
    }

    pub fn input_sender(&self) -> InputSender {
        self.sender.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn grid(&self) -> Grid {
        self.config.grid
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// When the next tick is due, if one is scheduled.
    pub fn next_tick_at(&self) -> Option<Instant> {
        self.timer.due_at()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: self.config.grid,
            body: self.snake.body(),
            direction: self.snake.get_direction(),
            food: self.food.position(),
            score: self.score,
            over: self.phase == Phase::GameOver,
        }
    }

    /// Leaves `Ready`, the first tick fires on the next pump.
    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Ready {
            return;
        }

        info!("Starting game on a {}x{} grid", self.config.grid.width, self.config.grid.height);
        self.phase = Phase::Running;
        self.timer.schedule(Duration::ZERO, now);
    }

    /// Throws the current game away and starts over from the configuration.
    pub fn restart(&mut self, now: Instant) {
        self.timer.cancel();

        self.snake = Snake::new(self.config.initial_body.iter().copied(), self.config.initial_direction);
        self.food = Food::new(self.config.initial_food);
        self.score = 0;
        self.phase = Phase::Running;

        info!("Restarting game");
        self.timer.schedule(Duration::ZERO, now);
    }

    pub fn pump(&mut self, sink: &mut impl RenderSink) -> anyhow::Result<Phase> {
        self.pump_at(Instant::now(), sink)
    }

    /// Applies queued input, then runs the pending tick if it is due.
    pub fn pump_at(&mut self, now: Instant, sink: &mut impl RenderSink) -> anyhow::Result<Phase> {
        while let Ok(input) = self.inputs.try_recv() {
            self.apply(input, now);
        }

        if let Some(handle) = self.timer.poll(now) {
            if self.timer.is_current(handle) && self.phase == Phase::Running {
                self.tick(now, sink)?;
            }
        }

        Ok(self.phase)
    }

    fn apply(&mut self, input: Input, now: Instant) {
        match input {
            Input::Direction(dir) => {
                if self.phase != Phase::GameOver {
                    self.snake.set_direction(dir);
                }
            }
            Input::Restart => self.restart(now),
        }
    }

    fn tick(&mut self, now: Instant, sink: &mut impl RenderSink) -> anyhow::Result<()> {
        self.snake.advance();

        if let Some(collision) = self.snake.collision(&self.config.grid) {
            self.timer.cancel();
            self.phase = Phase::GameOver;

            let reason = match collision {
                Collision::Wall => "hit a wall",
                Collision::Itself => "ran into itself",
            };
            info!("Game over, snake {} at {:?}, score {}", reason, self.snake.head(), self.score);

            return sink.draw(&self.frame());
        }

        if self.snake.eating_apple(&self.food) {
            self.score += 1;
            self.snake.grow();
            self.respawn_food();
            debug!("Food eaten, score {}, next food at {:?}", self.score, self.food.position());
        }

        sink.draw(&self.frame())?;
        self.timer.schedule(self.config.tick_interval, now);

        Ok(())
    }

    /// Rejection sampling with no retry cap: on a grid the snake fills
    /// completely this never returns.
    fn respawn_food(&mut self) {
        let cells = self.config.grid.cells();
        let mut attempts = 0;

        loop {
            self.food.set_new_position(&self.config.grid, &mut self.rng);
            if !self.food.is_on_snake(&self.snake) {
                return;
            }

            attempts += 1;
            if attempts == cells {
                warn!("Still placing food after {} attempts, snake covers {} of {} cells", attempts, self.snake.len(), cells);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Vec<Coords>, Coords, u32, bool)>,
    }

    impl RenderSink for Recorder {
        fn draw(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
            self.frames.push((frame.body.iter().copied().collect(), frame.food, frame.score, frame.over));
            Ok(())
        }
    }

    fn game() -> SnakeGame<StdRng> {
        SnakeGame::with_rng(GameConfig::default(), StdRng::seed_from_u64(3))
    }

    fn body(game: &SnakeGame<StdRng>) -> Vec<Coords> {
        game.snake().body().iter().copied().collect()
    }

    #[test]
    fn ready_does_not_tick() {
        let mut game = game();
        let mut sink = Recorder::default();
        let now = Instant::now();

        assert_eq!(game.pump_at(now, &mut sink).unwrap(), Phase::Ready);
        assert!(sink.frames.is_empty());
        assert_eq!(game.next_tick_at(), None);
    }

    #[test]
    fn ticks_on_interval() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        let tick = game.tick_interval();

        game.start(start);
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(game.snake().head(), (7, 4));

        game.pump_at(start + tick / 2, &mut sink).unwrap();
        assert_eq!(sink.frames.len(), 1);

        game.pump_at(start + tick, &mut sink).unwrap();
        assert_eq!(sink.frames.len(), 2);
        assert_eq!(game.snake().head(), (8, 4));
    }

    #[test]
    fn eating_scores_and_grows_next_tick() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        let tick = game.tick_interval();
        game.food = Food::new((7, 4));

        game.start(start);
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 5);
        assert!(game.snake().just_ate());
        assert!(!game.food().is_on_snake(game.snake()));

        game.pump_at(start + tick, &mut sink).unwrap();
        assert_eq!(game.snake().len(), 6);
        assert_eq!(body(&game)[5], (3, 4));
    }

    #[test]
    fn collision_ends_the_game() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        game.snake = Snake::new(vec![(29, 5), (28, 5)], Direction::Right);

        game.start(start);
        assert_eq!(game.pump_at(start, &mut sink).unwrap(), Phase::GameOver);
        assert_eq!(game.snake().head(), (30, 5));
        assert!(!game.timer.is_pending());

        let (_, _, _, over) = sink.frames.last().unwrap();
        assert!(*over);
        assert_eq!(sink.frames.len(), 1);

        game.pump_at(start + Duration::from_secs(5), &mut sink).unwrap();
        assert_eq!(sink.frames.len(), 1);
    }

    #[test]
    fn direction_ignored_after_game_over() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        game.snake = Snake::new(vec![(29, 5), (28, 5)], Direction::Right);

        game.start(start);
        game.pump_at(start, &mut sink).unwrap();

        game.input_sender().send(Input::Direction(Direction::Up)).unwrap();
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(game.snake().get_direction(), Direction::Right);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn restart_resets_everything() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        game.snake = Snake::new(vec![(29, 5), (28, 5)], Direction::Right);
        game.score = 4;

        game.start(start);
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(game.phase(), Phase::GameOver);

        let later = start + Duration::from_secs(1);
        game.restart(later);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.score(), 0);
        assert_eq!(body(&game), GameConfig::default().initial_body);
        assert_eq!(game.food().position(), (10, 10));
        assert_eq!(game.next_tick_at(), Some(later));

        game.pump_at(later, &mut sink).unwrap();
        assert_eq!(game.snake().head(), (7, 4));
    }

    #[test]
    fn restart_while_running_drops_pending_tick() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        let tick = game.tick_interval();

        game.start(start);
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(game.next_tick_at(), Some(start + tick));

        let mid = start + tick / 2;
        game.input_sender().send(Input::Restart).unwrap();
        game.pump_at(mid, &mut sink).unwrap();

        // The restart tick ran at `mid`, the old one at `start + tick` is gone.
        assert_eq!(game.snake().head(), (7, 4));
        assert_eq!(game.next_tick_at(), Some(mid + tick));
        game.pump_at(start + tick, &mut sink).unwrap();
        assert_eq!(game.snake().head(), (7, 4));
    }

    #[test]
    fn queued_reversal_is_dropped() {
        let mut game = game();
        let mut sink = Recorder::default();
        let start = Instant::now();
        let tick = game.tick_interval();
        let sender = game.input_sender();

        game.start(start);
        sender.send(Input::Direction(Direction::Left)).unwrap();
        game.pump_at(start, &mut sink).unwrap();
        assert_eq!(game.snake().head(), (7, 4));

        sender.send(Input::Direction(Direction::Down)).unwrap();
        game.pump_at(start + tick, &mut sink).unwrap();
        assert_eq!(game.snake().head(), (7, 5));
    }

    #[test]
    fn respawned_food_avoids_snake() {
        let mut game = SnakeGame::with_rng(
            GameConfig { grid: Grid::new(3, 2), ..GameConfig::default() },
            StdRng::seed_from_u64(11),
        );
        game.snake = Snake::new(vec![(0, 0), (1, 0), (2, 0), (2, 1), (1, 1)], Direction::Down);

        for _ in 0..50 {
            game.respawn_food();
            assert_eq!(game.food().position(), (0, 1));
        }
    }
}
