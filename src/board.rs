//! Shared game state: everything the frame loop and the obstacle mutator
//! both touch lives behind one lock.

use std::ops::RangeInclusive;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::snake::Snake;
use crate::Position;

/// Speed added to the snake for every food eaten.
pub const SPEED_INCREMENT: f32 = 0.02;

/// Random draws tried per grid cell before falling back to a full scan.
const SAMPLES_PER_CELL: usize = 4;

pub struct Board {
    pub snake: Snake,
    pub food: Position,
    pub obstacles: Vec<Position>,
    pub score: u32,
    pub running: bool,
    rng: StdRng,
}

impl Board {
    pub fn new(snake: Snake, rng: StdRng) -> Self {
        Board { snake, food: Position::default(), obstacles: vec![], score: 0, running: true, rng }
    }

    pub fn width(&self) -> i32 {
        self.snake.grid_width() as i32
    }

    pub fn height(&self) -> i32 {
        self.snake.grid_height() as i32
    }

    /// Moves the food to a random cell free of snake and obstacles. Returns
    /// `None` and leaves the food untouched when no such cell exists.
    pub fn place_food(&mut self) -> Option<Position> {
        let (width, height) = (self.width(), self.height());
        let Board { snake, obstacles, rng, .. } = self;

        let cell = sample_free_cell(&mut *rng, width, height, |p| {
            obstacles.contains(&p) || snake.snake_cell(p.x, p.y)
        })?;

        self.food = cell;
        Some(cell)
    }

    /// One tick of game logic. Does nothing once the snake is dead.
    pub fn update(&mut self) {
        if !self.snake.is_alive() {
            return;
        }

        self.snake.update();
        let head = self.snake.head();

        if head == self.food {
            self.score += 1;
            if self.place_food().is_none() {
                info!(score = self.score, "no free cell left for food, board cleared");
                self.snake.kill();
            }
            self.snake.grow_body();
            let speed = self.snake.speed();
            self.snake.set_speed(speed + SPEED_INCREMENT);
        }

        if self.obstacles.contains(&head) {
            self.snake.kill();
        }
    }

    /// Replaces the obstacle set with a random number (drawn from `counts`)
    /// of cells clear of the snake, the food and each other. Fewer are placed
    /// when the grid runs out of room; the number placed is returned.
    pub fn regenerate_obstacles(&mut self, counts: RangeInclusive<usize>) -> usize {
        let (width, height) = (self.width(), self.height());
        let Board { snake, food, obstacles, rng, .. } = self;
        let food = *food;

        obstacles.clear();
        let count = rng.gen_range(counts);
        for _ in 0..count {
            let cell = sample_free_cell(&mut *rng, width, height, |p| {
                p == food || obstacles.contains(&p) || snake.snake_cell(p.x, p.y)
            });
            match cell {
                Some(cell) => obstacles.push(cell),
                None => break,
            }
        }

        obstacles.len()
    }
}

/// Picks a uniformly random cell of the `width` x `height` grid for which
/// `is_blocked` is false. Random sampling is bounded; after that every free
/// cell is collected and one is chosen, so a saturated grid yields `None`.
pub fn sample_free_cell<R, F>(rng: &mut R, width: i32, height: i32, is_blocked: F) -> Option<Position>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> bool,
{
    if width <= 0 || height <= 0 {
        return None;
    }

    let attempts = SAMPLES_PER_CELL * width as usize * height as usize;
    for _ in 0..attempts {
        let cell = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if !is_blocked(cell) {
            return Some(cell);
        }
    }

    let free: Vec<Position> = (0..height)
        .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
        .filter(|p| !is_blocked(*p))
        .collect();

    if free.is_empty() {
        warn!(width, height, "grid saturated, no free cell");
    }
    free.choose(rng).copied()
}

/// The board plus the condition variable the obstacle mutator sleeps on.
pub struct SharedBoard {
    board: Mutex<Board>,
    wake: Condvar,
}

impl SharedBoard {
    pub fn new(board: Board) -> Self {
        SharedBoard { board: Mutex::new(board), wake: Condvar::new() }
    }

    /// A panic on the other thread never leaves the board half-written, so a
    /// poisoned lock is taken over as is.
    pub fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps up to `timeout`, returning early as soon as `running` is
    /// cleared and `notify` is called.
    pub fn wait_while_running<'a>(&self, guard: MutexGuard<'a, Board>, timeout: Duration) -> MutexGuard<'a, Board> {
        match self.wake.wait_timeout_while(guard, timeout, |board| board.running) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    pub fn notify(&self) {
        self.wake.notify_all();
    }
}
