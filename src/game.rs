use std::sync::{Arc, MutexGuard};
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::board::{Board, SharedBoard};
use crate::config::GameConfig;
use crate::obstacles::{border_obstacles, ObstacleMutator};
use crate::snake::Snake;
use crate::store::{ScoreStore, StoreError};
use crate::{Level, Position};

const TITLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Keyboard (or scripted) input, polled once per frame.
pub trait Controller {
    fn handle_input(&mut self, running: &mut bool, snake: &mut Snake) -> Result<()>;
}

pub trait Renderer {
    fn render(&mut self, snake: &Snake, food: Position, obstacles: &[Position]) -> Result<()>;

    /// Called about once a second with the frames counted since the last call.
    fn update_window_title(&mut self, score: u32, fps: u32) -> Result<()>;
}

/// What gets written to the score store at the end of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: String,
    pub level: Level,
    pub score: u32,
    pub size: u32,
}

pub struct SnakeGame {
    board: Arc<SharedBoard>,
    level: Level,
    mutator: Option<ObstacleMutator>,
}

impl SnakeGame {
    pub fn new(config: &GameConfig, level: Level) -> Result<Self> {
        Self::with_rng(config, level, StdRng::from_entropy())
    }

    /// Same as `new` with a reproducible random sequence.
    pub fn with_seed(config: &GameConfig, level: Level, seed: u64) -> Result<Self> {
        Self::with_rng(config, level, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, level: Level, rng: StdRng) -> Result<Self> {
        config.validate()?;

        let snake = Snake::new(config.grid_width, config.grid_height);
        let mut board = Board::new(snake, rng);

        if level == Level::Medium {
            board.obstacles = border_obstacles(config.grid_width, config.grid_height);
        }
        if board.place_food().is_none() {
            warn!("no room for food on a fresh board");
            board.snake.kill();
        }

        let board = Arc::new(SharedBoard::new(board));
        let mutator = match level {
            Level::Hard => Some(ObstacleMutator::spawn(Arc::clone(&board), config.obstacles.clone())?),
            _ => None,
        };

        info!(%level, width = config.grid_width, height = config.grid_height, "game created");
        Ok(SnakeGame { board, level, mutator })
    }

    /// Input, update, render until the controller clears the running flag.
    /// A dead snake freezes the board but does not end the loop.
    pub fn run<C, R>(&mut self, controller: &mut C, renderer: &mut R, target_frame_duration: Duration) -> Result<()>
    where
        C: Controller + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut title_timestamp = Instant::now();
        let mut frame_count: u32 = 0;
        let mut running = true;

        while running {
            let frame_start = Instant::now();

            let score = {
                let mut guard = self.board.lock();
                let board = &mut *guard;

                controller.handle_input(&mut board.running, &mut board.snake)?;
                board.update();
                renderer.render(&board.snake, board.food, &board.obstacles)?;

                running = board.running;
                board.score
            };

            let frame_end = Instant::now();
            frame_count += 1;
            let frame_duration = frame_end - frame_start;

            if frame_end - title_timestamp >= TITLE_INTERVAL {
                renderer.update_window_title(score, frame_count)?;
                frame_count = 0;
                title_timestamp = frame_end;
            }

            if frame_duration < target_frame_duration {
                sleep(target_frame_duration - frame_duration);
            }
        }

        self.stop_obstacles();
        info!(score = self.score(), size = self.size(), "game finished");
        Ok(())
    }

    /// Stops and joins the obstacle mutator, if this level has one.
    pub fn stop_obstacles(&mut self) {
        if let Some(mut mutator) = self.mutator.take() {
            mutator.stop();
        }
    }

    /// Appends this session to the player's history and writes the store.
    /// The exclusive borrow of `store` is the only synchronization needed.
    pub fn save_game(&self, store: &mut ScoreStore, info: &PlayerInfo) -> Result<(), StoreError> {
        store.append(&info.name, info.level, info.score, info.size);
        store.save()?;
        info!(player = %info.name, level = %info.level, score = info.score, "score saved");
        Ok(())
    }

    pub fn player_info(&self, name: &str) -> PlayerInfo {
        PlayerInfo {
            name: name.to_string(),
            level: self.level,
            score: self.score(),
            size: self.size(),
        }
    }

    /// One tick outside the frame loop.
    pub fn update(&self) {
        self.board().update();
    }

    /// Relocates the food; `None` when the grid has no free cell.
    pub fn place_food(&self) -> Option<Position> {
        self.board().place_food()
    }

    pub fn score(&self) -> u32 {
        self.board().score
    }

    pub fn size(&self) -> u32 {
        self.board().snake.size() as u32
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn food(&self) -> Position {
        self.board().food
    }

    pub fn obstacles(&self) -> Vec<Position> {
        self.board().obstacles.clone()
    }

    pub fn snake(&self) -> Snake {
        self.board().snake.clone()
    }

    pub fn is_running(&self) -> bool {
        self.board().running
    }

    pub fn has_obstacle_mutator(&self) -> bool {
        self.mutator.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock()
    }
}
