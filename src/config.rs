//! Game settings with defaults, overridable from the environment.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::term::CELL_WIDTH;

pub const DEFAULT_GRID_WIDTH: usize = 32;
pub const DEFAULT_GRID_HEIGHT: usize = 32;
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 60;
pub const DEFAULT_DB_PATH: &str = "game_db.json";

/// Largest grid whose border and status line still fit terminal coordinates.
pub const MAX_GRID_WIDTH: usize = (u16::MAX as usize - 2) / CELL_WIDTH as usize;
pub const MAX_GRID_HEIGHT: usize = u16::MAX as usize - 3;

pub const DEFAULT_OBSTACLE_PERIOD: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_OBSTACLES: usize = 5;
pub const DEFAULT_MAX_OBSTACLES: usize = 14;

/// Timing and size of the Hard level's obstacle relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleSettings {
    pub period: Duration,
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        ObstacleSettings {
            period: DEFAULT_OBSTACLE_PERIOD,
            min_count: DEFAULT_MIN_OBSTACLES,
            max_count: DEFAULT_MAX_OBSTACLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub frames_per_second: u32,
    pub db_path: PathBuf,
    pub obstacles: ObstacleSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            obstacles: ObstacleSettings::default(),
        }
    }
}

impl GameConfig {
    pub fn new(grid_width: usize, grid_height: usize) -> Self {
        GameConfig {
            grid_width,
            grid_height,
            ..Default::default()
        }
    }

    /// Reads `SNAKE_GAME_DB`, `SNAKE_GRID_WIDTH`, `SNAKE_GRID_HEIGHT` and
    /// `SNAKE_FPS`, keeping the default for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = GameConfig::default();

        if let Some(path) = env::var_os("SNAKE_GAME_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(width) = env_var("SNAKE_GRID_WIDTH")? {
            config.grid_width = width;
        }
        if let Some(height) = env_var("SNAKE_GRID_HEIGHT")? {
            config.grid_height = height;
        }
        if let Some(fps) = env_var("SNAKE_FPS")? {
            config.frames_per_second = fps;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width >= 3 && self.grid_height >= 3,
            "grid must be at least 3x3, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= MAX_GRID_WIDTH && self.grid_height <= MAX_GRID_HEIGHT,
            "grid must be at most {}x{}, got {}x{}",
            MAX_GRID_WIDTH,
            MAX_GRID_HEIGHT,
            self.grid_width,
            self.grid_height
        );
        ensure!(self.frames_per_second > 0, "frame rate must be positive");
        ensure!(
            self.obstacles.min_count <= self.obstacles.max_count,
            "obstacle count range {}..={} is empty",
            self.obstacles.min_count,
            self.obstacles.max_count
        );
        Ok(())
    }

    /// Target duration of one input/update/render cycle.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frames_per_second.max(1)))
    }
}

fn env_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value {:?} for {}", raw, key)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("cannot read {}", key)),
    }
}
