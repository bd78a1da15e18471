use anyhow::Result;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use snake_levels::config::GameConfig;
use snake_levels::game::{Controller, Renderer, SnakeGame};
use snake_levels::snake::{Direction, Snake};
use snake_levels::{Level, Position};

/// Quits after a fixed number of frames, optionally steering first.
struct ScriptedController {
    frames_left: usize,
    turn: Option<Direction>,
}

impl ScriptedController {
    fn quit_after(frames: usize) -> Self {
        ScriptedController { frames_left: frames, turn: None }
    }
}

impl Controller for ScriptedController {
    fn handle_input(&mut self, running: &mut bool, snake: &mut Snake) -> Result<()> {
        if let Some(dir) = self.turn.take() {
            snake.set_direction(dir);
        }
        if self.frames_left == 0 {
            *running = false;
        } else {
            self.frames_left -= 1;
        }
        Ok(())
    }
}

/// Quits once a wall-clock deadline has passed.
struct TimedController {
    deadline: Instant,
}

impl Controller for TimedController {
    fn handle_input(&mut self, running: &mut bool, _snake: &mut Snake) -> Result<()> {
        if Instant::now() >= self.deadline {
            *running = false;
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingRenderer {
    frames: usize,
    titles: Vec<(u32, u32)>,
    last_food: Option<Position>,
    last_obstacles: Vec<Position>,
    saw_dead_snake: bool,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snake: &Snake, food: Position, obstacles: &[Position]) -> Result<()> {
        self.frames += 1;
        self.last_food = Some(food);
        self.last_obstacles = obstacles.to_vec();
        self.saw_dead_snake |= !snake.is_alive();
        Ok(())
    }

    fn update_window_title(&mut self, score: u32, fps: u32) -> Result<()> {
        self.titles.push((score, fps));
        Ok(())
    }
}

#[test]
fn loop_runs_until_quit_input() -> Result<()> {
    let mut game = SnakeGame::with_seed(&GameConfig::default(), Level::Easy, 1)?;
    let mut controller = ScriptedController::quit_after(5);
    let mut renderer = RecordingRenderer::default();

    game.run(&mut controller, &mut renderer, Duration::from_millis(1))?;

    // the quitting frame is still updated and rendered
    assert_eq!(renderer.frames, 6);
    assert!(!game.is_running());
    assert_eq!(renderer.last_food, Some(game.food()));
    Ok(())
}

#[test]
fn death_does_not_end_the_loop() -> Result<()> {
    // Medium walls: heading up from the centre of a 6x6 grid hits the border
    let config = GameConfig::new(6, 6);
    let mut game = SnakeGame::with_seed(&config, Level::Medium, 2)?;
    let mut controller = ScriptedController::quit_after(200);
    let mut renderer = RecordingRenderer::default();

    game.run(&mut controller, &mut renderer, Duration::from_millis(0))?;

    assert!(renderer.saw_dead_snake);
    assert_eq!(renderer.frames, 201);
    assert_eq!(renderer.last_obstacles.len(), 2 * 6 + 2 * 6 - 4);
    Ok(())
}

#[test]
fn title_reports_score_and_frame_rate() -> Result<()> {
    let mut game = SnakeGame::with_seed(&GameConfig::default(), Level::Easy, 3)?;
    let mut controller = TimedController { deadline: Instant::now() + Duration::from_millis(1300) };
    let mut renderer = RecordingRenderer::default();

    game.run(&mut controller, &mut renderer, Duration::from_millis(10))?;

    assert_eq!(renderer.titles.len(), 1);
    let (score, fps) = renderer.titles[0];
    assert_eq!(score, game.score());
    assert!(fps > 10 && fps <= 101, "fps was {}", fps);
    Ok(())
}

#[test]
fn hard_level_shuts_its_mutator_down_on_quit() -> Result<()> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = (|| -> Result<bool> {
            let mut game = SnakeGame::with_seed(&GameConfig::default(), Level::Hard, 4)?;
            assert!(game.has_obstacle_mutator());
            let mut controller = ScriptedController::quit_after(3);
            let mut renderer = RecordingRenderer::default();
            game.run(&mut controller, &mut renderer, Duration::from_millis(1))?;
            Ok(game.has_obstacle_mutator())
        })();
        tx.send(result.map_err(|e| e.to_string())).ok();
    });

    let still_running = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("game did not shut down in time")
        .map_err(anyhow::Error::msg)?;
    assert!(!still_running);
    Ok(())
}

#[test]
fn hard_level_relocates_obstacles_while_playing() -> Result<()> {
    let mut config = GameConfig::default();
    config.obstacles.period = Duration::from_millis(20);
    let mut game = SnakeGame::with_seed(&config, Level::Hard, 5)?;
    let mut controller = TimedController { deadline: Instant::now() + Duration::from_millis(200) };
    let mut renderer = RecordingRenderer::default();

    game.run(&mut controller, &mut renderer, Duration::from_millis(5))?;

    let obstacles = game.obstacles();
    assert!((5..=14).contains(&obstacles.len()));
    assert!(!obstacles.contains(&game.food()));
    Ok(())
}
