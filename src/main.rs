use std::io::{self, BufRead, Write};

use anyhow::{ensure, Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use snake_levels::config::GameConfig;
use snake_levels::game::SnakeGame;
use snake_levels::menu::{Menu, MenuOutcome};
use snake_levels::store::ScoreStore;
use snake_levels::term::{TermInput, TermManager};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::from_env()?;
    ScoreStore::create_if_missing(&config.db_path)?;

    let level = {
        let store = ScoreStore::load(&config.db_path)
            .with_context(|| format!("cannot read scores from {:?}", config.db_path))?;
        debug!(path = ?store.path(), "score store ready");
        let stdin = io::stdin();
        match Menu::new(stdin.lock(), io::stdout(), &store).run()? {
            MenuOutcome::Play(level) => level,
            MenuOutcome::Exit => return Ok(()),
        }
    };

    let mut term = TermManager::new(config.grid_width, config.grid_height)?;

    let (need_w, need_h) = term.required_size();
    let (have_w, have_h) = term.get_terminal_size()?;
    ensure!(
        have_w >= need_w && have_h >= need_h,
        "terminal is {}x{}, the game needs at least {}x{}",
        have_w,
        have_h,
        need_w,
        need_h
    );

    let mut game = SnakeGame::new(&config, level)?;
    term.setup()?;
    let res = game.run(&mut TermInput, &mut term, config.frame_duration());
    term.restore()?;
    res?;

    println!("Game has terminated successfully!");
    println!("Enter your name to save score:");
    io::stdout().flush()?;
    let name = read_player_name()?;

    let info = game.player_info(&name);
    println!("Score: {}", info.score);
    println!("Size: {}", info.size);

    // reload so scores saved by another session meanwhile are kept
    let mut store = ScoreStore::load(&config.db_path)?;
    game.save_game(&mut store, &info)
        .with_context(|| format!("cannot save score to {:?}", store.path()))?;

    Ok(())
}

fn read_player_name() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.split_whitespace().next().unwrap_or("Player").to_string())
}
