use anyhow::Result;
use tempfile::tempdir;

use snake_levels::config::GameConfig;
use snake_levels::game::{PlayerInfo, SnakeGame};
use snake_levels::store::{ScoreStore, StoreError};
use snake_levels::Level;

#[test]
fn saved_session_survives_a_reload() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("game_db.json");
    ScoreStore::create_if_missing(&path)?;

    let game = SnakeGame::with_seed(&GameConfig::default(), Level::Medium, 7)?;
    let mut store = ScoreStore::load(&path)?;
    store.append("Alice", Level::Medium, 3, 4);
    let info = PlayerInfo { name: "Alice".into(), level: Level::Medium, score: 7, size: 5 };
    game.save_game(&mut store, &info)?;

    let reloaded = ScoreStore::load(&path)?;
    let medium = reloaded.history("Alice", Level::Medium);
    assert_eq!(medium.score.last(), Some(&7));
    assert_eq!(medium.size.last(), Some(&5));
    assert_eq!(medium.score.len(), medium.size.len());
    assert!(reloaded.history("Alice", Level::Easy).score.is_empty());
    Ok(())
}

#[test]
fn sessions_from_the_game_append_in_order() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("game_db.json");
    ScoreStore::create_if_missing(&path)?;

    for seed in 0..3 {
        let game = SnakeGame::with_seed(&GameConfig::default(), Level::Easy, seed)?;
        let mut store = ScoreStore::load(&path)?;
        game.save_game(&mut store, &game.player_info("Zed"))?;
    }

    let store = ScoreStore::load(&path)?;
    let easy = store.history("Zed", Level::Easy);
    assert_eq!(easy.score, vec![0, 0, 0]);
    assert_eq!(easy.size, vec![1, 1, 1]);
    Ok(())
}

#[test]
fn saving_into_a_missing_directory_fails() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("game_db.json");
    ScoreStore::create_if_missing(&path)?;
    let mut store = ScoreStore::load(&path)?;
    drop(dir);

    let game = SnakeGame::with_seed(&GameConfig::default(), Level::Easy, 1)?;
    let err = game.save_game(&mut store, &game.player_info("Ghost")).unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    Ok(())
}
