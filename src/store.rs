//! JSON file of past sessions: player name -> level name -> `Score`/`Size`
//! histories that only ever grow.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::Level;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to open score store {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to write score store {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("score store {path:?} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode score store")]
    Encode(#[from] serde_json::Error),
}

/// Scores and snake sizes of one player on one level, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHistory {
    #[serde(rename = "Score", default)]
    pub score: Vec<u32>,
    #[serde(rename = "Size", default)]
    pub size: Vec<u32>,
}

impl LevelHistory {
    pub fn best_score(&self) -> Option<u32> {
        self.score.iter().copied().max()
    }
}

/// Histories of one player keyed by level name.
pub type PlayerRecord = BTreeMap<String, LevelHistory>;

#[derive(Debug)]
pub struct ScoreStore {
    path: PathBuf,
    players: BTreeMap<String, PlayerRecord>,
}

impl ScoreStore {
    /// Reads the whole store. An empty file counts as an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Open { path: path.clone(), source })?;

        let players: BTreeMap<String, PlayerRecord> = if raw.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse { path: path.clone(), source })?
        };

        debug!(path = ?path, players = players.len(), "score store loaded");
        Ok(ScoreStore { path, players })
    }

    /// Writes an empty store at `path` unless a file is already there.
    /// Returns whether a file was created.
    pub fn create_if_missing(path: &Path) -> Result<bool, StoreError> {
        if path.exists() {
            return Ok(false);
        }

        fs::write(path, "{}\n").map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
        info!(path = ?path, "created empty score store");
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The player's record, empty if the player has never played.
    pub fn read(&self, name: &str) -> PlayerRecord {
        self.players.get(name).cloned().unwrap_or_default()
    }

    pub fn update(&mut self, name: &str, record: PlayerRecord) {
        self.players.insert(name.to_string(), record);
    }

    pub fn read_all(&self) -> &BTreeMap<String, PlayerRecord> {
        &self.players
    }

    pub fn history(&self, name: &str, level: Level) -> LevelHistory {
        self.players
            .get(name)
            .and_then(|record| record.get(level.name()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn append(&mut self, name: &str, level: Level, score: u32, size: u32) {
        let mut record = self.read(name);
        let history = record.entry(level.name().to_string()).or_default();
        history.score.push(score);
        history.size.push(size);
        self.update(name, record);
    }

    /// Highest score anyone reached on `level`, 0 when nobody has played it.
    pub fn best_score(&self, level: Level) -> u32 {
        self.players
            .values()
            .filter_map(|record| record.get(level.name()))
            .filter_map(LevelHistory::best_score)
            .max()
            .unwrap_or(0)
    }

    /// Rewrites the file with four-space indentation. The new content goes
    /// to a temporary file next to the store which then replaces it, so the
    /// store on disk is either the old or the new version.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.players.serialize(&mut ser)?;
        buf.push(b'\n');

        let write_err = |source: io::Error| StoreError::Write { path: self.path.clone(), source };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&buf).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = ?self.path, "score store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let err = ScoreStore::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }

    #[test]
    fn garbage_fails_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ScoreStore::load(&path).unwrap_err(), StoreError::Parse { .. }));
    }

    #[test]
    fn unknown_player_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        assert!(ScoreStore::create_if_missing(&path).unwrap());
        assert!(!ScoreStore::create_if_missing(&path).unwrap());

        let store = ScoreStore::load(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(store.read("ghost").is_empty());
        assert_eq!(store.history("ghost", Level::Hard), LevelHistory::default());
        assert_eq!(store.best_score(Level::Hard), 0);
    }

    #[test]
    fn reads_files_written_by_hand() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            r#"{"Bob": {"Easy": {"Score": [3, 9], "Size": [4, 10]}, "Hard": {"Score": [1]}}}"#,
        )
        .unwrap();

        let store = ScoreStore::load(&path).unwrap();
        assert_eq!(store.history("Bob", Level::Easy).score, vec![3, 9]);
        assert_eq!(store.history("Bob", Level::Hard).size, Vec::<u32>::new());
        assert_eq!(store.best_score(Level::Easy), 9);
        assert_eq!(store.best_score(Level::Medium), 0);
    }

    #[test]
    fn saved_file_uses_level_keys_and_four_spaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        ScoreStore::create_if_missing(&path).unwrap();

        let mut store = ScoreStore::load(&path).unwrap();
        store.append("Carol", Level::Medium, 2, 3);
        store.save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"Carol\": {"));
        assert!(text.contains("\"Medium\""));
        assert!(text.contains("\"Score\""));
        assert!(text.contains("\"Size\""));
    }

    #[test]
    fn save_replaces_the_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"Old": {"Easy": {"Score": [1], "Size": [2]}}}"#).unwrap();

        let mut store = ScoreStore::load(&path).unwrap();
        store.append("New", Level::Hard, 5, 6);
        store.save().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("db.json")]);

        let store = ScoreStore::load(&path).unwrap();
        assert_eq!(store.history("Old", Level::Easy).score, vec![1]);
        assert_eq!(store.history("New", Level::Hard).size, vec![6]);
    }

    #[test]
    fn failed_save_leaves_the_old_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"Old": {"Easy": {"Score": [1], "Size": [2]}}}"#).unwrap();

        // a directory where the store file should be makes the final rename fail
        let mut store = ScoreStore::load(&path).unwrap();
        store.path = dir.path().join("blocked");
        fs::create_dir(&store.path).unwrap();
        store.append("New", Level::Easy, 3, 4);

        assert!(matches!(store.save().unwrap_err(), StoreError::Write { .. }));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"Old": {"Easy": {"Score": [1], "Size": [2]}}}"#
        );
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn appends_keep_scores_and_sizes_aligned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        ScoreStore::create_if_missing(&path).unwrap();

        let mut store = ScoreStore::load(&path).unwrap();
        store.append("Dan", Level::Easy, 4, 5);
        store.append("Dan", Level::Easy, 6, 7);
        store.append("Dan", Level::Hard, 1, 2);
        store.save().unwrap();

        let store = ScoreStore::load(&path).unwrap();
        let easy = store.history("Dan", Level::Easy);
        assert_eq!(easy.score, vec![4, 6]);
        assert_eq!(easy.size, vec![5, 7]);
        assert_eq!(store.read("Dan").len(), 2);
    }
}
