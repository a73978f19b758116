use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use json::JsonValue;
use log::{debug, info, warn};

use crate::error::CacheError;
use crate::game::GameRecord;

/// Bumped whenever the on-disk record layout changes.
pub const CACHE_VERSION: u32 = 1;

/// Store metadata keyed by appid, persisted as a single JSON snapshot.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    games: BTreeMap<u32, GameRecord>,
}

impl CacheStore {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            games: BTreeMap::new(),
        }
    }

    /// Loads the snapshot at `path`. A missing file yields an empty store;
    /// an unreadable or malformed one is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No local cache found, fetching data may take some time");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let corrupt = |reason: String| CacheError::Corrupt {
            path: path.clone(),
            reason,
        };

        let snapshot = json::parse(&text).map_err(|e| corrupt(e.to_string()))?;
        if !snapshot.is_object() {
            return Err(corrupt("expected a JSON object".to_string()));
        }

        let Some(version) = snapshot["version"].as_u32() else {
            return Err(corrupt("missing or non-integer `version`".to_string()));
        };
        if version != CACHE_VERSION {
            warn!("Ignoring cache written with format version {version}, expected {CACHE_VERSION}");
            return Ok(Self::empty(path));
        }

        let updated_at = snapshot["updated_at"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        if !snapshot["games"].is_object() {
            return Err(corrupt("missing `games` table".to_string()));
        }

        let mut games = BTreeMap::new();
        for (key, value) in snapshot["games"].entries() {
            let app_id: u32 = key
                .parse()
                .map_err(|_| corrupt(format!("invalid appid key `{key}`")))?;
            let record = GameRecord::from_json(app_id, value).map_err(|e| corrupt(e.to_string()))?;
            games.insert(app_id, record);
        }

        match updated_at {
            Some(t) => info!(
                "Loaded {} cached games (last updated {})",
                games.len(),
                t.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => info!("Loaded {} cached games", games.len()),
        }

        Ok(Self { path, games })
    }

    /// Writes the full snapshot, replacing the previous one.
    pub fn save(&self) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let mut games = JsonValue::new_object();
        for (app_id, record) in &self.games {
            games[app_id.to_string().as_str()] = record.to_json();
        }

        let mut snapshot = JsonValue::new_object();
        snapshot["version"] = CACHE_VERSION.into();
        snapshot["updated_at"] = Utc::now().to_rfc3339().into();
        snapshot["games"] = games;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, snapshot.pretty(2)).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!("Saved {} games to {}", self.len(), self.path.display());
        Ok(())
    }

    pub fn get(&self, app_id: u32) -> Option<&GameRecord> {
        self.games.get(&app_id)
    }

    pub fn contains(&self, app_id: u32) -> bool {
        self.games.contains_key(&app_id)
    }

    pub fn insert(&mut self, record: GameRecord) {
        self.games.insert(record.app_id, record);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{OwnedGame, Platforms, StoreDetails};
    use tempfile::tempdir;

    fn record(app_id: u32, name: &str, is_free: bool, categories: &[u32]) -> GameRecord {
        let platforms = Platforms {
            windows: true,
            linux: app_id % 2 == 0,
            mac: false,
        };
        GameRecord::new(
            OwnedGame::new(app_id, name),
            StoreDetails::with_categories(is_free, platforms, categories),
        )
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::load(dir.path().join("missing.cache")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("games.cache");

        let mut cache = CacheStore::empty(&path);
        cache.insert(record(10, "Counter-Strike", false, &[1]));
        cache.insert(record(440, "Team Fortress 2", true, &[1, 9]));
        cache.insert(record(105600, "Terraria \"Journey\"", false, &[9]));
        cache.save().unwrap();

        let snapshot = json::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(snapshot["updated_at"].is_string());

        let loaded = CacheStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        for app_id in [10, 440, 105600] {
            assert_eq!(loaded.get(app_id), cache.get(app_id));
        }
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.cache");
        fs::write(&path, b"\x80\x04\x95 not json").unwrap();

        assert!(matches!(
            CacheStore::load(&path),
            Err(CacheError::Corrupt { .. }) | Err(CacheError::Io { .. })
        ));

        fs::write(&path, "{ \"version\": 1, \"games\": [] }").unwrap();
        assert!(matches!(
            CacheStore::load(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn partial_record_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.cache");
        fs::write(
            &path,
            r#"{"version": 1, "games": {"10": {"name": "Counter-Strike"}}}"#,
        )
        .unwrap();

        assert!(matches!(
            CacheStore::load(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn other_version_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.cache");
        fs::write(&path, r#"{"version": 99, "games": {"10": {}}}"#).unwrap();

        let cache = CacheStore::load(&path).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_or_malformed_version_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.cache");

        for body in [
            r#"{"games": {"10": {"name": "Counter-Strike"}}}"#,
            r#"{"version": "one", "games": "garbage"}"#,
        ] {
            fs::write(&path, body).unwrap();
            assert!(
                matches!(CacheStore::load(&path), Err(CacheError::Corrupt { .. })),
                "{body}"
            );
            assert_eq!(fs::read_to_string(&path).unwrap(), body);
        }
    }
}
