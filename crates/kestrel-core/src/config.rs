//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use kestrel_preload::{PreloadPolicy, DEFAULT_IDLE_TIMEOUT};
use kestrel_recovery::DEFAULT_BACKUP_DELAY;
use kestrel_storage::{Database, StorageError};

use crate::Result;

const PRELOAD_IDLE_TIMEOUT_KEY: &str = "preload_idle_timeout_ms";
const RECOVERY_DEBOUNCE_KEY: &str = "recovery_debounce_ms";
const PRELOAD_POLICY_KEY: &str = "preload_policy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the settings database
    pub database_path: PathBuf,
    /// Directory holding the crash-recovery snapshot
    pub state_dir: PathBuf,
    /// How long an untouched preloaded tab is kept
    #[serde(with = "millis")]
    pub preload_idle_timeout: Duration,
    /// Quiet period before session state is written
    #[serde(with = "millis")]
    pub backup_debounce: Duration,
    /// When background preloading is allowed
    pub preload_policy: PreloadPolicy,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("kestrel.db"),
            state_dir: data_dir.join("state"),
            preload_idle_timeout: DEFAULT_IDLE_TIMEOUT,
            backup_debounce: DEFAULT_BACKUP_DELAY,
            preload_policy: PreloadPolicy::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Kestrel"))
            .unwrap_or_else(|| PathBuf::from(".kestrel"))
    }

    /// Read a JSON config file, falling back to defaults when it is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply user overrides stored in the settings table.
    ///
    /// Values that do not parse are logged and ignored.
    pub fn apply_overrides(&mut self, db: &Database) -> Result<()> {
        if let Some(ms) = read_override::<u64>(db, PRELOAD_IDLE_TIMEOUT_KEY)? {
            self.preload_idle_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = read_override::<u64>(db, RECOVERY_DEBOUNCE_KEY)? {
            self.backup_debounce = Duration::from_millis(ms);
        }

        if let Some(policy) = read_override::<PreloadPolicy>(db, PRELOAD_POLICY_KEY)? {
            self.preload_policy = policy;
        }

        Ok(())
    }

    /// Persist the preload policy so it survives restarts
    pub fn save_preload_policy(db: &Database, policy: PreloadPolicy) -> Result<()> {
        db.set_setting(PRELOAD_POLICY_KEY, policy.as_str())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn read_override<T: std::str::FromStr>(db: &Database, key: &str) -> Result<Option<T>> {
    match db.get_parsed_setting(key) {
        Ok(value) => Ok(value),
        Err(StorageError::InvalidSetting { key, value }) => {
            tracing::warn!(key = %key, value = %value, "Ignoring invalid setting");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "linux",
            target_os = "android"
        )))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/data"));
        assert_eq!(config.database_path, PathBuf::from("/data/kestrel.db"));
        assert_eq!(config.state_dir, PathBuf::from("/data/state"));
        assert_eq!(config.preload_idle_timeout, Duration::from_secs(30));
        assert_eq!(config.backup_debounce, Duration::from_millis(500));
        assert_eq!(config.preload_policy, PreloadPolicy::WifiOnly);
    }

    #[test]
    fn test_overrides() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(PRELOAD_IDLE_TIMEOUT_KEY, "10000").unwrap();
        db.set_setting(RECOVERY_DEBOUNCE_KEY, "not a number").unwrap();
        Config::save_preload_policy(&db, PreloadPolicy::Always).unwrap();

        let mut config = Config::new(PathBuf::from("/data"));
        config.apply_overrides(&db).unwrap();

        assert_eq!(config.preload_idle_timeout, Duration::from_secs(10));
        assert_eq!(config.backup_debounce, DEFAULT_BACKUP_DELAY);
        assert_eq!(config.preload_policy, PreloadPolicy::Always);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kestrel.json");

        let missing = Config::load_or_default(&path).unwrap();
        assert_eq!(missing, Config::default());

        let mut config = Config::new(dir.path().to_path_buf());
        config.backup_debounce = Duration::from_millis(250);
        config.preload_policy = PreloadPolicy::Never;
        std::fs::write(&path, serde_json::to_vec(&config).unwrap()).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);

        let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["backup_debounce"], 250);
        assert_eq!(raw["preload_policy"], "never");
    }
}
