use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const BLOCKED_SITES_KEY: &str = "blockedSites";
pub const POMODORO_WORK_KEY: &str = "pomodoroWork";
pub const POMODORO_BREAK_KEY: &str = "pomodoroBreak";
pub const FONT_SCALE_KEY: &str = "lumen-font-scale";

pub const DEFAULT_BLOCKED_SITES: [&str; 4] =
    ["twitter.com", "youtube.com", "facebook.com", "reddit.com"];
pub const DEFAULT_POMODORO_WORK: u64 = 25;
pub const DEFAULT_POMODORO_BREAK: u64 = 5;
pub const DEFAULT_FONT_SCALE: f64 = 1.0;

/// Which partition a key lives in. `Sync` follows the user across devices,
/// `Local` holds the per-install toggle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageArea {
    Sync,
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    sync: Map<String, Value>,
    #[serde(default)]
    local: Map<String, Value>,
}

impl UserSettings {
    fn area(&self, area: StorageArea) -> &Map<String, Value> {
        match area {
            StorageArea::Sync => &self.sync,
            StorageArea::Local => &self.local,
        }
    }

    fn area_mut(&mut self, area: StorageArea) -> &mut Map<String, Value> {
        match area {
            StorageArea::Sync => &mut self.sync,
            StorageArea::Local => &mut self.local,
        }
    }
}

/// Two-partition key/value store backed by a single JSON file.
///
/// Without a path the store lives in memory only, which is what page contexts
/// in tests and one-shot hosts use.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<UserSettings>,
    first_run: bool,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let first_run = !path.exists();
        let data = if first_run {
            UserSettings::default()
        } else {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
            first_run,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(UserSettings::default()),
            first_run: true,
        }
    }

    /// True when no settings file existed at construction time.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn get(&self, area: StorageArea, key: &str) -> Option<Value> {
        self.read().area(area).get(key).cloned()
    }

    pub fn get_all(&self, area: StorageArea) -> Map<String, Value> {
        self.read().area(area).clone()
    }

    /// Local boolean flag; anything missing or non-boolean reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(StorageArea::Local, key)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    pub fn set(&self, area: StorageArea, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut guard = self.write();
        guard.area_mut(area).insert(key.to_string(), value.into());
        self.persist(&guard)
    }

    pub fn set_many(&self, area: StorageArea, entries: Vec<(&str, Value)>) -> Result<()> {
        let mut guard = self.write();
        let partition = guard.area_mut(area);
        for (key, value) in entries {
            partition.insert(key.to_string(), value);
        }
        self.persist(&guard)
    }

    pub fn set_flag(&self, key: &str, enabled: bool) -> Result<()> {
        self.set(StorageArea::Local, key, enabled)
    }

    pub fn font_scale(&self) -> f64 {
        self.get(StorageArea::Local, FONT_SCALE_KEY)
            .and_then(|value| value.as_f64())
            .unwrap_or(DEFAULT_FONT_SCALE)
    }

    pub fn pomodoro_minutes(&self) -> (u64, u64) {
        let read = |key: &str, default: u64| {
            self.get(StorageArea::Sync, key)
                .and_then(|value| value.as_u64())
                .unwrap_or(default)
        };
        (
            read(POMODORO_WORK_KEY, DEFAULT_POMODORO_WORK),
            read(POMODORO_BREAK_KEY, DEFAULT_POMODORO_BREAK),
        )
    }

    pub fn blocked_sites(&self) -> Vec<String> {
        self.get(StorageArea::Sync, BLOCKED_SITES_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Seeds the defaults a fresh install starts with.
    pub fn install_defaults(&self) -> Result<()> {
        let mut guard = self.write();
        guard.sync.insert(
            BLOCKED_SITES_KEY.to_string(),
            Value::from(DEFAULT_BLOCKED_SITES.to_vec()),
        );
        guard
            .sync
            .insert(POMODORO_WORK_KEY.to_string(), Value::from(DEFAULT_POMODORO_WORK));
        guard
            .sync
            .insert(POMODORO_BREAK_KEY.to_string(), Value::from(DEFAULT_POMODORO_BREAK));
        guard
            .local
            .insert(FONT_SCALE_KEY.to_string(), Value::from(DEFAULT_FONT_SCALE));
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}
