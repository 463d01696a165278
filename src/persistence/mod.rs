//! Best-effort key-value persistence
//!
//! Features:
//! - `KeyValueStore` seam with an in-memory store and browser LocalStorage
//! - Each profile key is read independently
//! - Absent or corrupt values fall back to documented defaults
//! - Write failures are logged and swallowed

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::economy::{Inventory, MAX_UPGRADE_LEVEL, Profile, STARTING_COINS, Upgrades};
use crate::tuning::Tuning;

pub const HIGH_SCORE_KEY: &str = "spaceRunHighScore";
pub const COINS_KEY: &str = "spaceRunCoins";
pub const UPGRADES_KEY: &str = "spaceRunUpgrades";
pub const INVENTORY_KEY: &str = "spaceRunInventory";
/// Optional JSON balance overrides, written by the hosting page
pub const TUNING_KEY: &str = "spaceRunTuning";

/// Keys shared with the hosting page
pub const API_BASE_URL_KEY: &str = "api_base_url";
pub const GAME_ID_KEY: &str = "game_id";
pub const CAMPAIGN_ID_KEY: &str = "campaign_id";
pub const GAME_STATE_KEY: &str = "game_state";
pub const AD_STATUS_KEY: &str = "ad_status";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String-keyed storage backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store, used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every access fails, like a browser with storage disabled
    pub fn offline() -> Self {
        Self {
            values: HashMap::new(),
            offline: true,
        }
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            offline: false,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.offline {
            return Err(StorageError::Unavailable);
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.offline {
            return Err(StorageError::Unavailable);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}

/// Read a raw value, treating backend errors like an absent key
fn read<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Could not read {key}: {e}");
            None
        }
    }
}

/// Integer parse that accepts a float-formatted value ("1234.5" -> 1234)
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.floor() as u64)
    })
}

fn load_count<S: KeyValueStore + ?Sized>(store: &S, key: &str, default: u64) -> u64 {
    match read(store, key) {
        None => default,
        Some(raw) => parse_count(&raw).unwrap_or_else(|| {
            log::warn!("Corrupt value for {key}: {raw:?}, using {default}");
            default
        }),
    }
}

/// Read a stored JSON object. Anything else reads as empty.
fn load_fields<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Map<String, Value> {
    let Some(raw) = read(store, key) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            log::warn!("Expected an object for {key}, found {other}, using defaults");
            Map::new()
        }
        Err(e) => {
            log::warn!("Corrupt JSON for {key}: {e}, using defaults");
            Map::new()
        }
    }
}

/// One numeric field, truncated. Missing or non-numeric fields give `None`.
fn field_count(fields: &Map<String, Value>, key: &str, name: &str) -> Option<u64> {
    let value = fields.get(name)?;
    let count = value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0).floor() as u64);
    if count.is_none() {
        log::warn!("Corrupt {name} in {key}: {value}, using default");
    }
    count
}

fn load_upgrades<S: KeyValueStore + ?Sized>(store: &S) -> Upgrades {
    let fields = load_fields(store, UPGRADES_KEY);
    let level = |name: &str, default: u32| {
        field_count(&fields, UPGRADES_KEY, name)
            .map(|v| v.min(u64::from(MAX_UPGRADE_LEVEL)) as u32)
            .unwrap_or(default)
            .clamp(1, MAX_UPGRADE_LEVEL)
    };
    let defaults = Upgrades::default();
    Upgrades {
        magnet: level("magnet", defaults.magnet),
        jetpack: level("jetpack", defaults.jetpack),
        sneakers: level("sneakers", defaults.sneakers),
    }
}

fn load_inventory<S: KeyValueStore + ?Sized>(store: &S) -> Inventory {
    let fields = load_fields(store, INVENTORY_KEY);
    let defaults = Inventory::default();
    Inventory {
        headstart: field_count(&fields, INVENTORY_KEY, "headstart")
            .map(|v| v.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(defaults.headstart),
    }
}

/// Balance overrides supplied by the hosting page, if any
pub fn load_tuning<S: KeyValueStore + ?Sized>(store: &S) -> Tuning {
    match read(store, TUNING_KEY) {
        None => Tuning::default(),
        Some(raw) => Tuning::from_json(&raw).unwrap_or_else(|e| {
            log::warn!("Corrupt JSON for {TUNING_KEY}: {e}, using default tuning");
            Tuning::default()
        }),
    }
}

/// Load the profile; every key and every upgrade field falls back on its own
pub fn load_profile<S: KeyValueStore + ?Sized>(store: &S) -> Profile {
    let upgrades = load_upgrades(store);
    let inventory = load_inventory(store);

    let profile = Profile {
        high_score: load_count(store, HIGH_SCORE_KEY, 0),
        total_coins: load_count(store, COINS_KEY, STARTING_COINS),
        upgrades,
        inventory,
    };
    log::info!(
        "Loaded profile: best {}, {} credits",
        profile.high_score,
        profile.total_coins
    );
    profile
}

/// Write every profile key. Failures are logged, never returned.
pub fn save_profile<S: KeyValueStore + ?Sized>(store: &mut S, profile: &Profile) {
    let mut write = |key: &str, value: String| {
        if let Err(e) = store.set(key, &value) {
            log::warn!("Could not save {key}: {e}");
        }
    };

    write(HIGH_SCORE_KEY, profile.high_score.to_string());
    write(COINS_KEY, profile.total_coins.to_string());
    match serde_json::to_string(&profile.upgrades) {
        Ok(json) => write(UPGRADES_KEY, json),
        Err(e) => log::warn!("Could not encode upgrades: {e}"),
    }
    match serde_json::to_string(&profile.inventory) {
        Ok(json) => write(INVENTORY_KEY, json),
        Err(e) => log::warn!("Could not encode inventory: {e}"),
    }
}
