#![deny(warnings)]

//! Persistence layer: the JSON save record and the stores it lives in.
//!
//! A game is saved as one record under [`SAVE_KEY`]:
//!
//! ```json
//! { "balance": 12.5, "perClickYield": 1, "passiveYieldPerSecond": 0,
//!   "upgrades": { "cursor": { "owned": 1, "cost": 12 } } }
//! ```
//!
//! Missing or out-of-range fields fall back to their defaults one by one; a
//! payload that is not JSON or has mistyped fields is reported as
//! [`LoadError::Corrupt`].

mod store;

pub use store::{FileStore, KvStore, MemoryStore, StoreError};

use clicker_core::{validate_state, Catalog, EconomyState, BASE_PER_CLICK};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Key of the save record in the store.
pub const SAVE_KEY: &str = "cookieClickerSave";

/// Returns the default directory used for local saves.
pub fn default_save_dir() -> &'static str {
    "./saves"
}

/// Why a save could not be loaded.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    /// No record has been saved yet.
    #[error("no saved game")]
    Absent,
    /// The record exists but cannot be turned into a valid state.
    #[error("corrupt save data: {0}")]
    Corrupt(String),
    /// The store could not be read.
    #[error("save store unreadable: {0}")]
    Io(String),
}

/// Why a save could not be written or erased.
#[derive(Debug, Error, PartialEq)]
pub enum SaveError {
    #[error("save failed: {0}")]
    Io(String),
    #[error("could not encode state: {0}")]
    Encode(String),
}

impl From<StoreError> for SaveError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(msg) => SaveError::Io(msg),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SaveRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_click_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    passive_yield_per_second: Option<f64>,
    upgrades: BTreeMap<String, UpgradeRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct UpgradeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    owned: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
}

fn extract_record(state: &EconomyState) -> SaveRecord {
    SaveRecord {
        balance: Some(state.balance),
        per_click_yield: Some(state.per_click),
        passive_yield_per_second: Some(state.passive_per_second),
        upgrades: state
            .upgrades
            .iter()
            .map(|(id, up)| {
                (
                    id.0.clone(),
                    UpgradeRecord {
                        owned: Some(up.owned),
                        cost: Some(up.cost),
                    },
                )
            })
            .collect(),
    }
}

/// Saved value if present and accepted by `valid`, otherwise `default`.
fn field_or(field: &str, saved: Option<f64>, default: f64, valid: fn(f64) -> bool) -> f64 {
    match saved {
        Some(v) if v.is_finite() && valid(v) => v,
        Some(v) => {
            warn!(field, value = v, default, "saved value out of range, using default");
            default
        }
        None => default,
    }
}

/// Restore a record on top of the catalog defaults.
fn apply_record(catalog: &Catalog, record: SaveRecord) -> EconomyState {
    let mut state = EconomyState::new(catalog);
    state.balance = field_or("balance", record.balance, 0.0, |v| v >= 0.0);
    state.per_click =
        field_or("perClickYield", record.per_click_yield, BASE_PER_CLICK, |v| v > 0.0);
    state.passive_per_second = field_or(
        "passiveYieldPerSecond",
        record.passive_yield_per_second,
        0.0,
        |v| v >= 0.0,
    );

    for (id, saved) in record.upgrades {
        match state.upgrade_mut(&id) {
            Some(up) => {
                if let Some(owned) = saved.owned {
                    up.owned = owned;
                }
                up.cost = field_or(&format!("{id}.cost"), saved.cost, up.cost, |v| v >= 0.0);
            }
            None => debug!(upgrade = %id, "dropping saved upgrade missing from catalog"),
        }
    }
    state
}

/// Serialize a state to the JSON save format.
pub fn encode(state: &EconomyState) -> Result<String, SaveError> {
    validate_state(state).map_err(|e| SaveError::Encode(e.to_string()))?;
    serde_json::to_string(&extract_record(state)).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Parse a JSON save payload against the given catalog.
pub fn decode(payload: &str, catalog: &Catalog) -> Result<EconomyState, LoadError> {
    let record: SaveRecord =
        serde_json::from_str(payload).map_err(|e| LoadError::Corrupt(e.to_string()))?;
    let state = apply_record(catalog, record);
    validate_state(&state).map_err(|e| LoadError::Corrupt(e.to_string()))?;
    Ok(state)
}

/// Write the state under [`SAVE_KEY`].
pub fn save<S: KvStore + ?Sized>(store: &mut S, state: &EconomyState) -> Result<(), SaveError> {
    let json = encode(state)?;
    store.set(SAVE_KEY, &json)?;
    Ok(())
}

/// Read the state saved under [`SAVE_KEY`].
pub fn load<S: KvStore + ?Sized>(store: &S, catalog: &Catalog) -> Result<EconomyState, LoadError> {
    let payload = store
        .get(SAVE_KEY)
        .map_err(|e| LoadError::Io(e.to_string()))?
        .ok_or(LoadError::Absent)?;
    decode(&payload, catalog)
}

/// Load the saved state, or the catalog defaults when there is none or it is unusable.
pub fn load_or_default<S: KvStore + ?Sized>(store: &S, catalog: &Catalog) -> EconomyState {
    match load(store, catalog) {
        Ok(state) => state,
        Err(LoadError::Absent) => EconomyState::new(catalog),
        Err(e) => {
            warn!(error = %e, "ignoring saved game, starting fresh");
            EconomyState::new(catalog)
        }
    }
}

/// Delete the saved record.
pub fn erase<S: KvStore + ?Sized>(store: &mut S) -> Result<(), SaveError> {
    store.remove(SAVE_KEY)?;
    Ok(())
}
