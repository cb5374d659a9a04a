#![deny(warnings)]

//! Game session: routes every mutation of an [`EconomyState`] through the
//! economy rules and then persists it, best effort.
//!
//! A save failure never rolls back the in-memory change; it is logged and
//! kept in [`Game::last_save_error`] for the front end to surface.

pub mod cheats;
pub mod ticker;

pub use cheats::{DebugCommand, DebugOutcome, ResetConfirmation, DEFAULT_MAX_COUNT};
pub use ticker::{Ticker, MAX_TICK_HZ};

use clicker_core::{Catalog, EconomyState};
use clicker_econ::{EconError, Purchase};
use persistence::{KvStore, LoadError, SaveError};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// One running game bound to a store.
pub struct Game<S: KvStore> {
    catalog: Catalog,
    state: EconomyState,
    store: S,
    recovered_from: Option<LoadError>,
    last_save_error: Option<SaveError>,
}

impl<S: KvStore> Game<S> {
    /// Resume the saved game from `store`, or start fresh when there is none
    /// or it cannot be used.
    pub fn open(catalog: Catalog, store: S) -> Self {
        let (state, recovered_from) = match persistence::load(&store, &catalog) {
            Ok(state) => {
                info!(balance = state.balance, "resumed saved game");
                (state, None)
            }
            Err(LoadError::Absent) => {
                info!("no saved game, starting fresh");
                (EconomyState::new(&catalog), None)
            }
            Err(e) => {
                warn!(error = %e, "saved game unusable, starting fresh");
                (EconomyState::new(&catalog), Some(e))
            }
        };
        Self {
            catalog,
            state,
            store,
            recovered_from,
            last_save_error: None,
        }
    }

    /// Wrap an existing state without touching the store.
    pub fn with_state(catalog: Catalog, state: EconomyState, store: S) -> Self {
        Self {
            catalog,
            state,
            store,
            recovered_from: None,
            last_save_error: None,
        }
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load error that forced a fresh start, if any.
    pub fn recovered_from(&self) -> Option<&LoadError> {
        self.recovered_from.as_ref()
    }

    /// Error of the most recent save attempt; cleared by the next successful save.
    pub fn last_save_error(&self) -> Option<&SaveError> {
        self.last_save_error.as_ref()
    }

    pub fn can_afford(&self, id: &str) -> bool {
        clicker_econ::can_afford(&self.state, &self.catalog, id)
    }

    /// Manual action. Returns the cookies gained.
    pub fn click(&mut self) -> f64 {
        let gained = clicker_econ::click(&mut self.state);
        debug!(gained, balance = self.state.balance, "click");
        self.persist();
        gained
    }

    pub fn purchase(&mut self, id: &str) -> Result<Purchase, EconError> {
        let bought = clicker_econ::purchase(&mut self.state, &self.catalog, id)?;
        info!(
            upgrade = id,
            spent = bought.spent,
            owned = bought.owned,
            next_cost = bought.new_cost,
            "upgrade purchased"
        );
        self.persist();
        Ok(bought)
    }

    /// Passive accumulation over `elapsed_secs`. Skips the save when nothing was earned.
    pub fn advance(&mut self, elapsed_secs: f64) -> Result<f64, EconError> {
        let gained = clicker_econ::advance(&mut self.state, elapsed_secs)?;
        if gained > 0.0 {
            self.persist();
        }
        Ok(gained)
    }

    /// Read model for renderers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.catalog)
    }

    fn persist(&mut self) {
        match persistence::save(&mut self.store, &self.state) {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                warn!(error = %e, "save failed; keeping in-memory state");
                self.last_save_error = Some(e);
            }
        }
    }
}

/// Per-upgrade row of a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpgradeView {
    pub id: String,
    pub name: String,
    pub owned: u64,
    pub cost: f64,
    pub affordable: bool,
}

/// Everything a renderer needs after a mutation, in catalog order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub balance: f64,
    /// Balance truncated for display.
    pub balance_display: u64,
    pub per_click: f64,
    pub passive_per_second: f64,
    pub upgrades: Vec<UpgradeView>,
}

impl Snapshot {
    pub fn capture(state: &EconomyState, catalog: &Catalog) -> Self {
        let upgrades = catalog
            .iter()
            .map(|def| {
                let (owned, cost) = state
                    .upgrade(def.id.as_str())
                    .map(|u| (u.owned, u.cost))
                    .unwrap_or((0, def.base_cost));
                UpgradeView {
                    id: def.id.0.clone(),
                    name: def.name.clone(),
                    owned,
                    cost,
                    affordable: state.balance >= cost,
                }
            })
            .collect();
        Self {
            balance: state.balance,
            balance_display: state.display_balance(),
            per_click: state.per_click,
            passive_per_second: state.passive_per_second,
            upgrades,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "cookies: {} | per click: {} | per second: {}",
            self.balance_display, self.per_click, self.passive_per_second
        )?;
        for u in &self.upgrades {
            let mark = if u.affordable { '*' } else { ' ' };
            writeln!(
                f,
                " {mark} {:<14} {:<16} owned: {:>4} | cost: {}",
                u.id, u.name, u.owned, u.cost
            )?;
        }
        Ok(())
    }
}
