#![deny(warnings)]

//! Core domain models and invariants for the cookie clicker economy.
//!
//! This crate defines the upgrade catalog and the mutable economy state,
//! with validation helpers that guard the basic invariants every other
//! crate relies on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Cost multiplier applied after every purchase of a standard upgrade.
pub const COST_GROWTH: f64 = 1.2;

/// Fixed tick cadence used by schedulers driving passive generation.
pub const TICKS_PER_SECOND: u32 = 10;

/// Elapsed seconds represented by one tick at the standard cadence.
pub const TICK_SECONDS: f64 = 1.0 / TICKS_PER_SECOND as f64;

/// Per-click yield of a fresh game.
pub const BASE_PER_CLICK: f64 = 1.0;

/// Stable identifier of an upgrade, e.g. "cursor" or "double-clicks".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(pub String);

impl UpgradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How an upgrade's effect composes with the current yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Adds the effect to the per-click yield.
    AdditiveClick,
    /// Multiplies the per-click yield by the effect.
    MultiplicativeClick,
    /// Adds the effect to the passive yield per second.
    AdditivePassive,
}

impl EffectKind {
    pub fn is_multiplicative(self) -> bool {
        matches!(self, EffectKind::MultiplicativeClick)
    }
}

fn default_growth() -> f64 {
    COST_GROWTH
}

/// Immutable catalog entry describing a purchasable upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    /// Unique key, e.g. "grandma".
    pub id: UpgradeId,
    /// Human-readable name.
    pub name: String,
    /// Cost of the first purchase.
    pub base_cost: f64,
    /// Factor the cost is multiplied by (then floored) after each purchase.
    #[serde(default = "default_growth")]
    pub cost_growth: f64,
    /// Effect magnitude: an amount for additive kinds, a factor for multiplicative ones.
    pub effect: f64,
    /// Composition rule of the effect.
    pub kind: EffectKind,
}

impl UpgradeDefinition {
    fn standard(id: &str, name: &str, base_cost: f64, effect: f64, kind: EffectKind) -> Self {
        Self {
            id: UpgradeId::new(id),
            name: name.to_string(),
            base_cost,
            cost_growth: COST_GROWTH,
            effect,
            kind,
        }
    }

    /// State of this upgrade before any purchase.
    pub fn initial_state(&self) -> UpgradeState {
        UpgradeState {
            cost: self.base_cost,
            owned: 0,
        }
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Two definitions share the same id.
    #[error("duplicate upgrade id: {0}")]
    DuplicateId(String),
    /// Ids must contain at least one non-whitespace character.
    #[error("upgrade id must not be blank")]
    BlankId,
    /// Base cost must be finite and non-negative.
    #[error("invalid base cost for {0}")]
    InvalidCost(String),
    /// Growth factor must be finite and strictly greater than one.
    #[error("invalid cost growth for {0}")]
    InvalidGrowth(String),
    /// Effect must be finite; >= 0 for additive kinds, >= 1 for multiplicative ones.
    #[error("invalid effect magnitude for {0}")]
    InvalidEffect(String),
}

/// Ordered, immutable list of upgrade definitions keyed by id.
///
/// Iteration order is the order the definitions were given in, which keeps
/// bulk operations and displays reproducible.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    entries: Vec<UpgradeDefinition>,
}

impl Catalog {
    /// Build a catalog, validating every definition and id uniqueness.
    pub fn new(entries: Vec<UpgradeDefinition>) -> Result<Self, CatalogError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for def in &entries {
            validate_definition(def)?;
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId(def.id.0.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The catalog of the classic game: two click upgrades and five producers.
    pub fn standard() -> Self {
        use EffectKind::*;
        let table = [
            ("better-clicks", "Sticky Fingers", 20.0, 1.0, AdditiveClick),
            ("double-clicks", "Cookie Gloves", 100.0, 2.0, MultiplicativeClick),
            ("cursor", "Cursor", 10.0, 1.0, AdditivePassive),
            ("grandma", "Grandma", 50.0, 5.0, AdditivePassive),
            ("bakery", "Bakery", 200.0, 10.0, AdditivePassive),
            ("factory", "Cookie Factory", 500.0, 20.0, AdditivePassive),
            ("mine", "Chocolate Mine", 2000.0, 50.0, AdditivePassive),
        ];
        Self {
            entries: table
                .into_iter()
                .map(|(id, name, cost, effect, kind)| {
                    UpgradeDefinition::standard(id, name, cost, effect, kind)
                })
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeDefinition> {
        self.entries.iter().find(|d| d.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_definition(def: &UpgradeDefinition) -> Result<(), CatalogError> {
    if def.id.0.trim().is_empty() {
        return Err(CatalogError::BlankId);
    }
    if !def.base_cost.is_finite() || def.base_cost < 0.0 {
        return Err(CatalogError::InvalidCost(def.id.0.clone()));
    }
    if !def.cost_growth.is_finite() || def.cost_growth <= 1.0 {
        return Err(CatalogError::InvalidGrowth(def.id.0.clone()));
    }
    let floor = if def.kind.is_multiplicative() { 1.0 } else { 0.0 };
    if !def.effect.is_finite() || def.effect < floor {
        return Err(CatalogError::InvalidEffect(def.id.0.clone()));
    }
    Ok(())
}

/// Mutable per-upgrade progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeState {
    /// Price of the next purchase.
    pub cost: f64,
    /// Number of purchases so far.
    pub owned: u64,
}

/// The whole economic state of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    /// Cookies available to spend (>= 0).
    pub balance: f64,
    /// Cookies granted per manual action (> 0).
    pub per_click: f64,
    /// Cookies generated per second without manual action (>= 0).
    pub passive_per_second: f64,
    /// Progress of every catalog upgrade.
    pub upgrades: BTreeMap<UpgradeId, UpgradeState>,
}

impl EconomyState {
    /// Fresh state derived from the catalog defaults.
    pub fn new(catalog: &Catalog) -> Self {
        let upgrades = catalog
            .iter()
            .map(|d| (d.id.clone(), d.initial_state()))
            .collect();
        Self {
            balance: 0.0,
            per_click: BASE_PER_CLICK,
            passive_per_second: 0.0,
            upgrades,
        }
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeState> {
        self.upgrades.get(&UpgradeId::from(id))
    }

    pub fn upgrade_mut(&mut self, id: &str) -> Option<&mut UpgradeState> {
        self.upgrades.get_mut(&UpgradeId::from(id))
    }

    /// Balance truncated to a whole number, as displayed to the player.
    pub fn display_balance(&self) -> u64 {
        // `as` saturates for out-of-range floats.
        self.balance.trunc() as u64
    }
}

/// Validation errors for economy invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite value in field {0}")]
    NonFinite(&'static str),
    /// Balance must be non-negative.
    #[error("negative balance: {0}")]
    NegativeBalance(f64),
    /// Per-click yield must be strictly positive.
    #[error("per-click yield must be > 0, got {0}")]
    NonPositiveClick(f64),
    /// Passive yield must be non-negative.
    #[error("passive yield must be >= 0, got {0}")]
    NegativePassive(f64),
    /// Upgrade cost must be finite and non-negative.
    #[error("invalid cost for upgrade {0}")]
    InvalidCost(String),
}

/// Validate the economy invariants that can be checked on a single snapshot.
pub fn validate_state(state: &EconomyState) -> Result<(), ValidationError> {
    if !state.balance.is_finite() {
        return Err(ValidationError::NonFinite("balance"));
    }
    if !state.per_click.is_finite() {
        return Err(ValidationError::NonFinite("per_click"));
    }
    if !state.passive_per_second.is_finite() {
        return Err(ValidationError::NonFinite("passive_per_second"));
    }
    if state.balance < 0.0 {
        return Err(ValidationError::NegativeBalance(state.balance));
    }
    if state.per_click <= 0.0 {
        return Err(ValidationError::NonPositiveClick(state.per_click));
    }
    if state.passive_per_second < 0.0 {
        return Err(ValidationError::NegativePassive(state.passive_per_second));
    }
    for (id, up) in &state.upgrades {
        if !up.cost.is_finite() || up.cost < 0.0 {
            return Err(ValidationError::InvalidCost(id.0.clone()));
        }
    }
    Ok(())
}
