#![deny(warnings)]

//! Economic rules for the cookie clicker.
//!
//! This module provides validated operations over [`EconomyState`]:
//! - Upgrade purchase with affordability checks and floor cost growth
//! - Manual click yield
//! - Passive accumulation over an explicit elapsed time
//! - Privileged balance edits and bulk max-out used by the debug console
//!
//! None of these functions perform I/O; persisting the result is the
//! caller's job.

use clicker_core::{Catalog, EconomyState, EffectKind, UpgradeDefinition};
use thiserror::Error;
use tracing::debug;

/// Errors produced by economic operations. State is unchanged whenever one is returned.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Bad input to an operation, e.g. a non-positive grant.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Balance is below the current cost of the requested upgrade.
    #[error("insufficient funds: need {cost}, have {balance}")]
    InsufficientFunds { cost: f64, balance: f64 },
    /// The id does not name a catalog upgrade.
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),
    /// The result would leave a field infinite or NaN.
    #[error("{0} would overflow")]
    Overflow(&'static str),
}

/// Outcome of a successful purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    /// Cookies deducted from the balance.
    pub spent: f64,
    /// Owned count after the purchase.
    pub owned: u64,
    /// Price of the next purchase.
    pub new_cost: f64,
}

/// Cost after one purchase: `floor(cost * growth)`.
///
/// Example:
/// assert_eq!(next_cost(10.0, 1.2), 12.0);
pub fn next_cost(cost: f64, growth: f64) -> f64 {
    (cost * growth).floor()
}

/// Current cost of an upgrade, falling back to its base cost when the state
/// has no entry for it yet.
fn current_cost(state: &EconomyState, def: &UpgradeDefinition) -> f64 {
    state
        .upgrade(def.id.as_str())
        .map(|u| u.cost)
        .unwrap_or(def.base_cost)
}

/// Affordability predicate used to enable purchase actions. Unknown ids are never affordable.
pub fn can_afford(state: &EconomyState, catalog: &Catalog, id: &str) -> bool {
    catalog
        .get(id)
        .map(|def| state.balance >= current_cost(state, def))
        .unwrap_or(false)
}

fn finite(field: &'static str, value: f64) -> Result<f64, EconError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EconError::Overflow(field))
    }
}

/// Apply an upgrade's effect `times` times to the yields.
///
/// Additive kinds scale linearly, multiplicative kinds compound. The state is
/// only touched when both yields stay finite.
fn apply_effect(
    state: &mut EconomyState,
    def: &UpgradeDefinition,
    times: u64,
) -> Result<(), EconError> {
    if times == 0 {
        return Ok(());
    }
    let n = times as f64;
    let (mut per_click, mut passive) = (state.per_click, state.passive_per_second);
    match def.kind {
        EffectKind::AdditiveClick => per_click += def.effect * n,
        EffectKind::MultiplicativeClick => per_click *= def.effect.powf(n),
        EffectKind::AdditivePassive => passive += def.effect * n,
    }
    state.per_click = finite("per-click yield", per_click)?;
    state.passive_per_second = finite("passive yield", passive)?;
    Ok(())
}

/// Buy one unit of an upgrade.
///
/// On success the cost is deducted, the owned count incremented, the effect
/// applied and finally the cost regrown. On failure nothing changes.
pub fn purchase(
    state: &mut EconomyState,
    catalog: &Catalog,
    id: &str,
) -> Result<Purchase, EconError> {
    let def = catalog
        .get(id)
        .ok_or_else(|| EconError::UnknownUpgrade(id.to_string()))?;
    let cost = current_cost(state, def);
    if state.balance < cost {
        return Err(EconError::InsufficientFunds {
            cost,
            balance: state.balance,
        });
    }

    let new_cost = finite("upgrade cost", next_cost(cost, def.cost_growth))?;
    apply_effect(state, def, 1)?;

    // Clamp float residue.
    state.balance = (state.balance - cost).max(0.0);
    let entry = state
        .upgrades
        .entry(def.id.clone())
        .or_insert_with(|| def.initial_state());
    entry.owned += 1;
    entry.cost = new_cost;
    let owned = entry.owned;
    debug!(upgrade = id, spent = cost, owned, new_cost, "purchase applied");
    Ok(Purchase {
        spent: cost,
        owned,
        new_cost,
    })
}

/// Manual action: add the per-click yield to the balance and return the
/// amount actually added. The balance saturates at `f64::MAX`.
pub fn click(state: &mut EconomyState) -> f64 {
    let before = state.balance;
    state.balance = (before + state.per_click).min(f64::MAX);
    state.balance - before
}

/// Passive accumulation over `elapsed_secs` seconds.
///
/// Returns the amount added; zero when there is no passive yield.
pub fn advance(state: &mut EconomyState, elapsed_secs: f64) -> Result<f64, EconError> {
    if !elapsed_secs.is_finite() || elapsed_secs < 0.0 {
        return Err(EconError::InvalidArgument(format!(
            "elapsed time must be a non-negative number of seconds, got {elapsed_secs}"
        )));
    }
    if state.passive_per_second <= 0.0 || elapsed_secs == 0.0 {
        return Ok(0.0);
    }
    let gained = state.passive_per_second * elapsed_secs;
    state.balance = finite("balance", state.balance + gained)?;
    Ok(gained)
}

/// Add cookies without earning them. `amount` must be finite and > 0.
pub fn grant(state: &mut EconomyState, amount: f64) -> Result<f64, EconError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EconError::InvalidArgument(format!(
            "grant amount must be a positive number, got {amount}"
        )));
    }
    state.balance = finite("balance", state.balance + amount)?;
    Ok(state.balance)
}

/// Overwrite the balance. `amount` must be finite and >= 0.
pub fn set_balance(state: &mut EconomyState, amount: f64) -> Result<(), EconError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EconError::InvalidArgument(format!(
            "balance must be a non-negative number, got {amount}"
        )));
    }
    state.balance = amount;
    Ok(())
}

/// Set every catalog upgrade to `target` owned at cost 0, compounding each
/// effect `target` times onto the current yields in catalog order.
///
/// This reproduces the yields of `target` sequential purchases per upgrade
/// without any cost growth. Fails with [`EconError::Overflow`], leaving the
/// state unchanged, when a yield would become infinite.
pub fn max_all(state: &mut EconomyState, catalog: &Catalog, target: u64) -> Result<(), EconError> {
    let mut next = state.clone();
    for def in catalog.iter() {
        apply_effect(&mut next, def, target)?;
        let entry = next
            .upgrades
            .entry(def.id.clone())
            .or_insert_with(|| def.initial_state());
        entry.owned = target;
        entry.cost = 0.0;
    }
    *state = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clicker_core::{UpgradeId, COST_GROWTH, TICK_SECONDS};
    use proptest::prelude::*;

    fn fresh() -> (EconomyState, Catalog) {
        let catalog = Catalog::standard();
        (EconomyState::new(&catalog), catalog)
    }

    #[test]
    fn test_next_cost() {
        assert_eq!(next_cost(10.0, 1.2), 12.0);
        assert_eq!(next_cost(12.0, 1.2), 14.0);
        assert_eq!(next_cost(2000.0, 1.2), 2400.0);
    }

    #[test]
    fn cursor_scenario() {
        let (mut s, c) = fresh();
        assert_eq!(click(&mut s), 1.0);
        assert_eq!(s.balance, 1.0);

        let before = s.clone();
        let err = purchase(&mut s, &c, "cursor").unwrap_err();
        assert_eq!(
            err,
            EconError::InsufficientFunds {
                cost: 10.0,
                balance: 1.0
            }
        );
        assert_eq!(s, before);

        grant(&mut s, 9.0).unwrap();
        assert_eq!(s.balance, 10.0);
        let p = purchase(&mut s, &c, "cursor").unwrap();
        assert_eq!(p.spent, 10.0);
        assert_eq!(s.balance, 0.0);
        assert_eq!(s.passive_per_second, 1.0);
        assert_eq!(s.upgrade("cursor").unwrap().cost, 12.0);
        assert_eq!(s.upgrade("cursor").unwrap().owned, 1);
    }

    #[test]
    fn exact_balance_boundary() {
        let (mut s, c) = fresh();
        s.balance = 50.0;
        purchase(&mut s, &c, "grandma").unwrap();
        assert_eq!(s.balance, 0.0);
        assert_eq!(s.passive_per_second, 5.0);
    }

    #[test]
    fn one_below_cost_is_rejected() {
        let (mut s, c) = fresh();
        s.balance = 19.0;
        let before = s.clone();
        assert!(matches!(
            purchase(&mut s, &c, "better-clicks"),
            Err(EconError::InsufficientFunds { .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn unknown_upgrade_is_rejected() {
        let (mut s, c) = fresh();
        s.balance = 1e9;
        let before = s.clone();
        assert_eq!(
            purchase(&mut s, &c, "time-machine"),
            Err(EconError::UnknownUpgrade("time-machine".into()))
        );
        assert_eq!(s, before);
        assert!(!can_afford(&s, &c, "time-machine"));
    }

    #[test]
    fn double_clicks_multiply() {
        let (mut s, c) = fresh();
        s.balance = 1_000.0;
        purchase(&mut s, &c, "double-clicks").unwrap();
        assert_eq!(s.per_click, 2.0);
        purchase(&mut s, &c, "double-clicks").unwrap();
        assert_eq!(s.per_click, 4.0);
        assert_eq!(s.upgrade("double-clicks").unwrap().cost, 144.0);
    }

    #[test]
    fn better_clicks_add() {
        let (mut s, c) = fresh();
        s.balance = 1_000.0;
        purchase(&mut s, &c, "better-clicks").unwrap();
        purchase(&mut s, &c, "better-clicks").unwrap();
        assert_eq!(s.per_click, 3.0);
        assert_eq!(click(&mut s), 3.0);
    }

    #[test]
    fn affordability_predicate() {
        let (mut s, c) = fresh();
        assert!(!can_afford(&s, &c, "cursor"));
        s.balance = 10.0;
        assert!(can_afford(&s, &c, "cursor"));
        assert!(!can_afford(&s, &c, "grandma"));
    }

    #[test]
    fn purchase_fills_missing_state_entry() {
        let (mut s, c) = fresh();
        s.upgrades.remove(&UpgradeId::from("bakery"));
        s.balance = 200.0;
        purchase(&mut s, &c, "bakery").unwrap();
        assert_eq!(s.upgrade("bakery").unwrap().owned, 1);
        assert_eq!(s.upgrade("bakery").unwrap().cost, 240.0);
    }

    #[test]
    fn advance_without_passive_is_noop() {
        let (mut s, _) = fresh();
        assert_eq!(advance(&mut s, 1.0).unwrap(), 0.0);
        assert_eq!(s.balance, 0.0);
    }

    #[test]
    fn advance_adds_fractional_yield() {
        let (mut s, _) = fresh();
        s.passive_per_second = 5.0;
        let gained = advance(&mut s, 0.5).unwrap();
        assert_eq!(gained, 2.5);
        assert_eq!(s.balance, 2.5);
        for _ in 0..10 {
            advance(&mut s, TICK_SECONDS).unwrap();
        }
        assert!((s.balance - 7.5).abs() < 1e-9);
    }

    #[test]
    fn advance_rejects_bad_elapsed() {
        let (mut s, _) = fresh();
        s.passive_per_second = 1.0;
        assert!(matches!(advance(&mut s, -0.1), Err(EconError::InvalidArgument(_))));
        assert!(matches!(advance(&mut s, f64::NAN), Err(EconError::InvalidArgument(_))));
        assert_eq!(s.balance, 0.0);
    }

    #[test]
    fn grant_and_set_validate() {
        let (mut s, _) = fresh();
        assert!(grant(&mut s, 0.0).is_err());
        assert!(grant(&mut s, -3.0).is_err());
        assert!(grant(&mut s, f64::INFINITY).is_err());
        assert_eq!(grant(&mut s, 5.0).unwrap(), 5.0);
        assert!(set_balance(&mut s, -1.0).is_err());
        assert_eq!(s.balance, 5.0);
        set_balance(&mut s, 0.0).unwrap();
        assert_eq!(s.balance, 0.0);
        set_balance(&mut s, 123.0).unwrap();
        assert_eq!(s.balance, 123.0);
    }

    #[test]
    fn max_all_matches_sequential_purchases() {
        let (mut bought, c) = fresh();
        for def in c.iter() {
            for _ in 0..10 {
                bought.balance = 1e12;
                purchase(&mut bought, &c, def.id.as_str()).unwrap();
            }
        }

        let (mut maxed, _) = fresh();
        max_all(&mut maxed, &c, 10).unwrap();

        assert_eq!(maxed.per_click, bought.per_click);
        assert_eq!(maxed.per_click, (1.0 + 10.0) * 1024.0);
        assert_eq!(maxed.passive_per_second, bought.passive_per_second);
        assert_eq!(maxed.passive_per_second, 860.0);
        for def in c.iter() {
            let up = maxed.upgrade(def.id.as_str()).unwrap();
            assert_eq!(up.owned, 10);
            assert_eq!(up.cost, 0.0);
        }
    }

    #[test]
    fn max_all_zero_only_zeroes_costs() {
        let (mut s, c) = fresh();
        max_all(&mut s, &c, 0).unwrap();
        assert_eq!(s.per_click, 1.0);
        assert_eq!(s.passive_per_second, 0.0);
        assert!(s.upgrades.values().all(|u| u.cost == 0.0 && u.owned == 0));
    }

    #[test]
    fn grant_rejects_overflowing_balance() {
        let (mut s, _) = fresh();
        grant(&mut s, 1e308).unwrap();
        let before = s.clone();
        assert_eq!(grant(&mut s, 1e308), Err(EconError::Overflow("balance")));
        assert_eq!(s, before);
        assert!(s.balance.is_finite());
    }

    #[test]
    fn max_all_rejects_overflowing_yield() {
        let (mut s, c) = fresh();
        let before = s.clone();
        assert_eq!(max_all(&mut s, &c, 2000), Err(EconError::Overflow("per-click yield")));
        assert_eq!(s, before);
    }

    #[test]
    fn advance_rejects_overflowing_balance() {
        let (mut s, _) = fresh();
        s.passive_per_second = 1e300;
        s.balance = 1.0;
        assert_eq!(advance(&mut s, 1e10), Err(EconError::Overflow("balance")));
        assert_eq!(s.balance, 1.0);
    }

    #[test]
    fn purchase_rejects_overflowing_yield() {
        let (mut s, c) = fresh();
        s.per_click = f64::MAX;
        s.balance = 100.0;
        let before = s.clone();
        assert_eq!(
            purchase(&mut s, &c, "double-clicks"),
            Err(EconError::Overflow("per-click yield"))
        );
        assert_eq!(s, before);
    }

    #[test]
    fn click_saturates_balance() {
        let (mut s, _) = fresh();
        s.per_click = f64::MAX;
        s.balance = f64::MAX;
        assert_eq!(click(&mut s), 0.0);
        assert_eq!(s.balance, f64::MAX);
    }

    proptest! {
        #[test]
        fn cost_strictly_grows(idx in 0usize..7, n in 1usize..40) {
            let (mut s, c) = fresh();
            let id = c.iter().nth(idx).unwrap().id.clone();
            let mut cost = s.upgrade(id.as_str()).unwrap().cost;
            for _ in 0..n {
                s.balance = cost;
                let p = purchase(&mut s, &c, id.as_str()).unwrap();
                prop_assert!(s.balance >= 0.0);
                prop_assert_eq!(p.new_cost, (cost * COST_GROWTH).floor());
                prop_assert!(p.new_cost > cost);
                cost = p.new_cost;
            }
        }

        #[test]
        fn purchases_never_overdraw(
            start in 0.0f64..5_000.0,
            picks in proptest::collection::vec(0usize..7, 1..60),
        ) {
            let (mut s, c) = fresh();
            s.balance = start;
            let ids: Vec<_> = c.iter().map(|d| d.id.clone()).collect();
            let mut per_click = s.per_click;
            let mut passive = s.passive_per_second;
            for i in picks {
                let _ = purchase(&mut s, &c, ids[i].as_str());
                prop_assert!(s.balance >= 0.0);
                prop_assert!(s.per_click >= per_click);
                prop_assert!(s.passive_per_second >= passive);
                per_click = s.per_click;
                passive = s.passive_per_second;
            }
        }

        #[test]
        fn advance_is_linear(passive in 0.0f64..1_000.0, t1 in 0.0f64..100.0, t2 in 0.0f64..100.0) {
            let (mut split, _) = fresh();
            split.passive_per_second = passive;
            let mut whole = split.clone();
            advance(&mut split, t1).unwrap();
            advance(&mut split, t2).unwrap();
            advance(&mut whole, t1 + t2).unwrap();
            let tol = 1e-9 * whole.balance.max(1.0);
            prop_assert!((split.balance - whole.balance).abs() <= tol);
        }
    }
}
