//! Privileged debug commands.
//!
//! These bypass affordability but still mutate through the economy rules and
//! persist like normal play.

use crate::Game;
use clicker_core::EconomyState;
use clicker_econ::EconError;
use persistence::KvStore;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Owned count used by `max` when none is given.
pub const DEFAULT_MAX_COUNT: u64 = 10;

/// Usage lines returned by [`DebugCommand::Help`].
pub const HELP: &[&str] = &[
    "grant <amount>  - add cookies",
    "set <amount>    - set the cookie count",
    "max [count]     - own every upgrade `count` times (default 10) at zero cost",
    "reset RESET     - erase all progress",
    "help            - show this help",
];

/// Proof that the caller explicitly confirmed a reset.
#[derive(Debug, PartialEq)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    /// The exact phrase a user must type to confirm.
    pub const PHRASE: &'static str = "RESET";

    pub fn from_phrase(input: &str) -> Option<Self> {
        (input.trim() == Self::PHRASE).then_some(Self(()))
    }
}

#[derive(Debug, PartialEq)]
pub enum DebugCommand {
    Grant(f64),
    SetBalance(f64),
    MaxAll(u64),
    Reset(ResetConfirmation),
    Help,
}

/// What a debug command did, printable for the console.
#[derive(Debug, PartialEq)]
pub enum DebugOutcome {
    Granted { amount: f64, balance: f64 },
    BalanceSet(f64),
    Maxed(u64),
    Reset,
    Help(&'static [&'static str]),
}

impl fmt::Display for DebugOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugOutcome::Granted { amount, balance } => {
                write!(f, "Added {amount} cookies! Total: {balance}")
            }
            DebugOutcome::BalanceSet(v) => write!(f, "Set cookies to {v}!"),
            DebugOutcome::Maxed(n) => write!(f, "All upgrades unlocked and maxed out at {n}!"),
            DebugOutcome::Reset => write!(f, "All progress erased."),
            DebugOutcome::Help(lines) => {
                writeln!(f, "Available cheat commands:")?;
                for l in lines.iter() {
                    writeln!(f, "  {l}")?;
                }
                Ok(())
            }
        }
    }
}

fn parse_amount(word: Option<&str>, what: &str) -> Result<f64, EconError> {
    let raw = word.ok_or_else(|| EconError::InvalidArgument(format!("{what} needs an amount")))?;
    raw.parse::<f64>()
        .map_err(|_| EconError::InvalidArgument(format!("not a number: {raw}")))
}

impl FromStr for DebugCommand {
    type Err = EconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let cmd = words.next().unwrap_or("help");
        let arg = words.next();
        let parsed = match cmd {
            "grant" | "add" => DebugCommand::Grant(parse_amount(arg, "grant")?),
            "set" => DebugCommand::SetBalance(parse_amount(arg, "set")?),
            "max" => match arg {
                None => DebugCommand::MaxAll(DEFAULT_MAX_COUNT),
                Some(raw) => DebugCommand::MaxAll(raw.parse().map_err(|_| {
                    EconError::InvalidArgument(format!("not a whole count: {raw}"))
                })?),
            },
            "reset" => {
                let confirm = arg.and_then(ResetConfirmation::from_phrase).ok_or_else(|| {
                    EconError::InvalidArgument(format!(
                        "reset must be confirmed with: reset {}",
                        ResetConfirmation::PHRASE
                    ))
                })?;
                DebugCommand::Reset(confirm)
            }
            "help" => DebugCommand::Help,
            other => {
                return Err(EconError::InvalidArgument(format!(
                    "unknown cheat command: {other}"
                )))
            }
        };
        if let Some(extra) = words.next() {
            return Err(EconError::InvalidArgument(format!("unexpected argument: {extra}")));
        }
        Ok(parsed)
    }
}

impl<S: KvStore> Game<S> {
    /// Run a privileged command. Invalid arguments leave the state untouched.
    pub fn run_debug(&mut self, cmd: DebugCommand) -> Result<DebugOutcome, EconError> {
        let outcome = match cmd {
            DebugCommand::Grant(amount) => {
                let balance = clicker_econ::grant(&mut self.state, amount)?;
                DebugOutcome::Granted { amount, balance }
            }
            DebugCommand::SetBalance(amount) => {
                clicker_econ::set_balance(&mut self.state, amount)?;
                DebugOutcome::BalanceSet(amount)
            }
            DebugCommand::MaxAll(count) => {
                clicker_econ::max_all(&mut self.state, &self.catalog, count)?;
                DebugOutcome::Maxed(count)
            }
            DebugCommand::Reset(_confirmed) => {
                self.reset();
                return Ok(DebugOutcome::Reset);
            }
            DebugCommand::Help => return Ok(DebugOutcome::Help(HELP)),
        };
        info!(%outcome, "debug command applied");
        self.persist();
        Ok(outcome)
    }

    fn reset(&mut self) {
        if let Err(e) = persistence::erase(&mut self.store) {
            warn!(error = %e, "could not erase saved game");
            self.last_save_error = Some(e);
        } else {
            self.last_save_error = None;
        }
        self.state = EconomyState::new(&self.catalog);
        info!("game reset");
    }
}
