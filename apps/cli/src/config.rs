//! CLI configuration: defaults, optional YAML file, then command-line flags.

use anyhow::{bail, Context, Result};
use clicker_core::{Catalog, UpgradeDefinition, TICKS_PER_SECOND};
use clicker_runtime::{DEFAULT_MAX_COUNT, MAX_TICK_HZ};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the save record.
    pub save_dir: PathBuf,
    /// Passive ticks per second while idling.
    pub tick_hz: u32,
    /// Owned count used by `cheat max` without an argument.
    pub max_count: u64,
    /// Fallback tracing filter when RUST_LOG is unset.
    pub log_filter: String,
    /// YAML list of upgrade definitions replacing the standard catalog.
    pub catalog_path: Option<PathBuf>,
    /// Keep the game in memory only.
    pub ephemeral: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(persistence::default_save_dir()),
            tick_hz: TICKS_PER_SECOND,
            max_count: DEFAULT_MAX_COUNT,
            log_filter: "info".to_string(),
            catalog_path: None,
            ephemeral: false,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid config file")
    }

    /// Build the config from process-style arguments (without the program name).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let args: Vec<String> = args.into_iter().collect();

        // The config file is the base layer, so find it before applying flags.
        let mut cfg = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args.get(i + 1).context("--config needs a path")?;
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {path}"))?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };

        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => {
                    it.next();
                }
                "--save-dir" => cfg.save_dir = PathBuf::from(value(&mut it, &arg)?),
                "--tick-hz" => cfg.tick_hz = parse(&mut it, &arg)?,
                "--max-count" => cfg.max_count = parse(&mut it, &arg)?,
                "--catalog" => cfg.catalog_path = Some(PathBuf::from(value(&mut it, &arg)?)),
                "--log" => cfg.log_filter = value(&mut it, &arg)?,
                "--ephemeral" => cfg.ephemeral = true,
                other => bail!("unknown argument: {other}"),
            }
        }
        if !(1..=MAX_TICK_HZ).contains(&cfg.tick_hz) {
            bail!("tick rate must be between 1 and {MAX_TICK_HZ} Hz");
        }
        Ok(cfg)
    }

    /// The configured catalog, or the standard one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => load_catalog(path),
            None => Ok(Catalog::standard()),
        }
    }
}

fn value(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    it.next().with_context(|| format!("{flag} needs a value"))
}

fn parse<T: std::str::FromStr>(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<T> {
    let raw = value(it, flag)?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {flag}: {raw}"))
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let defs: Vec<UpgradeDefinition> =
        serde_yaml::from_str(&text).context("invalid catalog file")?;
    Ok(Catalog::new(defs)?)
}
