#![deny(warnings)]

//! Headless terminal front end for the cookie clicker.

mod config;
mod repl;

use anyhow::Result;
use clicker_runtime::Game;
use config::Config;
use persistence::{FileStore, MemoryStore};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cfg = Config::from_args(std::env::args().skip(1))?;

    // Logging setup; stdout belongs to the game.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let catalog = cfg.catalog()?;
    info!(
        upgrades = catalog.len(),
        save_dir = %cfg.save_dir.display(),
        ephemeral = cfg.ephemeral,
        "starting CLI"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if cfg.ephemeral {
        let mut game = Game::open(catalog, MemoryStore::new());
        repl::run(&mut game, &cfg, stdin.lock(), &mut stdout)
    } else {
        let mut game = Game::open(catalog, FileStore::new(&cfg.save_dir));
        if let Some(e) = game.recovered_from() {
            println!("note: {e}; starting a new game");
        }
        repl::run(&mut game, &cfg, stdin.lock(), &mut stdout)
    }
}
