//! Line-oriented front end: reads commands, drives the game, prints the view.

use anyhow::Result;
use clicker_runtime::{DebugCommand, Game, ResetConfirmation, Ticker};
use persistence::KvStore;
use std::io::{BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;

#[derive(Debug, PartialEq)]
pub enum Command {
    Click(u32),
    Buy(String),
    Wait(Duration),
    Idle(Duration),
    Status,
    Cheat(String),
    Version,
    Help,
    Quit,
}

const USAGE: &str = "\
commands:
  click [n]          bake n cookies by hand
  buy <id>           buy an upgrade
  wait <seconds>     fast-forward passive baking
  idle <seconds>     bake in real time
  status | list      show cookies and upgrades
  cheat <command>    debug console (cheat help)
  version            build information
  quit";

fn seconds(raw: Option<&str>) -> Result<Duration, String> {
    let raw = raw.ok_or("expected a number of seconds")?;
    let secs: f64 = raw.parse().map_err(|_| format!("not a number: {raw}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("invalid duration: {raw}"))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);
    match head {
        "click" | "c" => match arg {
            None => Ok(Command::Click(1)),
            Some(n) => n
                .parse()
                .map(Command::Click)
                .map_err(|_| format!("not a click count: {n}")),
        },
        "buy" | "b" => arg
            .map(|id| Command::Buy(id.to_string()))
            .ok_or_else(|| "buy needs an upgrade id".to_string()),
        "wait" => seconds(arg).map(Command::Wait),
        "idle" => seconds(arg).map(Command::Idle),
        "status" | "list" | "" => Ok(Command::Status),
        "cheat" => Ok(Command::Cheat(rest.to_string())),
        "version" => Ok(Command::Version),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try help)")),
    }
}

/// Drive `game` from `input` until EOF or `quit`.
pub fn run<S, R, W>(game: &mut Game<S>, cfg: &Config, input: R, out: &mut W) -> Result<()>
where
    S: KvStore,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    let mut ticker = Ticker::new(cfg.tick_hz);
    write!(out, "{}", game.snapshot())?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };
        match cmd {
            Command::Quit => break,
            Command::Help => writeln!(out, "{USAGE}")?,
            Command::Version => writeln!(
                out,
                "clicker {} ({} built {})",
                env!("CARGO_PKG_VERSION"),
                env!("GIT_SHA"),
                env!("BUILD_DATE")
            )?,
            Command::Status => write!(out, "{}", game.snapshot())?,
            Command::Click(n) => {
                let gained: f64 = (0..n).map(|_| game.click()).sum();
                writeln!(out, "+{gained} | cookies: {}", game.state().display_balance())?;
            }
            Command::Buy(id) => match game.purchase(&id) {
                Ok(p) => writeln!(
                    out,
                    "bought {id} (owned {}) for {} | next cost {}",
                    p.owned, p.spent, p.new_cost
                )?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Wait(d) => {
                let ticks = ticker.accumulate(d);
                let gained = game.advance(ticks as f64 * ticker.tick_seconds())?;
                writeln!(
                    out,
                    "+{gained} over {ticks} ticks | cookies: {}",
                    game.state().display_balance()
                )?;
            }
            Command::Idle(d) => {
                let gained = idle(game, &mut ticker, d)?;
                writeln!(out, "+{gained} | cookies: {}", game.state().display_balance())?;
            }
            Command::Cheat(args) => {
                let args = if args.trim() == "reset" {
                    write!(out, "Type {} to erase ALL progress: ", ResetConfirmation::PHRASE)?;
                    out.flush()?;
                    let answer = lines.next().transpose()?.unwrap_or_default();
                    if ResetConfirmation::from_phrase(&answer).is_none() {
                        writeln!(out, "reset cancelled")?;
                        continue;
                    }
                    format!("reset {}", ResetConfirmation::PHRASE)
                } else if args.trim() == "max" {
                    format!("max {}", cfg.max_count)
                } else {
                    args
                };
                let outcome = args
                    .parse::<DebugCommand>()
                    .and_then(|cmd| game.run_debug(cmd));
                match outcome {
                    Ok(o) => writeln!(out, "{}", o.to_string().trim_end())?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
        }
        if let Some(e) = game.last_save_error() {
            writeln!(out, "warning: {e}")?;
        }
    }
    Ok(())
}

/// Tick in real time at the ticker's cadence for `span`.
fn idle<S: KvStore>(game: &mut Game<S>, ticker: &mut Ticker, span: Duration) -> Result<f64> {
    let start = Instant::now();
    let mut last = start;
    let mut gained = 0.0;
    while last.duration_since(start) < span {
        thread::sleep(ticker.interval());
        let now = Instant::now();
        for _ in 0..ticker.accumulate(now - last) {
            gained += game.advance(ticker.tick_seconds())?;
        }
        last = now;
    }
    Ok(gained)
}
