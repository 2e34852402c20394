//! Headless Tile Cascade runner (default binary).
//!
//! Loads a level, plays a move script (or autoplays with hints), and prints drained board
//! events and a final snapshot as JSON lines on stdout. Logs go to stderr via `RUST_LOG`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use tile_cascade::core::{EngineConfig, Game, LevelDescriptor};
use tile_cascade::engine::{parse_script, suggest_move};
use tile_cascade::types::Move;

#[derive(Debug, Parser)]
#[command(name = "tile-cascade")]
#[command(about = "Resolve a tile-matching level headlessly and print JSON lines")]
struct Cli {
    /// Level descriptor (JSON)
    level: PathBuf,
    /// RNG seed (overrides TILE_CASCADE_SEED)
    #[arg(long)]
    seed: Option<u32>,
    /// Move script, one `swap R,C R,C` or `tap R,C` per line; autoplays when omitted
    #[arg(long)]
    script: Option<PathBuf>,
    /// Stop autoplay after this many moves
    #[arg(long, default_value_t = 100)]
    max_turns: usize,
    /// Print every board event as a JSON line
    #[arg(long, default_value_t = false)]
    events: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env();
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let level = load_level(&cli.level)?;
    let mut game = Game::from_level(&level, config)
        .with_context(|| format!("building level {}", cli.level.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    flush_events(&mut game, cli.events, &mut out)?;

    match &cli.script {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            let moves = parse_script(&text)
                .with_context(|| format!("parsing script {}", path.display()))?;
            for mv in moves {
                if game.status().is_terminal() {
                    break;
                }
                play(&mut game, mv);
                flush_events(&mut game, cli.events, &mut out)?;
            }
        }
        None => {
            for _ in 0..cli.max_turns {
                let Some(mv) = suggest_move(&game) else {
                    info!("[Runner] no suggestion left");
                    break;
                };
                play(&mut game, mv);
                flush_events(&mut game, cli.events, &mut out)?;
                if game.status().is_terminal() {
                    break;
                }
            }
        }
    }

    let snapshot = game.snapshot();
    serde_json::to_writer(&mut out, &snapshot).context("writing snapshot")?;
    writeln!(out)?;
    info!(
        "[Runner] finished: {:?}, {} moves left",
        snapshot.status, snapshot.moves_remaining
    );
    Ok(())
}

fn load_level(path: &Path) -> Result<LevelDescriptor> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading level {}", path.display()))?;
    LevelDescriptor::from_json(&text).with_context(|| format!("parsing level {}", path.display()))
}

fn play(game: &mut Game, mv: Move) {
    match game.resolve_move(mv) {
        Ok(report) if report.consumed => info!(
            "[Runner] {:?}: {} cascades, {} helpers fired",
            mv, report.cascades, report.helpers_fired
        ),
        Ok(_) => info!("[Runner] {:?} had no effect", mv),
        Err(e) => warn!("[Runner] {:?} rejected: {}", mv, e),
    }
}

fn flush_events(game: &mut Game, print: bool, out: &mut impl Write) -> Result<()> {
    let events = game.drain_events();
    if !print {
        return Ok(());
    }
    for event in events {
        serde_json::to_writer(&mut *out, &event).context("writing event")?;
        writeln!(out)?;
    }
    Ok(())
}
