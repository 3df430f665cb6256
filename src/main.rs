//! Moonlander headless runner
//!
//! Loads a level, replays a scripted input sequence through the fixed
//! timestep loop and logs race progress.
//!
//! Usage: moonlander <level.json> [--script script.json] [--max-ticks N]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use moonlander::LevelConfig;
use moonlander::consts::{MAX_SUBSTEPS, SIM_DT};
use moonlander::sim::{RacePhase, TickInput, World, tick};

/// Simulated frame interval of the runner
const FRAME_DT: f64 = 1.0 / 30.0;

const DEFAULT_MAX_TICKS: u64 = 3600;

/// Hold one input for a number of ticks
#[derive(Debug, Deserialize)]
struct ScriptStep {
    ticks: u64,
    #[serde(default)]
    input: TickInput,
}

#[derive(Parser)]
#[command(name = "moonlander")]
#[command(about = "Run a moonlander level headless with a scripted input")]
struct Args {
    /// Level description (JSON)
    level: PathBuf,

    /// Input script: a JSON array of `{ "ticks": n, "input": {...} }` steps
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(short, long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
}

fn load_world(path: &Path) -> anyhow::Result<World> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading level {}", path.display()))?;
    let level = LevelConfig::from_json(&json)
        .with_context(|| format!("loading level {}", path.display()))?;
    World::from_level(&level).with_context(|| format!("building level {}", path.display()))
}

fn load_script(path: Option<&Path>) -> anyhow::Result<Vec<ScriptStep>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing script {}", path.display()))
}

/// Input for a given tick; idle once the script runs out
fn input_at(script: &[ScriptStep], tick: u64) -> TickInput {
    let mut start = 0;
    for step in script {
        if tick < start + step.ticks {
            return step.input;
        }
        start += step.ticks;
    }
    TickInput::default()
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut world = load_world(&args.level)?;
    let script = load_script(args.script.as_deref())?;
    log::info!(
        "Running '{}' for up to {} ticks ({} bodies)",
        world.name,
        args.max_ticks,
        world.bodies.len()
    );

    let mut accumulator = 0.0;
    let mut laps_seen = 0;
    let mut grounded = world.player().grounded();

    'frames: while world.time_ticks < args.max_ticks {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = input_at(&script, world.time_ticks);
            tick(&mut world, &input);
            accumulator -= SIM_DT;
            substeps += 1;

            let hud = world.hud();
            if hud.grounded != grounded {
                grounded = hud.grounded;
                log::debug!("tick {}: grounded={grounded}", world.time_ticks);
            }
            if hud.lap_times.len() > laps_seen {
                laps_seen = hud.lap_times.len();
                if let Some(time) = hud.lap_times.last() {
                    log::info!("Lap {laps_seen} in {:.2}s", time.as_secs_f64());
                }
            }
            if hud.phase == RacePhase::Finished || world.time_ticks >= args.max_ticks {
                break 'frames;
            }
        }
    }

    let hud = world.hud();
    let player = world.player();
    log::info!(
        "Stopped after {} ticks: {:?}, lap {}/{}, best {:?}",
        world.time_ticks,
        hud.phase,
        hud.current_lap,
        hud.max_laps,
        hud.best_lap
    );
    log::info!(
        "Player at ({:.1}, {:.1}) rotation {:.3} rad, grounded={}",
        player.pos.x,
        player.pos.y,
        player.rotation,
        hud.grounded
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Moonlander (headless) starting...");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
