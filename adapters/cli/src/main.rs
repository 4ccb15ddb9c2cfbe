#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that traces beams through Mirror Maze levels.

mod layout_transfer;
mod render;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use mirror_maze_core::{Command, Event, LevelDefinition, MirrorOrientation, Position};
use mirror_maze_system_beam_tracer::BeamTracer;
use mirror_maze_world::{self as world, query, Grid, World};

use crate::layout_transfer::{MirrorLayoutSnapshot, MirrorPlacement};

/// Exit status reported when the beam reaches the target.
const REACHED_TARGET: u8 = 0;
/// Exit status reported when the beam misses the target.
const MISSED_TARGET: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "mirror-maze", about = "Trace laser beams through mirror puzzle levels")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Traces the beam and prints the lit grid.
    Trace(LayoutArgs),
    /// Prints a layout transfer string for the placed mirrors.
    Export(LayoutArgs),
}

#[derive(Debug, Args)]
struct LayoutArgs {
    /// Level file in TOML format.
    level: PathBuf,
    /// Mirror to place, written as `X,Y,/` or `X,Y,\`.
    #[arg(long = "place", value_name = "X,Y,GLYPH", value_parser = parse_placement)]
    placements: Vec<MirrorPlacement>,
    /// Layout transfer string produced by the `export` command.
    #[arg(long)]
    layout: Option<String>,
}

/// Entry point for the Mirror Maze command-line interface.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        CliCommand::Trace(args) => trace_level(&args).map(ExitCode::from),
        CliCommand::Export(args) => {
            println!("{}", export_layout(&args)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints the lit grid and returns the exit status for the trace outcome.
fn trace_level(args: &LayoutArgs) -> Result<u8> {
    let (world, events) = build_world(args)?;
    let grid = query::grid_view(&world).context("no level is active")?;
    let mut tracer = BeamTracer::new();
    let trace = tracer
        .handle(&events, Some(grid), query::emitter(&world))
        .context("no beam could be traced")?;

    print!("{}", render::render(grid, trace.illumination()));
    match trace.result().failure() {
        None => {
            println!("target reached in {} steps", trace.transitions());
            Ok(REACHED_TARGET)
        }
        Some(reason) => {
            println!("beam failed: {reason:?}");
            Ok(MISSED_TARGET)
        }
    }
}

/// Encodes the player mirrors of the requested layout as a transfer string.
fn export_layout(args: &LayoutArgs) -> Result<String> {
    let (world, _) = build_world(args)?;
    let grid = query::grid(&world).context("no level is active")?;
    let snapshot = MirrorLayoutSnapshot {
        size: grid.size(),
        mirrors: grid
            .player_mirrors()
            .into_iter()
            .map(|(position, orientation)| MirrorPlacement {
                position,
                orientation,
            })
            .collect(),
    };
    Ok(snapshot.encode()?)
}

/// Loads the level and applies every requested mirror placement.
fn build_world(args: &LayoutArgs) -> Result<(World, Vec<Event>)> {
    let definition = load_level(&args.level)?;
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { definition }, &mut events);
    if let Some(Event::LevelRejected { reason }) = events.first() {
        bail!("invalid level {}: {reason}", args.level.display());
    }

    let mut placements = args.placements.clone();
    if let Some(layout) = &args.layout {
        let snapshot =
            MirrorLayoutSnapshot::decode(layout).context("could not read layout string")?;
        let size = query::grid(&world).map_or(0, Grid::size);
        if snapshot.size != size {
            bail!(
                "layout targets a {0}x{0} grid but the level is {1}x{1}",
                snapshot.size,
                size
            );
        }
        placements.extend(snapshot.mirrors);
    }

    for placement in placements {
        let before = events.len();
        world::apply(
            &mut world,
            Command::PlaceMirror {
                position: placement.position,
                orientation: placement.orientation,
            },
            &mut events,
        );
        for event in &events[before..] {
            if let Event::MirrorPlacementRejected { position, reason } = event {
                warn!("skipping mirror at {position}: {reason}");
            }
        }
    }

    info!(
        "level {:?}: {} mirror(s) placed, {} remaining",
        query::level_name(&world).unwrap_or_default(),
        query::move_count(&world),
        query::mirrors_remaining(&world)
    );
    Ok((world, events))
}

fn load_level(path: &Path) -> Result<LevelDefinition> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse level file {}", path.display()))
}

fn parse_placement(value: &str) -> Result<MirrorPlacement, String> {
    let mut parts = value.splitn(3, ',');
    let (Some(x), Some(y), Some(glyph)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected X,Y,GLYPH but got '{value}'"));
    };

    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column '{x}': {error}"))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row '{y}': {error}"))?;
    let mut glyphs = glyph.trim().chars();
    let orientation = match (glyphs.next(), glyphs.next()) {
        (Some(glyph), None) => MirrorOrientation::from_glyph(glyph),
        _ => None,
    }
    .ok_or_else(|| format!("mirror glyph must be '/' or '\\', got '{glyph}'"))?;

    Ok(MirrorPlacement {
        position: Position::new(x, y),
        orientation,
    })
}
