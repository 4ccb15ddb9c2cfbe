#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mirror Maze.

mod grid;
mod level;

pub use grid::{Grid, GridBuilder};
pub use level::Level;

use log::{debug, warn};
use mirror_maze_core::{Command, Event, MirrorOrientation, PlacementError, Position};

/// Represents the authoritative Mirror Maze world state.
#[derive(Debug, Default)]
pub struct World {
    active: Option<ActiveLevel>,
}

#[derive(Debug)]
struct ActiveLevel {
    level: Level,
    grid: Grid,
    moves: u32,
}

impl World {
    /// Creates a world without an active level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_level(&mut self) -> Result<(), PlacementError> {
        let active = self.active.as_mut().ok_or(PlacementError::NoLevelLoaded)?;
        active.grid = active.level.grid().clone();
        active.moves = 0;
        Ok(())
    }

    fn place_mirror(
        &mut self,
        position: Position,
        orientation: MirrorOrientation,
    ) -> Result<(), PlacementError> {
        let active = self.active.as_mut().ok_or(PlacementError::NoLevelLoaded)?;
        let grid = active.grid.place_mirror(position, orientation)?;
        active.commit(grid);
        Ok(())
    }

    fn remove_mirror(&mut self, position: Position) -> Result<(), PlacementError> {
        let active = self.active.as_mut().ok_or(PlacementError::NoLevelLoaded)?;
        let grid = active.grid.remove_mirror(position)?;
        active.commit(grid);
        Ok(())
    }

    fn rotate_mirror(&mut self, position: Position) -> Result<MirrorOrientation, PlacementError> {
        let active = self.active.as_mut().ok_or(PlacementError::NoLevelLoaded)?;
        let grid = active.grid.rotate_mirror(position)?;
        let orientation = grid
            .cell(position)
            .and_then(|cell| cell.mirror_orientation())
            .ok_or(PlacementError::InvalidPlacement)?;
        active.commit(grid);
        Ok(orientation)
    }
}

impl ActiveLevel {
    fn new(level: Level) -> Self {
        Self {
            grid: level.grid().clone(),
            level,
            moves: 0,
        }
    }

    fn commit(&mut self, grid: Grid) {
        self.grid = grid;
        self.moves = self.moves.saturating_add(1);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { definition } => match Level::from_definition(&definition) {
            Ok(level) => {
                let size = level.grid().size();
                let emitter = level.emitter();
                debug!("loaded level {:?} ({size}x{size})", level.name());
                world.active = Some(ActiveLevel::new(level));
                out_events.push(Event::LevelLoaded { size, emitter });
            }
            Err(reason) => {
                warn!("rejected level {:?}: {reason}", definition.name);
                out_events.push(Event::LevelRejected { reason });
            }
        },
        Command::ResetLevel => match world.reset_level() {
            Ok(()) => out_events.push(Event::LevelReset),
            Err(reason) => {
                debug!("rejected level reset: {reason}");
                out_events.push(Event::LevelResetRejected { reason });
            }
        },
        Command::PlaceMirror {
            position,
            orientation,
        } => match world.place_mirror(position, orientation) {
            Ok(()) => {
                debug!("placed {} mirror at {position}", orientation.glyph());
                out_events.push(Event::MirrorPlaced {
                    position,
                    orientation,
                });
            }
            Err(reason) => {
                debug!("rejected mirror placement at {position}: {reason}");
                out_events.push(Event::MirrorPlacementRejected { position, reason });
            }
        },
        Command::RemoveMirror { position } => match world.remove_mirror(position) {
            Ok(()) => {
                debug!("removed mirror at {position}");
                out_events.push(Event::MirrorRemoved { position });
            }
            Err(reason) => {
                debug!("rejected mirror removal at {position}: {reason}");
                out_events.push(Event::MirrorRemovalRejected { position, reason });
            }
        },
        Command::RotateMirror { position } => match world.rotate_mirror(position) {
            Ok(orientation) => {
                debug!("rotated mirror at {position} to {}", orientation.glyph());
                out_events.push(Event::MirrorRotated {
                    position,
                    orientation,
                });
            }
            Err(reason) => {
                debug!("rejected mirror rotation at {position}: {reason}");
                out_events.push(Event::MirrorRotationRejected { position, reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use mirror_maze_core::{Emitter, GridView};

    use super::{Grid, World};

    /// Title of the active level, if any.
    #[must_use]
    pub fn level_name(world: &World) -> Option<&str> {
        world.active.as_ref().map(|active| active.level.name())
    }

    /// Provides read-only access to the current grid.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.active.as_ref().map(|active| &active.grid)
    }

    /// Exposes a read-only view of the current grid cells.
    #[must_use]
    pub fn grid_view(world: &World) -> Option<GridView<'_>> {
        grid(world).map(Grid::view)
    }

    /// Beam source of the active level.
    #[must_use]
    pub fn emitter(world: &World) -> Option<Emitter> {
        world.active.as_ref().map(|active| active.level.emitter())
    }

    /// Accepted grid mutations since the level was loaded or reset.
    #[must_use]
    pub fn move_count(world: &World) -> u32 {
        world.active.as_ref().map_or(0, |active| active.moves)
    }

    /// Number of mirrors the player may still place.
    #[must_use]
    pub fn mirrors_remaining(world: &World) -> u32 {
        grid(world).map_or(0, Grid::mirrors_remaining)
    }
}
