#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mirror Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired grid mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values. The beam tracer
//! reacts to those events by re-tracing the beam over an immutable
//! [`GridView`], producing a [`SimulationResult`] and an [`IlluminationMap`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the active level with the provided definition.
    LoadLevel {
        /// Level data to validate and install.
        definition: LevelDefinition,
    },
    /// Restores the active level to its initial configuration.
    ResetLevel,
    /// Requests placement of a player mirror on an empty cell.
    PlaceMirror {
        /// Cell that should receive the mirror.
        position: Position,
        /// Orientation of the mirror to place.
        orientation: MirrorOrientation,
    },
    /// Requests removal of a player mirror.
    RemoveMirror {
        /// Cell holding the mirror to remove.
        position: Position,
    },
    /// Requests that a player mirror flips between `/` and `\`.
    RotateMirror {
        /// Cell holding the mirror to retype.
        position: Position,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level was validated and installed.
    LevelLoaded {
        /// Number of cells along each edge of the square grid.
        size: u32,
        /// Beam source defined by the level.
        emitter: Emitter,
    },
    /// Reports that a level definition failed validation.
    LevelRejected {
        /// Specific defect found in the definition.
        reason: InvalidLevel,
    },
    /// Confirms that the active level returned to its initial configuration.
    LevelReset,
    /// Reports that a reset was requested while no level was active.
    LevelResetRejected {
        /// Specific reason the reset failed.
        reason: PlacementError,
    },
    /// Confirms that a player mirror was placed.
    MirrorPlaced {
        /// Cell that received the mirror.
        position: Position,
        /// Orientation of the placed mirror.
        orientation: MirrorOrientation,
    },
    /// Confirms that a player mirror was removed.
    MirrorRemoved {
        /// Cell that held the mirror.
        position: Position,
    },
    /// Confirms that a player mirror changed orientation.
    MirrorRotated {
        /// Cell holding the mirror.
        position: Position,
        /// Orientation after the rotation.
        orientation: MirrorOrientation,
    },
    /// Reports that a placement request was rejected.
    MirrorPlacementRejected {
        /// Cell provided in the request.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a removal request was rejected.
    MirrorRemovalRejected {
        /// Cell provided in the request.
        position: Position,
        /// Specific reason the removal failed.
        reason: PlacementError,
    },
    /// Reports that a rotation request was rejected.
    MirrorRotationRejected {
        /// Cell provided in the request.
        position: Position,
        /// Specific reason the rotation failed.
        reason: PlacementError,
    },
}

impl Event {
    /// Reports whether the event signals that the grid contents changed.
    #[must_use]
    pub const fn changes_grid(&self) -> bool {
        matches!(
            self,
            Self::LevelLoaded { .. }
                | Self::LevelReset
                | Self::MirrorPlaced { .. }
                | Self::MirrorRemoved { .. }
                | Self::MirrorRotated { .. }
        )
    }
}

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Moves one cell in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant,
    /// which callers treat as leaving the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self::new(x, y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions a beam may travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Travel toward decreasing row indices.
    Up,
    /// Travel toward increasing row indices.
    Down,
    /// Travel toward decreasing column indices.
    Left,
    /// Travel toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit grid step expressed as `(dx, dy)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Reports whether the direction runs along a row.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Diagonal orientation of a mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorOrientation {
    /// `/` mirror, swapping Right with Up and Left with Down.
    Forward,
    /// `\` mirror, swapping Right with Down and Left with Up.
    Backward,
}

impl MirrorOrientation {
    /// Outgoing direction for a beam entering the mirror while travelling `incoming`.
    ///
    /// This lookup is the only reflection rule used by the engine.
    #[must_use]
    pub const fn reflect(self, incoming: Direction) -> Direction {
        match (self, incoming) {
            (Self::Forward, Direction::Up) => Direction::Right,
            (Self::Forward, Direction::Down) => Direction::Left,
            (Self::Forward, Direction::Left) => Direction::Down,
            (Self::Forward, Direction::Right) => Direction::Up,
            (Self::Backward, Direction::Up) => Direction::Left,
            (Self::Backward, Direction::Down) => Direction::Right,
            (Self::Backward, Direction::Left) => Direction::Up,
            (Self::Backward, Direction::Right) => Direction::Down,
        }
    }

    /// Orientation obtained by flipping the mirror a quarter turn.
    #[must_use]
    pub const fn rotated(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Glyph used in level files and layout strings.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '\\',
        }
    }

    /// Parses the glyph produced by [`MirrorOrientation::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '/' => Some(Self::Forward),
            '\\' => Some(Self::Backward),
            _ => None,
        }
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Traversable cell that leaves the beam untouched.
    #[default]
    Empty,
    /// Immutable obstacle that absorbs the beam.
    Wall,
    /// Mirror that deflects the beam by ninety degrees.
    Mirror {
        /// Diagonal the mirror is aligned with.
        orientation: MirrorOrientation,
    },
    /// Fixed beam source.
    Emitter,
    /// Cell the beam must reach.
    Target,
}

impl Cell {
    /// Orientation of the mirror occupying the cell, if any.
    #[must_use]
    pub const fn mirror_orientation(&self) -> Option<MirrorOrientation> {
        match self {
            Self::Mirror { orientation } => Some(*orientation),
            _ => None,
        }
    }
}

/// Beam source anchored on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emitter {
    /// Cell holding the emitter.
    pub position: Position,
    /// Direction the beam leaves the emitter in.
    pub direction: Direction,
}

/// Read-only view into a dense square grid of cells stored in row-major order.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    size: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    ///
    /// Cells beyond `size * size` are ignored; missing cells read as absent.
    #[must_use]
    pub const fn new(cells: &'a [Cell], size: u32) -> Self {
        Self { cells, size }
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x() < self.size && position.y() < self.size
    }

    /// Returns the cell stored at the provided position, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates over every cell together with its position in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + 'a {
        let size = self.size;
        let count = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        self.cells
            .iter()
            .copied()
            .take(count)
            .enumerate()
            .map(move |(index, cell)| {
                let index = index as u64;
                let width = u64::from(size);
                let position = Position::new((index % width) as u32, (index / width) as u32);
                (position, cell)
            })
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let row = usize::try_from(position.y()).ok()?;
        let column = usize::try_from(position.x()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }
}

/// Level data as stored in level files.
///
/// The layout is a list of equally long rows using the glyphs `.` (empty),
/// `#` (wall), `/` and `\` (fixed mirrors), `E` (emitter) and `T` (target).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Human readable level title.
    #[serde(default)]
    pub name: String,
    /// Direction the beam leaves the emitter in.
    pub emitter_direction: Direction,
    /// Maximum number of mirrors the player may place.
    pub max_mirrors: u32,
    /// Grid rows from top to bottom.
    pub rows: Vec<String>,
}

/// Reasons a mirror placement, removal, or rotation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The cell lies outside the grid or does not hold what the request expects.
    #[error("cell cannot accept this change")]
    InvalidPlacement,
    /// The cell belongs to the level's fixed configuration.
    #[error("cell is part of the level and cannot change")]
    ImmutableCell,
    /// The level's player mirror budget is exhausted.
    #[error("mirror limit reached")]
    MirrorLimitReached,
    /// No level is active, so the grid cannot change.
    #[error("no level loaded")]
    NoLevelLoaded,
}

/// Defects that make a level definition unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum InvalidLevel {
    /// The definition contains no rows.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A row length differs from the number of rows.
    #[error("row {row} holds {found} cells, expected {expected}")]
    NotSquare {
        /// Zero-based index of the offending row.
        row: u32,
        /// Number of cells every row must contain.
        expected: u32,
        /// Number of cells found in the row.
        found: u32,
    },
    /// A row contains a glyph outside the level alphabet.
    #[error("unknown glyph {glyph:?} at {position}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Cell holding the character.
        position: Position,
    },
    /// The grid holds no emitter.
    #[error("level has no emitter")]
    MissingEmitter,
    /// The grid holds no target.
    #[error("level has no target")]
    MissingTarget,
    /// The grid holds more than one emitter.
    #[error("second emitter at {position}")]
    DuplicateEmitter {
        /// Cell holding the extra emitter.
        position: Position,
    },
    /// The grid holds more than one target.
    #[error("second target at {position}")]
    DuplicateTarget {
        /// Cell holding the extra target.
        position: Position,
    },
}

/// Reasons a traced beam failed to reach the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceFailure {
    /// The beam entered a wall or the emitter and was absorbed.
    HitWall,
    /// The beam left the grid.
    OutOfBounds,
    /// The beam re-entered a previously visited cell and direction.
    Looped,
    /// The grid holds no target.
    ///
    /// Levels without a target are rejected at load time with
    /// [`InvalidLevel::MissingTarget`], so tracing never reports this value.
    NoTarget,
}

/// Outcome of tracing a beam across the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationResult {
    /// The beam reached the target.
    Success {
        /// Illuminated cells in order of passage, ending at the target.
        path: Vec<Position>,
    },
    /// The beam terminated without reaching the target.
    Failure(TraceFailure),
}

impl SimulationResult {
    /// Reports whether the beam reached the target.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure reason, if the beam did not reach the target.
    #[must_use]
    pub const fn failure(&self) -> Option<TraceFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(reason) => Some(*reason),
        }
    }
}

/// Cells the beam passed through, with the directions it entered them in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IlluminationMap {
    cells: BTreeMap<Position, Vec<Direction>>,
}

impl IlluminationMap {
    /// Creates an empty illumination map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the beam entered `position` while travelling `direction`.
    pub fn record(&mut self, position: Position, direction: Direction) {
        self.cells.entry(position).or_default().push(direction);
    }

    /// Directions the beam entered the cell in, in order of passage.
    #[must_use]
    pub fn directions(&self, position: Position) -> &[Direction] {
        self.cells.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reports whether the beam passed through the cell.
    #[must_use]
    pub fn is_lit(&self, position: Position) -> bool {
        self.cells.contains_key(&position)
    }

    /// Number of distinct illuminated cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell was illuminated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over illuminated cells in position order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &[Direction])> {
        self.cells
            .iter()
            .map(|(position, directions)| (*position, directions.as_slice()))
    }
}
