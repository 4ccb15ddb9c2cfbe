#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure beam tracing system for Mirror Maze.
//!
//! [`trace`] follows a beam cell by cell from the emitter, reflecting it off
//! mirrors until it reaches the target, leaves the grid, is absorbed, or
//! re-enters a state it already visited. [`BeamTracer`] wraps the function in
//! a system that re-traces from scratch whenever the world reports a grid
//! change.

use std::collections::HashSet;

use log::debug;
use mirror_maze_core::{
    Cell, Direction, Emitter, Event, GridView, IlluminationMap, Position, SimulationResult,
    TraceFailure,
};

/// Phases of the beam state machine.
///
/// `Traveling` and `Reflecting` are only observed while the beam is in
/// flight; every completed trace ends in one of the terminal phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeamPhase {
    /// The beam moves straight through an empty cell.
    Traveling,
    /// The beam changes direction on a mirror.
    Reflecting,
    /// The beam was absorbed by a wall or the emitter.
    Absorbed,
    /// The beam left the grid.
    Exited,
    /// The beam re-entered a visited cell and direction.
    Looped,
    /// The beam reached the target.
    Reached,
}

impl BeamPhase {
    /// Reports whether the phase ends the trace.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Traveling | Self::Reflecting)
    }
}

/// Complete record of a single trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeamTrace {
    result: SimulationResult,
    illumination: IlluminationMap,
    transitions: u32,
    phase: BeamPhase,
}

impl BeamTrace {
    /// Outcome of the trace.
    #[must_use]
    pub const fn result(&self) -> &SimulationResult {
        &self.result
    }

    /// Cells the beam passed through.
    #[must_use]
    pub const fn illumination(&self) -> &IlluminationMap {
        &self.illumination
    }

    /// Number of `(position, direction)` states the beam visited.
    ///
    /// Never exceeds `4 * size * size` for a square grid.
    #[must_use]
    pub const fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Terminal phase of the beam state machine.
    #[must_use]
    pub const fn phase(&self) -> BeamPhase {
        self.phase
    }

    /// Splits the trace into its outcome and illumination map.
    #[must_use]
    pub fn into_parts(self) -> (SimulationResult, IlluminationMap) {
        (self.result, self.illumination)
    }
}

/// Ephemeral state of a beam in flight.
#[derive(Debug)]
struct BeamState {
    position: Option<Position>,
    direction: Direction,
    visited: HashSet<(Position, Direction)>,
    illumination: IlluminationMap,
    path: Vec<Position>,
}

impl BeamState {
    fn launch(emitter: Position, direction: Direction) -> Self {
        Self {
            position: emitter.step(direction),
            direction,
            visited: HashSet::new(),
            illumination: IlluminationMap::new(),
            path: Vec::new(),
        }
    }

    /// Processes the current cell and advances the beam by one step.
    fn advance(&mut self, grid: &GridView<'_>) -> BeamPhase {
        let Some(position) = self.position.filter(|position| grid.contains(*position)) else {
            return BeamPhase::Exited;
        };

        if !self.visited.insert((position, self.direction)) {
            return BeamPhase::Looped;
        }

        let phase = match grid.cell(position) {
            None => return BeamPhase::Exited,
            Some(Cell::Wall | Cell::Emitter) => return BeamPhase::Absorbed,
            Some(Cell::Target) => {
                self.illuminate(position);
                return BeamPhase::Reached;
            }
            Some(Cell::Empty) => {
                self.illuminate(position);
                BeamPhase::Traveling
            }
            Some(Cell::Mirror { orientation }) => {
                self.illuminate(position);
                self.direction = orientation.reflect(self.direction);
                BeamPhase::Reflecting
            }
        };

        self.position = position.step(self.direction);
        phase
    }

    fn illuminate(&mut self, position: Position) {
        self.illumination.record(position, self.direction);
        self.path.push(position);
    }

    fn finish(self, phase: BeamPhase) -> BeamTrace {
        let result = match phase {
            BeamPhase::Reached => SimulationResult::Success { path: self.path },
            BeamPhase::Absorbed => SimulationResult::Failure(TraceFailure::HitWall),
            BeamPhase::Looped => SimulationResult::Failure(TraceFailure::Looped),
            BeamPhase::Exited | BeamPhase::Traveling | BeamPhase::Reflecting => {
                SimulationResult::Failure(TraceFailure::OutOfBounds)
            }
        };
        let transitions = u32::try_from(self.visited.len()).unwrap_or(u32::MAX);

        BeamTrace {
            result,
            illumination: self.illumination,
            transitions,
            phase,
        }
    }
}

/// Traces a beam leaving `emitter` in `initial_direction` across the grid.
///
/// The trace starts on the cell adjacent to the emitter and never mutates the
/// grid. Termination is guaranteed because every visited
/// `(position, direction)` state is recorded and revisiting one ends the
/// trace as a loop.
#[must_use]
pub fn trace(grid: GridView<'_>, emitter: Position, initial_direction: Direction) -> BeamTrace {
    let mut beam = BeamState::launch(emitter, initial_direction);
    let phase = loop {
        let phase = beam.advance(&grid);
        if phase.is_terminal() {
            break phase;
        }
    };

    let trace = beam.finish(phase);
    debug!(
        "beam from {emitter} heading {initial_direction:?} ended {:?} after {} transitions",
        trace.phase(),
        trace.transitions()
    );
    trace
}

/// Pure system that keeps the latest beam trace in sync with the grid.
#[derive(Debug, Default)]
pub struct BeamTracer {
    latest: Option<BeamTrace>,
}

impl BeamTracer {
    /// Creates a tracer without a cached trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last computed trace, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&BeamTrace> {
        self.latest.as_ref()
    }

    /// Consumes world events and re-traces the beam when the grid changed.
    ///
    /// The trace is recomputed from scratch on every grid change; without a
    /// grid or emitter the cached trace is dropped.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: Option<GridView<'_>>,
        emitter: Option<Emitter>,
    ) -> Option<&BeamTrace> {
        let (Some(grid), Some(emitter)) = (grid, emitter) else {
            self.latest = None;
            return None;
        };

        let stale = self.latest.is_none() || events.iter().any(Event::changes_grid);
        if stale {
            self.latest = Some(trace(grid, emitter.position, emitter.direction));
        }

        self.latest.as_ref()
    }
}
