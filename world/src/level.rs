//! Level validation that turns level files into playable grids.

use mirror_maze_core::{Cell, Emitter, InvalidLevel, LevelDefinition, MirrorOrientation, Position};

use crate::grid::Grid;

/// Validated level ready to be played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    name: String,
    grid: Grid,
    emitter: Emitter,
    target: Position,
}

impl Level {
    /// Validates the definition and builds the level's initial grid.
    ///
    /// Every non-empty glyph becomes part of the fixed configuration.
    pub fn from_definition(definition: &LevelDefinition) -> Result<Self, InvalidLevel> {
        if definition.rows.is_empty() {
            return Err(InvalidLevel::EmptyGrid);
        }

        let size = u32::try_from(definition.rows.len()).unwrap_or(u32::MAX);
        let mut layout = Grid::builder(size, definition.max_mirrors);
        let mut emitter = None;
        let mut target = None;

        for (row, line) in (0..size).zip(&definition.rows) {
            let found = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
            if found != size {
                return Err(InvalidLevel::NotSquare {
                    row,
                    expected: size,
                    found,
                });
            }

            for (column, glyph) in (0..size).zip(line.chars()) {
                let position = Position::new(column, row);
                let cell = parse_glyph(glyph)
                    .ok_or(InvalidLevel::UnknownGlyph { glyph, position })?;
                match cell {
                    Cell::Emitter if emitter.is_some() => {
                        return Err(InvalidLevel::DuplicateEmitter { position });
                    }
                    Cell::Emitter => emitter = Some(position),
                    Cell::Target if target.is_some() => {
                        return Err(InvalidLevel::DuplicateTarget { position });
                    }
                    Cell::Target => target = Some(position),
                    _ => {}
                }
                layout = layout.cell(position, cell);
            }
        }

        let emitter = emitter.ok_or(InvalidLevel::MissingEmitter)?;
        let target = target.ok_or(InvalidLevel::MissingTarget)?;

        Ok(Self {
            name: definition.name.clone(),
            grid: layout.build(),
            emitter: Emitter {
                position: emitter,
                direction: definition.emitter_direction,
            },
            target,
        })
    }

    /// Human readable level title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid in its initial configuration.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Beam source of the level.
    #[must_use]
    pub const fn emitter(&self) -> Emitter {
        self.emitter
    }

    /// Cell the beam must reach.
    #[must_use]
    pub const fn target(&self) -> Position {
        self.target
    }
}

fn parse_glyph(glyph: char) -> Option<Cell> {
    match glyph {
        '.' => Some(Cell::Empty),
        '#' => Some(Cell::Wall),
        'E' => Some(Cell::Emitter),
        'T' => Some(Cell::Target),
        other => {
            MirrorOrientation::from_glyph(other).map(|orientation| Cell::Mirror { orientation })
        }
    }
}
