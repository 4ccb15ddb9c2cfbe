//! Plain-text picture of a grid with the traced beam overlaid.

use mirror_maze_core::{Cell, GridView, IlluminationMap, Position};

/// Draws one line per grid row.
///
/// Lit empty cells show `-` for horizontal passes, `|` for vertical passes
/// and `+` where the beam crossed itself.
pub(crate) fn render(grid: GridView<'_>, illumination: &IlluminationMap) -> String {
    let size = grid.size();
    let mut out = String::new();
    for y in 0..size {
        for x in 0..size {
            let position = Position::new(x, y);
            out.push(glyph(grid.cell(position), illumination, position));
        }
        out.push('\n');
    }
    out
}

fn glyph(cell: Option<Cell>, illumination: &IlluminationMap, position: Position) -> char {
    match cell {
        Some(Cell::Wall) => '#',
        Some(Cell::Emitter) => 'E',
        Some(Cell::Target) => 'T',
        Some(Cell::Mirror { orientation }) => orientation.glyph(),
        Some(Cell::Empty) | None => {
            let directions = illumination.directions(position);
            let horizontal = directions.iter().any(|direction| direction.is_horizontal());
            let vertical = directions.iter().any(|direction| !direction.is_horizontal());
            match (horizontal, vertical) {
                (true, true) => '+',
                (true, false) => '-',
                (false, true) => '|',
                (false, false) => '.',
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_maze_core::{Direction, MirrorOrientation};

    #[test]
    fn draws_beam_segments_and_fixed_cells() {
        let cells = [
            Cell::Emitter,
            Cell::Empty,
            Cell::Mirror {
                orientation: MirrorOrientation::Backward,
            },
            Cell::Wall,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Target,
        ];
        let mut illumination = IlluminationMap::new();
        illumination.record(Position::new(1, 0), Direction::Right);
        illumination.record(Position::new(2, 0), Direction::Right);
        illumination.record(Position::new(2, 1), Direction::Down);
        illumination.record(Position::new(1, 1), Direction::Left);
        illumination.record(Position::new(1, 1), Direction::Up);

        let picture = render(GridView::new(&cells, 3), &illumination);

        assert_eq!(picture, "E-\\\n#+|\n..T\n");
    }
}
