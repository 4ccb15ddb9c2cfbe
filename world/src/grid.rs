//! Owning square grid with the pure mirror mutation rules.

use mirror_maze_core::{Cell, GridView, MirrorOrientation, PlacementError, Position};

/// Dense square grid of cells stored in row-major order.
///
/// Alongside the cells the grid remembers which cells belong to the level's
/// fixed configuration and how many mirrors the player may add. Every mutation
/// returns a new grid and leaves `self` untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<Cell>,
    fixed: Vec<bool>,
    mirror_limit: u32,
}

impl Grid {
    /// Creates an empty grid with `size` cells per edge.
    #[must_use]
    pub fn new(size: u32, mirror_limit: u32) -> Self {
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            size,
            cells: vec![Cell::Empty; capacity],
            fixed: vec![false; capacity],
            mirror_limit,
        }
    }

    /// Starts a grid whose fixed configuration is laid out cell by cell.
    #[must_use]
    pub fn builder(size: u32, mirror_limit: u32) -> GridBuilder {
        GridBuilder {
            grid: Self::new(size, mirror_limit),
        }
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Borrows the cells as a read-only view for systems.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    /// Returns the cell at the provided position, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|index| self.cells[index])
    }

    /// Reports whether the cell belongs to the level's fixed configuration.
    #[must_use]
    pub fn is_fixed(&self, position: Position) -> bool {
        self.index(position).map_or(false, |index| self.fixed[index])
    }

    /// Maximum number of mirrors the player may place.
    #[must_use]
    pub const fn mirror_limit(&self) -> u32 {
        self.mirror_limit
    }

    /// Number of mirrors currently placed by the player.
    #[must_use]
    pub fn player_mirror_count(&self) -> u32 {
        let count = self
            .cells
            .iter()
            .zip(&self.fixed)
            .filter(|(cell, fixed)| !**fixed && cell.mirror_orientation().is_some())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of mirrors the player may still place.
    #[must_use]
    pub fn mirrors_remaining(&self) -> u32 {
        self.mirror_limit
            .saturating_sub(self.player_mirror_count())
    }

    /// Player-placed mirrors in row-major order.
    #[must_use]
    pub fn player_mirrors(&self) -> Vec<(Position, MirrorOrientation)> {
        self.view()
            .iter()
            .filter(|(position, _)| !self.is_fixed(*position))
            .filter_map(|(position, cell)| {
                cell.mirror_orientation()
                    .map(|orientation| (position, orientation))
            })
            .collect()
    }

    /// Places a player mirror on an empty cell.
    pub fn place_mirror(
        &self,
        position: Position,
        orientation: MirrorOrientation,
    ) -> Result<Self, PlacementError> {
        let index = self
            .index(position)
            .ok_or(PlacementError::InvalidPlacement)?;
        if self.cells[index] != Cell::Empty {
            return Err(PlacementError::InvalidPlacement);
        }
        if self.player_mirror_count() >= self.mirror_limit {
            return Err(PlacementError::MirrorLimitReached);
        }

        let mut next = self.clone();
        next.cells[index] = Cell::Mirror { orientation };
        Ok(next)
    }

    /// Removes a player mirror, leaving the cell empty.
    pub fn remove_mirror(&self, position: Position) -> Result<Self, PlacementError> {
        let index = self.player_mirror_index(position)?;
        let mut next = self.clone();
        next.cells[index] = Cell::Empty;
        Ok(next)
    }

    /// Flips a player mirror between `/` and `\`.
    pub fn rotate_mirror(&self, position: Position) -> Result<Self, PlacementError> {
        let index = self.player_mirror_index(position)?;
        let mut next = self.clone();
        if let Cell::Mirror { orientation } = &mut next.cells[index] {
            *orientation = orientation.rotated();
        }
        Ok(next)
    }

    fn player_mirror_index(&self, position: Position) -> Result<usize, PlacementError> {
        let index = self
            .index(position)
            .ok_or(PlacementError::InvalidPlacement)?;
        if self.fixed[index] {
            return Err(PlacementError::ImmutableCell);
        }
        if self.cells[index].mirror_orientation().is_none() {
            return Err(PlacementError::InvalidPlacement);
        }
        Ok(index)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.x() < self.size && position.y() < self.size {
            let row = usize::try_from(position.y()).ok()?;
            let column = usize::try_from(position.x()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Lays out the fixed cells of a grid before it is handed out.
///
/// A finished [`Grid`] only changes through the player mirror operations, so
/// fixed cells can never be overwritten after construction.
#[derive(Debug)]
pub struct GridBuilder {
    grid: Grid,
}

impl GridBuilder {
    /// Stores `cell` as part of the fixed configuration.
    ///
    /// Positions outside the grid are ignored.
    #[must_use]
    pub fn cell(mut self, position: Position, cell: Cell) -> Self {
        if let Some(index) = self.grid.index(position) {
            self.grid.cells[index] = cell;
            self.grid.fixed[index] = cell != Cell::Empty;
        }
        self
    }

    /// Finishes the layout.
    #[must_use]
    pub fn build(self) -> Grid {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty_and_unfixed() {
        let grid = Grid::new(3, 1);
        assert_eq!(grid.view().iter().count(), 9);
        assert!(grid.view().iter().all(|(_, cell)| cell == Cell::Empty));
        assert!(!grid.is_fixed(Position::new(1, 1)));
    }

    #[test]
    fn builder_ignores_positions_outside_grid() {
        let grid = Grid::builder(2, 0)
            .cell(Position::new(5, 0), Cell::Wall)
            .build();
        assert_eq!(grid, Grid::new(2, 0));
    }

    #[test]
    fn fixed_mirrors_do_not_count_against_limit() {
        let grid = Grid::builder(3, 1)
            .cell(
                Position::new(0, 0),
                Cell::Mirror {
                    orientation: MirrorOrientation::Forward,
                },
            )
            .build();
        assert_eq!(grid.player_mirror_count(), 0);
        assert_eq!(grid.mirrors_remaining(), 1);
    }

    #[test]
    fn rotate_flips_orientation_without_spending_budget() {
        let grid = Grid::new(3, 1)
            .place_mirror(Position::new(1, 1), MirrorOrientation::Forward)
            .expect("place");
        let rotated = grid.rotate_mirror(Position::new(1, 1)).expect("rotate");

        assert_eq!(
            rotated.cell(Position::new(1, 1)),
            Some(Cell::Mirror {
                orientation: MirrorOrientation::Backward
            })
        );
        assert_eq!(rotated.player_mirror_count(), 1);
    }

    #[test]
    fn player_mirrors_lists_only_placed_mirrors() {
        let grid = Grid::builder(3, 2)
            .cell(
                Position::new(0, 0),
                Cell::Mirror {
                    orientation: MirrorOrientation::Backward,
                },
            )
            .build()
            .place_mirror(Position::new(2, 1), MirrorOrientation::Forward)
            .expect("place");

        assert_eq!(
            grid.player_mirrors(),
            vec![(Position::new(2, 1), MirrorOrientation::Forward)]
        );
    }
}
