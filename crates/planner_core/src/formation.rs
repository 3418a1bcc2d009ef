//! The 7×7 formation grid.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::unit::{Unit, UnitId};

/// Rows and columns in a formation.
pub const GRID_SIZE: usize = 7;

/// Number of cells in a formation.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Identifier given to the working formation.
pub const DEFAULT_FORMATION_ID: &str = "1";

/// Character that separates fields in share links; never part of a name.
pub const RESERVED_NAME_CHAR: char = ';';

/// A validated grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    row: usize,
    col: usize,
}

impl GridPos {
    /// Validate a row/column pair.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfBounds`] unless both lie in 0..7.
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(PlannerError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    /// Position of the `index`th cell in row-major order.
    #[must_use]
    pub fn from_cell_index(index: usize) -> Option<Self> {
        Self::new(index / GRID_SIZE, index % GRID_SIZE).ok()
    }

    /// Row (0-based).
    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    /// Column (0-based).
    #[must_use]
    pub const fn col(self) -> usize {
        self.col
    }

    /// Row-major cell index.
    #[must_use]
    pub const fn cell_index(self) -> usize {
        self.row() * GRID_SIZE + self.col()
    }

    /// All positions in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_CELLS).filter_map(Self::from_cell_index)
    }
}

/// Remove the reserved separator and surrounding whitespace from a name.
#[must_use]
pub fn sanitize_formation_name(name: &str) -> String {
    name.replace(RESERVED_NAME_CHAR, "").trim().to_string()
}

/// A named formation grid with its total power.
///
/// `power` is recomputed from the occupied cells on every write; it is
/// never adjusted incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Formation {
    id: String,
    name: String,
    tiles: Vec<Option<Unit>>,
    power: u32,
}

impl Formation {
    /// Create an empty formation.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tiles: vec![None; GRID_CELLS],
            power: 0,
        }
    }

    /// Formation identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sum of placed units' power.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.power
    }

    /// Unit at `pos`, if any.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Option<&Unit> {
        self.tiles[pos.cell_index()].as_ref()
    }

    /// Put `unit` at `pos` (or clear it) and return the previous occupant.
    pub fn set_tile(&mut self, pos: GridPos, unit: Option<Unit>) -> Option<Unit> {
        let previous = std::mem::replace(&mut self.tiles[pos.cell_index()], unit);
        self.recompute_power();
        previous
    }

    /// Exchange the contents of two cells.
    pub fn swap_tiles(&mut self, a: GridPos, b: GridPos) {
        self.tiles.swap(a.cell_index(), b.cell_index());
        self.recompute_power();
    }

    /// Remove every unit, returning them in row-major order.
    pub fn take_all(&mut self) -> Vec<Unit> {
        let units = self.tiles.iter_mut().filter_map(Option::take).collect();
        self.recompute_power();
        units
    }

    /// Apply `f` to the unit at `pos`, then recompute power.
    pub fn modify_tile<T>(&mut self, pos: GridPos, f: impl FnOnce(&mut Unit) -> T) -> Option<T> {
        let result = self.tiles[pos.cell_index()].as_mut().map(f);
        self.recompute_power();
        result
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, Option<&Unit>)> {
        GridPos::all().map(move |pos| (pos, self.tile(pos)))
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (GridPos, &Unit)> {
        self.cells().filter_map(|(pos, unit)| unit.map(|u| (pos, u)))
    }

    /// Number of placed units.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.tiles.iter().flatten().count()
    }

    /// Whether no unit is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(Option::is_none)
    }

    /// Locate a placed unit by id.
    #[must_use]
    pub fn position_of(&self, id: &UnitId) -> Option<GridPos> {
        self.occupied()
            .find(|(_, unit)| unit.id() == id)
            .map(|(pos, _)| pos)
    }

    /// Independently recompute the power total from the grid.
    #[must_use]
    pub fn calculate_power(&self) -> u32 {
        self.tiles.iter().flatten().map(Unit::power).sum()
    }

    fn recompute_power(&mut self) {
        self.power = self.calculate_power();
    }
}
