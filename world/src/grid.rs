//! Cell and entity storage backing the authoritative grid.

use tile_blast_core::{CellCoord, EntityDefinition, EntityKind};

/// Entity occupying a single cell.
///
/// Kind and maximum health are fixed at creation; only current health
/// changes, and only downward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entity {
    kind: EntityKind,
    max_health: u32,
    health: u32,
}

impl Entity {
    /// Creates a full-health entity from an external definition.
    pub(crate) const fn from_definition(definition: EntityDefinition) -> Self {
        Self {
            kind: definition.kind(),
            max_health: definition.max_health(),
            health: definition.max_health(),
        }
    }

    pub(crate) const fn kind(&self) -> EntityKind {
        self.kind
    }

    pub(crate) const fn max_health(&self) -> u32 {
        self.max_health
    }

    pub(crate) const fn health(&self) -> u32 {
        self.health
    }

    /// Applies one unit of damage and reports whether the entity was
    /// destroyed. Health never goes below zero.
    pub(crate) fn damage(&mut self) -> bool {
        self.health = self.health.saturating_sub(1);
        self.health == 0
    }
}

/// What a cell currently holds.
///
/// Occupancy owns the entity directly, so "an occupied cell always has
/// exactly one entity and an empty or obstacle cell has none" holds by
/// construction rather than by discipline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CellContent {
    /// No entity; a candidate for falling and filling.
    Empty,
    /// Exactly one owned entity.
    Occupied(Entity),
    /// Immovable blocker fixed at grid construction.
    Obstacle,
}

/// A single addressable position in the grid.
///
/// Created once when the grid is built and alive for the whole level; the
/// coordinate never changes, only the content does.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    coord: CellCoord,
    content: CellContent,
}

impl Cell {
    pub(crate) const fn new(coord: CellCoord, content: CellContent) -> Self {
        Self { coord, content }
    }

    pub(crate) const fn coord(&self) -> CellCoord {
        self.coord
    }

    pub(crate) const fn content(&self) -> &CellContent {
        &self.content
    }

    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    pub(crate) const fn occupant(&self) -> Option<&Entity> {
        match &self.content {
            CellContent::Occupied(entity) => Some(entity),
            CellContent::Empty | CellContent::Obstacle => None,
        }
    }

    pub(crate) fn occupant_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.content {
            CellContent::Occupied(entity) => Some(entity),
            CellContent::Empty | CellContent::Obstacle => None,
        }
    }

    /// Releases the owned entity, leaving the cell empty.
    pub(crate) fn clear(&mut self) -> Option<Entity> {
        match std::mem::replace(&mut self.content, CellContent::Empty) {
            CellContent::Occupied(entity) => Some(entity),
            CellContent::Empty => None,
            // Obstacles are fixed at construction; put the marker back.
            CellContent::Obstacle => {
                self.content = CellContent::Obstacle;
                None
            }
        }
    }

    /// Takes ownership of an entity relocating or spawning into the cell.
    pub(crate) fn receive(&mut self, entity: Entity) {
        self.content = CellContent::Occupied(entity);
    }
}

/// Dense rectangular cell storage with bounds-checked lookup.
///
/// Out-of-range coordinates resolve to no cell rather than an error; "no
/// neighbor" is a normal outcome the matching and fall logic rely on.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len() as u64, u64::from(columns) * u64::from(rows));
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get_mut(index))
    }

    /// Iterates every cell in bottom-up row-major order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterates the cells of one column from the bottom row upward.
    pub(crate) fn column_cells(&self, column: u32) -> impl Iterator<Item = &Cell> {
        (0..self.rows).filter_map(move |row| self.cell(CellCoord::new(column, row)))
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.column() < self.columns && coord.row() < self.rows {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
