#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Blast engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative grid world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of connected same-color cells required for a selection to
/// have any effect.
pub const MIN_GROUP_SIZE: usize = 3;

/// Suggested pause between the fall and fill phases of a cascade.
///
/// Purely a presentation pacing hint for embedding frame loops that animate
/// falling entities; the engine never consults it and a headless caller may
/// run both phases back to back.
pub const DEFAULT_FILL_DELAY: Duration = Duration::from_millis(200);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests resolution of a player selection at the provided cell.
    SelectCell {
        /// Cell the player selected.
        cell: CellCoord,
    },
    /// Requests that entities in the column fall into vacancies below them.
    FallColumn {
        /// Zero-based index of the column to settle.
        column: u32,
    },
    /// Requests that a freshly created entity occupy a vacant cell.
    SpawnEntity {
        /// Cell the new entity should occupy.
        cell: CellCoord,
        /// Definition describing the entity to create.
        definition: EntityDefinition,
    },
}

/// Events broadcast by the world after processing commands.
///
/// Together these carry everything a presentation layer needs to animate a
/// resolution: the source cell of every mutation, its destination cell or the
/// fact of removal, and the kind of entity involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a selection produced a qualifying match group.
    MatchResolved {
        /// Cell the resolution started from.
        origin: CellCoord,
        /// Color shared by every cell in the match set.
        color: ColorKind,
        /// Connected same-color cells, in discovery order.
        matched: Vec<CellCoord>,
        /// Breakable cells orthogonally adjacent to the match set.
        fringe: Vec<CellCoord>,
    },
    /// Reports that an entity absorbed one unit of damage and survived.
    EntityDamaged {
        /// Cell occupied by the damaged entity.
        cell: CellCoord,
        /// Kind of the damaged entity.
        kind: EntityKind,
        /// Health remaining after the hit.
        remaining_health: u32,
    },
    /// Reports that damage reduced an entity to zero health and removed it.
    EntityDestroyed {
        /// Cell that held the destroyed entity; it is empty afterwards.
        cell: CellCoord,
        /// Kind of the destroyed entity.
        kind: EntityKind,
    },
    /// Announces the columns a resolution touched, in ascending index order.
    ColumnsDisturbed {
        /// Distinct column indices awaiting a fall pass.
        columns: Vec<u32>,
    },
    /// Confirms that an entity relocated downward within its column.
    EntityFell {
        /// Cell the entity vacated.
        from: CellCoord,
        /// Cell the entity occupies after falling.
        to: CellCoord,
        /// Kind of the relocated entity.
        kind: EntityKind,
    },
    /// Confirms that a fall pass over a column completed.
    ColumnSettled {
        /// Column the fall pass ran over.
        column: u32,
        /// Cells still vacant after falling, from the bottom row upward.
        vacancies: Vec<CellCoord>,
    },
    /// Confirms that a new entity occupied a vacant cell.
    EntitySpawned {
        /// Cell the entity was created in.
        cell: CellCoord,
        /// Definition the entity was created from.
        definition: EntityDefinition,
    },
    /// Announces that a disturbed column holds no vacancies anymore.
    ColumnRefilled {
        /// Column that returned to full occupancy.
        column: u32,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the bottom row of the grid, so falling entities move toward
/// decreasing row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the coordinate one step away in the provided direction.
    ///
    /// Steps that would leave the non-negative index space yield `None`.
    /// Upper bounds are the grid's concern: a coordinate past the far edge is
    /// representable here and simply resolves to no cell when looked up.
    #[must_use]
    pub fn offset_by(self, direction: Direction) -> Option<CellCoord> {
        let column = self
            .column
            .checked_add_signed(i32::from(direction.column_step()))?;
        let row = self.row.checked_add_signed(i32::from(direction.row_step()))?;
        Some(CellCoord::new(column, row))
    }
}

/// Directions relating a cell to its eight surrounding neighbors.
///
/// Matching, fringe discovery, and fill-time neighbor context only ever
/// consult [`Direction::ORTHOGONAL`]; the diagonal variants complete the
/// vocabulary for presentation layers that need it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward decreasing row indices.
    Down,
    /// Diagonal combining [`Direction::Left`] and [`Direction::Up`].
    LeftUp,
    /// Diagonal combining [`Direction::Right`] and [`Direction::Up`].
    RightUp,
    /// Diagonal combining [`Direction::Right`] and [`Direction::Down`].
    RightDown,
    /// Diagonal combining [`Direction::Left`] and [`Direction::Down`].
    LeftDown,
}

impl Direction {
    /// The four orthogonal directions, in the order matching visits them.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Signed column displacement of a single step in this direction.
    #[must_use]
    pub const fn column_step(self) -> i8 {
        match self {
            Direction::Left | Direction::LeftUp | Direction::LeftDown => -1,
            Direction::Up | Direction::Down => 0,
            Direction::Right | Direction::RightUp | Direction::RightDown => 1,
        }
    }

    /// Signed row displacement of a single step in this direction.
    #[must_use]
    pub const fn row_step(self) -> i8 {
        match self {
            Direction::Up | Direction::LeftUp | Direction::RightUp => 1,
            Direction::Left | Direction::Right => 0,
            Direction::Down | Direction::LeftDown | Direction::RightDown => -1,
        }
    }
}

/// Palette of matchable entity colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorKind {
    /// Red palette entry.
    Red,
    /// Green palette entry.
    Green,
    /// Blue palette entry.
    Blue,
    /// Yellow palette entry.
    Yellow,
    /// Purple palette entry.
    Purple,
}

impl ColorKind {
    /// Every color the engine can match, in canonical order.
    pub const PALETTE: [ColorKind; 5] = [
        ColorKind::Red,
        ColorKind::Green,
        ColorKind::Blue,
        ColorKind::Yellow,
        ColorKind::Purple,
    ];
}

/// Classifies the entity occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Matchable entity carrying a palette color.
    Color(ColorKind),
    /// Unmatchable entity damaged by adjacent qualifying matches.
    Breakable,
    /// Immovable entity that never matches and never takes damage.
    Obstacle,
}

impl EntityKind {
    /// Reports whether entities of this kind participate in flood-fill
    /// matching.
    #[must_use]
    pub const fn is_matchable(&self) -> bool {
        matches!(self, EntityKind::Color(_))
    }
}

/// Definition an external item-model lookup resolves a seed code or a
/// requested kind into.
///
/// Presentation data carried by the original item models is of no interest to
/// the engine and is intentionally absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityDefinition {
    kind: EntityKind,
    max_health: u32,
}

impl EntityDefinition {
    /// Creates a new entity definition.
    #[must_use]
    pub const fn new(kind: EntityKind, max_health: u32) -> Self {
        Self { kind, max_health }
    }

    /// Kind of entity this definition describes.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Health an entity created from this definition starts with.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }
}

/// Opaque per-cell code a level supplies for the entity catalog to interpret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedCode(u32);

impl SeedCode {
    /// Creates a new seed code wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying code value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Minimal level shape the engine consumes at grid construction.
///
/// Seed codes are stored row-major starting from the bottom row, matching the
/// cell coordinate convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    columns: u32,
    rows: u32,
    seeds: Vec<SeedCode>,
}

impl LevelData {
    /// Creates a new level description from raw dimensions and seed codes.
    ///
    /// The shape is validated when a world is constructed from it, not here,
    /// so deserialized levels can be carried around before use.
    #[must_use]
    pub fn new(columns: u32, rows: u32, seeds: Vec<SeedCode>) -> Self {
        Self {
            columns,
            rows,
            seeds,
        }
    }

    /// Number of columns the level declares.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows the level declares.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Seed codes in bottom-up row-major order.
    #[must_use]
    pub fn seeds(&self) -> &[SeedCode] {
        &self.seeds
    }

    /// Number of cells the declared dimensions require.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }
}

/// Reasons grid construction from level data may fail.
///
/// Construction failures are fatal and surface synchronously; no partial
/// grid is ever produced. Everything past construction follows the soft
/// no-op policy instead, since user-driven selection misses are expected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelDataError {
    /// The seed array does not cover the declared grid dimensions.
    #[error("level declares {columns}x{rows} cells but supplies {seeds} seed codes")]
    DimensionMismatch {
        /// Columns the level declared.
        columns: u32,
        /// Rows the level declared.
        rows: u32,
        /// Seed codes the level actually supplied.
        seeds: usize,
    },
    /// A seed code resolved to a definition no entity could live with.
    #[error("seed code {code} at column {column}, row {row} resolved to a zero-health definition")]
    LifelessDefinition {
        /// Code that produced the rejected definition.
        code: u32,
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
    },
}

/// Policy deciding whether obstacles block entities falling past them.
///
/// The original engine let entities fall straight through obstacle cells,
/// which reads as a gap rather than a decision. The rewrite names the choice:
/// [`ObstaclePolicy::Blocks`] is the intended default, and
/// [`ObstaclePolicy::Permeable`] reproduces the legacy behavior for levels
/// that depend on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstaclePolicy {
    /// Obstacles stop the downward search; cells above them keep their
    /// entities in place.
    Blocks,
    /// The downward search skips obstacle cells, letting entities fall
    /// through them.
    Permeable,
}

/// Ephemeral outcome of flood-fill matching from an origin cell.
///
/// Recomputed per selection and never persisted. Element order within the
/// member slices is discovery order, which is implementation-defined; callers
/// should assert membership, not position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    color: ColorKind,
    matched: Vec<CellCoord>,
    fringe: Vec<CellCoord>,
}

impl MatchResult {
    /// Creates a new match result from the anchor color and member cells.
    #[must_use]
    pub fn new(color: ColorKind, matched: Vec<CellCoord>, fringe: Vec<CellCoord>) -> Self {
        Self {
            color,
            matched,
            fringe,
        }
    }

    /// Color shared by every cell in the match set.
    #[must_use]
    pub const fn color(&self) -> ColorKind {
        self.color
    }

    /// Connected same-color cells reachable from the origin.
    #[must_use]
    pub fn matched(&self) -> &[CellCoord] {
        &self.matched
    }

    /// Breakable cells orthogonally adjacent to some match-set cell.
    #[must_use]
    pub fn fringe(&self) -> &[CellCoord] {
        &self.fringe
    }

    /// Reports whether the match set is large enough to take effect.
    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.matched.len() >= MIN_GROUP_SIZE
    }

    /// Distinct columns touched by the match set and fringe, ascending.
    #[must_use]
    pub fn disturbed_columns(&self) -> Vec<u32> {
        let mut columns: Vec<u32> = self
            .matched
            .iter()
            .chain(self.fringe.iter())
            .map(CellCoord::column)
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }
}
