#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that translates pointer input into selection
//! commands.
//!
//! The system deliberately performs no occupied/matchable filtering of its
//! own: the world's `apply` entry point is the single authoritative filter,
//! and any upstream hit-test filtering is a performance optimization, not a
//! correctness dependency. What the system does own is selection
//! serialization: while a previous resolution's cascade is still in flight,
//! new selections are dropped so columns are never read in a transiently
//! inconsistent state.

use std::collections::BTreeSet;

use tile_blast_core::{CellCoord, Command, Event};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionInput {
    /// Indicates whether the pointer was released on this frame.
    pub pointer_released: bool,
    /// Cell the pointer resolved to, if it hit the grid at all.
    pub cursor_cell: Option<CellCoord>,
}

impl SelectionInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(pointer_released: bool, cursor_cell: Option<CellCoord>) -> Self {
        Self {
            pointer_released,
            cursor_cell,
        }
    }
}

/// Selection system that forwards pointer releases as selection commands.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    settling: BTreeSet<u32>,
}

impl Selection {
    /// Creates a new selection system with no cascade in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether a previous resolution's cascade is still settling.
    #[must_use]
    pub fn cascade_in_flight(&self) -> bool {
        !self.settling.is_empty()
    }

    /// Consumes world events and frame input to emit selection commands.
    ///
    /// Disturbed columns are tracked until they either settle with no
    /// vacancies or report a refill; input arriving in between is dropped.
    pub fn handle(&mut self, events: &[Event], input: SelectionInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ColumnsDisturbed { columns } => {
                    for column in columns {
                        let _ = self.settling.insert(*column);
                    }
                }
                Event::ColumnSettled { column, vacancies } if vacancies.is_empty() => {
                    let _ = self.settling.remove(column);
                }
                Event::ColumnRefilled { column } => {
                    let _ = self.settling.remove(column);
                }
                _ => {}
            }
        }

        if self.cascade_in_flight() || !input.pointer_released {
            return;
        }

        if let Some(cell) = input.cursor_cell {
            out.push(Command::SelectCell { cell });
        }
    }
}
