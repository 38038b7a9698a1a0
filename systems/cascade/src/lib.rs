#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure cascade sequencing system with an explicit two-phase surface.
//!
//! The original engine refilled columns through a deferred timed callback
//! baked into the grid logic. Here the embedding frame loop owns the
//! sequencing instead: it calls [`Cascade::fall`] with the resolution
//! events, applies the resulting commands, waits whatever pause suits its
//! presentation ([`tile_blast_core::DEFAULT_FILL_DELAY`] is a reasonable
//! choice), and then calls [`Cascade::fill`] with the settle events. A
//! headless caller or test harness simply runs both phases back to back.

use tile_blast_core::{CellCoord, Command, EntityDefinition, Event};

/// Pure system translating cascade events into fall and fill commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cascade;

impl Cascade {
    /// Creates a new cascade system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Maps each disturbance announcement into per-column fall commands.
    ///
    /// Columns are emitted in the announced order, which the world already
    /// sorts ascending, so cascade outcomes stay reproducible.
    pub fn fall(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::ColumnsDisturbed { columns } = event {
                for column in columns {
                    out.push(Command::FallColumn { column: *column });
                }
            }
        }
    }

    /// Maps each settle report into one spawn command per remaining vacancy.
    ///
    /// Replacement definitions come from the caller-supplied provider,
    /// typically closing over the world's neighbor context and a seeded
    /// generation system.
    pub fn fill<F>(&self, events: &[Event], mut definition_for: F, out: &mut Vec<Command>)
    where
        F: FnMut(CellCoord) -> EntityDefinition,
    {
        for event in events {
            if let Event::ColumnSettled { vacancies, .. } = event {
                for cell in vacancies {
                    out.push(Command::SpawnEntity {
                        cell: *cell,
                        definition: definition_for(*cell),
                    });
                }
            }
        }
    }
}
