#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Tile Blast.
//!
//! The world owns the rectangular cell grid and is mutated exclusively
//! through [`apply`]. Selections resolve synchronously: the match is
//! computed, damage lands, and destroyed cells are empty the instant their
//! entity reaches zero health. The cascade that restores occupancy is split
//! into explicit fall and fill commands so the embedding frame loop owns any
//! pacing between the phases.

mod grid;
mod matching;

use tile_blast_core::{
    CellCoord, Command, EntityDefinition, EntityKind, Event, LevelData, LevelDataError,
    ObstaclePolicy, SeedCode,
};

use crate::grid::{Cell, CellContent, Entity, Grid};

/// Represents the authoritative Tile Blast grid state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    obstacle_policy: ObstaclePolicy,
}

impl World {
    /// Builds a world from level data, consulting the entity catalog once per
    /// cell to translate seed codes into initial entities.
    ///
    /// A catalog returning `None` marks the cell intentionally empty; an
    /// obstacle definition fixes the cell as an obstacle for the lifetime of
    /// the level. Fails with [`LevelDataError`] when the seed array does not
    /// cover the declared dimensions or a code resolves to a definition no
    /// entity could live with; no partial world is produced.
    pub fn from_level<F>(
        level: &LevelData,
        obstacle_policy: ObstaclePolicy,
        mut catalog: F,
    ) -> Result<Self, LevelDataError>
    where
        F: FnMut(SeedCode) -> Option<EntityDefinition>,
    {
        let dimension_mismatch = LevelDataError::DimensionMismatch {
            columns: level.columns(),
            rows: level.rows(),
            seeds: level.seeds().len(),
        };
        let cell_count =
            usize::try_from(level.cell_count()).map_err(|_| dimension_mismatch.clone())?;
        if level.seeds().len() != cell_count {
            return Err(dimension_mismatch);
        }

        let mut cells = Vec::with_capacity(cell_count);
        for (index, code) in level.seeds().iter().copied().enumerate() {
            let row = index as u32 / level.columns();
            let column = index as u32 % level.columns();
            let content = match catalog(code) {
                None => CellContent::Empty,
                Some(definition) => match definition.kind() {
                    EntityKind::Obstacle => CellContent::Obstacle,
                    EntityKind::Color(_) | EntityKind::Breakable => {
                        if definition.max_health() == 0 {
                            return Err(LevelDataError::LifelessDefinition {
                                code: code.get(),
                                column,
                                row,
                            });
                        }
                        CellContent::Occupied(Entity::from_definition(definition))
                    }
                },
            };
            cells.push(Cell::new(CellCoord::new(column, row), content));
        }

        Ok(Self {
            grid: Grid::new(level.columns(), level.rows(), cells),
            obstacle_policy,
        })
    }

    fn resolve_selection(&mut self, origin: CellCoord, out_events: &mut Vec<Event>) {
        // Selection sources are imprecise; anything unmatchable is a quiet
        // miss rather than an error. This is the single authoritative filter.
        let Some(result) = matching::flood_fill(&self.grid, origin) else {
            return;
        };
        if !result.qualifies() {
            return;
        }

        out_events.push(Event::MatchResolved {
            origin,
            color: result.color(),
            matched: result.matched().to_vec(),
            fringe: result.fringe().to_vec(),
        });

        let columns = result.disturbed_columns();
        let affected: Vec<CellCoord> = result
            .matched()
            .iter()
            .chain(result.fringe().iter())
            .copied()
            .collect();
        for coord in affected {
            self.damage_cell(coord, out_events);
        }

        out_events.push(Event::ColumnsDisturbed { columns });
    }

    fn damage_cell(&mut self, coord: CellCoord, out_events: &mut Vec<Event>) {
        let Some(cell) = self.grid.cell_mut(coord) else {
            return;
        };
        let Some(entity) = cell.occupant_mut() else {
            return;
        };
        let kind = entity.kind();
        let destroyed = entity.damage();
        let remaining_health = entity.health();
        if destroyed {
            // Removal is synchronous: the cell is empty and eligible for the
            // cascade the instant health reaches zero. Any destruction delay
            // is a presentation concern downstream of the event.
            let _ = cell.clear();
            out_events.push(Event::EntityDestroyed { cell: coord, kind });
        } else {
            out_events.push(Event::EntityDamaged {
                cell: coord,
                kind,
                remaining_health,
            });
        }
    }

    fn fall_column(&mut self, column: u32, out_events: &mut Vec<Event>) {
        if column >= self.grid.columns() {
            return;
        }

        for row in 0..self.grid.rows() {
            let destination = CellCoord::new(column, row);
            if !self.grid.cell(destination).is_some_and(Cell::is_empty) {
                continue;
            }
            let Some(source) = self.first_occupant_above(destination) else {
                continue;
            };
            let Some(entity) = self.grid.cell_mut(source).and_then(Cell::clear) else {
                continue;
            };
            let kind = entity.kind();
            if let Some(cell) = self.grid.cell_mut(destination) {
                cell.receive(entity);
                out_events.push(Event::EntityFell {
                    from: source,
                    to: destination,
                    kind,
                });
            }
        }

        out_events.push(Event::ColumnSettled {
            column,
            vacancies: self.vacancies(column),
        });
    }

    /// Nearest occupied cell above `below` in the same column, honoring the
    /// configured obstacle policy.
    fn first_occupant_above(&self, below: CellCoord) -> Option<CellCoord> {
        for row in below.row() + 1..self.grid.rows() {
            let candidate = CellCoord::new(below.column(), row);
            match self.grid.cell(candidate)?.content() {
                CellContent::Occupied(_) => return Some(candidate),
                CellContent::Obstacle => match self.obstacle_policy {
                    ObstaclePolicy::Blocks => return None,
                    ObstaclePolicy::Permeable => {}
                },
                CellContent::Empty => {}
            }
        }
        None
    }

    fn spawn_entity(
        &mut self,
        coord: CellCoord,
        definition: EntityDefinition,
        out_events: &mut Vec<Event>,
    ) {
        // Providers contract to return a live matchable kind; anything else
        // is dropped under the same soft policy as a stray selection.
        if !definition.kind().is_matchable() || definition.max_health() == 0 {
            return;
        }
        let Some(cell) = self.grid.cell_mut(coord) else {
            return;
        };
        if !cell.is_empty() {
            return;
        }
        cell.receive(Entity::from_definition(definition));
        out_events.push(Event::EntitySpawned {
            cell: coord,
            definition,
        });
        if self.vacancies(coord.column()).is_empty() {
            out_events.push(Event::ColumnRefilled {
                column: coord.column(),
            });
        }
    }

    /// Empty cells of a column from the bottom row upward.
    fn vacancies(&self, column: u32) -> Vec<CellCoord> {
        self.grid
            .column_cells(column)
            .filter(|cell| cell.is_empty())
            .map(Cell::coord)
            .collect()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectCell { cell } => world.resolve_selection(cell, out_events),
        Command::FallColumn { column } => world.fall_column(column, out_events),
        Command::SpawnEntity { cell, definition } => {
            world.spawn_entity(cell, definition, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{matching, Cell, CellContent, World};
    use tile_blast_core::{CellCoord, Direction, EntityKind, MatchResult, ObstaclePolicy};

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Fall policy the world was constructed with.
    #[must_use]
    pub fn obstacle_policy(world: &World) -> ObstaclePolicy {
        world.obstacle_policy
    }

    /// Snapshot of the cell at the provided coordinate.
    ///
    /// Out-of-range coordinates resolve to `None`; neighbor logic treats
    /// that as "no neighbor", never as an error.
    #[must_use]
    pub fn cell(world: &World, coord: CellCoord) -> Option<CellSnapshot> {
        world.grid.cell(coord).map(|cell| match cell.content() {
            CellContent::Empty => CellSnapshot::Empty,
            CellContent::Obstacle => CellSnapshot::Obstacle,
            CellContent::Occupied(entity) => CellSnapshot::Occupied(EntitySnapshot {
                kind: entity.kind(),
                max_health: entity.max_health(),
                health: entity.health(),
            }),
        })
    }

    /// Computes the ephemeral match probe from the origin cell.
    ///
    /// `None` unless the origin is occupied by a matchable color entity.
    /// Recomputed per call; nothing is cached or persisted.
    #[must_use]
    pub fn find_match(world: &World, origin: CellCoord) -> Option<MatchResult> {
        matching::flood_fill(&world.grid, origin)
    }

    /// Kinds of the entities occupying the four orthogonal neighbors.
    ///
    /// Fill-time context for replacement providers; empty and obstacle
    /// neighbors contribute nothing.
    #[must_use]
    pub fn orthogonal_neighbor_kinds(world: &World, cell: CellCoord) -> Vec<EntityKind> {
        Direction::ORTHOGONAL
            .iter()
            .filter_map(|direction| cell.offset_by(*direction))
            .filter_map(|neighbor| world.grid.cell(neighbor))
            .filter_map(Cell::occupant)
            .map(super::Entity::kind)
            .collect()
    }

    /// Empty cells of a column from the bottom row upward.
    #[must_use]
    pub fn vacancies_in_column(world: &World, column: u32) -> Vec<CellCoord> {
        world.vacancies(column)
    }

    /// Reports whether the grid holds no empty cells at all.
    #[must_use]
    pub fn is_settled(world: &World) -> bool {
        !world.grid.iter().any(Cell::is_empty)
    }

    /// Snapshot of a single cell's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CellSnapshot {
        /// The cell holds no entity.
        Empty,
        /// The cell owns the described entity.
        Occupied(EntitySnapshot),
        /// The cell is fixed as an immovable obstacle.
        Obstacle,
    }

    /// Immutable representation of a single entity's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Kind of the occupying entity.
        pub kind: EntityKind,
        /// Health the entity started with.
        pub max_health: u32,
        /// Health the entity currently has.
        pub health: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use tile_blast_core::{
        CellCoord, ColorKind, Command, EntityDefinition, EntityKind, Event, LevelData,
        LevelDataError, ObstaclePolicy, SeedCode,
    };

    // Seed vocabulary used by the test catalog: 0 empty, 1-5 one-health
    // palette colors, 6 two-health breakable, 7 obstacle, 8 two-health red,
    // 9 deliberately lifeless.
    fn catalog(code: SeedCode) -> Option<EntityDefinition> {
        match code.get() {
            1 => Some(EntityDefinition::new(EntityKind::Color(ColorKind::Red), 1)),
            2 => Some(EntityDefinition::new(EntityKind::Color(ColorKind::Green), 1)),
            3 => Some(EntityDefinition::new(EntityKind::Color(ColorKind::Blue), 1)),
            4 => Some(EntityDefinition::new(
                EntityKind::Color(ColorKind::Yellow),
                1,
            )),
            5 => Some(EntityDefinition::new(
                EntityKind::Color(ColorKind::Purple),
                1,
            )),
            6 => Some(EntityDefinition::new(EntityKind::Breakable, 2)),
            7 => Some(EntityDefinition::new(EntityKind::Obstacle, 1)),
            8 => Some(EntityDefinition::new(EntityKind::Color(ColorKind::Red), 2)),
            9 => Some(EntityDefinition::new(EntityKind::Color(ColorKind::Red), 0)),
            _ => None,
        }
    }

    fn level(columns: u32, rows: u32, codes: &[u32]) -> LevelData {
        LevelData::new(
            columns,
            rows,
            codes.iter().copied().map(SeedCode::new).collect(),
        )
    }

    fn world_from(columns: u32, rows: u32, codes: &[u32]) -> World {
        World::from_level(
            &level(columns, rows, codes),
            ObstaclePolicy::Blocks,
            catalog,
        )
        .expect("valid test level")
    }

    fn select(world: &mut World, cell: CellCoord) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::SelectCell { cell }, &mut events);
        events
    }

    fn occupied_color(world: &World, coord: CellCoord) -> Option<ColorKind> {
        match query::cell(world, coord)? {
            query::CellSnapshot::Occupied(entity) => match entity.kind {
                EntityKind::Color(color) => Some(color),
                _ => None,
            },
            _ => None,
        }
    }

    #[test]
    fn construction_rejects_mismatched_seed_dimensions() {
        let result = World::from_level(&level(3, 2, &[1, 1, 1, 1]), ObstaclePolicy::Blocks, catalog);
        assert_eq!(
            result.err(),
            Some(LevelDataError::DimensionMismatch {
                columns: 3,
                rows: 2,
                seeds: 4,
            })
        );
    }

    #[test]
    fn construction_rejects_lifeless_definitions() {
        let result = World::from_level(&level(2, 1, &[1, 9]), ObstaclePolicy::Blocks, catalog);
        assert_eq!(
            result.err(),
            Some(LevelDataError::LifelessDefinition {
                code: 9,
                column: 1,
                row: 0,
            })
        );
    }

    #[test]
    fn seeds_translate_into_the_three_cell_states() {
        let world = world_from(3, 1, &[1, 0, 7]);
        assert!(matches!(
            query::cell(&world, CellCoord::new(0, 0)),
            Some(query::CellSnapshot::Occupied(_))
        ));
        assert_eq!(
            query::cell(&world, CellCoord::new(1, 0)),
            Some(query::CellSnapshot::Empty)
        );
        assert_eq!(
            query::cell(&world, CellCoord::new(2, 0)),
            Some(query::CellSnapshot::Obstacle)
        );
        assert_eq!(query::cell(&world, CellCoord::new(3, 0)), None);
    }

    #[test]
    fn selections_on_unmatchable_cells_are_quiet_no_ops() {
        let mut world = world_from(4, 1, &[0, 6, 7, 1]);
        for column in 0..5 {
            let events = select(&mut world, CellCoord::new(column, 0));
            assert!(events.is_empty(), "column {column} should be a no-op");
        }
        // The breakable kept both health points through all of it.
        assert_eq!(
            query::cell(&world, CellCoord::new(1, 0)),
            Some(query::CellSnapshot::Occupied(query::EntitySnapshot {
                kind: EntityKind::Breakable,
                max_health: 2,
                health: 2,
            }))
        );
    }

    #[test]
    fn below_threshold_matches_leave_adjacent_breakables_untouched() {
        // Two reds with a breakable neighbor: below the group minimum,
        // so even the fringe takes zero damage.
        let mut world = world_from(3, 1, &[1, 1, 6]);
        let events = select(&mut world, CellCoord::new(0, 0));
        assert!(events.is_empty());
        assert_eq!(
            query::cell(&world, CellCoord::new(2, 0)),
            Some(query::CellSnapshot::Occupied(query::EntitySnapshot {
                kind: EntityKind::Breakable,
                max_health: 2,
                health: 2,
            }))
        );
    }

    #[test]
    fn qualifying_line_destroys_every_member() {
        let mut world = world_from(3, 2, &[1, 1, 1, 2, 3, 2]);
        let events = select(&mut world, CellCoord::new(0, 0));

        let destroyed: Vec<CellCoord> = events
            .iter()
            .filter_map(|event| match event {
                Event::EntityDestroyed { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();
        let mut sorted = destroyed.clone();
        sorted.sort();
        assert_eq!(
            sorted,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
            ]
        );
        for cell in sorted {
            assert_eq!(query::cell(&world, cell), Some(query::CellSnapshot::Empty));
        }

        assert!(events.iter().any(|event| matches!(
            event,
            Event::ColumnsDisturbed { columns } if columns == &vec![0, 1, 2]
        )));
        // The row above is untouched.
        assert_eq!(occupied_color(&world, CellCoord::new(0, 1)), Some(ColorKind::Green));
        assert_eq!(occupied_color(&world, CellCoord::new(1, 1)), Some(ColorKind::Blue));
    }

    #[test]
    fn fringe_breakables_take_exactly_one_damage_unit() {
        // Breakable above the middle of a qualifying red row.
        let mut world = world_from(3, 2, &[1, 1, 1, 0, 6, 0]);
        let events = select(&mut world, CellCoord::new(1, 0));

        let fringe_hit = events.iter().any(|event| {
            matches!(
                event,
                Event::EntityDamaged {
                    cell,
                    kind: EntityKind::Breakable,
                    remaining_health: 1,
                } if *cell == CellCoord::new(1, 1)
            )
        });
        assert!(fringe_hit, "breakable should absorb one unit: {events:?}");
        assert!(!events.iter().any(|event| matches!(
            event,
            Event::EntityDestroyed { cell, .. } if *cell == CellCoord::new(1, 1)
        )));
    }

    #[test]
    fn surviving_entities_still_disturb_their_columns() {
        // Two-health reds: the group qualifies, nobody dies, yet the
        // columns are still scheduled for a (no-op) cascade pass.
        let mut world = world_from(3, 1, &[8, 8, 8]);
        let events = select(&mut world, CellCoord::new(1, 0));

        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::EntityDamaged { .. }))
                .count(),
            3
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ColumnsDisturbed { columns } if columns == &vec![0, 1, 2]
        )));
        assert_eq!(occupied_color(&world, CellCoord::new(0, 0)), Some(ColorKind::Red));
    }

    #[test]
    fn fall_preserves_relative_vertical_order() {
        // Column 0 bottom-up: empty, green, empty, blue.
        let mut world = world_from(1, 4, &[0, 2, 0, 3]);
        let mut events = Vec::new();
        apply(&mut world, Command::FallColumn { column: 0 }, &mut events);

        assert_eq!(occupied_color(&world, CellCoord::new(0, 0)), Some(ColorKind::Green));
        assert_eq!(occupied_color(&world, CellCoord::new(0, 1)), Some(ColorKind::Blue));
        assert_eq!(
            query::vacancies_in_column(&world, 0),
            vec![CellCoord::new(0, 2), CellCoord::new(0, 3)]
        );

        let falls: Vec<(CellCoord, CellCoord)> = events
            .iter()
            .filter_map(|event| match event {
                Event::EntityFell { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            falls,
            vec![
                (CellCoord::new(0, 1), CellCoord::new(0, 0)),
                (CellCoord::new(0, 3), CellCoord::new(0, 1)),
            ]
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ColumnSettled { column: 0, vacancies }
                if vacancies == &vec![CellCoord::new(0, 2), CellCoord::new(0, 3)]
        )));
    }

    #[test]
    fn obstacles_block_falling_by_default() {
        // Bottom-up: empty, obstacle, red.
        let mut world = world_from(1, 3, &[0, 7, 1]);
        let mut events = Vec::new();
        apply(&mut world, Command::FallColumn { column: 0 }, &mut events);

        // The red stays put above the obstacle; the vacancy below remains.
        assert_eq!(occupied_color(&world, CellCoord::new(0, 2)), Some(ColorKind::Red));
        assert_eq!(
            query::vacancies_in_column(&world, 0),
            vec![CellCoord::new(0, 0)]
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EntityFell { .. })));
    }

    #[test]
    fn permeable_policy_reproduces_the_legacy_fall_through() {
        let mut world = World::from_level(
            &level(1, 3, &[0, 7, 1]),
            ObstaclePolicy::Permeable,
            catalog,
        )
        .expect("valid test level");
        let mut events = Vec::new();
        apply(&mut world, Command::FallColumn { column: 0 }, &mut events);

        assert_eq!(occupied_color(&world, CellCoord::new(0, 0)), Some(ColorKind::Red));
        assert_eq!(
            query::vacancies_in_column(&world, 0),
            vec![CellCoord::new(0, 2)]
        );
    }

    #[test]
    fn fall_on_unknown_or_full_columns_changes_nothing() {
        let mut world = world_from(2, 2, &[1, 2, 3, 4]);
        let mut events = Vec::new();
        apply(&mut world, Command::FallColumn { column: 9 }, &mut events);
        assert!(events.is_empty());

        apply(&mut world, Command::FallColumn { column: 0 }, &mut events);
        assert_eq!(
            events,
            vec![Event::ColumnSettled {
                column: 0,
                vacancies: Vec::new(),
            }]
        );
    }

    #[test]
    fn spawns_fill_vacancies_and_report_column_refills() {
        let mut world = world_from(1, 2, &[0, 1]);
        let definition = EntityDefinition::new(EntityKind::Color(ColorKind::Purple), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEntity {
                cell: CellCoord::new(0, 0),
                definition,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EntitySpawned {
                    cell: CellCoord::new(0, 0),
                    definition,
                },
                Event::ColumnRefilled { column: 0 },
            ]
        );
        assert!(query::is_settled(&world));
    }

    #[test]
    fn spawns_against_unusable_targets_are_dropped() {
        let mut world = world_from(2, 1, &[1, 0]);
        let mut events = Vec::new();

        // Occupied cell.
        apply(
            &mut world,
            Command::SpawnEntity {
                cell: CellCoord::new(0, 0),
                definition: EntityDefinition::new(EntityKind::Color(ColorKind::Blue), 1),
            },
            &mut events,
        );
        // Out of bounds.
        apply(
            &mut world,
            Command::SpawnEntity {
                cell: CellCoord::new(5, 0),
                definition: EntityDefinition::new(EntityKind::Color(ColorKind::Blue), 1),
            },
            &mut events,
        );
        // Unmatchable kind.
        apply(
            &mut world,
            Command::SpawnEntity {
                cell: CellCoord::new(1, 0),
                definition: EntityDefinition::new(EntityKind::Breakable, 1),
            },
            &mut events,
        );
        // Lifeless definition.
        apply(
            &mut world,
            Command::SpawnEntity {
                cell: CellCoord::new(1, 0),
                definition: EntityDefinition::new(EntityKind::Color(ColorKind::Blue), 0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(occupied_color(&world, CellCoord::new(0, 0)), Some(ColorKind::Red));
        assert_eq!(
            query::cell(&world, CellCoord::new(1, 0)),
            Some(query::CellSnapshot::Empty)
        );
    }

    #[test]
    fn neighbor_kind_context_skips_empty_and_obstacle_cells() {
        // Bottom row: red, target empty cell, obstacle. Above target: breakable.
        let world = world_from(3, 2, &[1, 0, 7, 0, 6, 0]);
        let kinds = query::orthogonal_neighbor_kinds(&world, CellCoord::new(1, 0));
        assert_eq!(
            kinds,
            vec![EntityKind::Color(ColorKind::Red), EntityKind::Breakable]
        );
    }

    #[test]
    fn match_probe_is_recomputed_and_idempotent_across_members() {
        let world = world_from(2, 2, &[1, 1, 1, 2]);
        let probe = query::find_match(&world, CellCoord::new(0, 0)).expect("matchable origin");
        let mut expected = probe.matched().to_vec();
        expected.sort();

        for member in probe.matched() {
            let rerun = query::find_match(&world, *member).expect("member is matchable");
            let mut matched = rerun.matched().to_vec();
            matched.sort();
            assert_eq!(matched, expected);
        }
    }
}
