#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Default replacement provider for cascade fills.
//!
//! The engine treats the replacement policy as opaque: any provider that
//! returns one live matchable kind per vacancy will do. This one picks
//! uniformly among palette colors absent from the vacancy's orthogonal
//! neighborhood, biasing fills away from immediately re-creating a match,
//! and is fully deterministic for a given seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_blast_core::{ColorKind, EntityDefinition, EntityKind};

/// Configuration parameters required to construct the provider.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    spawn_health: u32,
}

impl Config {
    /// Creates a new configuration using the provided seed and the health
    /// freshly spawned entities start with.
    #[must_use]
    pub const fn new(rng_seed: u64, spawn_health: u32) -> Self {
        Self {
            rng_seed,
            spawn_health,
        }
    }
}

/// Seeded provider that picks replacement colors for cascade fills.
#[derive(Clone, Debug)]
pub struct ItemGeneration {
    rng: ChaCha8Rng,
    spawn_health: u32,
}

impl ItemGeneration {
    /// Creates a new provider using the supplied configuration.
    ///
    /// A zero spawn health would make every spawn request a no-op at the
    /// world boundary, so it is clamped to one.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            spawn_health: config.spawn_health.max(1),
        }
    }

    /// Picks a replacement definition given the kinds occupying the
    /// vacancy's orthogonal neighbor cells.
    ///
    /// Colors already adjacent are excluded from the draw; when every
    /// palette color is adjacent the draw falls back to the full palette.
    pub fn pick(&mut self, neighbors: &[EntityKind]) -> EntityDefinition {
        let mut candidates: Vec<ColorKind> = ColorKind::PALETTE
            .iter()
            .copied()
            .filter(|color| !neighbors.contains(&EntityKind::Color(*color)))
            .collect();
        if candidates.is_empty() {
            candidates.extend(ColorKind::PALETTE);
        }

        let index = self.rng.gen_range(0..candidates.len());
        EntityDefinition::new(EntityKind::Color(candidates[index]), self.spawn_health)
    }
}
