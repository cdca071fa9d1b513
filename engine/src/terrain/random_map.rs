//! Random Map Generator
//!
//! Scatters craters over a flat plain. Big craters are rare and wide with a
//! flattened floor; small craters pepper the surface. Each crater's rim and
//! floor are relative to the elevation already at its centre, so craters
//! landing inside earlier ones nest naturally.

use super::game_map::GameMap;
use super::height_field::HeightField;
use super::object_layer::ObjectCatalog;
use crate::config::{RandomMapConfig, TerrainConfig};

// ============================================================================
// SIMPLE RNG (xorshift32)
// ============================================================================

/// A minimal deterministic pseudo-random number generator using the xorshift32
/// algorithm. Given the same seed, it always produces the same sequence.
#[derive(Clone, Debug)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// A seed of 0 is bumped to 1 because xorshift32 requires a non-zero state.
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish integer in `0..bound`; 0 when `bound` is 0.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Crater-field generator.
#[derive(Clone, Debug)]
pub struct RandomMap {
    config: RandomMapConfig,
    rng: SimpleRng,
}

impl RandomMap {
    pub fn new(config: RandomMapConfig) -> Self {
        let rng = SimpleRng::new(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &RandomMapConfig {
        &self.config
    }

    /// Generate a map with the default catalog and terrain configuration.
    pub fn generate(&mut self) -> GameMap {
        self.generate_with(ObjectCatalog::default(), &TerrainConfig::default())
    }

    /// Generate a map; its control points are current on return.
    pub fn generate_with(&mut self, catalog: ObjectCatalog, terrain: &TerrainConfig) -> GameMap {
        let mut field = HeightField::new(
            self.config.width,
            self.config.height,
            self.config.base_height,
        );

        let crater_count = self.config.crater_count();
        let big = crater_count / 10;
        for _ in 0..big {
            self.big_crater(&mut field);
        }
        for _ in 0..crater_count {
            self.small_crater(&mut field);
        }

        log::info!(
            "[RandomMap] Generated {}x{} map with {} big and {} small craters (seed {}), elevation {}..={}",
            field.width(),
            field.height(),
            big,
            crater_count,
            self.config.seed,
            field.min_height(),
            field.max_height()
        );

        // The control point cache is built from the finished field.
        GameMap::with_config(field, catalog, terrain)
    }

    fn random_vertex(&mut self, field: &HeightField) -> (i32, i32) {
        let row = self.rng.below(field.height() + 1) as i32;
        let column = self.rng.below(field.width() + 1) as i32;
        (row, column)
    }

    fn small_crater(&mut self, field: &mut HeightField) {
        let (row, column) = self.random_vertex(field);
        let base = field.height_at(row, column);
        let inner = self.rng.below(7) as i32 + 3;
        let outer = inner + self.rng.below(3) as i32 + 1;
        field.crater(row, column, outer, inner, base + 2, base - 1);
    }

    fn big_crater(&mut self, field: &mut HeightField) {
        let (row, column) = self.random_vertex(field);
        let base = field.height_at(row, column);
        let inner = self.rng.below(10) as i32 + 20;
        let outer = inner + self.rng.below(3) as i32 + 4;
        field.crater(row, column, outer, inner, base + 3, base - 2);
        // Central floor plateau.
        field.crater(row, column, 5, 0, base - 1, base - 1);
    }
}
