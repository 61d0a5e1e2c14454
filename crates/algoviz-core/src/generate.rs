//! Seeded input generation.
//!
//! The same seed always yields the same inputs, and since every step source
//! is deterministic, the same steps.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BstModel, GraphModel, MAX_SEGMENT_LEN};
use crate::source::sorting::MAX_ARRAY_LEN;

/// Configuration for the input generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for deterministic generation
    pub seed: u64,
    pub array_size: usize,
    /// Number of values inserted into a random tree
    pub tree_size: usize,
    pub graph_nodes: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            array_size: 20,
            tree_size: 7,
            graph_nodes: 8,
        }
    }
}

/// Produces random, valid inputs for the step sources.
pub struct Generator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Values in `1..=100`, with the configured size clamped to what sorting accepts.
    pub fn array(&mut self) -> Vec<i64> {
        let n = self.config.array_size.clamp(1, MAX_ARRAY_LEN);
        (0..n).map(|_| self.rng.gen_range(1..=100)).collect()
    }

    /// Distinct values in insertion order.
    pub fn bst_values(&mut self) -> Vec<i64> {
        let n = self.config.tree_size.clamp(1, 31);
        let mut pool: Vec<i64> = (1..=99).collect();
        pool.shuffle(&mut self.rng);
        pool.truncate(n);
        pool
    }

    pub fn bst(&mut self) -> Result<BstModel> {
        let values = self.bst_values();
        BstModel::from_values(&values)
    }

    /// Between 5 and 12 values in `1..=50`.
    pub fn heap_values(&mut self) -> Vec<i64> {
        let n = self.rng.gen_range(5..=12);
        (0..n).map(|_| self.rng.gen_range(1..=50)).collect()
    }

    /// A connected weighted graph: a ring through every node plus a few chords.
    pub fn graph(&mut self) -> Result<GraphModel> {
        let n = self.config.graph_nodes.clamp(3, 26);
        let mut edges: Vec<(usize, usize, u64)> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                (i.min(j), i.max(j), self.rng.gen_range(1..=10))
            })
            .collect();

        let extra = (n * 2 / 5).min(n - 1);
        let mut added = 0;
        for _ in 0..2 * n {
            if added == extra {
                break;
            }
            let (a, b) = (self.rng.gen_range(0..n), self.rng.gen_range(0..n));
            let (a, b) = (a.min(b), a.max(b));
            if a == b || edges.iter().any(|&(x, y, _)| x == a && y == b) {
                continue;
            }
            edges.push((a, b, self.rng.gen_range(1..=10)));
            added += 1;
        }
        GraphModel::new(n, &edges)
    }

    /// Values in `1..=20` for a segment tree of `len` leaves.
    pub fn segment_values(&mut self, len: usize) -> Vec<i64> {
        let n = len.clamp(1, MAX_SEGMENT_LEN);
        (0..n).map(|_| self.rng.gen_range(1..=20)).collect()
    }
}
