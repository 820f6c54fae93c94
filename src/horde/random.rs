// src/horde/random.rs
//! Seeded random source (deterministic per seed, so replays match).

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::core::RandomSource;

#[derive(Resource, Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        // Keep horde rolls independent from other systems seeded with the same world seed.
        let mix = seed ^ 0x5EED_7E47_0000_0001u64;
        Self { rng: ChaCha8Rng::seed_from_u64(mix) }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.random_range(0..len))
    }

    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }

    fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }

    fn chance(&mut self, p: f32) -> bool {
        if p >= 1.0 {
            return true;
        }
        if p <= 0.0 || p.is_nan() {
            return false;
        }
        self.rng.random_bool(p as f64)
    }

    fn direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.rng.random_range(0.0..TAU))
    }
}
