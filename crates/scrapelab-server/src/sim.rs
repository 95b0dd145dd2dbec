//! Demo data source.
//!
//! Every pseudo-random roll the handlers and the background simulator make
//! goes through the `DemoSource` trait, so tests can substitute scripted
//! values instead of relying on actual randomness.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

/// Source of simulated demo data.
pub trait DemoSource: Send + Sync {
    /// True with probability `p` (clamped to `[0, 1]`).
    fn chance(&self, p: f64) -> bool;

    /// Pick one of `options` uniformly. `options` must be non-empty.
    fn pick<'a>(&self, options: &'a [&'a str]) -> &'a str;

    /// Uniform float in `[lo, hi)`.
    fn uniform_f64(&self, lo: f64, hi: f64) -> f64;

    /// Uniform integer in `[lo, hi)`.
    fn uniform_u64(&self, lo: u64, hi: u64) -> u64;
}

/// Production source backed by the thread-local RNG.
#[derive(Default)]
pub struct RngSource;

impl DemoSource for RngSource {
    fn chance(&self, p: f64) -> bool {
        rand::thread_rng().gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick<'a>(&self, options: &'a [&'a str]) -> &'a str {
        options[rand::thread_rng().gen_range(0..options.len())]
    }

    fn uniform_f64(&self, lo: f64, hi: f64) -> f64 {
        rand::thread_rng().gen_range(lo..hi)
    }

    fn uniform_u64(&self, lo: u64, hi: u64) -> u64 {
        rand::thread_rng().gen_range(lo..hi)
    }
}

/// One scripted roll for `ScriptedSource`.
#[derive(Debug, Clone, Copy)]
pub enum Roll {
    /// Answer for the next `chance()` call.
    Chance(bool),
    /// Index into `options` for the next `pick()` call.
    Pick(usize),
    /// Value for the next `uniform_f64()` call.
    F64(f64),
    /// Value for the next `uniform_u64()` call.
    U64(u64),
}

/// Test source replaying a fixed script. A call that finds no matching
/// roll at the front of the queue (or an empty queue) falls back to the
/// lowest deterministic value, so under-scripted tests stay predictable.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Roll>>,
}

impl ScriptedSource {
    pub fn new(rolls: impl IntoIterator<Item = Roll>) -> Self {
        Self {
            script: Mutex::new(rolls.into_iter().collect()),
        }
    }

    fn next(&self) -> Option<Roll> {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }
}

impl DemoSource for ScriptedSource {
    fn chance(&self, _p: f64) -> bool {
        matches!(self.next(), Some(Roll::Chance(true)))
    }

    fn pick<'a>(&self, options: &'a [&'a str]) -> &'a str {
        let idx = match self.next() {
            Some(Roll::Pick(i)) => i.min(options.len() - 1),
            _ => 0,
        };
        options[idx]
    }

    fn uniform_f64(&self, lo: f64, _hi: f64) -> f64 {
        match self.next() {
            Some(Roll::F64(v)) => v,
            _ => lo,
        }
    }

    fn uniform_u64(&self, lo: u64, _hi: u64) -> u64 {
        match self.next() {
            Some(Roll::U64(v)) => v,
            _ => lo,
        }
    }
}
