//! Pulse Data: deterministic synthetic dataset for the ops dashboard.
//!
//! A seeded LCG drives every generator, so a fixed seed reproduces the
//! exact same dataset across processes. The dataset is built once as an
//! explicit value and shared read-only; nothing here mutates after
//! generation.

pub mod seeded;
pub mod dataset;
mod publishers;
mod agents;
mod submissions;
mod incidents;
mod snapshots;

pub use seeded::SeededRandom;
pub use dataset::Dataset;

/// Default seed for demo data. Changing this changes every record.
pub const DEFAULT_SEED: u64 = 42;

/// Trailing window covered by submissions and incidents, in days.
pub const WINDOW_DAYS: i64 = 60;
