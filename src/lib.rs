//! # Duel Solver Library
//!
//! This library models a turn-based duel between a spell-casting player and a
//! boss, and searches for the cheapest sequence of spells that wins it.
//!
//! It is used by three binaries:
//! - `duel_solver`: builds a scenario from flags or a boss file and prints the
//!   minimum mana needed to win, along with the winning cast sequence.
//! - `duel_player`: plays a duel interactively, one round at a time.
//! - `crosscheck`: compares the frontier search against exhaustive search on
//!   seeded random scenarios.
//!
//! ## Modules
//! - `engine`: the spell catalog (`Spell`), scenario parameters (`Scenario`),
//!   immutable duel snapshots (`GameState`) and round resolution.
//! - `solver`: the priority frontier search (`solve`, `least_mana_to_win`)
//!   and an exhaustive reference search (`solve_exhaustive`).
//! - `utils`: parsing the boss description from puzzle input.
//! - `error`: configuration errors raised before any search starts.

pub mod engine;
pub mod error;
pub mod solver;
pub mod utils;

pub use error::{Result, ScenarioError};
