//! Error types for scenario construction.
//!
//! The search itself never fails: illegal casts are filtered out and an
//! unwinnable duel is an ordinary outcome. Everything here is raised before
//! any search work starts.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("{who} hit points must be positive, got {value}")]
    NonPositiveHitPoints { who: &'static str, value: i32 },

    #[error("{who} hit points must be at most {max}, got {value}")]
    TooManyHitPoints { who: &'static str, value: i32, max: i32 },

    #[error("player mana must not be negative, got {0}")]
    NegativeMana(i32),

    #[error("boss damage must not be negative, got {0}")]
    NegativeDamage(i32),

    #[error("unknown spell: {0}")]
    UnknownSpell(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("boss description is missing `{0}`")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
