use crate::engine::Scenario;
use crate::error::{Result, ScenarioError};

/// Boss statistics read from a puzzle input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossStats {
    pub hit_points: i32,
    pub damage: i32,
}

impl BossStats {
    /// Builds a validated scenario pitting the given player against this boss.
    pub fn scenario(&self, player_hp: i32, player_mana: i32, hard_mode: bool) -> Result<Scenario> {
        Scenario::new(player_hp, player_mana, self.hit_points, self.damage, hard_mode)
    }
}

/// Parses a boss description of the form
///
/// ```text
/// Hit Points: 55
/// Damage: 8
/// ```
///
/// Keys are matched case-insensitively, blank lines are ignored, and the two
/// keys may appear in any order. Any other key, a missing key, a duplicated
/// key, or a value that is not an integer is an error.
///
/// # Examples
/// ```
/// use duel_solver::utils::parse_boss;
///
/// let boss = parse_boss("Hit Points: 55\nDamage: 8\n").unwrap();
/// assert_eq!(boss.hit_points, 55);
/// assert_eq!(boss.damage, 8);
///
/// assert!(parse_boss("Hit Points: 55\n").is_err());
/// assert!(parse_boss("Hit Points: lots\nDamage: 8").is_err());
/// ```
pub fn parse_boss(input: &str) -> Result<BossStats> {
    let mut hit_points = None;
    let mut damage = None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or_else(|| ScenarioError::Parse {
            line: line_no,
            message: format!("expected `key: value`, found '{}'", line),
        })?;
        let value: i32 = value.trim().parse().map_err(|_| ScenarioError::Parse {
            line: line_no,
            message: format!("'{}' is not an integer", value.trim()),
        })?;

        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "hit points" => &mut hit_points,
            "damage" => &mut damage,
            other => {
                return Err(ScenarioError::Parse {
                    line: line_no,
                    message: format!("unrecognized key '{}'", other),
                })
            }
        };
        if slot.replace(value).is_some() {
            return Err(ScenarioError::Parse {
                line: line_no,
                message: format!("duplicate key '{}'", key.trim()),
            });
        }
    }

    Ok(BossStats {
        hit_points: hit_points.ok_or(ScenarioError::MissingField("Hit Points"))?,
        damage: damage.ok_or(ScenarioError::MissingField("Damage"))?,
    })
}
