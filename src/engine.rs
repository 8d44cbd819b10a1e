//! Core duel engine.
//!
//! This module defines the game's fundamental components:
//! - `Spell`: the fixed catalog of five spells and their statistics.
//! - `Scenario`: validated starting parameters for one duel (player vitals,
//!   boss vitals, hard-mode flag).
//! - `GameState`: an immutable snapshot of a duel between rounds.
//! - `PlayerTurn`: a state whose start-of-turn upkeep has been resolved and
//!   which is waiting for the player to pick a spell.
//!
//! A round is resolved in two halves. `GameState::begin_turn` applies the
//! hard-mode upkeep and the player-turn effect tick; `PlayerTurn::cast` pays for
//! the spell, resolves it, ticks effects again for the boss turn and lets the
//! boss attack. Every step produces a fresh value, states are never edited in
//! place once handed out.
use crate::error::{Result, ScenarioError};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Player hit points used when a scenario does not override them.
pub const DEFAULT_PLAYER_HP: i32 = 50;
/// Player mana used when a scenario does not override it.
pub const DEFAULT_PLAYER_MANA: i32 = 500;
/// Largest hit point total a scenario accepts for either side.
pub const MAX_HIT_POINTS: i32 = 1_000_000;

/// Static statistics of one catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpellStats {
    pub name: &'static str,
    pub cost: u32,
    /// Damage dealt on cast (instant) or on every tick (timed).
    pub damage: i32,
    pub heal: i32,
    /// Armor granted while the effect is active.
    pub armor: i32,
    /// Mana regenerated on every tick.
    pub mana_gain: u32,
    /// Number of turns a timed effect lasts; 0 for instant spells.
    pub duration: u8,
}

const CATALOG: [SpellStats; 5] = [
    SpellStats { name: "Magic Missile", cost: 53, damage: 4, heal: 0, armor: 0, mana_gain: 0, duration: 0 },
    SpellStats { name: "Drain", cost: 73, damage: 2, heal: 2, armor: 0, mana_gain: 0, duration: 0 },
    SpellStats { name: "Shield", cost: 113, damage: 0, heal: 0, armor: 7, mana_gain: 0, duration: 6 },
    SpellStats { name: "Poison", cost: 173, damage: 3, heal: 0, armor: 0, mana_gain: 0, duration: 6 },
    SpellStats { name: "Recharge", cost: 229, damage: 0, heal: 0, armor: 0, mana_gain: 101, duration: 5 },
];

/// One of the five spells the player can cast.
///
/// The variant order matches the catalog order, so `Spell::ALL` iterates
/// from the cheapest to the most expensive spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Spell {
    MagicMissile,
    Drain,
    Shield,
    Poison,
    Recharge,
}

impl Spell {
    /// Every spell, in catalog order.
    pub const ALL: [Spell; 5] = [
        Spell::MagicMissile,
        Spell::Drain,
        Spell::Shield,
        Spell::Poison,
        Spell::Recharge,
    ];

    /// Returns the catalog entry for this spell.
    pub fn stats(self) -> &'static SpellStats {
        &CATALOG[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }

    /// Mana paid when casting the spell.
    ///
    /// # Examples
    ///
    /// ```
    /// use duel_solver::engine::Spell;
    /// assert_eq!(Spell::MagicMissile.cost(), 53);
    /// assert_eq!(Spell::Recharge.cost(), 229);
    /// ```
    pub fn cost(self) -> u32 {
        self.stats().cost
    }

    /// True when the spell resolves entirely on the turn it is cast.
    pub fn is_instant(self) -> bool {
        self.stats().duration == 0
    }

    /// True when the spell leaves an effect that ticks on later turns.
    pub fn is_timed(self) -> bool {
        !self.is_instant()
    }

    /// Looks a spell up by name.
    ///
    /// Matching ignores case, spaces, dashes and underscores, so
    /// `"Magic Missile"`, `"magic-missile"` and `"magicmissile"` are all
    /// accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use duel_solver::engine::Spell;
    /// assert_eq!(Spell::from_name("magic missile"), Some(Spell::MagicMissile));
    /// assert_eq!(Spell::from_name("POISON"), Some(Spell::Poison));
    /// assert_eq!(Spell::from_name("fireball"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Spell> {
        let wanted = normalize_name(name);
        Spell::ALL
            .into_iter()
            .find(|spell| normalize_name(spell.name()) == wanted)
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Spell {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        Spell::from_name(s).ok_or_else(|| ScenarioError::UnknownSpell(s.trim().to_string()))
    }
}

impl fmt::Display for Spell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated starting parameters of a duel.
///
/// # Examples
///
/// ```
/// use duel_solver::engine::Scenario;
/// let scenario = Scenario::new(10, 250, 13, 8, false).unwrap();
/// assert_eq!(scenario.boss_hp(), 13);
/// assert!(Scenario::new(10, -1, 13, 8, false).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scenario {
    player_hp: i32,
    player_mana: u32,
    boss_hp: i32,
    boss_damage: i32,
    hard_mode: bool,
}

impl Scenario {
    /// Builds a scenario, rejecting hit points outside `1..=MAX_HIT_POINTS`
    /// and negative mana or damage.
    pub fn new(
        player_hp: i32,
        player_mana: i32,
        boss_hp: i32,
        boss_damage: i32,
        hard_mode: bool,
    ) -> Result<Self> {
        if player_hp <= 0 {
            return Err(ScenarioError::NonPositiveHitPoints { who: "player", value: player_hp });
        }
        if boss_hp <= 0 {
            return Err(ScenarioError::NonPositiveHitPoints { who: "boss", value: boss_hp });
        }
        for (who, value) in [("player", player_hp), ("boss", boss_hp)] {
            if value > MAX_HIT_POINTS {
                return Err(ScenarioError::TooManyHitPoints { who, value, max: MAX_HIT_POINTS });
            }
        }
        let player_mana =
            u32::try_from(player_mana).map_err(|_| ScenarioError::NegativeMana(player_mana))?;
        if boss_damage < 0 {
            return Err(ScenarioError::NegativeDamage(boss_damage));
        }
        Ok(Scenario { player_hp, player_mana, boss_hp, boss_damage, hard_mode })
    }

    /// Same scenario with the hard-mode flag replaced.
    pub fn with_hard_mode(self, hard_mode: bool) -> Self {
        Scenario { hard_mode, ..self }
    }

    pub fn player_hp(&self) -> i32 {
        self.player_hp
    }

    pub fn player_mana(&self) -> u32 {
        self.player_mana
    }

    pub fn boss_hp(&self) -> i32 {
        self.boss_hp
    }

    pub fn boss_damage(&self) -> i32 {
        self.boss_damage
    }

    pub fn hard_mode(&self) -> bool {
        self.hard_mode
    }

    /// The state before the first player turn: full vitals, nothing spent,
    /// no active effects.
    pub fn initial_state(&self) -> GameState {
        GameState {
            player_hp: self.player_hp,
            player_mana: self.player_mana,
            boss_hp: self.boss_hp,
            mana_spent: 0,
            effects: BTreeMap::new(),
        }
    }
}

/// Snapshot of a duel between rounds.
///
/// Active effects are kept in an ordered map so two states holding the same
/// effects compare and hash identically regardless of cast order. Armor is
/// not stored: it is derived from the active effects on every tick.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    player_hp: i32,
    player_mana: u32,
    boss_hp: i32,
    mana_spent: u32,
    effects: BTreeMap<Spell, u8>,
}

impl GameState {
    pub fn player_hp(&self) -> i32 {
        self.player_hp
    }

    pub fn player_mana(&self) -> u32 {
        self.player_mana
    }

    pub fn boss_hp(&self) -> i32 {
        self.boss_hp
    }

    /// Total mana paid for every cast leading to this state.
    pub fn mana_spent(&self) -> u32 {
        self.mana_spent
    }

    /// Remaining turns of an active effect, or `None` if it is not active.
    pub fn remaining(&self, spell: Spell) -> Option<u8> {
        self.effects.get(&spell).copied()
    }

    pub fn is_active(&self, spell: Spell) -> bool {
        self.effects.contains_key(&spell)
    }

    /// Active effects with their remaining turns, in catalog order.
    pub fn active_effects(&self) -> impl Iterator<Item = (Spell, u8)> + '_ {
        self.effects.iter().map(|(&spell, &turns)| (spell, turns))
    }

    /// True if the spell is affordable and, for timed spells, not already
    /// active in this state.
    pub fn can_cast(&self, spell: Spell) -> bool {
        spell.cost() <= self.player_mana && (spell.is_instant() || !self.is_active(spell))
    }

    /// Every spell castable from this state, in catalog order.
    pub fn legal_spells(&self) -> Vec<Spell> {
        Spell::ALL.into_iter().filter(|&spell| self.can_cast(spell)).collect()
    }

    pub fn is_won(&self) -> bool {
        self.boss_hp <= 0
    }

    pub fn is_lost(&self) -> bool {
        self.player_hp <= 0
    }

    /// Resolves the start of the player's turn: hard-mode upkeep, then one
    /// effect tick.
    ///
    /// The result decides which spells are legal this turn, since the tick
    /// can both regenerate mana and expire effects.
    pub fn begin_turn<'a>(&self, scenario: &'a Scenario) -> TurnStart<'a> {
        let mut next = self.clone();
        if scenario.hard_mode {
            next.player_hp -= 1;
            if next.is_lost() {
                return TurnStart::Lost;
            }
        }
        next.apply_effects();
        if next.is_won() {
            return TurnStart::Won(next);
        }
        TurnStart::Ready(PlayerTurn { state: next, scenario })
    }

    /// Plays one full round with the given spell.
    ///
    /// Returns `None` when the spell cannot be cast once the turn has started
    /// (unaffordable, or its effect is still running). A duel that ends during
    /// upkeep or the opening tick ends the same way regardless of the spell.
    ///
    /// # Examples
    ///
    /// ```
    /// use duel_solver::engine::{RoundOutcome, Scenario, Spell};
    /// let scenario = Scenario::new(10, 250, 13, 8, false).unwrap();
    /// let state = scenario.initial_state();
    /// let Some(RoundOutcome::Continue(state)) = state.play_round(Spell::Poison, &scenario) else {
    ///     panic!("the duel should still be running");
    /// };
    /// assert_eq!(state.player_hp(), 2);
    /// assert_eq!(state.boss_hp(), 10);
    /// let Some(RoundOutcome::Won(end)) = state.play_round(Spell::MagicMissile, &scenario) else {
    ///     panic!("poison and a missile finish the boss");
    /// };
    /// assert_eq!(end.mana_spent(), 226);
    /// ```
    pub fn play_round(&self, spell: Spell, scenario: &Scenario) -> Option<RoundOutcome> {
        match self.begin_turn(scenario) {
            TurnStart::Lost => Some(RoundOutcome::Lost),
            TurnStart::Won(state) => Some(RoundOutcome::Won(state)),
            TurnStart::Ready(turn) => turn.try_cast(spell),
        }
    }

    /// Applies every active effect once and returns the armor granted for
    /// this tick.
    ///
    /// Each effect deals its damage and regenerates its mana, then loses one
    /// turn; effects reaching zero are removed. Armor counts only the
    /// effects still active after the decrement.
    fn apply_effects(&mut self) -> i32 {
        let mut armor = 0;
        let mut expired = Vec::new();
        for (&spell, turns) in self.effects.iter_mut() {
            let stats = spell.stats();
            self.boss_hp -= stats.damage;
            self.player_mana = self.player_mana.saturating_add(stats.mana_gain);
            *turns -= 1;
            if *turns == 0 {
                expired.push(spell);
            } else {
                armor += stats.armor;
            }
        }
        for spell in expired {
            self.effects.remove(&spell);
        }
        armor
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "player {} hp, {} mana | boss {} hp | spent {}",
            self.player_hp, self.player_mana, self.boss_hp, self.mana_spent
        )?;
        if !self.effects.is_empty() {
            f.write_str(" | effects:")?;
            for (spell, turns) in self.active_effects() {
                write!(f, " {spell}({turns})")?;
            }
        }
        Ok(())
    }
}

/// Result of `GameState::begin_turn`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnStart<'a> {
    /// Hard-mode upkeep killed the player.
    Lost,
    /// An effect killed the boss before the player had to cast anything.
    Won(GameState),
    /// The player must now pick a spell.
    Ready(PlayerTurn<'a>),
}

/// Result of a full round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Lost,
    /// The boss died; the state records the total mana spent.
    Won(GameState),
    Continue(GameState),
}

/// A state waiting for the player's cast, after upkeep and the opening tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerTurn<'a> {
    state: GameState,
    scenario: &'a Scenario,
}

impl<'a> PlayerTurn<'a> {
    /// The state as it stands once the turn has started.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Spells that can be cast this turn. Empty means the duel is stuck.
    pub fn legal_spells(&self) -> Vec<Spell> {
        self.state.legal_spells()
    }

    /// Like `cast`, but returns `None` for a spell that is not legal this turn.
    pub fn try_cast(&self, spell: Spell) -> Option<RoundOutcome> {
        self.state.can_cast(spell).then(|| self.cast(spell))
    }

    /// Casts `spell` and resolves the rest of the round: the boss-turn tick
    /// and the boss attack.
    ///
    /// # Panics
    /// Panics if the spell is not legal this turn; callers pick it from
    /// `legal_spells` or use `try_cast`.
    pub fn cast(&self, spell: Spell) -> RoundOutcome {
        assert!(self.state.can_cast(spell), "{spell} is not castable");
        let stats = spell.stats();
        let mut next = self.state.clone();
        next.player_mana -= stats.cost;
        next.mana_spent = next.mana_spent.saturating_add(stats.cost);
        if spell.is_instant() {
            next.boss_hp -= stats.damage;
            next.player_hp = next.player_hp.saturating_add(stats.heal);
        } else {
            next.effects.insert(spell, stats.duration);
        }
        if next.is_won() {
            return RoundOutcome::Won(next);
        }

        let armor = next.apply_effects();
        if next.is_won() {
            return RoundOutcome::Won(next);
        }

        next.player_hp -= (self.scenario.boss_damage - armor).max(1);
        if next.is_lost() {
            return RoundOutcome::Lost;
        }
        RoundOutcome::Continue(next)
    }
}
