use crate::engine::{GameState, RoundOutcome, Scenario, Spell, TurnStart};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, info, trace};

/// Represents a winning line found by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Total mana paid for every cast in `spells`.
    pub mana_spent: u32,
    /// Spells cast on consecutive player turns, first turn first.
    pub spells: Vec<Spell>,
    pub stats: SearchStats,
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States whose successors were generated.
    pub states_expanded: usize,
    /// Largest frontier size observed. Always 0 for `solve_exhaustive`,
    /// which keeps no frontier.
    pub peak_frontier: usize,
    /// Distinct state signatures recorded in the visited memo. Always 0 for
    /// `solve_exhaustive`.
    pub memo_size: usize,
}

/// Optional bounds on the amount of work a search may do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        SearchLimits::default()
    }

    pub fn with_max_expansions(max_expansions: usize) -> Self {
        SearchLimits { max_expansions: Some(max_expansions) }
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The cheapest winning line.
    Won(Solution),
    /// Every reachable line loses or gets stuck.
    Unwinnable(SearchStats),
    /// The expansion budget ran out before a win was proven minimal.
    BudgetExhausted(SearchStats),
}

impl SearchOutcome {
    /// Minimum mana spent, if a win was found.
    pub fn mana_spent(&self) -> Option<u32> {
        match self {
            SearchOutcome::Won(solution) => Some(solution.mana_spent),
            _ => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Won(solution) => &solution.stats,
            SearchOutcome::Unwinnable(stats) | SearchOutcome::BudgetExhausted(stats) => stats,
        }
    }
}

/// Signature used by the visited memo: everything that decides the future of
/// a duel, without the mana already spent.
type Signature = (i32, u32, i32, Vec<(Spell, u8)>);

fn signature(state: &GameState) -> Signature {
    (
        state.player_hp(),
        state.player_mana(),
        state.boss_hp(),
        state.active_effects().collect(),
    )
}

/// Cheapest known cost per signature.
#[derive(Debug, Default)]
struct VisitedMemo {
    best: HashMap<Signature, u32>,
}

impl VisitedMemo {
    /// Records `state` if its signature is new or strictly cheaper than any
    /// earlier one. Returns whether the state should be queued.
    fn offer(&mut self, state: &GameState) -> bool {
        let key = signature(state);
        if self.best.get(&key).is_some_and(|&best| best <= state.mana_spent()) {
            return false;
        }
        self.best.insert(key, state.mana_spent());
        true
    }

    /// True when the signature was queued again later at a lower cost, so
    /// this copy no longer needs expanding.
    fn is_stale(&self, state: &GameState) -> bool {
        self.best
            .get(&signature(state))
            .is_some_and(|&best| best < state.mana_spent())
    }

    fn len(&self) -> usize {
        self.best.len()
    }
}

/// A queued state. The heap pops the lowest `mana_spent` first and breaks
/// ties by insertion order.
struct FrontierEntry {
    mana_spent: u32,
    seq: u64,
    won: bool,
    state: GameState,
    path: Vec<Spell>,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .mana_spent
            .cmp(&self.mana_spent)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum mana needed to win the scenario, or `None` if it cannot be won.
///
/// # Examples
///
/// ```
/// use duel_solver::engine::Scenario;
/// use duel_solver::solver::least_mana_to_win;
///
/// let scenario = Scenario::new(10, 250, 13, 8, false).unwrap();
/// assert_eq!(least_mana_to_win(&scenario), Some(226));
///
/// let broke = Scenario::new(10, 0, 13, 8, false).unwrap();
/// assert_eq!(least_mana_to_win(&broke), None);
/// ```
pub fn least_mana_to_win(scenario: &Scenario) -> Option<u32> {
    solve(scenario, SearchLimits::unlimited()).mana_spent()
}

/// Searches for the cheapest winning line using a priority frontier ordered
/// by mana spent.
///
/// Mana spent never decreases along a line, so the first winning entry popped
/// from the frontier is minimal. Wins detected while expanding a state are
/// queued rather than returned, since a cheaper win may still be waiting in
/// the frontier.
pub fn solve(scenario: &Scenario, limits: SearchLimits) -> SearchOutcome {
    debug!(?scenario, ?limits, "starting frontier search");

    let mut frontier = BinaryHeap::new();
    let mut seen = VisitedMemo::default();
    let mut stats = SearchStats::default();
    let mut seq = 0u64;

    let initial = scenario.initial_state();
    seen.offer(&initial);
    frontier.push(FrontierEntry { mana_spent: 0, seq, won: false, state: initial, path: Vec::new() });
    stats.peak_frontier = 1;

    while let Some(entry) = frontier.pop() {
        if entry.won {
            stats.memo_size = seen.len();
            return won(entry.mana_spent, entry.path, stats);
        }
        if seen.is_stale(&entry.state) {
            continue;
        }

        let turn = match entry.state.begin_turn(scenario) {
            TurnStart::Lost => continue,
            TurnStart::Won(_) => {
                stats.memo_size = seen.len();
                return won(entry.mana_spent, entry.path, stats);
            }
            TurnStart::Ready(turn) => turn,
        };

        let spells = turn.legal_spells();
        if spells.is_empty() {
            trace!(state = %turn.state(), "dead end");
            continue;
        }

        if limits.max_expansions.is_some_and(|max| stats.states_expanded >= max) {
            stats.memo_size = seen.len();
            info!(expanded = stats.states_expanded, "expansion budget exhausted");
            return SearchOutcome::BudgetExhausted(stats);
        }
        stats.states_expanded += 1;
        if stats.states_expanded % 10_000 == 0 {
            debug!(
                expanded = stats.states_expanded,
                frontier = frontier.len(),
                cost = entry.mana_spent,
                "search progress"
            );
        }

        for spell in spells {
            let (next, is_win) = match turn.cast(spell) {
                RoundOutcome::Lost => continue,
                RoundOutcome::Won(end) => (end, true),
                RoundOutcome::Continue(next) if seen.offer(&next) => (next, false),
                RoundOutcome::Continue(_) => continue,
            };
            trace!(%spell, state = %next, is_win, "queued successor");

            let mut path = entry.path.clone();
            path.push(spell);
            seq += 1;
            frontier.push(FrontierEntry {
                mana_spent: next.mana_spent(),
                seq,
                won: is_win,
                state: next,
                path,
            });
        }
        stats.peak_frontier = stats.peak_frontier.max(frontier.len());
    }

    stats.memo_size = seen.len();
    info!(expanded = stats.states_expanded, "no winning line");
    SearchOutcome::Unwinnable(stats)
}

fn won(mana_spent: u32, spells: Vec<Spell>, stats: SearchStats) -> SearchOutcome {
    info!(mana_spent, casts = spells.len(), expanded = stats.states_expanded, "found cheapest win");
    SearchOutcome::Won(Solution { mana_spent, spells, stats })
}

/// Explores every line whose total cost stays within `spend_cap`, keeping the
/// cheapest win.
///
/// This is a depth first branch-and-bound search with no memo. It is far
/// slower than `solve` and exists as an independent reference for checking
/// it. Every cast costs at least 53 mana, so the cap bounds the depth.
pub fn solve_exhaustive(scenario: &Scenario, spend_cap: u32) -> Option<Solution> {
    let mut best: Option<Solution> = None;
    let mut stats = SearchStats::default();
    explore(&scenario.initial_state(), scenario, spend_cap, Vec::new(), &mut best, &mut stats);
    best.map(|solution| Solution { stats, ..solution })
}

fn explore(
    state: &GameState,
    scenario: &Scenario,
    spend_cap: u32,
    path: Vec<Spell>,
    best: &mut Option<Solution>,
    stats: &mut SearchStats,
) {
    let beats_best = |cost: u32, best: &Option<Solution>| {
        best.as_ref().map_or(true, |found| cost < found.mana_spent)
    };
    if !beats_best(state.mana_spent(), &*best) {
        return;
    }

    let turn = match state.begin_turn(scenario) {
        TurnStart::Lost => return,
        TurnStart::Won(end) => {
            *best = Some(Solution { mana_spent: end.mana_spent(), spells: path, stats: *stats });
            return;
        }
        TurnStart::Ready(turn) => turn,
    };
    stats.states_expanded += 1;

    for spell in turn.legal_spells() {
        if turn.state().mana_spent() + spell.cost() > spend_cap {
            continue;
        }
        let mut next_path = path.clone();
        next_path.push(spell);
        match turn.cast(spell) {
            RoundOutcome::Lost => {}
            RoundOutcome::Won(end) => {
                if beats_best(end.mana_spent(), &*best) {
                    *best = Some(Solution {
                        mana_spent: end.mana_spent(),
                        spells: next_path,
                        stats: *stats,
                    });
                }
            }
            RoundOutcome::Continue(next) => {
                explore(&next, scenario, spend_cap, next_path, best, stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(player_hp: i32, player_mana: i32, boss_hp: i32, boss_damage: i32, hard: bool) -> Scenario {
        Scenario::new(player_hp, player_mana, boss_hp, boss_damage, hard).unwrap()
    }

    /// Plays `spells` from the initial state and returns the mana spent after
    /// every round, asserting the line ends in a win.
    fn replay(scenario: &Scenario, spells: &[Spell]) -> Vec<u32> {
        let mut state = scenario.initial_state();
        let mut spent = vec![state.mana_spent()];
        for (i, &spell) in spells.iter().enumerate() {
            let outcome = state.play_round(spell, scenario);
            match outcome {
                Some(RoundOutcome::Continue(next)) => {
                    spent.push(next.mana_spent());
                    state = next;
                }
                Some(RoundOutcome::Won(end)) => {
                    assert_eq!(i, spells.len() - 1, "won before the line was finished");
                    spent.push(end.mana_spent());
                    return spent;
                }
                other => panic!("cast {} ({}) did not continue: {:?}", i, spell, other),
            }
        }
        panic!("line {:?} did not win", spells);
    }

    #[test]
    fn test_solve_first_example() {
        let scenario = scenario(10, 250, 13, 8, false);
        let SearchOutcome::Won(solution) = solve(&scenario, SearchLimits::unlimited()) else {
            panic!("scenario is winnable");
        };
        assert_eq!(solution.mana_spent, 226);
        assert_eq!(solution.spells, vec![Spell::Poison, Spell::MagicMissile]);
        assert_eq!(solve_exhaustive(&scenario, 1000).map(|s| s.mana_spent), Some(226));
    }

    #[test]
    fn test_solve_second_example() {
        let scenario = scenario(10, 250, 14, 8, false);
        let SearchOutcome::Won(solution) = solve(&scenario, SearchLimits::unlimited()) else {
            panic!("scenario is winnable");
        };
        assert_eq!(solution.mana_spent, 641);
        assert_eq!(*replay(&scenario, &solution.spells).last().unwrap(), 641);
    }

    #[test]
    fn test_solve_full_size_boss() {
        let normal = scenario(50, 500, 55, 8, false);
        assert_eq!(least_mana_to_win(&normal), Some(953));
        assert_eq!(least_mana_to_win(&normal.with_hard_mode(true)), Some(1289));
    }

    #[test]
    fn test_winning_line_spend_is_non_decreasing() {
        for hard in [false, true] {
            let scenario = scenario(50, 500, 55, 8, hard);
            let SearchOutcome::Won(solution) = solve(&scenario, SearchLimits::unlimited()) else {
                panic!("scenario is winnable");
            };
            let spent = replay(&scenario, &solution.spells);
            assert!(spent.windows(2).all(|w| w[0] <= w[1]), "spend went down: {:?}", spent);
            assert_eq!(*spent.last().unwrap(), solution.mana_spent);
            let cast_total: u32 = solution.spells.iter().map(|s| s.cost()).sum();
            assert_eq!(cast_total, solution.mana_spent);
        }
    }

    #[test]
    fn test_zero_mana_is_unwinnable_without_expanding() {
        let outcome = solve(&scenario(10, 0, 13, 8, false), SearchLimits::unlimited());
        assert_eq!(outcome.mana_spent(), None);
        let SearchOutcome::Unwinnable(stats) = outcome else {
            panic!("expected an unwinnable scenario, got {:?}", outcome);
        };
        assert_eq!(stats.states_expanded, 0);
    }

    #[test]
    fn test_cannot_afford_anything() {
        assert_eq!(least_mana_to_win(&scenario(10, 52, 13, 8, false)), None);
    }

    #[test]
    fn test_hard_mode_one_hit_point_is_unwinnable() {
        let outcome = solve(&scenario(1, 500, 55, 8, true), SearchLimits::unlimited());
        assert!(matches!(outcome, SearchOutcome::Unwinnable(_)));
        assert_eq!(outcome.stats().states_expanded, 0);
    }

    #[test]
    fn test_boss_too_strong_is_unwinnable() {
        // Two hit points in hard mode: upkeep leaves one, the boss finishes it.
        assert_eq!(least_mana_to_win(&scenario(2, 500, 13, 8, true)), None);
    }

    #[test]
    fn test_single_missile_win() {
        let SearchOutcome::Won(solution) =
            solve(&scenario(10, 53, 4, 8, true), SearchLimits::unlimited())
        else {
            panic!("one missile kills the boss");
        };
        assert_eq!(solution.mana_spent, 53);
        assert_eq!(solution.spells, vec![Spell::MagicMissile]);
        assert_eq!(solution.stats.states_expanded, 1);
    }

    #[test]
    fn test_expansion_budget() {
        let tiny = scenario(10, 53, 4, 8, false);
        assert!(matches!(
            solve(&tiny, SearchLimits::with_max_expansions(0)),
            SearchOutcome::BudgetExhausted(_)
        ));
        assert_eq!(solve(&tiny, SearchLimits::with_max_expansions(1)).mana_spent(), Some(53));

        let example = scenario(10, 250, 13, 8, false);
        let outcome = solve(&example, SearchLimits::with_max_expansions(1));
        let SearchOutcome::BudgetExhausted(stats) = outcome else {
            panic!("one expansion cannot prove a win, got {:?}", outcome);
        };
        assert_eq!(stats.states_expanded, 1);
        assert_eq!(solve(&example, SearchLimits::with_max_expansions(1_000)).mana_spent(), Some(226));
    }

    #[test]
    fn test_memo_collapses_equivalent_states() {
        let SearchOutcome::Won(solution) =
            solve(&scenario(50, 500, 55, 8, false), SearchLimits::unlimited())
        else {
            panic!("scenario is winnable");
        };
        assert!(solution.stats.memo_size > 0);
        assert!(solution.stats.states_expanded <= solution.stats.memo_size);
        assert!(solution.stats.peak_frontier > 0);
    }

    /// Plays `spells` and returns the state after the last round.
    fn state_after(scenario: &Scenario, spells: &[Spell]) -> GameState {
        spells.iter().fold(scenario.initial_state(), |state, &spell| {
            match state.play_round(spell, scenario) {
                Some(RoundOutcome::Continue(next)) => next,
                other => panic!("{} did not continue: {:?}", spell, other),
            }
        })
    }

    #[test]
    fn test_memo_requeues_cheaper_signature_and_marks_stale() {
        // One missile from 10 hp / 500 mana against a 100 hp boss leaves
        // 2 hp / 447 mana / 96 boss hp after spending 53. A scenario starting
        // there reaches the same signature having spent nothing.
        let dearer = state_after(&scenario(10, 500, 100, 8, false), &[Spell::MagicMissile]);
        let cheaper = scenario(2, 447, 96, 8, false).initial_state();
        assert_eq!(signature(&dearer), signature(&cheaper));
        assert_eq!(dearer.mana_spent(), 53);

        let mut memo = VisitedMemo::default();
        assert!(memo.offer(&dearer));
        assert!(!memo.offer(&dearer));
        assert!(!memo.is_stale(&dearer));

        assert!(memo.offer(&cheaper));
        assert_eq!(memo.len(), 1);
        assert!(memo.is_stale(&dearer));
        assert!(!memo.is_stale(&cheaper));
        assert!(!memo.offer(&dearer));
        assert!(!memo.offer(&cheaper));
    }

    #[test]
    fn test_exhaustive_reports_no_frontier_or_memo() {
        let solution = solve_exhaustive(&scenario(10, 250, 13, 8, false), 1000).unwrap();
        assert!(solution.stats.states_expanded > 0);
        assert_eq!(solution.stats.peak_frontier, 0);
        assert_eq!(solution.stats.memo_size, 0);
    }

    #[test]
    fn test_solve_matches_exhaustive_search() {
        const CAP: u32 = 1000;
        for player_hp in [1, 5, 10] {
            for player_mana in [0, 53, 250, 400] {
                for boss_hp in [4, 13, 14] {
                    for boss_damage in [1, 8, 10] {
                        for hard in [false, true] {
                            let scenario = scenario(player_hp, player_mana, boss_hp, boss_damage, hard);
                            let frontier = least_mana_to_win(&scenario).filter(|&cost| cost <= CAP);
                            let exhaustive = solve_exhaustive(&scenario, CAP).map(|s| s.mana_spent);
                            assert_eq!(frontier, exhaustive, "disagreement on {:?}", scenario);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_exhaustive_respects_spend_cap() {
        let scenario = scenario(10, 250, 13, 8, false);
        assert_eq!(solve_exhaustive(&scenario, 225), None);
        let solution = solve_exhaustive(&scenario, 226).unwrap();
        assert_eq!(solution.spells, vec![Spell::Poison, Spell::MagicMissile]);
    }
}
