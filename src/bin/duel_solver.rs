use anyhow::{Context, Result};
use clap::Parser;
use duel_solver::engine::{Scenario, DEFAULT_PLAYER_HP, DEFAULT_PLAYER_MANA};
use duel_solver::solver::{solve, SearchLimits, SearchOutcome};
use duel_solver::utils::{parse_boss, BossStats};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Finds the least mana needed to win a duel", long_about = None)]
struct Args {
    /// Path to the boss description ("Hit Points: N" / "Damage: N")
    boss_file: Option<PathBuf>,

    /// Boss hit points (overrides the boss file)
    #[clap(long)]
    boss_hp: Option<i32>,

    /// Boss damage per attack (overrides the boss file)
    #[clap(long)]
    boss_damage: Option<i32>,

    #[clap(long, default_value_t = DEFAULT_PLAYER_HP)]
    player_hp: i32,

    #[clap(long, default_value_t = DEFAULT_PLAYER_MANA)]
    player_mana: i32,

    /// Lose 1 hit point at the start of every player turn
    #[clap(long)]
    hard: bool,

    /// Solve both normal and hard mode
    #[clap(long, conflicts_with = "hard")]
    both: bool,

    /// Give up after expanding this many states
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Log search progress
    #[clap(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_boss(args: &Args) -> Result<BossStats> {
    let from_file = match &args.boss_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read boss file {}", path.display()))?;
            let boss = parse_boss(&content)
                .with_context(|| format!("invalid boss file {}", path.display()))?;
            info!(path = %path.display(), ?boss, "loaded boss");
            Some(boss)
        }
        None => None,
    };

    let hit_points = args
        .boss_hp
        .or(from_file.map(|b| b.hit_points))
        .context("boss hit points missing: pass a boss file or --boss-hp")?;
    let damage = args
        .boss_damage
        .or(from_file.map(|b| b.damage))
        .context("boss damage missing: pass a boss file or --boss-damage")?;
    Ok(BossStats { hit_points, damage })
}

fn report(scenario: &Scenario, outcome: &SearchOutcome) {
    let mode = if scenario.hard_mode() { "hard" } else { "normal" };
    let sep = "=".repeat(20);
    println!("{} {} mode {}", sep, mode, sep);
    match outcome {
        SearchOutcome::Won(solution) => {
            println!("Least mana spent: {}", solution.mana_spent);
            println!("Casts ({}):", solution.spells.len());
            for (i, spell) in solution.spells.iter().enumerate() {
                println!("  Turn {}: {} ({} mana)", i + 1, spell, spell.cost());
            }
        }
        SearchOutcome::Unwinnable(_) => println!("No winning sequence exists."),
        SearchOutcome::BudgetExhausted(stats) => println!(
            "No winning sequence found within {} expansions.",
            stats.states_expanded
        ),
    }
    let stats = outcome.stats();
    println!(
        "States expanded: {}, peak frontier: {}, memo size: {}\n",
        stats.states_expanded, stats.peak_frontier, stats.memo_size
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let boss = load_boss(&args)?;
    let scenario = boss.scenario(args.player_hp, args.player_mana, args.hard)?;
    let limits = SearchLimits { max_expansions: args.max_expansions };

    let modes = if args.both { vec![false, true] } else { vec![args.hard] };
    for hard in modes {
        let scenario = scenario.with_hard_mode(hard);
        let outcome = solve(&scenario, limits);
        report(&scenario, &outcome);
    }
    Ok(())
}
