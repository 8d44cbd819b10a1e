use anyhow::{bail, Result};
use clap::Parser;
use duel_solver::engine::Scenario;
use duel_solver::solver::{least_mana_to_win, solve_exhaustive};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Cross-checks frontier search against exhaustive search", long_about = None)]
struct Args {
    /// Number of random scenarios to check
    #[clap(long, default_value_t = 200)]
    count: usize,

    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Highest total spend the exhaustive search explores
    #[clap(long, default_value_t = 1000)]
    spend_cap: u32,
}

/// Draws a small scenario the exhaustive search can finish quickly.
fn random_scenario(rng: &mut impl Rng) -> Result<Scenario> {
    let scenario = Scenario::new(
        rng.gen_range(1..=15),
        rng.gen_range(0..=500),
        rng.gen_range(1..=20),
        rng.gen_range(0..=10),
        rng.gen_bool(0.5),
    )?;
    Ok(scenario)
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut winnable = 0;
    let mut mismatches = 0;

    println!("Checking {} scenarios (seed {}, spend cap {})...", args.count, args.seed, args.spend_cap);
    for idx in 0..args.count {
        let scenario = random_scenario(&mut rng)?;
        let frontier = least_mana_to_win(&scenario).filter(|&cost| cost <= args.spend_cap);
        let exhaustive = solve_exhaustive(&scenario, args.spend_cap).map(|s| s.mana_spent);
        debug!(idx, ?scenario, ?frontier, ?exhaustive, "checked");

        if frontier.is_some() {
            winnable += 1;
        }
        if frontier != exhaustive {
            mismatches += 1;
            warn!(idx, ?scenario, ?frontier, ?exhaustive, "searches disagree");
            println!("  Scenario {}: frontier {:?} vs exhaustive {:?} for {:?}", idx, frontier, exhaustive, scenario);
        }
    }

    println!("\n--- Cross-check Complete ---");
    println!("Scenarios checked: {}", args.count);
    println!("Winnable within cap: {}", winnable);
    println!("Disagreements: {}", mismatches);

    if mismatches > 0 {
        bail!("{} scenarios disagree", mismatches);
    }
    Ok(())
}
