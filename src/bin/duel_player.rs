use anyhow::Result;
use clap::Parser;
use duel_solver::engine::{
    RoundOutcome, Scenario, Spell, TurnStart, DEFAULT_PLAYER_HP, DEFAULT_PLAYER_MANA,
};
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play a duel against the boss by hand", long_about = None)]
struct Args {
    #[clap(long, default_value_t = 55)]
    boss_hp: i32,

    #[clap(long, default_value_t = 8)]
    boss_damage: i32,

    #[clap(long, default_value_t = DEFAULT_PLAYER_HP)]
    player_hp: i32,

    #[clap(long, default_value_t = DEFAULT_PLAYER_MANA)]
    player_mana: i32,

    /// Lose 1 hit point at the start of every player turn
    #[clap(long)]
    hard: bool,
}

/// Reads one spell choice: a catalog index or a spell name. `None` means quit.
fn read_choice(legal: &[Spell]) -> io::Result<Option<Spell>> {
    loop {
        print!("Cast a spell (index or name), or 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let trimmed = input.trim();
        if trimmed == "q" {
            return Ok(None);
        }

        let spell = match trimmed.parse::<usize>() {
            Ok(idx) => Spell::ALL.get(idx).copied(),
            Err(_) => Spell::from_name(trimmed),
        };
        match spell {
            Some(spell) if legal.contains(&spell) => return Ok(Some(spell)),
            Some(spell) => println!("{} cannot be cast right now.", spell),
            None => println!("Unknown spell '{}'.", trimmed),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scenario = Scenario::new(args.player_hp, args.player_mana, args.boss_hp, args.boss_damage, args.hard)?;
    let mut state = scenario.initial_state();
    let mut round = 1;
    println!("Welcome to the duel!");

    loop {
        println!("---------------------");
        println!("Round {}: {}", round, state);

        let turn = match state.begin_turn(&scenario) {
            TurnStart::Lost => {
                println!("The strain of the duel drains your last hit point. You lose.");
                break;
            }
            TurnStart::Won(end) => {
                println!("Your lingering spells finish the boss! Mana spent: {}", end.mana_spent());
                break;
            }
            TurnStart::Ready(turn) => turn,
        };

        let legal = turn.legal_spells();
        if legal.is_empty() {
            println!("You cannot afford any spell. You lose.");
            break;
        }
        println!("After effects: {}", turn.state());
        for (idx, spell) in Spell::ALL.iter().enumerate() {
            let marker = if legal.contains(spell) { ' ' } else { 'x' };
            println!("  [{}]{} {:<14} {:>3} mana", idx, marker, spell.name(), spell.cost());
        }

        let Some(spell) = read_choice(&legal)? else {
            println!("Thanks for playing!");
            break;
        };

        match turn.cast(spell) {
            RoundOutcome::Lost => {
                println!("The boss strikes you down. You lose.");
                break;
            }
            RoundOutcome::Won(end) => {
                println!("🎉 The boss is defeated! Mana spent: {} 🎉", end.mana_spent());
                break;
            }
            RoundOutcome::Continue(next) => state = next,
        }
        round += 1;
    }
    Ok(())
}
