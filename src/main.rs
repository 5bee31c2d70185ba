use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use std::time::Duration;

use persistence::timing::{human_time, timed};
use persistence::{search, CancelFlag, Error, Outcome, SearchConfig, Strategy};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Lowest persistence to look for
    #[arg(long, default_value_t = 3)]
    low: u32,

    /// Highest persistence to look for
    #[arg(long, default_value_t = 12)]
    high: u32,

    /// Longest candidate, in digits
    #[arg(short, long, default_value_t = 200)]
    until: usize,

    /// How products are reduced
    #[arg(short, long, value_enum, default_value_t = Strategy::default())]
    strategy: Strategy,

    /// Seconds to spend on each goal before giving up
    #[arg(long)]
    deadline: Option<f64>,

    /// Time every strategy against the highest goal instead
    #[arg(long)]
    compare: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if cli.low > cli.high {
        return Err(Error::InvalidGoalRange {
            low: cli.low,
            high: cli.high,
        })
        .context("checking --low and --high");
    }
    let deadline = cli
        .deadline
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("parsing --deadline")?;
    let config = SearchConfig {
        until: cli.until,
        strategy: cli.strategy,
        deadline,
    };
    config.validate().context("checking --until")?;
    let cancel = CancelFlag::new();

    if cli.compare {
        for strategy in Strategy::ALL {
            let config = SearchConfig {
                strategy,
                ..config.clone()
            };
            let outcome = timed(strategy.reducer().name(), || {
                search(cli.high, &config, &cancel)
            })?;
            info!("{}", outcome);
        }
        return Ok(());
    }

    println!();
    println!("Generating multiplicative persistences");
    println!("More info @ https://oeis.org/A003001");
    println!();

    for goal in cli.low..=cli.high {
        println!("Finding the smallest number with persistence {}...", goal);
        let outcome = search(goal, &config, &cancel)
            .with_context(|| format!("searching for persistence {}", goal))?;
        println!("{}\n", describe(&outcome));
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Found(w) => {
            let chain: Vec<String> = w.chain.iter().map(|p| p.to_string()).collect();
            format!(
                "{} has persistence {}, via:\n{}, {} steps found in {}",
                w.number,
                w.goal,
                chain.join("\n"),
                chain.len(),
                human_time(w.elapsed)
            )
        }
        Outcome::NotFound {
            goal,
            until,
            elapsed,
            ..
        } => format!(
            "Nothing with (up to) {} digits for {} steps, used {}",
            until,
            goal,
            human_time(*elapsed)
        ),
        Outcome::Cancelled {
            goal,
            reached_digits,
            elapsed,
            ..
        } => format!(
            "Gave up on {} steps after {} digits, used {}",
            goal,
            reached_digits,
            human_time(*elapsed)
        ),
    }
}
