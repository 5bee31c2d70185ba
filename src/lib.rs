use std::fmt;
use std::time::{Duration, Instant};

use log::info;
use num_bigint::BigUint;

pub mod digits;

mod error;
pub use error::*;

pub mod reduce;
pub use reduce::*;

pub mod reporter;
pub use reporter::*;

pub mod spaces;
pub use spaces::*;

pub mod timing;

/// Finds the first candidate whose persistence equals a goal.
pub struct Search<R: Reducer, Rep: Reporter = NullReporter> {
    reducer: R,
    reporter: Rep,
    stats: Stats,
}

impl<R: Reducer> Search<R, NullReporter> {
    pub fn new(reducer: R) -> Self {
        Search {
            reducer,
            reporter: NullReporter,
            stats: Stats::default(),
        }
    }
}

impl<R: Reducer, Rep: Reporter> Search<R, Rep> {
    pub fn with_reporter<T: Reporter>(self, reporter: T) -> Search<R, T> {
        Search {
            reducer: self.reducer,
            reporter,
            stats: self.stats,
        }
    }

    /// Searches every pruned candidate of 2 to `until` digits.
    pub fn run(&mut self, goal: u32, until: usize) -> Result<Outcome> {
        self.run_in(CandidateSpace::new(until), goal)
    }

    pub fn run_in<S>(&mut self, mut space: S, goal: u32) -> Result<Outcome>
    where
        S: Space<Batch = LengthBatch>,
    {
        let start = Instant::now();
        let mut examined = 0u64;
        let mut reached = 0;
        self.stats = Stats::default();

        while let Some(batch) = space.batch() {
            reached = batch.ndigits();
            self.stats.count += batch.len();
            for candidate in batch {
                examined += 1;
                if self.reducer.persistence(&candidate)? != goal {
                    continue;
                }
                let elapsed = start.elapsed();
                let reduction = self.reducer.reduce(&candidate, Trace::Chain)?;
                let witness = Witness {
                    goal,
                    number: String::from_utf8_lossy(&candidate).into_owned(),
                    chain: reduction.chain.unwrap_or_default(),
                    elapsed,
                    examined,
                };
                info!(
                    "{}: p({}) = {} after {} candidates",
                    self.reducer.name(),
                    goal,
                    witness.number,
                    examined
                );
                return Ok(Outcome::Found(witness));
            }
            self.stats.total += self.stats.count as u64;
            self.reporter.report_on(reached, &self.stats);
            self.stats.clear();
        }

        let elapsed = start.elapsed();
        if space.interrupted() {
            info!("{}: goal {} stopped after {} digits", self.reducer.name(), goal, reached);
            return Ok(Outcome::Cancelled {
                goal,
                reached_digits: reached,
                elapsed,
                examined,
            });
        }
        info!("{}: goal {} not found", self.reducer.name(), goal);
        Ok(Outcome::NotFound {
            goal,
            until: space.bound(),
            elapsed,
            examined,
        })
    }
}

/// The smallest candidate found with the goal persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub goal: u32,
    pub number: String,
    /// Intermediate products, ending in a single digit.
    pub chain: Vec<BigUint>,
    pub elapsed: Duration,
    pub examined: u64,
}

impl Witness {
    pub fn value(&self) -> Result<BigUint> {
        digits::parse(self.number.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Witness),
    NotFound {
        goal: u32,
        until: usize,
        elapsed: Duration,
        examined: u64,
    },
    Cancelled {
        goal: u32,
        reached_digits: usize,
        elapsed: Duration,
        examined: u64,
    },
}

impl Outcome {
    pub fn witness(&self) -> Option<&Witness> {
        match self {
            Outcome::Found(w) => Some(w),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Outcome::Found(w) => w.elapsed,
            Outcome::NotFound { elapsed, .. } | Outcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn examined(&self) -> u64 {
        match self {
            Outcome::Found(w) => w.examined,
            Outcome::NotFound { examined, .. } | Outcome::Cancelled { examined, .. } => *examined,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Found(w) => write!(f, "p({}) = {}", w.goal, w.number),
            Outcome::NotFound { until, .. } => {
                write!(f, "Sorry, nothing under {} digits", until + 1)
            }
            Outcome::Cancelled { reached_digits, .. } => {
                write!(f, "Stopped after {} digits", reached_digits)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub until: usize,
    pub strategy: Strategy,
    /// Give up on a goal once this much time has passed.
    pub deadline: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            until: 200,
            strategy: Strategy::default(),
            deadline: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.until < MIN_DIGITS {
            return Err(Error::InvalidBound {
                until: self.until,
                min: MIN_DIGITS,
            });
        }
        Ok(())
    }
}

/// Runs one goal under `config`, stopping early if `cancel` is raised.
pub fn search(goal: u32, config: &SearchConfig, cancel: &CancelFlag) -> Result<Outcome> {
    config.validate()?;
    let space = Cancellable::new(cancel.clone(), CandidateSpace::new(config.until));
    let mut search = Search::new(config.strategy.reducer()).with_reporter(LogReporter);
    match config.deadline {
        Some(limit) => search.run_in(TimeLimited::new(limit, space), goal),
        None => search.run_in(space, goal),
    }
}

#[derive(Debug)]
pub struct Stats {
    recording_since: Instant,
    /// Candidates handed out since the last report.
    pub count: usize,
    /// Candidates handed out over the whole search.
    pub total: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            recording_since: Instant::now(),
            count: 0,
            total: 0,
        }
    }
}

impl Stats {
    fn clear(&mut self) {
        self.count = 0;
        self.recording_since = Instant::now();
    }

    pub fn throughput(&self) -> f64 {
        let duration_since_read = self.recording_since.elapsed();
        self.count as f64 / duration_since_read.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recording(Vec<(usize, usize)>);

    impl Reporter for Recording {
        fn report_on(&mut self, ndigits: usize, stats: &Stats) {
            self.0.push((ndigits, stats.count));
        }
    }

    #[test]
    fn finds_39_for_three_steps() {
        let outcome = Search::new(IntegerReducer).run(3, 10).unwrap();
        let witness = outcome.witness().unwrap();
        assert_eq!(witness.number, "39");
        assert_eq!(witness.examined, 7);
        assert_eq!(witness.chain, [27u32, 14, 4].map(BigUint::from));
        assert_eq!(outcome.to_string(), "p(3) = 39");
    }

    #[test]
    fn short_lengths_never_reach_goals_zero_and_one() {
        for goal in [0, 1] {
            let outcome = Search::new(ManualReducer).run(goal, 30).unwrap();
            assert!(
                matches!(outcome, Outcome::NotFound { until: 30, examined: 24824, .. }),
                "{:?}",
                outcome
            );
            assert_eq!(outcome.to_string(), "Sorry, nothing under 31 digits");
        }
    }

    #[test]
    fn reports_each_finished_length() {
        let mut recording = Recording(Vec::new());
        let outcome = Search::new(GenericReducer)
            .with_reporter(&mut recording)
            .run(12, 4)
            .unwrap();
        assert!(outcome.witness().is_none());
        assert_eq!(recording.0, [(2, 16), (3, 31), (4, 51)]);
    }

    #[test]
    fn config_rejects_short_bound() {
        let config = SearchConfig {
            until: 1,
            ..SearchConfig::default()
        };
        assert_eq!(
            search(3, &config, &CancelFlag::new()),
            Err(Error::InvalidBound { until: 1, min: 2 })
        );
    }

    #[test]
    fn pre_cancelled_search_is_not_a_miss() {
        let flag = CancelFlag::new();
        flag.cancel();
        let outcome = search(11, &SearchConfig::default(), &flag).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Cancelled {
                reached_digits: 0,
                examined: 0,
                ..
            }
        ));
    }
}
