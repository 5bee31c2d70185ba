use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Leading digits a candidate may start with, in search order.
pub const PREFIXES: [&[u8]; 5] = [b"26", b"2", b"3", b"6", b""];

/// Digits the rest of a candidate is filled with, in non-decreasing order.
pub const SUFFIX_DIGITS: &[u8] = b"789";

/// Shortest candidate length the search considers.
pub const MIN_DIGITS: usize = 2;

pub trait Space {
    type Batch: ExactSizeIterator;

    fn batch(&mut self) -> Option<Self::Batch>;

    /// Largest candidate length this space would reach if run to the end.
    fn bound(&self) -> usize;

    /// True once the space has stopped early rather than run out.
    fn interrupted(&self) -> bool {
        false
    }
}

/// Every pruned candidate, one batch per digit length.
#[derive(Debug, Clone)]
pub struct CandidateSpace {
    next: usize,
    until: usize,
}

impl CandidateSpace {
    pub fn new(until: usize) -> Self {
        CandidateSpace {
            next: MIN_DIGITS,
            until,
        }
    }
}

impl Space for CandidateSpace {
    type Batch = LengthBatch;

    fn batch(&mut self) -> Option<Self::Batch> {
        if self.next > self.until {
            return None;
        }
        let batch = LengthBatch::new(self.next);
        self.next += 1;
        Some(batch)
    }

    fn bound(&self) -> usize {
        self.until
    }
}

/// Candidates of a single length: each prefix in [`PREFIXES`] order, then
/// each suffix multiset in combinations-with-replacement order.
#[derive(Debug, Clone)]
pub struct LengthBatch {
    ndigits: usize,
    prefixes: std::slice::Iter<'static, &'static [u8]>,
    current: Option<(&'static [u8], Suffixes)>,
    remaining: usize,
}

impl LengthBatch {
    pub fn new(ndigits: usize) -> Self {
        let remaining = PREFIXES
            .iter()
            .filter_map(|p| ndigits.checked_sub(p.len()))
            .map(|backfill| multiset_count(SUFFIX_DIGITS.len(), backfill))
            .sum();
        LengthBatch {
            ndigits,
            prefixes: PREFIXES.iter(),
            current: None,
            remaining,
        }
    }

    pub fn ndigits(&self) -> usize {
        self.ndigits
    }
}

impl Iterator for LengthBatch {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((prefix, suffixes)) = &mut self.current {
                if let Some(suffix) = suffixes.next() {
                    self.remaining -= 1;
                    let mut candidate = Vec::with_capacity(self.ndigits);
                    candidate.extend_from_slice(*prefix);
                    candidate.extend_from_slice(&suffix);
                    return Some(candidate);
                }
            }
            let prefix = *self.prefixes.next()?;
            self.current = self
                .ndigits
                .checked_sub(prefix.len())
                .map(|backfill| (prefix, Suffixes::new(SUFFIX_DIGITS, backfill)));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LengthBatch {}

/// Number of multisets of size `k` drawn from `n` symbols.
pub fn multiset_count(n: usize, k: usize) -> usize {
    if n == 0 {
        return usize::from(k == 0);
    }
    // C(n + k - 1, k), built up so each division is exact.
    (1..=k).fold(1, |acc, i| acc * (n - 1 + i) / i)
}

/// Non-decreasing sequences of `len` symbols from `alphabet`, in the
/// order combinations with replacement are conventionally listed.
#[derive(Debug, Clone)]
pub struct Suffixes {
    alphabet: &'static [u8],
    indices: Vec<usize>,
    done: bool,
}

impl Suffixes {
    pub fn new(alphabet: &'static [u8], len: usize) -> Self {
        Suffixes {
            alphabet,
            indices: vec![0; len],
            done: alphabet.is_empty() && len > 0,
        }
    }
}

impl Iterator for Suffixes {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.indices.iter().map(|&i| self.alphabet[i]).collect();

        let symbols = self.alphabet.len();
        match self.indices.iter().rposition(|&i| i + 1 < symbols) {
            None => self.done = true,
            Some(pos) => {
                let bumped = self.indices[pos] + 1;
                self.indices[pos..].fill(bumped);
            }
        }
        Some(item)
    }
}

/// Stops handing out batches once `limit` has passed since the first one.
#[derive(Debug)]
pub struct TimeLimited<S: Space> {
    space: S,
    first_batch: Option<Instant>,
    limit: Duration,
    expired: bool,
}

impl<S: Space> TimeLimited<S> {
    pub fn new(limit: Duration, space: S) -> Self {
        TimeLimited {
            limit,
            space,
            first_batch: None,
            expired: false,
        }
    }
}

impl<S: Space> Space for TimeLimited<S> {
    type Batch = S::Batch;

    fn batch(&mut self) -> Option<Self::Batch> {
        let started = *self.first_batch.get_or_insert_with(Instant::now);
        if started.elapsed() > self.limit {
            self.expired = true;
            return None;
        }
        self.space.batch()
    }

    fn bound(&self) -> usize {
        self.space.bound()
    }

    fn interrupted(&self) -> bool {
        self.expired || self.space.interrupted()
    }
}

/// A flag shared between a running search and whoever may stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Stops handing out batches once its [`CancelFlag`] is raised.
#[derive(Debug)]
pub struct Cancellable<S: Space> {
    space: S,
    flag: CancelFlag,
    stopped: bool,
}

impl<S: Space> Cancellable<S> {
    pub fn new(flag: CancelFlag, space: S) -> Self {
        Cancellable {
            space,
            flag,
            stopped: false,
        }
    }
}

impl<S: Space> Space for Cancellable<S> {
    type Batch = S::Batch;

    fn batch(&mut self) -> Option<Self::Batch> {
        if self.flag.is_cancelled() {
            self.stopped = true;
            return None;
        }
        self.space.batch()
    }

    fn bound(&self) -> usize {
        self.space.bound()
    }

    fn interrupted(&self) -> bool {
        self.stopped || self.space.interrupted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(batch: LengthBatch) -> Vec<String> {
        batch
            .map(|c| String::from_utf8(c).unwrap())
            .collect()
    }

    #[cfg(test)]
    mod suffixes {
        use super::*;

        #[test]
        fn lists_combinations_with_replacement() {
            let all: Vec<String> = Suffixes::new(b"789", 2)
                .map(|s| String::from_utf8(s).unwrap())
                .collect();
            assert_eq!(all, ["77", "78", "79", "88", "89", "99"]);
        }

        #[test]
        fn empty_length_yields_one_empty_suffix() {
            let all: Vec<Vec<u8>> = Suffixes::new(b"789", 0).collect();
            assert_eq!(all, vec![Vec::<u8>::new()]);
        }

        #[test]
        fn counts_match_enumeration() {
            for k in 0..12 {
                assert_eq!(Suffixes::new(b"789", k).count(), multiset_count(3, k));
            }
            assert_eq!(multiset_count(0, 0), 1);
            assert_eq!(multiset_count(0, 3), 0);
        }
    }

    #[cfg(test)]
    mod length_batch {
        use super::*;

        #[test]
        fn two_digit_candidates_in_order() {
            assert_eq!(
                text(LengthBatch::new(2)),
                [
                    "26", "27", "28", "29", "37", "38", "39", "67", "68", "69", "77", "78",
                    "79", "88", "89", "99"
                ]
            );
        }

        #[test]
        fn reports_exact_size() {
            let mut batch = LengthBatch::new(5);
            let expected = multiset_count(3, 3) + 3 * multiset_count(3, 4) + multiset_count(3, 5);
            assert_eq!(batch.len(), expected);
            batch.next();
            assert_eq!(batch.len(), expected - 1);
            assert_eq!(batch.count(), expected - 1);
        }

        #[test]
        fn candidates_have_requested_length() {
            for c in LengthBatch::new(7) {
                assert_eq!(c.len(), 7);
            }
        }

        #[test]
        fn short_lengths_skip_long_prefixes() {
            assert_eq!(text(LengthBatch::new(1)), ["2", "3", "6", "7", "8", "9"]);
        }
    }

    #[cfg(test)]
    mod space {
        use super::*;

        #[test]
        fn walks_lengths_up_to_bound() {
            let mut space = CandidateSpace::new(4);
            let lengths: Vec<usize> = std::iter::from_fn(|| space.batch())
                .map(|b| b.ndigits())
                .collect();
            assert_eq!(lengths, [2, 3, 4]);
            assert!(!space.interrupted());
            assert_eq!(space.bound(), 4);
        }

        #[test]
        fn bound_below_minimum_is_empty() {
            assert!(CandidateSpace::new(1).batch().is_none());
        }

        #[test]
        fn cancelled_space_stops_at_next_boundary() {
            let flag = CancelFlag::new();
            let mut space = Cancellable::new(flag.clone(), CandidateSpace::new(50));
            assert!(space.batch().is_some());
            flag.cancel();
            assert!(space.batch().is_none());
            assert!(space.interrupted());
        }

        #[test]
        fn expired_deadline_interrupts() {
            let mut space = TimeLimited::new(Duration::ZERO, CandidateSpace::new(50));
            // The clock starts on the first call.
            let _ = space.batch();
            std::thread::sleep(Duration::from_millis(2));
            assert!(space.batch().is_none());
            assert!(space.interrupted());
        }
    }
}
