//! Digit-product reduction.
//!
//! Every [`Reducer`] applies the same loop: while the number has more than
//! one digit, replace it with the product of its digits. Implementations
//! differ only in how they represent the number between steps.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive};

use crate::digits;
use crate::Result;

/// Whether a reduction keeps its intermediate products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Steps,
    Chain,
}

/// The outcome of reducing one digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reduction {
    pub steps: u32,
    /// Each intermediate product in order, when traced with [`Trace::Chain`].
    pub chain: Option<Vec<BigUint>>,
}

pub trait Reducer {
    fn name(&self) -> &'static str;

    /// Reduces `digits`, ASCII decimal digits with no leading zero.
    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction>;

    fn persistence(&self, digits: &[u8]) -> Result<u32> {
        self.reduce(digits, Trace::Steps).map(|r| r.steps)
    }
}

impl<R: Reducer + ?Sized> Reducer for &R {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction> {
        (**self).reduce(digits, trace)
    }
}

impl<R: Reducer + ?Sized> Reducer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction> {
        (**self).reduce(digits, trace)
    }
}

/// Selects one of the reduction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Strategy {
    /// Parse each digit, fold the product, re-render it.
    Generic,
    /// Multiply raw digit bytes in a native accumulator.
    Manual,
    /// Never leave integers; split digits off by dividing by ten.
    #[default]
    Integer,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Generic, Strategy::Manual, Strategy::Integer];

    pub fn reducer(self) -> &'static dyn Reducer {
        match self {
            Strategy::Generic => &GenericReducer,
            Strategy::Manual => &ManualReducer,
            Strategy::Integer => &IntegerReducer,
        }
    }
}

struct Recorder {
    steps: u32,
    chain: Option<Vec<BigUint>>,
}

impl Recorder {
    fn new(trace: Trace) -> Self {
        Recorder {
            steps: 0,
            chain: match trace {
                Trace::Steps => None,
                Trace::Chain => Some(Vec::new()),
            },
        }
    }

    fn step(&mut self, product: impl FnOnce() -> BigUint) {
        self.steps += 1;
        if let Some(chain) = &mut self.chain {
            chain.push(product());
        }
    }

    fn finish(self) -> Reduction {
        Reduction {
            steps: self.steps,
            chain: self.chain,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericReducer;

impl Reducer for GenericReducer {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction> {
        digits::validate(digits)?;
        let mut recorder = Recorder::new(trace);
        let mut current = digits.to_vec();
        while current.len() > 1 {
            let values: Vec<u32> = current
                .iter()
                .filter_map(|&b| char::from(b).to_digit(10))
                .collect();
            let product = values.iter().fold(BigUint::one(), |acc, &d| acc * d);
            current = digits::render(&product);
            recorder.step(|| product);
        }
        Ok(recorder.finish())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManualReducer;

impl Reducer for ManualReducer {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction> {
        digits::validate(digits)?;
        let mut recorder = Recorder::new(trace);
        let mut buf = digits.to_vec();
        while buf.len() > 1 {
            match native_product(&buf) {
                Ok(product) => {
                    digits::render_u64_into(product, &mut buf);
                    recorder.step(|| BigUint::from(product));
                }
                Err(product) => {
                    digits::render_into(&product, &mut buf);
                    recorder.step(|| product);
                }
            }
        }
        Ok(recorder.finish())
    }
}

/// Multiplies digit bytes in a `u64`, falling back to a `BigUint` at the
/// first multiplication that would overflow.
fn native_product(digits: &[u8]) -> std::result::Result<u64, BigUint> {
    let mut acc: u64 = 1;
    for (i, &b) in digits.iter().enumerate() {
        match acc.checked_mul(u64::from(b - b'0')) {
            Some(p) => acc = p,
            None => return Err(wide_product(acc, &digits[i..])),
        }
    }
    Ok(acc)
}

fn wide_product(acc: u64, digits: &[u8]) -> BigUint {
    let mut product = BigUint::from(acc);
    let mut chunk: u64 = 1;
    for &b in digits {
        let d = u64::from(b - b'0');
        match chunk.checked_mul(d) {
            Some(c) => chunk = c,
            None => {
                product *= chunk;
                chunk = d;
            }
        }
    }
    product * chunk
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerReducer;

impl Reducer for IntegerReducer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn reduce(&self, digits: &[u8], trace: Trace) -> Result<Reduction> {
        let mut recorder = Recorder::new(trace);
        let mut value = digits::parse(digits)?;
        let mut small = loop {
            match value.to_u64() {
                Some(n) => break n,
                None => {
                    value = big_digit_product(value);
                    recorder.step(|| value.clone());
                }
            }
        };
        while small > 9 {
            small = digit_product(small);
            recorder.step(|| BigUint::from(small));
        }
        Ok(recorder.finish())
    }
}

/// For n >= 10 the product of its digits is below n, so this cannot overflow.
fn digit_product(mut n: u64) -> u64 {
    let mut acc = 1;
    while n > 0 {
        acc *= n % 10;
        n /= 10;
    }
    acc
}

fn big_digit_product(mut value: BigUint) -> BigUint {
    let ten = BigUint::from(10u32);
    let mut product = BigUint::one();
    let mut chunk: u64 = 1;
    while value.to_u64().is_none() {
        let (quotient, digit) = value.div_rem(&ten);
        let d = digit.iter_u64_digits().next().unwrap_or(0);
        match chunk.checked_mul(d) {
            Some(c) => chunk = c,
            None => {
                product *= chunk;
                chunk = d;
            }
        }
        value = quotient;
    }
    let rest = value.to_u64().map_or(1, |n| if n == 0 { 1 } else { digit_product(n) });
    product * chunk * rest
}
