use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("digit sequence is empty")]
    Empty,

    #[error("invalid digit {:?} at position {position}", shown(.byte))]
    InvalidDigit { position: usize, byte: u8 },

    #[error("digit sequence of length {len} starts with a zero")]
    LeadingZero { len: usize },

    #[error("{digits}-digit value does not fit in 64 bits")]
    Overflow { digits: usize },

    #[error("goal range {low}..={high} is empty")]
    InvalidGoalRange { low: u32, high: u32 },

    #[error("digit bound {until} is below the minimum of {min}")]
    InvalidBound { until: usize, min: usize },
}

fn shown(byte: &u8) -> char {
    char::from(*byte)
}
