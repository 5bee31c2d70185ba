//! Decimal rendering and parsing, two digits at a time.
//!
//! Digit sequences are ASCII bytes, most significant digit first.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::{Error, Result};

/// Longest digit sequence that always fits in a `u64`.
pub const U64_DIGITS: usize = 19;

static DIGIT_PAIRS: &[u8; 200] = b"\
    0001020304050607080910111213141516171819\
    2021222324252627282930313233343536373839\
    4041424344454647484950515253545556575859\
    6061626364656667686970717273747576777879\
    8081828384858687888990919293949596979899";

/// The two ASCII digits of `n`, which must be below 100.
#[inline]
pub fn pair(n: u8) -> [u8; 2] {
    debug_assert!(n < 100);
    let i = usize::from(n) * 2;
    [DIGIT_PAIRS[i], DIGIT_PAIRS[i + 1]]
}

/// Checks that `digits` is a canonical decimal digit sequence.
pub fn validate(digits: &[u8]) -> Result<()> {
    if digits.is_empty() {
        return Err(Error::Empty);
    }
    if let Some(position) = digits.iter().position(|b| !b.is_ascii_digit()) {
        return Err(Error::InvalidDigit {
            position,
            byte: digits[position],
        });
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(Error::LeadingZero { len: digits.len() });
    }
    Ok(())
}

/// Converts digit values (0–9) to their ASCII form.
pub fn from_values(values: &[u8]) -> Result<Vec<u8>> {
    let digits = values
        .iter()
        .enumerate()
        .map(|(position, &v)| match v {
            0..=9 => Ok(b'0' + v),
            byte => Err(Error::InvalidDigit { position, byte }),
        })
        .collect::<Result<Vec<u8>>>()?;
    validate(&digits)?;
    Ok(digits)
}

/// Writes the decimal form of `n` into `buf`, replacing its contents.
pub fn render_u64_into(mut n: u64, buf: &mut Vec<u8>) {
    let mut tmp = [0u8; 20];
    let mut pos = tmp.len();
    while n >= 100 {
        pos -= 2;
        tmp[pos..pos + 2].copy_from_slice(&pair((n % 100) as u8));
        n /= 100;
    }
    if n < 10 {
        pos -= 1;
        tmp[pos] = b'0' + n as u8;
    } else {
        pos -= 2;
        tmp[pos..pos + 2].copy_from_slice(&pair(n as u8));
    }
    buf.clear();
    buf.extend_from_slice(&tmp[pos..]);
}

/// Writes the decimal form of `n` into `buf`, replacing its contents.
pub fn render_into(n: &BigUint, buf: &mut Vec<u8>) {
    if let Some(small) = n.to_u64() {
        return render_u64_into(small, buf);
    }

    let pairs = n.to_radix_be(100);
    buf.clear();
    buf.reserve(pairs.len() * 2);
    let (&head, tail) = match pairs.split_first() {
        Some(split) => split,
        None => return buf.push(b'0'),
    };
    if head < 10 {
        buf.push(b'0' + head);
    } else {
        buf.extend_from_slice(&pair(head));
    }
    for &p in tail {
        buf.extend_from_slice(&pair(p));
    }
}

pub fn render(n: &BigUint) -> Vec<u8> {
    let mut buf = Vec::new();
    render_into(n, &mut buf);
    buf
}

/// Parses a digit sequence of at most [`U64_DIGITS`] digits.
pub fn parse_u64(digits: &[u8]) -> Result<u64> {
    validate(digits)?;
    if digits.len() > U64_DIGITS {
        return Err(Error::Overflow {
            digits: digits.len(),
        });
    }
    Ok(pair_values(digits).fold(0, |acc, (scale, v)| acc * scale + u64::from(v)))
}

/// Parses a digit sequence of any length.
pub fn parse(digits: &[u8]) -> Result<BigUint> {
    if digits.len() <= U64_DIGITS {
        return parse_u64(digits).map(BigUint::from);
    }
    validate(digits)?;

    // Nine pairs are eighteen digits, which a u64 always holds.
    let pairs: Vec<(u64, u8)> = pair_values(digits).collect();
    let mut value = BigUint::zero();
    for chunk in pairs.chunks(9) {
        let (scale, part) = chunk
            .iter()
            .fold((1u64, 0u64), |(s, acc), &(step, v)| {
                (s * step, acc * step + u64::from(v))
            });
        value = value * scale + part;
    }
    Ok(value)
}

/// Splits validated digits into base-100 values, each with the scale it
/// occupies: 10 for a leading odd digit, 100 for every pair.
fn pair_values(digits: &[u8]) -> impl Iterator<Item = (u64, u8)> + '_ {
    let (head, rest) = digits.split_at(digits.len() % 2);
    let head = head.iter().map(|&d| (10, d - b'0'));
    let rest = rest
        .chunks_exact(2)
        .map(|p| (100, (p[0] - b'0') * 10 + (p[1] - b'0')));
    head.chain(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_cover_every_value() {
        for n in 0..100u8 {
            assert_eq!(pair(n), format!("{:02}", n).as_bytes());
        }
    }

    #[test]
    fn renders_without_leading_zeros() {
        let mut buf = Vec::new();
        for (n, expected) in [
            (0, "0"),
            (7, "7"),
            (10, "10"),
            (99, "99"),
            (100, "100"),
            (1005, "1005"),
            (u64::MAX, "18446744073709551615"),
        ] {
            render_u64_into(n, &mut buf);
            assert_eq!(buf, expected.as_bytes());
        }
    }

    #[test]
    fn renders_big_values() {
        let n = BigUint::from(9u32).pow(60);
        assert_eq!(render(&n), n.to_string().as_bytes());
        assert_eq!(render(&BigUint::zero()), b"0");
    }

    #[test]
    fn parses_odd_and_even_lengths() {
        assert_eq!(parse_u64(b"0"), Ok(0));
        assert_eq!(parse_u64(b"7"), Ok(7));
        assert_eq!(parse_u64(b"277"), Ok(277));
        assert_eq!(parse_u64(b"3778888999"), Ok(3778888999));
        assert_eq!(parse_u64(b"9999999999999999999"), Ok(9999999999999999999));
    }

    #[test]
    fn parses_past_u64() {
        let text = "277777788888899277777788888899277777788888899";
        let parsed = parse(text.as_bytes()).unwrap();
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn rejects_malformed_sequences() {
        assert_eq!(validate(b""), Err(Error::Empty));
        assert_eq!(
            validate(b"12a4"),
            Err(Error::InvalidDigit {
                position: 2,
                byte: b'a'
            })
        );
        assert_eq!(validate(b"012"), Err(Error::LeadingZero { len: 3 }));
        assert_eq!(
            parse_u64(b"12345678901234567890"),
            Err(Error::Overflow { digits: 20 })
        );
    }

    #[test]
    fn converts_digit_values() {
        assert_eq!(from_values(&[2, 7, 7]).unwrap(), b"277");
        assert_eq!(
            from_values(&[2, 10]),
            Err(Error::InvalidDigit {
                position: 1,
                byte: 10
            })
        );
    }
}
