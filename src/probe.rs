//! Probe sequence generator: folding hash for the start index, byte-sum
//! hash for the step, combined into a double-hashing sequence.
//!
//! All functions are pure. The table engine drives the attempt counter,
//! usually through [`ProbeSeq`].

/// Width in bytes of each block folded by [`initial_index`].
pub const BLOCK_LEN: usize = 3;

/// Parse a block the way `strtoul(.., 10)` reads a numeral prefix:
/// optional leading whitespace, optional sign, then the longest run of
/// decimal digits. Anything without digits is 0; `-` negates with wrapping.
fn block_value(block: &[u8]) -> u64 {
    let mut rest = block;
    while let [b, tail @ ..] = rest {
        if b.is_ascii_whitespace() {
            rest = tail;
        } else {
            break;
        }
    }
    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };
    let value = rest
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
        });
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Start index in `[0, m)`: XOR of the key's 3-byte blocks read as decimal
/// numerals, reduced modulo `m`.
///
/// Keys whose folded accumulators agree modulo `m` share a start index no
/// matter what else they contain.
#[inline]
pub fn initial_index(key: &str, m: usize) -> usize {
    debug_assert!(m > 0);
    let acc = key
        .as_bytes()
        .chunks(BLOCK_LEN)
        .fold(0u64, |acc, block| acc ^ block_value(block));
    (acc % m as u64) as usize
}

/// Step in `[1, m - 1]`: `1 + (sum of key bytes mod (m - 1))`. Never zero.
#[inline]
pub fn step(key: &str, m: usize) -> usize {
    debug_assert!(m >= 2);
    let sum = key
        .as_bytes()
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)));
    1 + (sum % (m as u64 - 1)) as usize
}

/// Index visited on `attempt`: `(initial_index + attempt * step) mod m`.
#[inline]
pub fn probe(key: &str, m: usize, attempt: usize) -> usize {
    combine(initial_index(key, m), step(key, m), m, attempt)
}

#[inline]
fn combine(start: usize, step: usize, m: usize, attempt: usize) -> usize {
    let offset = (attempt as u128 * step as u128) % m as u128;
    ((start as u128 + offset) % m as u128) as usize
}

/// Iterator over `(attempt, index)` for `attempt in 0..m`.
///
/// Both hashes are computed once up front. When `m` is prime every index is
/// visited exactly once.
#[derive(Clone, Debug)]
pub struct ProbeSeq {
    start: usize,
    step: usize,
    m: usize,
    attempt: usize,
}

impl ProbeSeq {
    pub fn new(key: &str, m: usize) -> Self {
        Self {
            start: initial_index(key, m),
            step: step(key, m),
            m,
            attempt: 0,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Iterator for ProbeSeq {
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt >= self.m {
            return None;
        }
        let attempt = self.attempt;
        self.attempt += 1;
        Some((attempt, combine(self.start, self.step, self.m, attempt)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.m - self.attempt;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ProbeSeq {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const M: usize = 1201;

    #[test]
    fn blocks_follow_numeral_prefix_rules() {
        assert_eq!(block_value(b"123"), 123);
        assert_eq!(block_value(b"1a2"), 1);
        assert_eq!(block_value(b"abc"), 0);
        assert_eq!(block_value(b" 42"), 42);
        assert_eq!(block_value(b"+7x"), 7);
        assert_eq!(block_value(b"-5"), 5u64.wrapping_neg());
        assert_eq!(block_value(b""), 0);
    }

    #[test]
    fn initial_index_folds_blocks_with_xor() {
        // "ABC" -> 0, "123" -> 123
        assert_eq!(initial_index("ABC123", M), 123);
        // 123 ^ 456 = 435
        assert_eq!(initial_index("123456", M), 435);
        // trailing partial block "78" -> 78; 123 ^ 456 ^ 78 = 509
        assert_eq!(initial_index("12345678", M), 509);
        assert_eq!(initial_index("banana", M), 0);
        assert_eq!(initial_index("", M), 0);
    }

    #[test]
    fn initial_index_reduces_mod_m() {
        // 999 ^ 1 = 998, then 998 % 7 = 4
        assert_eq!(initial_index("999001", 7), 4);
    }

    #[test]
    fn step_sums_bytes() {
        // 'a' + 'b' = 97 + 98 = 195; 1 + 195 % 1200
        assert_eq!(step("ab", M), 196);
        assert_eq!(step("", M), 1);
        // 1 + (195 % 6) = 1 + 3
        assert_eq!(step("ab", 7), 4);
    }

    #[test]
    fn probe_matches_formula() {
        let key = "ABC123";
        let h1 = initial_index(key, M);
        let h2 = step(key, M);
        for attempt in [0, 1, 2, 17, M - 1] {
            assert_eq!(probe(key, M, attempt), (h1 + attempt * h2) % M);
        }
    }

    #[test]
    fn seq_agrees_with_probe_and_is_exact() {
        let seq = ProbeSeq::new("maca", 11);
        assert_eq!(seq.len(), 11);
        for (attempt, idx) in seq {
            assert_eq!(idx, probe("maca", 11, attempt));
        }
    }

    proptest! {
        #[test]
        fn step_never_zero(key in ".{0,40}") {
            let s = step(&key, M);
            prop_assert!((1..M).contains(&s));
        }

        #[test]
        fn seq_covers_prime_table(key in "[a-zA-Z0-9]{1,12}") {
            let seen: BTreeSet<usize> = ProbeSeq::new(&key, M).map(|(_, i)| i).collect();
            prop_assert_eq!(seen.len(), M);
        }
    }
}
