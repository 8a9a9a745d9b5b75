use std::fmt::Display;

/// All the supported hash functions.
/// They are intentionally weak: the index is used to measure collisions, not to avoid them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// Sum of the digit values. Non-digit bytes are ignored.
    #[default]
    DigitSum,
    /// Sum of the byte values.
    CharCodeSum,
    /// Decimal value of the digits. Non-digit bytes are ignored.
    Numeric,
}

impl HashFunction {
    pub const ALL: [HashFunction; 3] = [Self::DigitSum, Self::CharCodeSum, Self::Numeric];

    /// Hashes a key into a slot in `0..capacity`.
    /// `capacity` must be strictly positive.
    pub fn hash(&self, key: &[u8], capacity: usize) -> usize {
        let digits = key.iter().filter(|c| c.is_ascii_digit()).map(|c| c - b'0');

        match self {
            Self::DigitSum => digits.map(|d| d as usize).sum::<usize>() % capacity,
            Self::CharCodeSum => key.iter().map(|&c| c as usize).sum::<usize>() % capacity,
            // Horner's rule, reducing at each step so that long keys never overflow
            Self::Numeric => digits.fold(0, |acc, d| (acc * 10 + d as usize) % capacity),
        }
    }
}

impl Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
