use std::ops::ControlFlow;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CnpError, CnpResult};

/// The maximum password length the cracker accepts.
pub const MAX_PASSWORD_LENGTH: usize = 10;

/// A SHA-256 digest.
pub type Sha256Digest = [u8; 32];

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$";

const CHARSETS: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL];

/// How many characters of each class a password contains.
/// Classes are tried in this order: uppercase, lowercase, digits, special characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composition {
    pub upper: u8,
    pub lower: u8,
    pub digit: u8,
    pub special: u8,
}

impl Default for Composition {
    /// One uppercase letter, three lowercase letters, one digit and one special character.
    fn default() -> Self {
        Self {
            upper: 1,
            lower: 3,
            digit: 1,
            special: 1,
        }
    }
}

impl Composition {
    /// Returns the length of the passwords with this composition.
    pub fn len(&self) -> usize {
        self.counts().iter().map(|&count| count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn counts(&self) -> [u8; 4] {
        [self.upper, self.lower, self.digit, self.special]
    }

    /// Checks that the passwords are between 1 and [`MAX_PASSWORD_LENGTH`] characters long,
    /// and returns their length.
    pub fn validate(&self) -> CnpResult<usize> {
        let length = self.len();
        if length == 0 || length > MAX_PASSWORD_LENGTH {
            return Err(CnpError::Composition(length));
        }

        Ok(length)
    }

    /// Returns the number of candidates with this composition, or `None` if it doesn't fit in a `u128`.
    pub fn search_space(&self) -> Option<u128> {
        let mut placed = 0u128;
        let mut space = 1u128;

        for (count, charset) in self.counts().into_iter().zip(CHARSETS) {
            // builds the multinomial coefficient one binomial step at a time, each division is exact
            for k in 1..=count as u128 {
                placed += 1;
                space = space.checked_mul(placed)? / k;
            }

            space = space.checked_mul((charset.len() as u128).checked_pow(count as u32)?)?;
        }

        Some(space)
    }
}

/// The result of a cracking attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrackOutcome {
    /// The password hashing to the target, if one was found.
    pub password: Option<String>,
    /// The number of recursive calls made.
    pub calls: u64,
}

/// The state threaded through the backtracking.
struct Backtrack<'a> {
    target: &'a Sha256Digest,
    length: usize,
    remaining: [u8; 4],
    candidate: Vec<u8>,
    calls: u64,
}

impl Backtrack<'_> {
    /// Extends the current candidate by one character of every class still available.
    /// Breaks with the password as soon as a candidate matches the target.
    fn extend(&mut self) -> ControlFlow<String> {
        self.calls += 1;

        if self.candidate.len() == self.length {
            if Sha256::digest(&self.candidate).as_slice() == self.target {
                // the candidate is only made of ASCII characters
                return ControlFlow::Break(String::from_utf8_lossy(&self.candidate).into_owned());
            }

            return ControlFlow::Continue(());
        }

        for (class, charset) in CHARSETS.into_iter().enumerate() {
            if self.remaining[class] == 0 {
                continue;
            }

            self.remaining[class] -= 1;
            for &c in charset {
                self.candidate.push(c);
                let flow = self.extend();
                self.candidate.pop();
                flow?;
            }
            self.remaining[class] += 1;
        }

        ControlFlow::Continue(())
    }
}

/// Searches the password of the given composition whose SHA-256 digest is `target`,
/// by trying every candidate depth-first.
pub fn crack(target: &Sha256Digest, composition: Composition) -> CnpResult<CrackOutcome> {
    let length = composition.validate()?;

    if let Some(space) = composition.search_space() {
        debug!("cracking a {length} characters password among {space} candidates");
    }

    let mut backtrack = Backtrack {
        target,
        length,
        remaining: composition.counts(),
        candidate: Vec::with_capacity(length),
        calls: 0,
    };

    let password = match backtrack.extend() {
        ControlFlow::Break(password) => Some(password),
        ControlFlow::Continue(()) => None,
    };

    Ok(CrackOutcome {
        password,
        calls: backtrack.calls,
    })
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::{crack, Composition, Sha256Digest};
    use crate::CnpError;

    fn digest(password: &str) -> Sha256Digest {
        Sha256::digest(password.as_bytes()).into()
    }

    fn composition(upper: u8, lower: u8, digit: u8, special: u8) -> Composition {
        Composition {
            upper,
            lower,
            digit,
            special,
        }
    }

    #[test]
    fn test_first_candidate() {
        let outcome = crack(&digest("A"), composition(1, 0, 0, 0)).unwrap();

        assert_eq!(outcome.password.as_deref(), Some("A"));
        // the root call, then the call completing "A"
        assert_eq!(outcome.calls, 2);
    }

    #[test]
    fn test_exhausted_search_call_count() {
        let outcome = crack(&digest("nope"), composition(1, 0, 0, 0)).unwrap();
        assert_eq!(outcome.password, None);
        assert_eq!(outcome.calls, 1 + 26);

        // 26 uppercase prefixes with 10 digits each, then 10 digit prefixes with 26 letters each
        let outcome = crack(&digest("nope"), composition(1, 0, 1, 0)).unwrap();
        assert_eq!(outcome.password, None);
        assert_eq!(outcome.calls, 1 + 26 * (1 + 10) + 10 * (1 + 26));
    }

    #[test]
    fn test_mixed_classes() {
        for password in ["aB7", "7aB", "Ba7", "z9Z"] {
            let outcome = crack(&digest(password), composition(1, 1, 1, 0)).unwrap();
            assert_eq!(outcome.password.as_deref(), Some(password));
        }

        let outcome = crack(&digest("q$"), composition(0, 1, 0, 1)).unwrap();
        assert_eq!(outcome.password.as_deref(), Some("q$"));
    }

    #[test]
    fn test_wrong_composition_is_not_found() {
        // "ab" has two lowercase letters, not one uppercase and one lowercase
        let outcome = crack(&digest("ab"), composition(1, 1, 0, 0)).unwrap();
        assert_eq!(outcome.password, None);
    }

    #[test]
    fn test_invalid_composition() {
        assert!(matches!(
            crack(&digest(""), composition(0, 0, 0, 0)),
            Err(CnpError::Composition(0))
        ));
        assert!(matches!(
            crack(&digest(""), composition(5, 6, 0, 0)),
            Err(CnpError::Composition(11))
        ));
    }

    #[test]
    fn test_search_space() {
        assert_eq!(composition(1, 0, 1, 0).search_space(), Some(2 * 26 * 10));
        assert_eq!(
            Composition::default().search_space(),
            Some(120 * 26 * 26u128.pow(3) * 10 * 4)
        );
        // 4 placements of 2 classes of 2 characters each
        assert_eq!(
            composition(0, 2, 0, 2).search_space(),
            Some(6 * 26u128.pow(2) * 4u128.pow(2))
        );
    }

    #[test]
    fn test_oversized_composition() {
        let composition = composition(10, 10, 10, 10);

        assert_eq!(composition.search_space(), None);
        assert!(matches!(
            composition.validate(),
            Err(CnpError::Composition(40))
        ));
        assert!(matches!(
            crack(&digest(""), composition),
            Err(CnpError::Composition(40))
        ));
    }

    #[test]
    fn test_validate() {
        assert_eq!(Composition::default().validate().unwrap(), 6);
        assert_eq!(composition(10, 0, 0, 0).validate().unwrap(), 10);
        assert!(composition(0, 0, 0, 0).validate().is_err());
    }
}
