use std::{
    fmt::{self, Display},
    ops::Range,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CnpError, CnpResult},
    CNP_LEN, CONTROL_KEY,
};

/// The sex encoded by the first digit of a CNP.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Returns the sex digit of a person of this sex born in the given year.
    /// Odd digits are used for men and even digits for women, and each pair encodes a century:
    /// 3/4 for 1800-1899, 1/2 for 1900-1999 and 5/6 for 2000-2099.
    pub fn digit_for_year(self, year: u16) -> CnpResult<u8> {
        let male_digit = match year {
            1800..=1899 => 3,
            1900..=1999 => 1,
            2000..=2099 => 5,
            _ => {
                return Err(CnpError::Field {
                    name: "birth year",
                    value: year as u32,
                    min: 1800,
                    max: 2099,
                })
            }
        };

        Ok(match self {
            Sex::Male => male_digit,
            Sex::Female => male_digit + 1,
        })
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Computes the control digit of a CNP from its first 12 digits.
/// The prefix must only contain ASCII digits.
pub fn control_digit(prefix: &[u8; 12]) -> u8 {
    let sum: u32 = prefix
        .iter()
        .zip(CONTROL_KEY)
        .map(|(&digit, weight)| digit.wrapping_sub(b'0') as u32 * weight as u32)
        .sum();

    match (sum % 11) as u8 {
        10 => 1,
        remainder => remainder,
    }
}

/// Returns true if the string is a well-formed CNP with a matching control digit.
pub fn is_valid(cnp: &str) -> bool {
    cnp.parse::<Cnp>().is_ok()
}

/// A validated personal numeric code, stored as ASCII digits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnp([u8; CNP_LEN]);

impl Cnp {
    /// Builds a CNP from its fields, zero-padding each of them and appending the control digit.
    /// Only the last two digits of the year are kept.
    pub fn from_parts(
        sex_digit: u8,
        year: u16,
        month: u8,
        day: u8,
        county: u8,
        sequence: u16,
    ) -> CnpResult<Self> {
        check_field("sex digit", sex_digit as u32, 1..=8)?;
        check_field("month", month as u32, 1..=12)?;
        check_field("day", day as u32, 1..=31)?;
        check_field("county", county as u32, 0..=99)?;
        check_field("sequence number", sequence as u32, 0..=999)?;

        let prefix = format!(
            "{sex_digit}{:02}{month:02}{day:02}{county:02}{sequence:03}",
            year % 100
        );

        let mut digits = [0; CNP_LEN];
        digits[..12].copy_from_slice(prefix.as_bytes());
        digits[12] = b'0' + control_digit(prefix_of(&digits));

        Ok(Self(digits))
    }

    /// Returns the CNP as a string slice.
    pub fn as_str(&self) -> &str {
        // a CNP only ever contains ASCII digits, so the conversion can't fail
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn sex_digit(&self) -> u8 {
        self.number(0..1) as u8
    }

    /// Returns the sex of the holder.
    pub fn sex(&self) -> Sex {
        if self.sex_digit() % 2 == 1 {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    /// Returns the full birth year, or `None` if the sex digit doesn't encode a century
    /// (foreign residents, digits 7 and 8).
    pub fn birth_year(&self) -> Option<u16> {
        let century = match self.sex_digit() {
            1 | 2 => 1900,
            3 | 4 => 1800,
            5 | 6 => 2000,
            _ => return None,
        };

        Some(century + self.number(1..3))
    }

    pub fn month(&self) -> u8 {
        self.number(3..5) as u8
    }

    pub fn day(&self) -> u8 {
        self.number(5..7) as u8
    }

    pub fn county(&self) -> u8 {
        self.number(7..9) as u8
    }

    pub fn sequence(&self) -> u16 {
        self.number(9..12)
    }

    pub fn control(&self) -> u8 {
        self.number(12..13) as u8
    }

    /// Reads the decimal number stored in the given digit range.
    fn number(&self, range: Range<usize>) -> u16 {
        self.0[range]
            .iter()
            .fold(0, |acc, &digit| acc * 10 + (digit - b'0') as u16)
    }
}

fn prefix_of(digits: &[u8; CNP_LEN]) -> &[u8; 12] {
    let [prefix @ .., _] = digits;
    prefix
}

fn check_field(
    name: &'static str,
    value: u32,
    range: std::ops::RangeInclusive<u32>,
) -> CnpResult<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CnpError::Field {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl FromStr for Cnp {
    type Err = CnpError;

    fn from_str(s: &str) -> CnpResult<Self> {
        let len = s.chars().count();
        if len != CNP_LEN {
            return Err(CnpError::Length(len));
        }

        if let Some((position, found)) = s.chars().enumerate().find(|(_, c)| !c.is_ascii_digit())
        {
            return Err(CnpError::NonDigit { position, found });
        }

        // all characters are ASCII digits, so there are exactly 13 bytes
        let mut digits = [0; CNP_LEN];
        digits.copy_from_slice(s.as_bytes());

        let expected = control_digit(prefix_of(&digits));
        let actual = digits[12] - b'0';
        if expected != actual {
            return Err(CnpError::Checksum { expected, actual });
        }

        Ok(Self(digits))
    }
}

impl TryFrom<String> for Cnp {
    type Error = CnpError;

    fn try_from(value: String) -> CnpResult<Self> {
        value.parse()
    }
}

impl From<Cnp> for String {
    fn from(cnp: Cnp) -> Self {
        cnp.as_str().to_owned()
    }
}

impl AsRef<[u8]> for Cnp {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Cnp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Cnp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cnp({})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{control_digit, is_valid, Cnp, Sex};
    use crate::CnpError;

    #[test]
    fn test_control_digit() {
        assert_eq!(control_digit(b"196010101234"), 8);
        assert_eq!(control_digit(b"500010112345"), 7);
        assert_eq!(control_digit(b"285121546001"), 3);
        // the weighted sum of this prefix is 65, which leaves a remainder of 10
        assert_eq!(control_digit(b"100000000007"), 1);
    }

    #[test]
    fn test_from_parts() {
        let cnp = Cnp::from_parts(1, 1960, 10, 10, 12, 34).unwrap();
        assert_eq!(cnp.as_str(), "1601010120348");

        let cnp = Cnp::from_parts(5, 2000, 1, 1, 12, 345).unwrap();
        assert_eq!(cnp.as_str(), "5000101123457");
        assert!(is_valid(cnp.as_str()));
    }

    #[test]
    fn test_as_str_matches_input() {
        for input in ["2851215460013", "1601010120348", "5000101123457"] {
            let cnp: Cnp = input.parse().unwrap();

            assert_eq!(cnp.as_str(), input);
            assert_eq!(cnp.to_string(), input);
            assert_eq!(String::from(cnp), input);
        }
    }

    #[test]
    fn test_from_parts_rejects_wide_fields() {
        assert!(matches!(
            Cnp::from_parts(9, 1960, 1, 1, 1, 1),
            Err(CnpError::Field { name: "sex digit", .. })
        ));
        assert!(matches!(
            Cnp::from_parts(1, 1960, 13, 1, 1, 1),
            Err(CnpError::Field { name: "month", .. })
        ));
        assert!(matches!(
            Cnp::from_parts(1, 1960, 1, 1, 1, 1000),
            Err(CnpError::Field {
                name: "sequence number",
                ..
            })
        ));
    }

    #[test]
    fn test_decode_fields() {
        let cnp: Cnp = "2851215460013".parse().unwrap();

        assert_eq!(cnp.sex(), Sex::Female);
        assert_eq!(cnp.birth_year(), Some(1985));
        assert_eq!(cnp.month(), 12);
        assert_eq!(cnp.day(), 15);
        assert_eq!(cnp.county(), 46);
        assert_eq!(cnp.sequence(), 1);
        assert_eq!(cnp.control(), 3);
    }

    #[test]
    fn test_sex_digit_for_year() {
        assert_eq!(Sex::Male.digit_for_year(1999).unwrap(), 1);
        assert_eq!(Sex::Female.digit_for_year(1850).unwrap(), 4);
        assert_eq!(Sex::Female.digit_for_year(2003).unwrap(), 6);
        assert!(Sex::Male.digit_for_year(2100).is_err());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(!is_valid("12345"));
        assert!(matches!("12345".parse::<Cnp>(), Err(CnpError::Length(5))));
        assert!(matches!("".parse::<Cnp>(), Err(CnpError::Length(0))));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(matches!(
            "19601010123a8".parse::<Cnp>(),
            Err(CnpError::NonDigit {
                position: 11,
                found: 'a'
            })
        ));
        // multi-byte characters are counted once
        assert!(matches!(
            "19601010123é8".parse::<Cnp>(),
            Err(CnpError::NonDigit { position: 11, .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_control_digit() {
        assert!(matches!(
            "1960101012340".parse::<Cnp>(),
            Err(CnpError::Checksum {
                expected: 8,
                actual: 0
            })
        ));
    }

    proptest! {
        #[test]
        fn control_digit_is_a_deterministic_digit(prefix in "[0-9]{12}") {
            let prefix: &[u8; 12] = prefix.as_bytes().try_into().unwrap();
            let digit = control_digit(prefix);

            prop_assert!(digit <= 9);
            prop_assert_eq!(digit, control_digit(prefix));
        }

        #[test]
        fn prefix_with_its_control_digit_is_valid(prefix in "[0-9]{12}") {
            let control = control_digit(prefix.as_bytes().try_into().unwrap());
            let cnp = format!("{prefix}{control}");

            prop_assert!(is_valid(&cnp));
        }
    }
}
