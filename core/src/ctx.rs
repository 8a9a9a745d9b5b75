use std::ops::RangeInclusive;

use crate::{
    error::{CnpError, CnpResult},
    DEFAULT_RECORD_COUNT, DEFAULT_REFERENCE_YEAR,
};

/// The earliest birth year a generated record can have.
const EARLIEST_BIRTH_YEAR: u16 = 1900;

/// The latest birth year a sex digit can encode.
const LATEST_BIRTH_YEAR: u16 = 2099;

/// An age group used to draw birth years.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AgeGroup {
    /// 18 to 35 years old.
    Young,
    /// 36 to 55 years old.
    Middle,
    /// 56 years old and more, born in 1900 at the earliest.
    Old,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [AgeGroup::Young, AgeGroup::Middle, AgeGroup::Old];
}

/// A builder for a generator context.
#[derive(Clone, Debug)]
pub struct GeneratorCtxBuilder {
    record_count: usize,
    reference_year: u16,
}

impl Default for GeneratorCtxBuilder {
    fn default() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

impl GeneratorCtxBuilder {
    /// Creates a new GeneratorCtxBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of records to generate.
    pub fn record_count(mut self, record_count: usize) -> Self {
        self.record_count = record_count;

        self
    }

    /// Sets the year the ages of the age groups are relative to.
    pub fn reference_year(mut self, reference_year: u16) -> Self {
        self.reference_year = reference_year;

        self
    }

    /// Builds a GeneratorCtx with the specified parameters.
    pub fn build(self) -> CnpResult<GeneratorCtx> {
        if self.record_count == 0 {
            return Err(CnpError::Field {
                name: "record count",
                value: 0,
                min: 1,
                max: u32::MAX,
            });
        }

        // the oldest "old" person must be born after 1900,
        // and the youngest "young" person before 2100
        let min_year = EARLIEST_BIRTH_YEAR + 56;
        let max_year = LATEST_BIRTH_YEAR + 18;
        if !(min_year..=max_year).contains(&self.reference_year) {
            return Err(CnpError::Field {
                name: "reference year",
                value: self.reference_year as u32,
                min: min_year as u32,
                max: max_year as u32,
            });
        }

        Ok(GeneratorCtx {
            record_count: self.record_count,
            reference_year: self.reference_year,
        })
    }
}

/// Context used to store all parameters used to generate records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorCtx {
    /// The number of records to generate.
    pub record_count: usize,
    /// The year ages are computed from.
    pub reference_year: u16,
}

impl GeneratorCtx {
    /// Returns the birth years of the people in the given age group.
    pub fn birth_years(&self, age_group: AgeGroup) -> RangeInclusive<u16> {
        let year = self.reference_year;

        match age_group {
            AgeGroup::Young => year - 35..=year - 18,
            AgeGroup::Middle => year - 55..=year - 36,
            AgeGroup::Old => EARLIEST_BIRTH_YEAR..=year - 56,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AgeGroup, GeneratorCtxBuilder};
    use crate::{CnpError, DEFAULT_RECORD_COUNT};

    #[test]
    fn test_defaults() {
        let ctx = GeneratorCtxBuilder::new().build().unwrap();

        assert_eq!(ctx.record_count, DEFAULT_RECORD_COUNT);
        assert_eq!(ctx.birth_years(AgeGroup::Young), 1990..=2007);
        assert_eq!(ctx.birth_years(AgeGroup::Middle), 1970..=1989);
        assert_eq!(ctx.birth_years(AgeGroup::Old), 1900..=1969);
    }

    #[test]
    fn test_rejects_empty_generation() {
        assert!(matches!(
            GeneratorCtxBuilder::new().record_count(0).build(),
            Err(CnpError::Field {
                name: "record count",
                ..
            })
        ));
    }

    #[test]
    fn test_reference_year_bounds() {
        assert!(GeneratorCtxBuilder::new()
            .reference_year(1956)
            .build()
            .is_ok());
        assert!(GeneratorCtxBuilder::new()
            .reference_year(2117)
            .build()
            .is_ok());
        assert!(GeneratorCtxBuilder::new()
            .reference_year(1955)
            .build()
            .is_err());
        assert!(GeneratorCtxBuilder::new()
            .reference_year(2118)
            .build()
            .is_err());
    }
}
