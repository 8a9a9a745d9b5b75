use rand::Rng;
use tracing::info;

use crate::{
    cnp::{Cnp, Sex},
    ctx::{AgeGroup, GeneratorCtx},
    error::CnpResult,
    record::Record,
};

/// How often the generation progress is logged.
const PROGRESS_STEP: usize = 100_000;

const MALE_FIRST_NAMES: [&str; 10] = [
    "Ion", "Gheorghe", "Vasile", "Marian", "Andrei", "Mihai", "Florin", "Daniel", "Cristian",
    "Adrian",
];

const FEMALE_FIRST_NAMES: [&str; 10] = [
    "Maria",
    "Elena",
    "Cristina",
    "Ana",
    "Gabriela",
    "Ioana",
    "Andreea",
    "Daniela",
    "Alexandra",
    "Mihaela",
];

const LAST_NAMES: [&str; 10] = [
    "Popescu",
    "Ionescu",
    "Georgescu",
    "Dumitrescu",
    "Avram",
    "Moldovan",
    "Rusu",
    "Marinescu",
    "Stan",
    "Dinu",
];

/// County codes 1 to 42, and 46 for Bucharest.
const COUNTY_CODES: [u8; 43] = {
    let mut codes = [46; 43];
    let mut i = 0;
    while i < 42 {
        codes[i] = i as u8 + 1;
        i += 1;
    }
    codes
};

/// Picks a random element of a non-empty slice.
fn pick<T: Copy>(rng: &mut impl Rng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Generates random records with valid CNPs.
/// The generator yields exactly `ctx.record_count` records.
pub struct RecordGenerator<R: Rng> {
    ctx: GeneratorCtx,
    rng: R,
    generated: usize,
}

impl<R: Rng> RecordGenerator<R> {
    /// Creates a new generator drawing its randomness from `rng`.
    pub fn new(ctx: GeneratorCtx, rng: R) -> Self {
        Self {
            ctx,
            rng,
            generated: 0,
        }
    }

    /// Generates a single random record.
    pub fn generate_record(&mut self) -> CnpResult<Record> {
        let sex = if self.rng.gen_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        };

        let age_group = pick(&mut self.rng, &AgeGroup::ALL);
        let year = self.rng.gen_range(self.ctx.birth_years(age_group));
        // every month has at least 28 days
        let month = self.rng.gen_range(1..=12);
        let day = self.rng.gen_range(1..=28);
        let county = pick(&mut self.rng, &COUNTY_CODES);
        let sequence = self.rng.gen_range(1..=999);

        let identifier = Cnp::from_parts(
            sex.digit_for_year(year)?,
            year,
            month,
            day,
            county,
            sequence,
        )?;

        let first_name = match sex {
            Sex::Male => pick(&mut self.rng, &MALE_FIRST_NAMES),
            Sex::Female => pick(&mut self.rng, &FEMALE_FIRST_NAMES),
        };
        let last_name = pick(&mut self.rng, &LAST_NAMES);

        Ok(Record::new(identifier, format!("{first_name} {last_name}")))
    }
}

impl<R: Rng> Iterator for RecordGenerator<R> {
    type Item = CnpResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.generated == self.ctx.record_count {
            return None;
        }

        self.generated += 1;
        if self.generated % PROGRESS_STEP == 0 {
            info!("{} records generated", self.generated);
        }

        Some(self.generate_record())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ctx.record_count - self.generated;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for RecordGenerator<R> {}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::{RecordGenerator, FEMALE_FIRST_NAMES, MALE_FIRST_NAMES};
    use crate::{is_valid, GeneratorCtxBuilder, Record, Sex};

    fn generate(count: usize, seed: u64) -> Vec<Record> {
        let ctx = GeneratorCtxBuilder::new()
            .record_count(count)
            .build()
            .unwrap();

        RecordGenerator::new(ctx, Pcg64::seed_from_u64(seed))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_generates_requested_count() {
        let ctx = GeneratorCtxBuilder::new().record_count(250).build().unwrap();
        let generator = RecordGenerator::new(ctx, Pcg64::seed_from_u64(1));

        assert_eq!(generator.len(), 250);
        assert_eq!(generate(250, 1).len(), 250);
    }

    #[test]
    fn test_generated_cnps_are_valid() {
        for record in generate(5_000, 42) {
            assert!(
                is_valid(record.identifier.as_str()),
                "{} is invalid",
                record.identifier
            );
        }
    }

    #[test]
    fn test_generated_fields() {
        for record in generate(2_000, 7) {
            let cnp = record.identifier;
            let year = cnp.birth_year().unwrap();

            assert!((1900..=2007).contains(&year));
            assert!((1..=12).contains(&cnp.month()));
            assert!((1..=28).contains(&cnp.day()));
            assert!((1..=42).contains(&cnp.county()) || cnp.county() == 46);
            assert!((1..=999).contains(&cnp.sequence()));

            let first_name = record.name.split(' ').next().unwrap();
            match cnp.sex() {
                Sex::Male => assert!(MALE_FIRST_NAMES.contains(&first_name)),
                Sex::Female => assert!(FEMALE_FIRST_NAMES.contains(&first_name)),
            }
        }
    }

    #[test]
    fn test_same_seed_same_records() {
        assert_eq!(generate(100, 3), generate(100, 3));
        assert_ne!(generate(100, 3), generate(100, 4));
    }
}
