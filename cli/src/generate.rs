use anyhow::{bail, Result};
use cnpstat_core::GeneratorCtxBuilder;

use crate::{generate_records_file, seeded_rng, Generate};

pub fn generate(args: Generate) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists, use --force to overwrite it",
            args.out.display()
        );
    }

    let ctx = GeneratorCtxBuilder::new()
        .record_count(args.records)
        .reference_year(args.generation.reference_year)
        .build()?;

    let mut rng = seeded_rng(args.generation.seed);
    generate_records_file(&args.out, ctx, &mut rng)
}
