use std::{
    io::{self, BufRead, Write},
    path::Path,
    time::Instant,
};

use anyhow::{Context, Result};
use cnpstat_core::{
    read_records, sample_searches, ChainedIndex, Cnp, GeneratorCtx, GeneratorCtxBuilder,
    SearchStats,
};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use human_repr::HumanDuration;
use rand_pcg::Pcg64;
use tracing::{info, warn};

use crate::{generate_records_file, seeded_rng, Index};

type CnpIndex<'a> = ChainedIndex<Cnp, &'a str>;

pub fn index(args: Index) -> Result<()> {
    let mut rng = seeded_rng(args.generation.seed);

    let ctx = GeneratorCtxBuilder::new()
        .record_count(args.records)
        .reference_year(args.generation.reference_year)
        .build()?;

    ensure_records_file(&args.data, ctx, &mut rng)?;

    let start = Instant::now();
    let records = read_records(&args.data)
        .with_context(|| format!("Unable to load the records of {}", args.data.display()))?;
    info!(
        "{} records loaded in {}",
        records.len(),
        start.elapsed().as_secs_f64().human_duration()
    );

    let start = Instant::now();
    let mut index = ChainedIndex::new(args.capacity, args.hash_function.into())?;
    index.extend(
        records
            .iter()
            .map(|record| (record.identifier, record.name.as_str())),
    );
    info!(
        "{} records indexed in {}",
        index.len(),
        start.elapsed().as_secs_f64().human_duration()
    );

    let keys = records
        .iter()
        .map(|record| record.identifier)
        .collect::<Vec<_>>();

    let stats = sample_searches(&index, &keys, args.samples, &mut rng)
        .context("Unable to run the search statistics")?;

    if !stats.missing.is_empty() {
        warn!(
            "{} of the sampled CNPs were not found in the index",
            stats.missing.len()
        );
    }

    print_report(&index, &stats);

    if args.interactive {
        let stdin = io::stdin();
        lookup_loop(&index, stdin.lock(), io::stdout())?;
    }

    Ok(())
}

/// Generates the records file unless it already exists.
/// Returns whether the file was generated.
fn ensure_records_file(path: &Path, ctx: GeneratorCtx, rng: &mut Pcg64) -> Result<bool> {
    if path.exists() {
        info!("Using the existing records of {}", path.display());
        return Ok(false);
    }

    generate_records_file(path, ctx, rng)?;
    Ok(true)
}

/// Prints the index shape and the search statistics.
fn print_report(index: &CnpIndex, stats: &SearchStats<Cnp>) {
    let distribution = index.distribution();

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Statistic", "Value"]);

    let rows = [
        ("Hash function", index.hash_function().to_string()),
        ("Records", distribution.entries.to_string()),
        ("Buckets", distribution.capacity.to_string()),
        ("Occupied buckets", distribution.occupied.to_string()),
        ("Empty buckets", distribution.empty().to_string()),
        ("Load factor", format!("{:.4}", distribution.load_factor())),
        (
            "Average chain length",
            format!("{:.4}", distribution.average_chain()),
        ),
        ("Longest chain", distribution.longest.to_string()),
        ("Searches", stats.searches.to_string()),
        ("Total probes", stats.total_probes.to_string()),
        ("Most probes", stats.max_probes.to_string()),
    ];

    for (name, value) in rows {
        display_table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    let found = Cell::new(format!("{}/{}", stats.found, stats.searches));
    display_table.add_row(vec![
        Cell::new("Found"),
        if stats.missing.is_empty() {
            found.fg(Color::Green)
        } else {
            found.fg(Color::Red)
        },
    ]);

    display_table.add_row(vec![
        Cell::new("Average probes per search"),
        Cell::new(format!("{:.4}", stats.average_probes())).fg(Color::Green),
    ]);

    println!("{display_table}");
}

/// Looks up the CNPs read from `input` until an empty line, `exit` or the end of the input.
fn lookup_loop(index: &CnpIndex, mut input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "CNP to look up (empty line or 'exit' to quit): ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let query = line.trim();
        if query.is_empty() || query.eq_ignore_ascii_case("exit") {
            break;
        }

        match query.parse::<Cnp>() {
            Ok(cnp) => {
                let probe = index.search(&cnp);
                match probe.value {
                    Some(name) => writeln!(output, "{cnp}: {name} ({} probes)", probe.probes)?,
                    None => writeln!(output, "{cnp} is not indexed ({} probes)", probe.probes)?,
                }
            }
            Err(err) => writeln!(output, "Invalid CNP: {err}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use cnpstat_core::{read_records, ChainedIndex, Cnp, GeneratorCtxBuilder, HashFunction};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use tempfile::tempdir;

    use super::{ensure_records_file, lookup_loop};

    #[test]
    fn test_existing_records_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cnp_data.csv");
        let contents = "identifier,name\n2851215460013,Ana Stan\n";
        fs::write(&path, contents).unwrap();

        let ctx = GeneratorCtxBuilder::new().record_count(10).build().unwrap();
        let generated = ensure_records_file(&path, ctx, &mut Pcg64::seed_from_u64(0)).unwrap();

        assert!(!generated);
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_missing_records_are_generated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cnp_data.csv");

        let ctx = GeneratorCtxBuilder::new().record_count(10).build().unwrap();
        let generated = ensure_records_file(&path, ctx, &mut Pcg64::seed_from_u64(0)).unwrap();

        assert!(generated);
        assert_eq!(read_records(&path).unwrap().len(), 10);
    }

    fn run(queries: &str) -> String {
        let mut index = ChainedIndex::new(101, HashFunction::DigitSum).unwrap();
        index.insert("2851215460013".parse::<Cnp>().unwrap(), "Ana Stan");

        let mut output = Vec::new();
        lookup_loop(&index, queries.as_bytes(), &mut output).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_lookup_found_and_missing() {
        let output = run("2851215460013\n1601010120348\n\nignored\n");

        assert!(output.contains("2851215460013: Ana Stan (1 probes)"));
        assert!(output.contains("1601010120348 is not indexed"));
        assert!(!output.contains("ignored"));
    }

    #[test]
    fn test_lookup_invalid_input_reprompts() {
        let output = run("12345\nexit\n");

        assert!(output.contains("Invalid CNP"));
        assert_eq!(output.matches("CNP to look up").count(), 2);
    }

    #[test]
    fn test_lookup_stops_at_end_of_input() {
        let output = run("2851215460013");

        assert!(output.contains("Ana Stan"));
    }
}
