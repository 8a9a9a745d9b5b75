mod crack;
mod generate;
mod index;
mod register;
mod validate;

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{value_parser, Args, Parser, Subcommand, ValueEnum};
use human_repr::HumanDuration;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{info, Level};

use cnpstat_core::{
    write_records, GeneratorCtx, HashFunction, RecordGenerator, DEFAULT_CAPACITY,
    DEFAULT_DATA_FILE, DEFAULT_RECORD_COUNT, DEFAULT_REFERENCE_YEAR, DEFAULT_REGISTER_FILE,
    DEFAULT_SAMPLE_SIZE,
};

use crack::crack;
use generate::generate;
use index::index;
use register::register;
use validate::validate;

/// All the hash functions the index can use.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum HashFunctionArg {
    DigitSum,
    CharCodeSum,
    Numeric,
}

impl From<HashFunctionArg> for HashFunction {
    fn from(arg: HashFunctionArg) -> Self {
        match arg {
            HashFunctionArg::DigitSum => HashFunction::DigitSum,
            HashFunctionArg::CharCodeSum => HashFunction::CharCodeSum,
            HashFunctionArg::Numeric => HashFunction::Numeric,
        }
    }
}

/// Synthetic CNP generation, chained hash index statistics and other small exercises.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Index(Index),
    Generate(Generate),
    Validate(Validate),
    Crack(Crack),
    Register(Register),
}

/// Index the records of a CSV file and measure the average number of probes per search.
/// The file is generated first if it doesn't exist.
#[derive(Args)]
pub struct Index {
    /// The records file.
    #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
    data: PathBuf,

    /// The number of records to generate if the records file doesn't exist.
    #[arg(short, long, value_parser = check_positive, default_value_t = DEFAULT_RECORD_COUNT)]
    records: usize,

    /// The number of buckets of the index.
    /// A prime number larger than the number of records spreads the keys best.
    #[arg(short, long, value_parser = check_positive, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// The hash function of the index.
    #[arg(long = "hash", value_enum, default_value_t = HashFunctionArg::DigitSum)]
    hash_function: HashFunctionArg,

    /// The number of random searches.
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    samples: usize,

    #[command(flatten)]
    generation: GenerationArgs,

    /// Prompt for CNPs to look up once the statistics are printed.
    #[arg(short, long)]
    interactive: bool,
}

/// Generate a records file.
#[derive(Args)]
pub struct Generate {
    /// The records file to create.
    #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
    out: PathBuf,

    /// The number of records to generate.
    #[arg(short, long, value_parser = check_positive, default_value_t = DEFAULT_RECORD_COUNT)]
    records: usize,

    #[command(flatten)]
    generation: GenerationArgs,

    /// Overwrite the records file if it already exists.
    #[arg(short, long)]
    force: bool,
}

/// Randomness settings shared by the commands generating records.
#[derive(Args)]
pub struct GenerationArgs {
    /// The seed of the random generator.
    /// A random seed is used and logged if none is given.
    #[arg(long)]
    seed: Option<u64>,

    /// The year the ages of the generated people are relative to.
    #[arg(long, value_parser = value_parser!(u16).range(1956..=2117), default_value_t = DEFAULT_REFERENCE_YEAR)]
    reference_year: u16,
}

/// Check whether CNPs are valid, and decode them.
#[derive(Args)]
pub struct Validate {
    /// The CNPs to check.
    #[arg(required = true)]
    cnps: Vec<String>,
}

/// Find the password producing a SHA-256 digest, by trying every password of a given composition.
#[derive(Args)]
pub struct Crack {
    /// The digest to crack, in hexadecimal.
    #[arg(value_parser = check_hex)]
    digest: [u8; 32],

    /// The number of uppercase letters.
    #[arg(long, value_parser = value_parser!(u8).range(..=10), default_value_t = 1)]
    upper: u8,

    /// The number of lowercase letters.
    #[arg(long, value_parser = value_parser!(u8).range(..=10), default_value_t = 3)]
    lower: u8,

    /// The number of digits.
    #[arg(long, value_parser = value_parser!(u8).range(..=10), default_value_t = 1)]
    digit: u8,

    /// The number of special characters, among `!@#$`.
    #[arg(long, value_parser = value_parser!(u8).range(..=10), default_value_t = 1)]
    special: u8,
}

/// Simulate a cash register giving back change until it runs out of banknotes.
#[derive(Args)]
pub struct Register {
    /// The register configuration. A default one is created if it doesn't exist.
    #[arg(short, long, default_value = DEFAULT_REGISTER_FILE)]
    data: PathBuf,

    /// The seed of the random generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many sales.
    #[arg(short, long)]
    max_sales: Option<usize>,
}

/// Checks if the number is strictly positive.
fn check_positive(n: &str) -> Result<usize> {
    let n = n.parse::<usize>().context("Expected a number")?;

    if n == 0 {
        bail!("The number should be at least 1");
    }

    Ok(n)
}

/// Checks if the digest is a valid hexadecimal SHA-256 digest.
fn check_hex(hex: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex).context("The digest is not valid hexadecimal")?;

    bytes
        .try_into()
        .or_else(|bytes: Vec<u8>| bail!("A SHA-256 digest is 32 bytes long, not {}", bytes.len()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.commands {
        Commands::Index(args) => index(args)?,
        Commands::Generate(args) => generate(args)?,
        Commands::Validate(args) => validate(args)?,
        Commands::Crack(args) => crack(args)?,
        Commands::Register(args) => register(args)?,
    }

    Ok(())
}

/// Helper function to create a random generator, logging the seed so that a run can be replayed.
fn seeded_rng(seed: Option<u64>) -> Pcg64 {
    let seed = seed.unwrap_or_else(rand::random);
    info!("Using the random seed {seed}");

    Pcg64::seed_from_u64(seed)
}

/// Helper function to generate records and store them to a CSV file.
fn generate_records_file(path: &Path, ctx: GeneratorCtx, rng: &mut Pcg64) -> Result<()> {
    info!(
        "Generating {} records into {}",
        ctx.record_count,
        path.display()
    );
    let start = Instant::now();

    let records = RecordGenerator::new(ctx, rng)
        .collect::<Result<Vec<_>, _>>()
        .context("Unable to generate the records")?;

    write_records(path, &records).context("Unable to store the records to the disk")?;

    info!(
        "{} records generated in {}",
        records.len(),
        start.elapsed().as_secs_f64().human_duration()
    );

    Ok(())
}
