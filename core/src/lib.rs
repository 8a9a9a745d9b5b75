pub mod cnp;
pub mod crack;
pub mod ctx;
pub mod error;
pub mod generator;
pub mod hash;
pub mod index;
pub mod record;
pub mod register;
pub mod stats;
pub mod storage;

pub use {
    cnp::{control_digit, is_valid, Cnp, Sex},
    crack::{crack, Composition, CrackOutcome, Sha256Digest},
    ctx::{AgeGroup, GeneratorCtx, GeneratorCtxBuilder},
    error::{CnpError, CnpResult},
    generator::RecordGenerator,
    hash::HashFunction,
    index::{BucketDistribution, ChainedIndex, Probe},
    record::Record,
    register::{Banknote, Change, Product, Register, RegisterConfig, Sale, SimulationReport},
    stats::{sample_searches, SearchStats},
    storage::{read_records, write_records},
};

/// The number of digits of a CNP, control digit included.
pub const CNP_LEN: usize = 13;

/// The weights applied to the first 12 digits to compute the control digit.
pub const CONTROL_KEY: [u8; 12] = [2, 7, 9, 1, 4, 6, 3, 5, 8, 2, 7, 9];

/// The default number of records to generate.
pub const DEFAULT_RECORD_COUNT: usize = 1_000_000;

/// The default number of buckets of the index.
/// A prime slightly larger than the default record count.
pub const DEFAULT_CAPACITY: usize = 1_000_037;

/// The default number of random searches of the statistics pass.
pub const DEFAULT_SAMPLE_SIZE: usize = 1_000;

/// The default year the generated ages are relative to.
pub const DEFAULT_REFERENCE_YEAR: u16 = 2025;

/// The default records file.
pub const DEFAULT_DATA_FILE: &str = "cnp_data.csv";

/// The default cash register configuration file.
pub const DEFAULT_REGISTER_FILE: &str = "cash_register_data.json";
