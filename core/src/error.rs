use std::io;

use thiserror::Error;

use crate::CNP_LEN;

pub type CnpResult<T> = std::result::Result<T, CnpError>;

#[derive(Error, Debug)]
pub enum CnpError {
    #[error("A CNP has exactly {len} digits, but {0} characters were given", len = CNP_LEN)]
    Length(usize),

    #[error("A CNP only contains digits, found {found:?} at position {position}")]
    NonDigit { position: usize, found: char },

    #[error("The control digit should be {expected}, but the CNP ends with {actual}")]
    Checksum { expected: u8, actual: u8 },

    #[error("The {name} field should be comprised between {min} and {max}, but is {value}")]
    Field {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("The index capacity should be at least 1")]
    Capacity,

    #[error("Cannot sample {requested} keys out of {available}")]
    SampleTooLarge { requested: usize, available: usize },

    #[error("A password composition should contain between 1 and {max} characters, but has {0}", max = crate::crack::MAX_PASSWORD_LENGTH)]
    Composition(usize),

    #[error(
        "Unable to access the file at the given path. Make sure the right permissions are available"
    )]
    Io(#[from] io::Error),

    #[error("The records file is malformed: {0}")]
    Csv(#[from] csv::Error),

    #[error("The register configuration is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
