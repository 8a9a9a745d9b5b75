use serde::{Deserialize, Serialize};

use crate::cnp::Cnp;

/// A generated person, persisted as one row of the records file.
/// Field names are used as the header of the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: Cnp,
    pub name: String,
}

impl Record {
    pub fn new(identifier: Cnp, name: impl Into<String>) -> Self {
        Self {
            identifier,
            name: name.into(),
        }
    }
}
