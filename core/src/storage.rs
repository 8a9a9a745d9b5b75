use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use tracing::debug;

use crate::{error::CnpResult, record::Record};

/// Stores records to a CSV file at the given path, overwriting it.
/// The file starts with an `identifier,name` header, followed by one row per record.
pub fn write_records<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a Record>,
) -> CnpResult<usize> {
    let file = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let buf_writer = BufWriter::with_capacity(1024 * 1024, file);
    let mut writer = csv::Writer::from_writer(buf_writer);

    let mut written = 0;
    for record in records {
        writer.serialize(record)?;
        written += 1;
    }
    writer.flush()?;

    debug!("{written} records written to {}", path.display());
    Ok(written)
}

/// Loads all the records of a CSV file written by [`write_records`].
/// The first malformed row, or a row holding an invalid CNP, aborts the loading.
pub fn read_records(path: &Path) -> CnpResult<Vec<Record>> {
    let file = File::open(path)?;
    let buf_reader = BufReader::with_capacity(1024 * 1024, file);
    let mut reader = csv::Reader::from_reader(buf_reader);

    let records = reader
        .deserialize()
        .collect::<Result<Vec<Record>, csv::Error>>()?;

    debug!("{} records read from {}", records.len(), path.display());
    Ok(records)
}
