use crate::error::{Result, WalletError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

pub const ACCOUNTS_DUMP: &str = "accounts.dump";
pub const PAYMENTS_DUMP: &str = "payments.dump";
pub const FAVORITES_DUMP: &str = "favorites.dump";

const DELIMITER: u8 = b';';

/// Reads headerless, semicolon-delimited dump rows.
///
/// Column order follows the field order of the record type.
pub struct DumpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> DumpReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes one record per row.
    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WalletError::from))
    }
}

/// Writes headerless, semicolon-delimited dump rows, one per record.
pub struct DumpWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DumpWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_records<T: Serialize>(&mut self, records: &[T]) -> Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes `records` to `path`, truncating any previous dump.
pub fn write_dump<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    DumpWriter::new(file).write_records(records)
}

/// Reads every record from `path`. A missing file yields `None`.
pub fn read_dump<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let records = DumpReader::new(file).records().collect::<Result<Vec<T>>>()?;
    Ok(Some(records))
}
