use crate::{
    error::ImportError,
    record::{CsvRecord, REQUIRED_COLUMNS},
};
use csv::{StringRecord, StringRecordsIntoIter};
use std::{
    ffi::OsStr,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// Lazy sequence of data rows, each paired with the line it starts on.
/// The header row is consumed by the reader and never yielded.
pub struct Rows<R> {
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> Rows<R> {
    /// Wrap any reader producing CSV text.
    pub fn new(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        Rows { records }
    }
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<(u64, CsvRecord), ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.records.next()?;
        Some(row.map_err(ImportError::from).and_then(|row| {
            let record = CsvRecord::try_from(&row)?;
            Ok((line_of(&row), record))
        }))
    }
}

impl TryFrom<&StringRecord> for CsvRecord {
    type Error = ImportError;

    /// Map a row positionally onto a `CsvRecord`.
    fn try_from(row: &StringRecord) -> Result<Self, Self::Error> {
        if row.len() < REQUIRED_COLUMNS {
            return Err(ImportError::missing_columns(
                line_of(row),
                row.len(),
                REQUIRED_COLUMNS,
            ));
        }

        let field = |idx: usize| row[idx].to_owned();

        Ok(CsvRecord {
            user_id: field(0),
            group_token: field(1),
            group_name: field(2),
            first_name: field(3),
            last_name: field(4),
            email: field(5),
            gender: field(6),
            birth_date: field(7),
            profile: field(8),
            password: field(9),
            avatar: row.get(REQUIRED_COLUMNS).map(str::to_owned),
        })
    }
}

/// Line of the input on which a row starts.
fn line_of(row: &StringRecord) -> u64 {
    row.position().map_or(0, |pos| pos.line())
}

/// Open the input file for a row-by-row scan.
/// Only files with a `.csv` extension are accepted; the check happens before
/// the filesystem is touched.
pub fn open(path: &Path) -> Result<Rows<BufReader<File>>, ImportError> {
    if path.extension() != Some(OsStr::new("csv")) {
        return Err(ImportError::FormatError(path.to_path_buf()));
    }

    let f = File::open(path)?;
    Ok(Rows::new(BufReader::new(f)))
}
