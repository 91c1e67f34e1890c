use crate::{
    error::ImportError,
    parse::Rows,
    provision::Provisioner,
    record::{CsvRecord, UserEntry},
    store::UserStore,
};
use log::{error, info, warn};
use std::io::Read;

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Data rows read, header excluded.
    pub processed: usize,
    pub persisted: usize,
    /// Input lines of the rows that were skipped.
    pub skipped: Vec<u64>,
}

/// Drives rows from the input file through provisioning into the store.
#[derive(Debug)]
pub struct Importer<P, S> {
    provisioner: P,
    store: S,
}

impl<P: Provisioner, S: UserStore> Importer<P, S> {
    /// Construct a new `Importer`.
    pub fn new(provisioner: P, store: S) -> Self {
        Importer { provisioner, store }
    }

    /// Import rows from an opened input.
    ///
    /// Provisioning and persistence failures skip the row. A malformed row
    /// ends the run; rows saved before that point stay saved.
    pub fn import<R: Read>(&mut self, rows: Rows<R>) -> Result<Summary, ImportError> {
        let mut summary = Summary::default();

        for row in rows {
            let (line, record) = match row {
                Ok(row) => row,
                Err(err) => {
                    error!("scan aborted after {} rows: {err}", summary.processed);
                    return Err(err);
                }
            };
            summary.processed += 1;

            match self.process(&record) {
                Ok(()) => {
                    info!("line {line} ({}) provisioned", record.user_id);
                    summary.persisted += 1;
                }
                Err(err) => {
                    warn!("line {line} ({}) skipped: {err}", record.user_id);
                    summary.skipped.push(line);
                }
            }
        }

        info!("finished {} lines", summary.processed);
        Ok(summary)
    }

    /// Provision a single row and save the result.
    fn process(&mut self, record: &CsvRecord) -> Result<(), ImportError> {
        let token = self.provisioner.provision(record)?;
        let entry = UserEntry::new(record, token)?;
        self.store.save(&entry)
    }

    /// Consume the importer, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
