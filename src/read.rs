use crate::{
    compute::Ledger,
    data::{Error, Transaction, FIELD_COUNT},
};
use anyhow::Context;
use log::{debug, info};
use std::{fs::File, path::Path};

/// Trait for doing something with a `Transaction` read from a data file.
/// `Ledger` appends them; tests use it to look at exactly what was kept.
pub(crate) trait TransactionUser {
    fn use_tx(&mut self, tx: Transaction);
}

/// The data file is pipe-separated with no quoting at all: a `"` in a
/// description is just a character. Comment lines start with `#`, blank lines
/// are skipped by `csv` itself, and record length is checked per line.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'|')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true);
    builder
}

/// Turns one data line into a `Transaction`. Any bad field rejects the whole line.
pub(crate) fn parse_record(record: &csv::StringRecord) -> Result<Transaction, Error> {
    if record.len() != FIELD_COUNT {
        return Err(Error::WrongFieldCount(record.len()));
    }
    record
        .deserialize(None)
        .map_err(|e| Error::Malformed(e.to_string()))
}

/// Reads every well-formed transaction and hands it to `user`, in file order.
/// Malformed lines are dropped; only I/O errors abort. Returns how many lines
/// were dropped.
pub(crate) fn read_transactions<R: std::io::Read, U: TransactionUser>(
    reader: R,
    user: &mut U,
) -> Result<usize, anyhow::Error> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut dropped = 0;
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("Dropping unreadable line: {e}");
                dropped += 1;
                continue;
            }
        };
        match parse_record(&record) {
            Ok(tx) => user.use_tx(tx),
            Err(e) => {
                let line = record.position().map_or(0, |pos| pos.line());
                debug!("Dropping line {line}: {e}");
                dropped += 1;
            }
        }
    }
    Ok(dropped)
}

/// Builds a fresh ledger from `path`. The caller's ledger is only replaced
/// once this succeeds.
pub(crate) fn load_ledger(path: &Path) -> Result<Ledger, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut ledger = Ledger::new();
    let dropped = read_transactions(file, &mut ledger)
        .with_context(|| format!("cannot read {}", path.display()))?;
    info!(
        "Loaded {} transactions from {} ({dropped} lines dropped)",
        ledger.len(),
        path.display()
    );
    Ok(ledger)
}
