use crate::compute::Ledger;
use anyhow::Context;
use log::info;
use std::{fs::File, io::Write, path::Path};

/// First line of every data file.
pub(crate) const HEADER: &str = "# Type|Category|Amount|Description|Date";

/// Basic pipe-separated exporter for a `Ledger`, header first, then one line
/// per transaction in ledger order.
pub(crate) fn write_transactions<W: Write>(
    mut writer: W,
    ledger: &Ledger,
) -> Result<(), anyhow::Error> {
    writeln!(writer, "{HEADER}")?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    for tx in ledger.transactions() {
        wtr.serialize(tx)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Truncates `path` and writes the whole ledger to it.
pub(crate) fn save_ledger(path: &Path, ledger: &Ledger) -> Result<(), anyhow::Error> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_transactions(file, ledger).with_context(|| format!("cannot write {}", path.display()))?;
    info!("Saved {} transactions to {}", ledger.len(), path.display());
    Ok(())
}
