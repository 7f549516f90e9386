use std::path::PathBuf;

/// Data file used when nothing else is configured.
pub(crate) const DATA_FILE: &str = "expense_data.txt";

/// Session settings. Loading may read any path the user types, but saving
/// always targets `data_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub data_file: PathBuf,
}
