use clap::Parser;
use config::{Config, DATA_FILE};
use env_logger::Env;
use shell::Session;
use std::path::PathBuf;

mod compute;
mod config;
mod data;
mod read;
mod shell;
mod write;

/// Record income and expenses and review monthly totals
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data file loaded at startup and written on every save
    #[arg(long, env = "EXPENSE_DATA_FILE", default_value = DATA_FILE)]
    data_file: PathBuf,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config {
        data_file: cli.data_file,
    };
    let stdin = std::io::stdin();
    Session::new(config, stdin.lock(), std::io::stdout()).run()
}
