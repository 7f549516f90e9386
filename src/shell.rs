use crate::{
    compute::Ledger,
    config::Config,
    data::{default_description, parse_amount, parse_date, Error, Kind, Transaction, MONTH_FORMAT},
    read::load_ledger,
    write::save_ledger,
};
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::{
    io::{BufRead, Write},
    ops::ControlFlow,
    path::{Path, PathBuf},
};

/// Source of "today" for blank or invalid dates and the default month.
pub(crate) type Clock = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Main menu entries, numbered from 1 in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Summary,
    Load,
    Save,
    List,
    Exit,
}

impl Action {
    fn from_choice(choice: i64) -> Option<Self> {
        match choice {
            1 => Some(Action::Add),
            2 => Some(Action::Summary),
            3 => Some(Action::Load),
            4 => Some(Action::Save),
            5 => Some(Action::List),
            6 => Some(Action::Exit),
            _ => None,
        }
    }
}

/// One interactive session: the ledger plus everything the menu actions need.
/// Input is read line by line; every failure except a broken console is
/// reported on `output` and the menu comes back.
pub(crate) struct Session<R, W> {
    ledger: Ledger,
    config: Config,
    input: R,
    output: W,
    today: Clock,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(config: Config, input: R, output: W) -> Self {
        Self {
            ledger: Ledger::new(),
            config,
            input,
            output,
            today: local_today,
        }
    }

    /// Loads the configured file, then serves the menu until Exit is chosen or
    /// the input ends. Both paths save before returning.
    pub fn run(&mut self) -> Result<(), anyhow::Error> {
        writeln!(self.output, "Welcome to Expense Tracker")?;
        let data_file = self.config.data_file.clone();
        self.load_from(&data_file)?;
        loop {
            match self.step() {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return Ok(()),
                Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::InputClosed)) => {
                    info!("Input closed, exiting");
                    return self.exit();
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn step(&mut self) -> Result<ControlFlow<()>, anyhow::Error> {
        self.display_menu()?;
        let choice = self.read_number()?;
        match Action::from_choice(choice) {
            Some(Action::Add) => self.add_transaction()?,
            Some(Action::Summary) => self.monthly_summary()?,
            Some(Action::Load) => self.load_prompted()?,
            Some(Action::Save) => self.save()?,
            Some(Action::List) => self.list_transactions()?,
            Some(Action::Exit) => {
                self.exit()?;
                return Ok(ControlFlow::Break(()));
            }
            None => writeln!(self.output, "Invalid choice. Please try again.")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn display_menu(&mut self) -> Result<(), anyhow::Error> {
        writeln!(self.output, "\nEXPENSE TRACKER MENU")?;
        writeln!(self.output, "1. Add Income/Expense")?;
        writeln!(self.output, "2. View Monthly Summary")?;
        writeln!(self.output, "3. Load data from file")?;
        writeln!(self.output, "4. Save data to file")?;
        writeln!(self.output, "5. View all transactions")?;
        writeln!(self.output, "6. Exit")?;
        write!(self.output, "Enter your choice (1-6): ")?;
        Ok(())
    }

    /// Next input line, trimmed. Bytes that are not UTF-8 become U+FFFD, so
    /// they fail whatever parsing follows instead of ending the session.
    /// End of input surfaces as `Error::InputClosed`.
    fn read_line(&mut self) -> Result<String, anyhow::Error> {
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Err(Error::InputClosed.into());
        }
        Ok(String::from_utf8_lossy(&line).trim().to_owned())
    }

    fn prompt(&mut self, text: &str) -> Result<String, anyhow::Error> {
        write!(self.output, "{text}")?;
        self.read_line()
    }

    /// Keeps asking until `parse` accepts the line.
    fn read_parsed<T>(
        &mut self,
        retry: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, anyhow::Error> {
        loop {
            let line = self.read_line()?;
            if let Some(value) = parse(&line) {
                return Ok(value);
            }
            write!(self.output, "{retry}")?;
        }
    }

    fn read_number(&mut self) -> Result<i64, anyhow::Error> {
        self.read_parsed("Enter a valid number: ", |line| line.parse().ok())
    }

    fn add_transaction(&mut self) -> Result<(), anyhow::Error> {
        writeln!(self.output, "\nADD TRANSACTION")?;
        writeln!(self.output, "Select transaction type:")?;
        writeln!(self.output, "1. Income")?;
        writeln!(self.output, "2. Expense")?;
        write!(self.output, "Enter choice (1 or 2): ")?;
        let Some(kind) = Kind::from_choice(self.read_number()?) else {
            writeln!(self.output, "Invalid type selected.")?;
            return Ok(());
        };

        writeln!(self.output, "{}", category_menu(kind))?;
        write!(
            self.output,
            "Select {} category: ",
            kind.to_string().to_lowercase()
        )?;
        let Some(category) = kind.category(self.read_number()?) else {
            writeln!(self.output, "Invalid category.")?;
            return Ok(());
        };

        write!(self.output, "Enter amount: ")?;
        let amount = self.read_parsed("Enter a valid amount: ", |line| parse_amount(line).ok())?;

        let mut description = self.prompt("Enter description (optional): ")?;
        if description.is_empty() {
            description = default_description(category);
        }

        let date_input = self.prompt("Enter date (YYYY-MM-DD) or press Enter for today: ")?;
        let date = if date_input.is_empty() {
            (self.today)()
        } else {
            match parse_date(&date_input) {
                Ok(date) => date,
                Err(e) => {
                    debug!("{e}");
                    writeln!(self.output, "Invalid format. Using today's date.")?;
                    (self.today)()
                }
            }
        };

        self.ledger
            .add(Transaction::new(kind, category, amount, description, date));
        writeln!(self.output, "Transaction added successfully.")?;
        self.save()
    }

    fn monthly_summary(&mut self) -> Result<(), anyhow::Error> {
        let input = self.prompt("Enter month (YYYY-MM) or press Enter for current month: ")?;
        let month = if input.is_empty() {
            (self.today)().format(MONTH_FORMAT).to_string()
        } else {
            input
        };
        match self.ledger.monthly_summary(&month) {
            Ok(Some(summary)) => writeln!(self.output, "{summary}")?,
            Ok(None) => writeln!(self.output, "No transactions for {month}")?,
            Err(e) => writeln!(self.output, "{e}")?,
        }
        Ok(())
    }

    fn list_transactions(&mut self) -> Result<(), anyhow::Error> {
        if self.ledger.is_empty() {
            writeln!(self.output, "No transactions recorded.")?;
            return Ok(());
        }
        writeln!(self.output, "All Transactions:")?;
        for tx in self.ledger.transactions() {
            writeln!(self.output, "{tx}")?;
        }
        Ok(())
    }

    fn load_prompted(&mut self) -> Result<(), anyhow::Error> {
        let input = self.prompt("Enter file path: ")?;
        let path = if input.is_empty() {
            self.config.data_file.clone()
        } else {
            PathBuf::from(input)
        };
        self.load_from(&path)
    }

    /// Replaces the ledger with the content of `path`. On failure the ledger
    /// is left untouched.
    fn load_from(&mut self, path: &Path) -> Result<(), anyhow::Error> {
        match load_ledger(path) {
            Ok(ledger) => {
                self.ledger = ledger;
                writeln!(self.output, "Loaded transactions from {}", path.display())?;
            }
            Err(e) => {
                info!("Load failed: {e:#}");
                writeln!(self.output, "Failed to load: {e:#}")?;
            }
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), anyhow::Error> {
        match save_ledger(&self.config.data_file, &self.ledger) {
            Ok(()) => writeln!(
                self.output,
                "Data saved to {}",
                self.config.data_file.display()
            )?,
            Err(e) => {
                info!("Save failed: {e:#}");
                writeln!(self.output, "Failed to save: {e:#}")?;
            }
        }
        Ok(())
    }

    fn exit(&mut self) -> Result<(), anyhow::Error> {
        self.save()?;
        writeln!(self.output, "Thank you for using Expense Tracker")?;
        self.output.flush()?;
        Ok(())
    }
}

/// `1. Salary  2. Business  ...`
fn category_menu(kind: Kind) -> String {
    kind.categories()
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {name}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}
