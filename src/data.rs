use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Fractional digits used whenever an amount is written or displayed.
pub const AMOUNT_DIGITS: u32 = 2;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_FORMAT: &str = "%Y-%m";

/// Number of `|`-separated fields of a persisted transaction line.
pub const FIELD_COUNT: usize = 5;

const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Business", "Investment", "Freelance", "Other"];
const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Rent",
    "Travel",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Shopping",
    "Other",
];

/// Whether money came in or went out. The textual form is the upper-case
/// variant name, both in the data file and on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Kind {
    Income,
    Expense,
}

impl Kind {
    /// Resolves the type menu (`1. Income`, `2. Expense`).
    pub fn from_choice(choice: i64) -> Option<Self> {
        match choice {
            1 => Some(Kind::Income),
            2 => Some(Kind::Expense),
            _ => None,
        }
    }

    /// The category table of this kind. Menu entry `n` is element `n - 1`.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            Kind::Income => &INCOME_CATEGORIES,
            Kind::Expense => &EXPENSE_CATEGORIES,
        }
    }

    /// Looks up a 1-based menu choice in the category table.
    pub fn category(self, choice: i64) -> Option<&'static str> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        self.categories().get(index).copied()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Income => "INCOME",
            Kind::Expense => "EXPENSE",
        })
    }
}

/// A single ledger entry. Nothing is validated here: the add workflow only
/// hands over categories taken from `Kind::categories`, and the reader keeps
/// whatever category a well-formed line carries. Amounts may be negative.
///
/// Deserialization is positional and strict (see `read::parse_record`);
/// serialization goes through `TransactionLine` so that the amount is always
/// written with exactly two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TransactionLine")]
pub(crate) struct Transaction {
    pub kind: Kind,
    pub category: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    pub description: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        kind: Kind,
        category: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            description: description.into(),
            date,
        }
    }

    /// The `YYYY-MM` key this transaction is summarized under.
    pub fn month(&self) -> String {
        self.date.format(MONTH_FORMAT).to_string()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({})",
            self.date.format(DATE_FORMAT),
            self.category,
            format_amount(self.amount),
            self.kind
        )
    }
}

/// Serialization proxy for `Transaction`, one field per column of the data file.
#[derive(Serialize)]
pub(crate) struct TransactionLine {
    pub kind: Kind,
    pub category: String,
    pub amount: String,
    pub description: String,
    pub date: String,
}

impl From<Transaction> for TransactionLine {
    fn from(tx: Transaction) -> Self {
        Self {
            kind: tx.kind,
            amount: format_amount(tx.amount),
            date: tx.date.format(DATE_FORMAT).to_string(),
            category: tx.category,
            description: tx.description,
        }
    }
}

/// Rounds half away from zero, like `printf("%.2f")` does.
pub(crate) fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_amount(amount))
}

/// Accepts plain (`12.5`) as well as scientific (`1.25e1`) notation.
/// Digit separators (`1_000`) are not amounts.
pub(crate) fn parse_amount(input: &str) -> Result<Decimal, Error> {
    if input.contains('_') {
        return Err(Error::InvalidAmount(input.to_owned()));
    }
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .map_err(|_| Error::InvalidAmount(input.to_owned()))
}

/// Exactly `YYYY-MM-DD`: four-digit year, zero-padded month and day, no sign
/// and no surrounding whitespace.
fn is_iso_date(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, Error> {
    if !is_iso_date(input) {
        return Err(Error::InvalidDate(input.to_owned()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| Error::InvalidDate(input.to_owned()))
}

fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let field = String::deserialize(deserializer)?;
    parse_amount(&field).map_err(serde::de::Error::custom)
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let field = String::deserialize(deserializer)?;
    parse_date(&field).map_err(serde::de::Error::custom)
}

pub(crate) fn default_description(category: &str) -> String {
    format!("{category} transaction")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Expected 5 fields, found {0}")]
    WrongFieldCount(usize),
    #[error("Malformed transaction: {0}")]
    Malformed(String),
    #[error("Invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Totals for {0} exceed the largest representable amount")]
    AmountOverflow(String),
    #[error("Input stream closed")]
    InputClosed,
}

#[cfg(test)]
mod tests {
    use super::{format_amount, parse_amount, parse_date, Error, Kind, Transaction};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_categories_are_gated_by_kind() {
        assert!(!Kind::Income.categories().contains(&"Rent"));
        assert!(!Kind::Income.categories().contains(&"Food"));
        assert!(!Kind::Expense.categories().contains(&"Salary"));
        assert!(!Kind::Expense.categories().contains(&"Freelance"));
        // "Other" is the only name both tables share
        assert!(Kind::Income.categories().contains(&"Other"));
        assert!(Kind::Expense.categories().contains(&"Other"));
    }

    #[test]
    fn test_category_choice() {
        assert_eq!(Kind::Income.category(1), Some("Salary"));
        assert_eq!(Kind::Income.category(5), Some("Other"));
        assert_eq!(Kind::Income.category(6), None);
        assert_eq!(Kind::Expense.category(2), Some("Rent"));
        assert_eq!(Kind::Expense.category(8), Some("Other"));
        assert_eq!(Kind::Expense.category(9), None);
        assert_eq!(Kind::Expense.category(0), None);
        assert_eq!(Kind::Expense.category(-1), None);
    }

    #[test]
    fn test_kind_choice() {
        assert_eq!(Kind::from_choice(1), Some(Kind::Income));
        assert_eq!(Kind::from_choice(2), Some(Kind::Expense));
        assert_eq!(Kind::from_choice(3), None);
        assert_eq!(Kind::from_choice(0), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(50)), "50.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
        assert_eq!(format_amount(dec!(0.125)), "0.13");
        assert_eq!(format_amount(dec!(-3.14159)), "-3.14");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.34"), Ok(dec!(12.34)));
        assert_eq!(parse_amount("-7"), Ok(dec!(-7)));
        assert_eq!(parse_amount("1.5e2"), Ok(dec!(150)));
        assert_eq!(
            parse_amount("twelve"),
            Err(Error::InvalidAmount("twelve".into()))
        );
        assert_eq!(
            parse_amount("1_000"),
            Err(Error::InvalidAmount("1_000".into()))
        );
        assert_eq!(
            parse_amount("79228162514264337593543950335"),
            Ok(rust_decimal::Decimal::MAX)
        );
        assert!(parse_amount("79228162514264337593543950336").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            parse_date("2024-13-40"),
            Err(Error::InvalidDate("2024-13-40".into()))
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("15/01/2024").is_err());
        for loose in ["2024-1-5", "2024-01-5", " 2024-01-05", "2024-01-05 ", "+2024-01-05", "02024-01-05"] {
            assert_eq!(parse_date(loose), Err(Error::InvalidDate(loose.into())));
        }
    }

    #[test]
    fn test_display() {
        let tx = Transaction::new(
            Kind::Expense,
            "Food",
            dec!(50),
            "Groceries",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );
        assert_eq!(tx.to_string(), "[2024-01-15] Food - 50.00 (EXPENSE)");
        assert_eq!(tx.month(), "2024-01");
    }
}
