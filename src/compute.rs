use crate::{
    data::{format_amount, Error, Kind, Transaction},
    read::TransactionUser,
};
use rust_decimal::Decimal;
use std::fmt;

/// This is where transactions are stored for the session, in insertion order.
/// Duplicates are fine: nothing identifies a transaction besides its position.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Totals for every transaction whose `YYYY-MM` equals `month`. The key is
    /// compared as a string, so a malformed key just matches nothing.
    /// Returns `None` when no transaction falls in that month, and an error
    /// when a total does not fit in a `Decimal`.
    pub fn monthly_summary(&self, month: &str) -> Result<Option<MonthlySummary>, Error> {
        let overflow = || Error::AmountOverflow(month.to_owned());
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        let mut found = false;
        for tx in self.transactions.iter().filter(|tx| tx.month() == month) {
            found = true;
            let total = match tx.kind {
                Kind::Income => &mut income,
                Kind::Expense => &mut expense,
            };
            *total = total.checked_add(tx.amount).ok_or_else(overflow)?;
        }
        if !found {
            return Ok(None);
        }
        let net = income.checked_sub(expense).ok_or_else(overflow)?;
        Ok(Some(MonthlySummary {
            income,
            expense,
            net,
        }))
    }
}

impl TransactionUser for Ledger {
    fn use_tx(&mut self, tx: Transaction) {
        self.add(tx);
    }
}

/// Income and expense totals of one month, and their difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlySummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Income: {}", format_amount(self.income))?;
        writeln!(f, "Total Expense: {}", format_amount(self.expense))?;
        write!(f, "Net: {}", format_amount(self.net))
    }
}
