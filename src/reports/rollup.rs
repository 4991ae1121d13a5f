//! Spending rolled up by day and by month

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::SpendwiseResult;
use crate::models::{BudgetMonth, Money, UserId};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Money,
}

/// Expense totals per calendar day, oldest day first
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotals {
    pub period: Option<BudgetMonth>,
    pub days: Vec<DailyTotal>,
}

impl DailyTotals {
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        period: Option<BudgetMonth>,
    ) -> SpendwiseResult<Self> {
        let transactions = match period {
            Some(p) => {
                storage
                    .transactions
                    .get_by_date_range(user_id, p.start_date(), p.end_date())?
            }
            None => storage.transactions.get_for_user(user_id)?,
        };

        let mut by_day: BTreeMap<NaiveDate, Money> = BTreeMap::new();
        for txn in transactions.iter().filter(|t| t.is_expense()) {
            *by_day.entry(txn.date()).or_default() += txn.amount;
        }

        Ok(Self {
            period,
            days: by_day
                .into_iter()
                .map(|(date, total)| DailyTotal { date, total })
                .collect(),
        })
    }

    pub fn total(&self) -> Money {
        self.days.iter().map(|d| d.total).sum()
    }

    pub fn format_terminal(&self, date_format: &str) -> String {
        let mut output = String::new();
        match self.period {
            Some(period) => output.push_str(&format!("Daily Expenses: {}\n", period.long_name())),
            None => output.push_str("Daily Expenses\n"),
        }
        output.push_str(&"=".repeat(30));
        output.push('\n');

        if self.days.is_empty() {
            output.push_str("No expenses recorded.\n");
            return output;
        }

        for day in &self.days {
            output.push_str(&format!(
                "{:<14} {:>14}\n",
                day.date.format(date_format),
                day.total
            ));
        }
        output.push_str(&"-".repeat(30));
        output.push('\n');
        output.push_str(&format!("{:<14} {:>14}\n", "TOTAL", self.total()));
        output
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub period: BudgetMonth,
    pub income: Money,
    pub expenses: Money,
}

impl MonthlyTotal {
    pub fn net(&self) -> Money {
        self.income - self.expenses
    }
}

/// Income and expenses per month, newest month first
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTotals {
    pub months: Vec<MonthlyTotal>,
}

impl MonthlyTotals {
    pub fn generate(storage: &Storage, user_id: UserId) -> SpendwiseResult<Self> {
        let mut by_month: BTreeMap<BudgetMonth, (Money, Money)> = BTreeMap::new();
        for txn in storage.transactions.get_for_user(user_id)? {
            let sums = by_month.entry(txn.month()).or_default();
            if txn.is_expense() {
                sums.1 += txn.amount;
            } else {
                sums.0 += txn.amount;
            }
        }

        Ok(Self {
            months: by_month
                .into_iter()
                .rev()
                .map(|(period, (income, expenses))| MonthlyTotal {
                    period,
                    income,
                    expenses,
                })
                .collect(),
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str("Monthly Totals\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if self.months.is_empty() {
            output.push_str("No transactions recorded.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<18} {:>12} {:>12} {:>12}\n",
            "Month", "Income", "Expenses", "Net"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for month in &self.months {
            output.push_str(&format!(
                "{:<18} {:>12} {:>12} {:>12}\n",
                month.period.long_name(),
                month.income,
                month.expenses,
                month.net()
            ));
        }
        output
    }
}
