// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly roll-ups over an owner's transaction list.
//!
//! Everything here is a pure function of its inputs: callers hand in the full
//! current list and get a freshly built result back.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::models::{MonthBucket, Transaction, TransactionType};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A transaction left out of a report because its date could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub id: i64,
    pub date: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub buckets: Vec<MonthBucket>,
    pub skipped: Vec<SkippedRecord>,
}

impl YearReport {
    pub fn total(&self, kind: TransactionType) -> Decimal {
        self.buckets.iter().map(|b| b.total(kind)).sum()
    }
}

/// Headline figures shown above the monthly chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// All-time income minus all-time expense; loans are not counted.
    pub total_savings: Decimal,
    pub total_loan: Decimal,
    pub current_month_income: Decimal,
    pub current_month_expense: Decimal,
}

fn month_label(year: i32, month0: usize) -> String {
    format!("{} {}", MONTH_NAMES[month0], year)
}

/// Buckets `transactions` into the twelve months of `year`.
///
/// Always yields twelve buckets, January first. Transactions from other years
/// are ignored; ones whose date does not parse are reported in `skipped`.
pub fn aggregate(transactions: &[Transaction], year: i32) -> YearReport {
    let mut buckets: Vec<MonthBucket> = (0..12)
        .map(|i| MonthBucket::empty(month_label(year, i)))
        .collect();
    let mut skipped = Vec::new();

    for t in transactions {
        let date = match t.calendar_date() {
            Ok(d) => d,
            Err(err) => {
                warn!(id = t.id, date = %t.date, "excluding transaction from aggregation");
                skipped.push(SkippedRecord {
                    id: t.id,
                    date: t.date.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if date.year() != year {
            continue;
        }
        buckets[date.month0() as usize].add(t.kind, t.amount);
    }

    YearReport {
        year,
        buckets,
        skipped,
    }
}

pub fn summarize(transactions: &[Transaction], today: NaiveDate) -> DashboardSummary {
    let mut summary = DashboardSummary::default();
    for t in transactions {
        match t.kind {
            TransactionType::Income => summary.total_savings += t.amount,
            TransactionType::Expense => summary.total_savings -= t.amount,
            TransactionType::Loan => summary.total_loan += t.amount,
        }

        let Ok(date) = t.calendar_date() else {
            continue;
        };
        if date.year() != today.year() || date.month() != today.month() {
            continue;
        }
        match t.kind {
            TransactionType::Income => summary.current_month_income += t.amount,
            TransactionType::Expense => summary.current_month_expense += t.amount,
            TransactionType::Loan => {}
        }
    }
    summary
}

/// Distinct years present in `transactions`, newest first.
pub fn available_years(transactions: &[Transaction]) -> Vec<i32> {
    let years: BTreeSet<i32> = transactions
        .iter()
        .filter_map(|t| t.calendar_date().ok())
        .map(|d| d.year())
        .collect();
    years.into_iter().rev().collect()
}
