// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::KhataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Loan,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [Self::Income, Self::Expense, Self::Loan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Loan => "loan",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = KhataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "loan" => Ok(Self::Loan),
            _ => Err(KhataError::InvalidTransactionType(s.to_string())),
        }
    }
}

/// A recorded money movement, as held by the store.
///
/// `date` is stored as zero-padded `YYYY-MM-DD` text; it is only parsed when a
/// calendar component is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub remarks: String,
    pub date: String,
}

impl Transaction {
    pub fn calendar_date(&self) -> Result<NaiveDate, KhataError> {
        calendar_date(&self.date)
    }

    /// Decimal text of the amount without trailing zeros (`50.50` -> `50.5`).
    pub fn amount_text(&self) -> String {
        self.amount.normalize().to_string()
    }
}

/// Field values for creating a transaction or replacing all fields of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub remarks: String,
    pub date: String,
}

impl NewTransaction {
    /// Checks the fields and returns the date in canonical `YYYY-MM-DD` form.
    pub fn validate(&self) -> Result<String, KhataError> {
        if self.remarks.trim().is_empty() {
            return Err(KhataError::EmptyRemarks);
        }
        if self.amount < Decimal::ZERO {
            return Err(KhataError::InvalidAmount(self.amount.to_string()));
        }
        let date = calendar_date(&self.date)?;
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// Per-month totals for one calendar month of a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub label: String,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub loan_total: Decimal,
}

impl MonthBucket {
    pub fn empty(label: String) -> Self {
        Self {
            label,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            loan_total: Decimal::ZERO,
        }
    }

    pub fn total(&self, kind: TransactionType) -> Decimal {
        match kind {
            TransactionType::Income => self.income_total,
            TransactionType::Expense => self.expense_total,
            TransactionType::Loan => self.loan_total,
        }
    }

    pub(crate) fn add(&mut self, kind: TransactionType, amount: Decimal) {
        match kind {
            TransactionType::Income => self.income_total += amount,
            TransactionType::Expense => self.expense_total += amount,
            TransactionType::Loan => self.loan_total += amount,
        }
    }
}

pub fn calendar_date(raw: &str) -> Result<NaiveDate, KhataError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| KhataError::MalformedDate(raw.to_string()))
}
