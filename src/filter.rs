// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Optional constraints for the transaction list view. Unset fields match
/// everything; set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Inclusive lower bound, compared as `YYYY-MM-DD` text.
    pub date_from: Option<String>,
    /// Inclusive upper bound, compared as `YYYY-MM-DD` text.
    pub date_to: Option<String>,
    pub year: Option<i32>,
    /// Matched case-insensitively against remarks, or as a substring of the amount.
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.year.is_none()
            && self.search_needle().is_none()
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.matches_with(t, self.search_needle().as_deref())
    }

    // Lowercasing goes through `str::to_lowercase`, which applies Unicode's
    // locale-independent mappings.
    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_with(&self, t: &Transaction, needle: Option<&str>) -> bool {
        if let Some(kind) = self.kind {
            if t.kind != kind {
                return false;
            }
        }
        if let Some(from) = &self.date_from {
            if t.date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if t.date.as_str() > to.as_str() {
                return false;
            }
        }
        if let Some(year) = self.year {
            match t.calendar_date() {
                Ok(d) if d.year() == year => {}
                _ => return false,
            }
        }
        if let Some(needle) = needle {
            let in_remarks = t.remarks.to_lowercase().contains(needle);
            if !in_remarks && !t.amount_text().contains(needle) {
                return false;
            }
        }
        true
    }
}

/// Returns the transactions satisfying `criteria`, in their original order.
pub fn filter(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    let needle = criteria.search_needle();
    transactions
        .iter()
        .filter(|t| criteria.matches_with(t, needle.as_deref()))
        .cloned()
        .collect()
}
