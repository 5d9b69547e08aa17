// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{DashboardSummary, YearReport, aggregate, available_years, summarize};
use crate::error::KhataError;
use crate::filter::{FilterCriteria, filter};
use crate::models::Transaction;
use crate::store::{Subscription, TransactionStore};

/// Everything the dashboard renders, rebuilt from scratch on each change.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub year: i32,
    pub today: NaiveDate,
    pub criteria: FilterCriteria,
    pub transactions: Vec<Transaction>,
    pub report: YearReport,
    pub summary: DashboardSummary,
    pub filtered: Vec<Transaction>,
    pub years: Vec<i32>,
    pub last_error: Option<String>,
    /// Bumped on every recomputation.
    pub revision: u64,
}

impl DashboardView {
    fn new(year: i32, today: NaiveDate, criteria: FilterCriteria) -> Self {
        Self {
            year,
            today,
            criteria,
            transactions: Vec::new(),
            report: aggregate(&[], year),
            summary: DashboardSummary::default(),
            filtered: Vec::new(),
            years: Vec::new(),
            last_error: None,
            revision: 0,
        }
    }

    fn recompute(&mut self) {
        self.report = aggregate(&self.transactions, self.year);
        self.summary = summarize(&self.transactions, self.today);
        self.filtered = filter(&self.transactions, &self.criteria);
        self.years = available_years(&self.transactions);
        self.revision += 1;
    }
}

fn lock(m: &Mutex<DashboardView>) -> MutexGuard<'_, DashboardView> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A dashboard bound to one owner's live transaction list.
pub struct LiveDashboard {
    state: Arc<Mutex<DashboardView>>,
    subscription: Subscription,
}

impl LiveDashboard {
    pub fn attach<S: TransactionStore + ?Sized>(
        store: &S,
        owner: i64,
        year: i32,
        criteria: FilterCriteria,
        today: NaiveDate,
    ) -> Result<Self, KhataError> {
        let state = Arc::new(Mutex::new(DashboardView::new(year, today, criteria)));
        let sink = Arc::clone(&state);
        let subscription = store.subscribe(
            owner,
            Box::new(move |update| {
                let mut view = lock(&sink);
                match update {
                    Ok(list) => {
                        view.transactions = list.to_vec();
                        view.last_error = None;
                        view.recompute();
                        debug!(owner, revision = view.revision, "dashboard refreshed");
                    }
                    Err(err) => {
                        warn!(owner, error = %err, "dashboard update failed");
                        view.last_error = Some(err.to_string());
                    }
                }
            }),
        )?;
        Ok(Self {
            state,
            subscription,
        })
    }

    pub fn owner(&self) -> i64 {
        self.subscription.owner()
    }

    pub fn view(&self) -> DashboardView {
        lock(&self.state).clone()
    }

    pub fn revision(&self) -> u64 {
        lock(&self.state).revision
    }

    pub fn set_year(&self, year: i32) {
        let mut view = lock(&self.state);
        view.year = year;
        view.recompute();
    }

    pub fn set_criteria(&self, criteria: FilterCriteria) {
        let mut view = lock(&self.state);
        view.criteria = criteria;
        view.recompute();
    }

    /// Stops receiving updates; the last computed view is returned.
    pub fn detach(self) -> DashboardView {
        let view = self.view();
        self.subscription.unsubscribe();
        view
    }
}
