// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::thread;
use std::time::Duration;

use crate::auth::{IdentityProvider, LocalIdentity};
use crate::commands::reports::{monthly_table, report_skipped, summary_table};
use crate::filter::FilterCriteria;
use crate::live::{DashboardView, LiveDashboard};
use crate::store::SqliteStore;
use crate::utils::display_symbol;
use anyhow::Result;
use chrono::{Datelike, Utc};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let today = Utc::now().date_naive();
    let year = m.get_one::<i32>("year").copied().unwrap_or(today.year());
    let interval = Duration::from_millis(*m.get_one::<u64>("interval_ms").unwrap());
    let symbol = display_symbol(conn)?;

    let store = SqliteStore::new(conn)?;
    let dashboard =
        LiveDashboard::attach(&store, user.id, year, FilterCriteria::default(), today)?;
    eprintln!("Watching {} for {}; press Ctrl-C to stop", user.email, year);

    let mut shown_revision = 0;
    let mut shown_error: Option<String> = None;
    loop {
        store.poll_external_changes()?;
        let view = dashboard.view();
        if view.revision != shown_revision {
            render(&view, symbol);
            shown_revision = view.revision;
        }
        if view.last_error.is_some() && view.last_error != shown_error {
            eprintln!("Update failed: {}", view.last_error.as_deref().unwrap_or_default());
        }
        shown_error = view.last_error;
        thread::sleep(interval);
    }
}

fn render(view: &DashboardView, symbol: &str) {
    report_skipped(&view.report);
    println!("{}", summary_table(&view.summary, symbol));
    println!("{}", monthly_table(&view.report, symbol));
}
