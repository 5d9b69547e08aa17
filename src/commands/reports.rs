// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{DashboardSummary, YearReport, aggregate, available_years, summarize};
use crate::auth::{IdentityProvider, LocalIdentity};
use crate::models::Transaction;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{display_symbol, fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use comfy_table::Table;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("years", sub)) => years(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn load(conn: &Connection) -> Result<Vec<Transaction>> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let store = SqliteStore::new(conn)?;
    store
        .list(user.id)
        .context("Could not load transactions for the report")
}

pub fn monthly_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<YearReport> {
    let year = sub
        .get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| Utc::now().year());
    Ok(aggregate(&load(conn)?, year))
}

pub fn dashboard_summary(conn: &Connection) -> Result<DashboardSummary> {
    Ok(summarize(&load(conn)?, Utc::now().date_naive()))
}

pub(crate) fn monthly_table(report: &YearReport, symbol: &str) -> Table {
    let rows = report
        .buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                fmt_money(&b.income_total, symbol),
                fmt_money(&b.expense_total, symbol),
                fmt_money(&b.loan_total, symbol),
            ]
        })
        .collect();
    pretty_table(&["Month", "Income", "Expense", "Loan"], rows)
}

pub(crate) fn summary_table(summary: &DashboardSummary, symbol: &str) -> Table {
    pretty_table(
        &["Total Savings", "Total Loan", "Income (this month)", "Expense (this month)"],
        vec![vec![
            fmt_money(&summary.total_savings, symbol),
            fmt_money(&summary.total_loan, symbol),
            fmt_money(&summary.current_month_income, symbol),
            fmt_money(&summary.current_month_expense, symbol),
        ]],
    )
}

pub(crate) fn report_skipped(report: &YearReport) {
    for s in &report.skipped {
        eprintln!("Skipped transaction {} ({}): {}", s.id, s.date, s.reason);
    }
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = monthly_report(conn, sub)?;
    report_skipped(&report);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report.buckets)? {
        println!("{}", monthly_table(&report, display_symbol(conn)?));
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let summary = dashboard_summary(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        println!("{}", summary_table(&summary, display_symbol(conn)?));
    }
    Ok(())
}

fn years(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let years = available_years(&load(conn)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &years)? {
        let rows = years.iter().map(|y| vec![y.to_string()]).collect();
        println!("{}", pretty_table(&["Year"], rows));
    }
    Ok(())
}
