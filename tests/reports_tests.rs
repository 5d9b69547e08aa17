// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khata::auth::{IdentityProvider, LocalIdentity};
use khata::error::KhataError;
use khata::{cli, commands::reports, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> (Connection, i64) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let auth = LocalIdentity::with_cost(&conn, 4);
    auth.register("asha@example.com", "password123").unwrap();
    let user = auth.sign_in("asha@example.com", "password123").unwrap();
    (conn, user.id)
}

fn insert(conn: &Connection, owner: i64, kind: &str, amount: &str, date: &str) {
    conn.execute(
        "INSERT INTO transactions(owner_id, type, amount, remarks, date) VALUES (?1,?2,?3,'r',?4)",
        params![owner, kind, amount, date],
    )
    .unwrap();
}

fn monthly(conn: &Connection, year: &str) -> anyhow::Result<khata::aggregate::YearReport> {
    let matches = cli::build_cli().get_matches_from(["khata", "report", "monthly", "--year", year]);
    if let Some(("report", r)) = matches.subcommand() {
        if let Some(("monthly", m)) = r.subcommand() {
            return reports::monthly_report(conn, m);
        }
    }
    panic!("report monthly not parsed");
}

#[test]
fn monthly_report_buckets_the_signed_in_users_year() {
    let (conn, owner) = setup();
    insert(&conn, owner, "expense", "50", "2023-06-15");
    insert(&conn, owner, "income", "2000", "2023-06-01");
    insert(&conn, owner, "loan", "500", "2023-06-05");
    insert(&conn, owner, "income", "70", "2022-06-05");

    let other = LocalIdentity::with_cost(&conn, 4)
        .register("bina@example.com", "password456")
        .unwrap();
    insert(&conn, other.id, "income", "9999", "2023-06-02");

    let report = monthly(&conn, "2023").unwrap();
    assert_eq!(report.buckets.len(), 12);
    let june = &report.buckets[5];
    assert_eq!(june.label, "Jun 2023");
    assert_eq!(june.income_total, Decimal::from(2000));
    assert_eq!(june.expense_total, Decimal::from(50));
    assert_eq!(june.loan_total, Decimal::from(500));
    let others: Decimal = report
        .buckets
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 5)
        .map(|(_, b)| b.income_total + b.expense_total + b.loan_total)
        .sum();
    assert!(others.is_zero());
}

#[test]
fn unknown_stored_type_fails_the_report() {
    let (conn, owner) = setup();
    insert(&conn, owner, "income", "10", "2023-01-01");
    insert(&conn, owner, "bonus", "10", "2023-01-02");
    let err = monthly(&conn, "2023").unwrap_err();
    let invalid = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<KhataError>(),
            Some(KhataError::InvalidTransactionType(t)) if t == "bonus"
        )
    });
    assert!(invalid, "unexpected error: {:#}", err);
}

#[test]
fn malformed_dates_are_reported_not_fatal() {
    let (conn, owner) = setup();
    insert(&conn, owner, "income", "10", "2023-01-01");
    insert(&conn, owner, "expense", "4", "1st of March");
    let report = monthly(&conn, "2023").unwrap();
    assert_eq!(report.buckets[0].income_total, Decimal::from(10));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].date, "1st of March");
}

#[test]
fn empty_ledger_gives_twelve_zero_months() {
    let (conn, _) = setup();
    let report = monthly(&conn, "2020").unwrap();
    assert_eq!(report.buckets.len(), 12);
    assert_eq!(report.buckets[0].label, "Jan 2020");
    assert!(report.skipped.is_empty());
}

#[test]
fn summary_counts_savings_and_loans() {
    let (conn, owner) = setup();
    insert(&conn, owner, "income", "100", "2021-01-01");
    insert(&conn, owner, "expense", "30", "2021-02-01");
    insert(&conn, owner, "loan", "45", "2021-03-01");
    let today = chrono::Utc::now().date_naive().to_string();
    insert(&conn, owner, "income", "5", &today);

    let summary = reports::dashboard_summary(&conn).unwrap();
    assert_eq!(summary.total_savings, Decimal::from(75));
    assert_eq!(summary.total_loan, Decimal::from(45));
    assert_eq!(summary.current_month_income, Decimal::from(5));
    assert!(summary.current_month_expense.is_zero());
}

#[test]
fn reports_require_sign_in() {
    let (conn, _) = setup();
    LocalIdentity::new(&conn).sign_out().unwrap();
    let err = monthly(&conn, "2023").unwrap_err();
    assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::NotSignedIn)));
}
