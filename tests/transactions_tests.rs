// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khata::auth::{IdentityProvider, LocalIdentity};
use khata::error::KhataError;
use khata::models::{NewTransaction, TransactionType};
use khata::store::{SqliteStore, TransactionStore};
use khata::{cli, commands::transactions, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> (Connection, i64) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let auth = LocalIdentity::with_cost(&conn, 4);
    auth.register("asha@example.com", "password123").unwrap();
    let user = auth.sign_in("asha@example.com", "password123").unwrap();
    (conn, user.id)
}

fn seed(conn: &Connection, owner: i64) {
    let store = SqliteStore::new(conn).unwrap();
    for (kind, amount, remarks, date) in [
        (TransactionType::Expense, "50", "Bus fare", "2023-06-15"),
        (TransactionType::Income, "2000", "Salary", "2023-06-01"),
        (TransactionType::Loan, "500", "Loan from Ram", "2023-06-05"),
    ] {
        store
            .create(
                owner,
                &NewTransaction {
                    kind,
                    amount: amount.parse().unwrap(),
                    remarks: remarks.into(),
                    date: date.into(),
                },
            )
            .unwrap();
    }
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["khata", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => transactions::handle(conn, tx_m),
        _ => panic!("no tx subcommand"),
    }
}

fn list(conn: &Connection, args: &[&str]) -> Vec<String> {
    let mut argv = vec!["khata", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_rows(conn, list_m)
                .unwrap()
                .into_iter()
                .map(|t| t.remarks)
                .collect();
        }
    }
    panic!("no list subcommand");
}

#[test]
fn list_is_newest_first_and_limit_respected() {
    let (conn, owner) = setup();
    seed(&conn, owner);
    assert_eq!(list(&conn, &[]), vec!["Bus fare", "Loan from Ram", "Salary"]);
    assert_eq!(list(&conn, &["--limit", "2"]), vec!["Bus fare", "Loan from Ram"]);
}

#[test]
fn list_filters_by_type_range_and_search() {
    let (conn, owner) = setup();
    seed(&conn, owner);
    assert_eq!(list(&conn, &["--type", "income"]), vec!["Salary"]);
    assert_eq!(list(&conn, &["--type", "all"]).len(), 3);
    assert_eq!(
        list(&conn, &["--from", "2023-06-04", "--to", "2023-06-12"]),
        vec!["Loan from Ram"]
    );
    assert_eq!(list(&conn, &["--search", "BUS"]), vec!["Bus fare"]);
    assert_eq!(list(&conn, &["--search", "2000"]), vec!["Salary"]);
    assert!(list(&conn, &["--year", "2022"]).is_empty());
    assert!(list(&conn, &["--from", "2023-07-01", "--to", "2023-06-01"]).is_empty());
}

#[test]
fn command_line_type_is_case_insensitive() {
    let (conn, owner) = setup();
    seed(&conn, owner);
    assert_eq!(list(&conn, &["--type", "Income"]), vec!["Salary"]);
    run(
        &conn,
        &["add", "--type", " LOAN ", "--amount", "5", "--remarks", "Lent", "--date", "2023-06-20"],
    )
    .unwrap();
    let rows = SqliteStore::new(&conn).unwrap().list(owner).unwrap();
    assert_eq!(rows[0].kind, TransactionType::Loan);
}

#[test]
fn unknown_type_filter_is_rejected() {
    let (conn, _) = setup();
    let err = run(&conn, &["list", "--type", "gift"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KhataError>(),
        Some(KhataError::InvalidTransactionType(t)) if t == "gift"
    ));
}

#[test]
fn add_edit_and_remove_round_trip_through_handlers() {
    let (conn, owner) = setup();
    run(
        &conn,
        &["add", "--type", "expense", "--amount", "12.50", "--remarks", " Tea ", "--date", "2024-02-03"],
    )
    .unwrap();
    let store = SqliteStore::new(&conn).unwrap();
    let rows = store.list(owner).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].remarks, "Tea");
    assert_eq!(rows[0].amount, "12.50".parse::<Decimal>().unwrap());
    let id = rows[0].id.to_string();

    run(
        &conn,
        &["edit", "--id", &id, "--type", "loan", "--amount", "40", "--remarks", "Lent to Hari", "--date", "2024-02-04"],
    )
    .unwrap();
    let edited = store.list(owner).unwrap().remove(0);
    assert_eq!(edited.kind, TransactionType::Loan);
    assert_eq!(edited.amount, Decimal::from(40));
    assert_eq!(edited.remarks, "Lent to Hari");
    assert_eq!(edited.date, "2024-02-04");

    run(&conn, &["rm", "--id", &id]).unwrap();
    assert!(store.list(owner).unwrap().is_empty());

    let err = run(&conn, &["rm", "--id", &id]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn add_without_date_uses_today() {
    let (conn, owner) = setup();
    run(&conn, &["add", "--type", "income", "--amount", "1", "--remarks", "Gift"]).unwrap();
    let rows = SqliteStore::new(&conn).unwrap().list(owner).unwrap();
    assert_eq!(rows[0].date, chrono::Utc::now().date_naive().to_string());
}

#[test]
fn add_rejects_blank_remarks_and_negative_amounts() {
    let (conn, owner) = setup();
    let err = run(&conn, &["add", "--type", "income", "--amount", "5", "--remarks", "  "]).unwrap_err();
    assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::EmptyRemarks)));

    let err = run(&conn, &["add", "--type", "expense", "--amount=-5", "--remarks", "x"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::InvalidAmount(_))));

    let err = run(
        &conn,
        &["add", "--type", "expense", "--amount", "5", "--remarks", "x", "--date", "2024-13-01"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
    assert!(SqliteStore::new(&conn).unwrap().list(owner).unwrap().is_empty());
}

#[test]
fn edits_cannot_touch_another_owners_transactions() {
    let (conn, owner) = setup();
    seed(&conn, owner);
    let other = LocalIdentity::with_cost(&conn, 4)
        .register("bina@example.com", "password456")
        .unwrap();
    let store = SqliteStore::new(&conn).unwrap();
    let id = store.list(owner).unwrap()[0].id;
    let err = store
        .update(
            other.id,
            id,
            &NewTransaction {
                kind: TransactionType::Income,
                amount: Decimal::ONE,
                remarks: "mine now".into(),
                date: "2023-01-01".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, KhataError::TransactionNotFound(i) if i == id));
    assert!(store.list(other.id).unwrap().is_empty());
}

#[test]
fn commands_require_a_signed_in_user() {
    let (conn, owner) = setup();
    seed(&conn, owner);
    LocalIdentity::new(&conn).sign_out().unwrap();
    let err = run(&conn, &["list"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::NotSignedIn)));
}
