// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khata::auth::{IdentityProvider, LocalIdentity};
use khata::error::KhataError;
use khata::{cli, commands::currency, commands::users, db, utils};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_user(auth: &LocalIdentity<'_>, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["khata", "user"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("user", sub)) => users::handle_with(auth, sub),
        _ => panic!("user command not parsed"),
    }
}

#[test]
fn register_login_logout_cycle() {
    let conn = setup();
    let auth = LocalIdentity::with_cost(&conn, 4);
    run_user(&auth, &["register", "--email", "asha@example.com", "--password", "password123"])
        .unwrap();
    assert!(auth.current_identity().unwrap().is_none());

    run_user(&auth, &["login", "--email", "ASHA@example.com", "--password", "password123"])
        .unwrap();
    assert_eq!(auth.require_identity().unwrap().email, "asha@example.com");
    run_user(&auth, &["whoami"]).unwrap();

    run_user(&auth, &["logout"]).unwrap();
    assert!(auth.current_identity().unwrap().is_none());
}

#[test]
fn bad_password_is_reported() {
    let conn = setup();
    let auth = LocalIdentity::with_cost(&conn, 4);
    run_user(&auth, &["register", "--email", "a@b.c", "--password", "password123"]).unwrap();
    let err = run_user(&auth, &["login", "--email", "a@b.c", "--password", "password124"])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KhataError>(),
        Some(KhataError::InvalidCredentials)
    ));
}

#[test]
fn display_currency_is_validated_and_persisted() {
    let conn = setup();
    assert_eq!(utils::get_display_currency(&conn).unwrap(), "USD");

    let matches = cli::build_cli().get_matches_from(["khata", "currency", "set", "npr"]);
    if let Some(("currency", sub)) = matches.subcommand() {
        currency::handle(&conn, sub).unwrap();
    } else {
        panic!("currency command not parsed");
    }
    assert_eq!(utils::get_display_currency(&conn).unwrap(), "NPR");
    assert_eq!(utils::display_symbol(&conn).unwrap(), "रु");

    let err = utils::set_display_currency(&conn, "XYZ").unwrap_err();
    assert!(err.to_string().contains("Unknown currency"));
    assert_eq!(utils::get_display_currency(&conn).unwrap(), "NPR");
}
