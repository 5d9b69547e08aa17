// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{IdentityProvider, LocalIdentity};
use crate::filter::{FilterCriteria, filter};
use crate::models::{NewTransaction, Transaction, TransactionType};
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{
    display_symbol, fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;

pub fn handle(conn: &rusqlite::Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn read_fields(sub: &clap::ArgMatches, default_date: NaiveDate) -> Result<NewTransaction> {
    let kind: TransactionType = sub
        .get_one::<String>("type")
        .unwrap()
        .trim()
        .to_ascii_lowercase()
        .parse()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let remarks = sub.get_one::<String>("remarks").unwrap().trim().to_string();
    let date = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => default_date,
    };
    Ok(NewTransaction {
        kind,
        amount,
        remarks,
        date: date.to_string(),
    })
}

fn add(conn: &rusqlite::Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let new = read_fields(sub, chrono::Utc::now().date_naive())?;
    let store = SqliteStore::new(conn)?;
    let t = store.create(user.id, &new)?;
    println!(
        "Recorded {} {} on {} '{}' (#{})",
        t.kind,
        fmt_money(&t.amount, display_symbol(conn)?),
        t.date,
        t.remarks,
        t.id
    );
    Ok(())
}

fn edit(conn: &rusqlite::Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let new = read_fields(sub, chrono::Utc::now().date_naive())?;
    let store = SqliteStore::new(conn)?;
    let t = store
        .update(user.id, id, &new)
        .with_context(|| format!("Could not update transaction {}", id))?;
    println!("Updated #{}: {} {} on {}", t.id, t.kind, t.amount, t.date);
    Ok(())
}

fn remove(conn: &rusqlite::Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let id = *sub.get_one::<i64>("id").unwrap();
    SqliteStore::new(conn)?.delete(user.id, id)?;
    println!("Removed transaction {}", id);
    Ok(())
}

fn list(conn: &rusqlite::Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let symbol = display_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.clone(),
                    t.kind.to_string(),
                    fmt_money(&t.amount, symbol),
                    t.remarks.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Type", "Amount", "Remarks"], rows)
        );
    }
    Ok(())
}

/// Builds list-view criteria from `tx list` arguments. `--type all` means no
/// type constraint.
pub fn criteria_from_args(sub: &clap::ArgMatches) -> Result<FilterCriteria> {
    let kind = match sub.get_one::<String>("type").map(|s| s.trim()) {
        None | Some("") => None,
        Some(s) if s.eq_ignore_ascii_case("all") => None,
        Some(s) => Some(s.to_ascii_lowercase().parse::<TransactionType>()?),
    };
    let date_from = sub
        .get_one::<String>("from")
        .map(|s| parse_date(s).map(|d| d.to_string()))
        .transpose()?;
    let date_to = sub
        .get_one::<String>("to")
        .map(|s| parse_date(s).map(|d| d.to_string()))
        .transpose()?;
    Ok(FilterCriteria {
        kind,
        date_from,
        date_to,
        year: sub.get_one::<i32>("year").copied(),
        search_text: sub.get_one::<String>("search").cloned(),
    })
}

pub fn query_rows(
    conn: &rusqlite::Connection,
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    let user = LocalIdentity::new(conn).require_identity()?;
    let criteria = criteria_from_args(sub)?;
    let all = SqliteStore::new(conn)?
        .list(user.id)
        .context("Could not load transactions")?;
    let mut data = filter(&all, &criteria);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
