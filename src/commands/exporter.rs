// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{IdentityProvider, LocalIdentity};
use crate::store::{SqliteStore, TransactionStore};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let user = LocalIdentity::new(conn).require_identity()?;
    let mut rows = SqliteStore::new(conn)?.list(user.id)?;
    // oldest first in files
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["id", "type", "amount", "remarks", "date"])?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.kind.to_string(),
                t.amount.to_string(),
                t.remarks.clone(),
                t.date.clone(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": t.id, "type": t.kind, "amount": t.amount.to_string(),
                    "remarks": t.remarks, "date": t.date
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
