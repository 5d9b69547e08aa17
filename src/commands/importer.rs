// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{IdentityProvider, LocalIdentity};
use crate::models::{NewTransaction, TransactionType};
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// One stored document. Ids and owner fields in the file are ignored; the
/// signed-in user owns everything imported.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "type")]
    kind: String,
    amount: Value,
    remarks: String,
    date: String,
}

fn to_new_transaction(doc: Document) -> Result<NewTransaction> {
    let kind: TransactionType = doc.kind.parse()?;
    let amount = match &doc.amount {
        Value::Number(n) => parse_decimal(&n.to_string())?,
        Value::String(s) => parse_decimal(s)?,
        other => return Err(anyhow!("Invalid amount {}", other)),
    };
    let date = parse_date(&doc.date)?;
    let new = NewTransaction {
        kind,
        amount,
        remarks: doc.remarks.trim().to_string(),
        date: date.to_string(),
    };
    new.validate()?;
    Ok(new)
}

fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let user = LocalIdentity::new(conn).require_identity()?;
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open JSON {}", path))?;
    let docs: Vec<Document> =
        serde_json::from_str(&raw).with_context(|| format!("Parse JSON {}", path))?;

    // validate everything before writing anything
    let mut records = Vec::with_capacity(docs.len());
    for (i, doc) in docs.into_iter().enumerate() {
        records.push(to_new_transaction(doc).with_context(|| format!("Record {}", i + 1))?);
    }

    let tx = conn.transaction()?;
    {
        let store = SqliteStore::new(&tx)?;
        for new in &records {
            store.create(user.id, new)?;
        }
    }
    tx.commit()?;
    println!("Imported {} transactions from {}", records.len(), path);
    Ok(())
}
