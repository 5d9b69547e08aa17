// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    CURRENCIES, currency_symbol, get_display_currency, pretty_table, set_display_currency,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let code = set_display_currency(conn, sub.get_one::<String>("code").unwrap())?;
            println!("Display currency set to {}", code);
        }
        Some(("show", _)) => {
            let code = get_display_currency(conn)?;
            println!("{} ({})", code, currency_symbol(&code).unwrap_or("?"));
        }
        Some(("list", _)) => {
            let rows = CURRENCIES
                .iter()
                .map(|(c, s)| vec![c.to_string(), s.to_string()])
                .collect();
            println!("{}", pretty_table(&["Code", "Symbol"], rows));
        }
        _ => {}
    }
    Ok(())
}
