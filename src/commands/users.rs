// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{IdentityProvider, LocalIdentity};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    handle_with(&LocalIdentity::new(conn), m)
}

pub fn handle_with(auth: &LocalIdentity<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("register", sub)) => {
            let email = sub.get_one::<String>("email").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            let user = auth.register(email, password)?;
            println!("Registered {} (id {})", user.email, user.id);
        }
        Some(("login", sub)) => {
            let email = sub.get_one::<String>("email").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            let user = auth.sign_in(email, password)?;
            println!("Signed in as {}", user.email);
        }
        Some(("logout", _)) => {
            auth.sign_out()?;
            println!("Signed out");
        }
        Some(("whoami", _)) => match auth.current_identity()? {
            Some(user) => println!("{} (id {})", user.email, user.id),
            None => println!("Not signed in"),
        },
        _ => {}
    }
    Ok(())
}
