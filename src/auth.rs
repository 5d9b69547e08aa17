// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local sign-in. Only the resulting owner id ever reaches the ledger code.

use bcrypt::{hash, verify};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use crate::error::KhataError;
use crate::models::User;

pub const SESSION_KEY: &str = "session_user";
pub const MIN_PASSWORD_LEN: usize = 8;

pub trait IdentityProvider {
    fn current_identity(&self) -> Result<Option<User>, KhataError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<User, KhataError>;
    fn sign_out(&self) -> Result<(), KhataError>;

    fn require_identity(&self) -> Result<User, KhataError> {
        self.current_identity()?.ok_or(KhataError::NotSignedIn)
    }
}

/// Profiles kept in the `users` table; the session is the `session_user` setting.
pub struct LocalIdentity<'c> {
    conn: &'c Connection,
    cost: u32,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<'c> LocalIdentity<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self::with_cost(conn, bcrypt::DEFAULT_COST)
    }

    /// `cost` is the bcrypt work factor used for new password hashes.
    pub fn with_cost(conn: &'c Connection, cost: u32) -> Self {
        Self { conn, cost }
    }

    pub fn register(&self, email: &str, password: &str) -> Result<User, KhataError> {
        let email = normalize_email(email);
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(KhataError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE email=?1",
                params![email],
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(KhataError::UserExists(email));
        }
        let password_hash = hash(password, self.cost)?;
        self.conn.execute(
            "INSERT INTO users(email, password_hash) VALUES (?1, ?2)",
            params![email, password_hash],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(user = id, "registered user");
        Ok(User { id, email })
    }

    fn user_by_id(&self, id: i64) -> Result<Option<User>, KhataError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, email FROM users WHERE id=?1",
                params![id],
                |r| {
                    Ok(User {
                        id: r.get(0)?,
                        email: r.get(1)?,
                    })
                },
            )
            .optional()?)
    }
}

impl IdentityProvider for LocalIdentity<'_> {
    fn current_identity(&self) -> Result<Option<User>, KhataError> {
        let session: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![SESSION_KEY],
                |r| r.get(0),
            )
            .optional()?;
        let Some(raw) = session else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(id) => self.user_by_id(id),
            Err(_) => {
                warn!(session = %raw, "ignoring unreadable session");
                Ok(None)
            }
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<User, KhataError> {
        let email = normalize_email(email);
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email=?1",
                params![email],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let Some((id, password_hash)) = row else {
            return Err(KhataError::InvalidCredentials);
        };
        if !verify(password, &password_hash)? {
            warn!(user = id, "rejected sign-in");
            return Err(KhataError::InvalidCredentials);
        }
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![SESSION_KEY, id.to_string()],
        )?;
        info!(user = id, "signed in");
        Ok(User { id, email })
    }

    fn sign_out(&self) -> Result<(), KhataError> {
        let removed = self
            .conn
            .execute("DELETE FROM settings WHERE key=?1", params![SESSION_KEY])?;
        if removed > 0 {
            info!("signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn register_then_sign_in_sets_session() {
        let conn = conn();
        let auth = LocalIdentity::with_cost(&conn, 4);
        let user = auth.register(" Asha@Example.com ", "correct horse").unwrap();
        assert_eq!(user.email, "asha@example.com");
        assert!(auth.current_identity().unwrap().is_none());

        let signed = auth.sign_in("asha@example.com", "correct horse").unwrap();
        assert_eq!(signed, user);
        assert_eq!(auth.require_identity().unwrap(), user);

        auth.sign_out().unwrap();
        assert!(matches!(
            auth.require_identity(),
            Err(KhataError::NotSignedIn)
        ));
    }

    #[test]
    fn wrong_password_and_unknown_user_are_rejected() {
        let conn = conn();
        let auth = LocalIdentity::with_cost(&conn, 4);
        auth.register("a@b.c", "long enough").unwrap();
        assert!(matches!(
            auth.sign_in("a@b.c", "not it at all"),
            Err(KhataError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@b.c", "long enough"),
            Err(KhataError::InvalidCredentials)
        ));
        assert!(auth.current_identity().unwrap().is_none());
    }

    #[test]
    fn duplicate_and_short_passwords_fail() {
        let conn = conn();
        let auth = LocalIdentity::with_cost(&conn, 4);
        auth.register("a@b.c", "long enough").unwrap();
        assert!(matches!(
            auth.register("A@B.C", "long enough"),
            Err(KhataError::UserExists(_))
        ));
        assert!(matches!(
            auth.register("x@y.z", "short"),
            Err(KhataError::WeakPassword(8))
        ));
    }
}
