// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures raised by the ledger core and its storage/identity collaborators.
#[derive(Debug, Error)]
pub enum KhataError {
    #[error("Invalid transaction type '{0}', expected income, expense or loan")]
    InvalidTransactionType(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    MalformedDate(String),
    #[error("Invalid amount '{0}', expected a non-negative decimal")]
    InvalidAmount(String),
    #[error("Remarks must not be empty")]
    EmptyRemarks,
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("Not signed in; run `khata user login` first")]
    NotSignedIn,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User '{0}' already exists")]
    UserExists(String),
    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}
