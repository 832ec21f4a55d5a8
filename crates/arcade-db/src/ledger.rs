//! Coin balance mutation.
//!
//! `add_coins` is an unconditional signed addition; spend paths check
//! affordability themselves and then apply a negative delta through
//! [`apply_coin_delta`] inside their own transaction. The delta is still
//! refused if it would take the balance below zero.

use arcade_types::models::User;
use rusqlite::Connection;
use tracing::info;

use crate::Database;
use crate::error::{EconomyError, EconomyResult};
use crate::queries::require_user;

impl Database {
    pub fn add_coins(&self, user_id: &str, amount: i64) -> EconomyResult<User> {
        self.with_tx(|tx| {
            let balance = apply_coin_delta(tx, user_id, amount)?;
            info!(user_id, amount, balance, "Coins added");
            Ok(require_user(tx, user_id)?.to_public()?)
        })
    }
}

/// Apply `delta` to a user's balance and return the new balance.
/// Must run inside the caller's transaction.
pub(crate) fn apply_coin_delta(conn: &Connection, user_id: &str, delta: i64) -> EconomyResult<i64> {
    let user = require_user(conn, user_id)?;
    let balance = user
        .coins
        .checked_add(delta)
        .ok_or_else(|| EconomyError::InvalidInput(format!("coin amount {} overflows", delta)))?;
    if balance < 0 {
        return Err(EconomyError::InsufficientFunds {
            required: -delta,
            available: user.coins,
        });
    }
    conn.execute(
        "UPDATE users SET coins = ?1 WHERE id = ?2",
        rusqlite::params![balance, user_id],
    )?;
    Ok(balance)
}
