//! Peer-to-peer cosmetic trades.
//!
//! A trade is created `pending` and resolves exactly once, to `accepted` or
//! `rejected`. Ownership is only checked when the receiver accepts, and the
//! whole swap runs in one transaction: every listed row moves or none do.

use std::collections::HashSet;

use arcade_types::models::{CosmeticTrade, TradeStatus};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use crate::Database;
use crate::cosmetics::{owns_cosmetic, require_cosmetic};
use crate::error::{EconomyError, EconomyResult};
use crate::models::{parse_enum, parse_uuid};
use crate::queries::require_user;

const SIDE_SENDER: i64 = 0;
const SIDE_RECEIVER: i64 = 1;

impl Database {
    pub fn propose_trade(
        &self,
        group_id: i64,
        sender_id: &str,
        receiver_id: &str,
        sender_cosmetic_ids: &[i64],
        receiver_cosmetic_ids: &[i64],
    ) -> EconomyResult<CosmeticTrade> {
        validate_offer(sender_id, receiver_id, sender_cosmetic_ids, receiver_cosmetic_ids)?;

        self.with_tx(|tx| {
            require_user(tx, sender_id)?;
            require_user(tx, receiver_id)?;
            for &cid in sender_cosmetic_ids.iter().chain(receiver_cosmetic_ids) {
                require_cosmetic(tx, cid)?;
            }

            tx.execute(
                "INSERT INTO cosmetic_trades (group_id, sender_id, receiver_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![group_id, sender_id, receiver_id],
            )?;
            let trade_id = tx.last_insert_rowid();

            let mut insert = tx.prepare(
                "INSERT INTO trade_items (trade_id, side, position, cosmetic_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (side, ids) in [(SIDE_SENDER, sender_cosmetic_ids), (SIDE_RECEIVER, receiver_cosmetic_ids)] {
                for (position, cid) in ids.iter().enumerate() {
                    insert.execute(rusqlite::params![trade_id, side, position as i64, cid])?;
                }
            }

            info!(trade_id, group_id, sender_id, receiver_id, "Trade proposed");
            require_trade(tx, trade_id)
        })
    }

    /// Accept a pending trade as its receiver and swap ownership.
    pub fn accept_trade(&self, trade_id: i64, acting_user_id: &str) -> EconomyResult<CosmeticTrade> {
        self.with_tx(|tx| {
            let trade = require_pending_for(tx, trade_id, acting_user_id)?;
            let sender = trade.sender_id.to_string();
            let receiver = trade.receiver_id.to_string();

            // Every listed item must still be held by the party offering it,
            // and must not already be held by the party receiving it.
            for (from, to, ids) in [
                (&sender, &receiver, &trade.sender_cosmetic_ids),
                (&receiver, &sender, &trade.receiver_cosmetic_ids),
            ] {
                for &cid in ids {
                    if !owns_cosmetic(tx, from, cid)? {
                        warn!(trade_id, user_id = %from, cosmetic_id = cid, "Trade item no longer held");
                        return Err(EconomyError::CosmeticNotOwned {
                            user_id: from.clone(),
                            cosmetic_id: cid,
                        });
                    }
                    if owns_cosmetic(tx, to, cid)? {
                        return Err(EconomyError::AlreadyOwned { item: "cosmetic", id: cid });
                    }
                }
            }

            transfer(tx, &sender, &receiver, &trade.sender_cosmetic_ids)?;
            transfer(tx, &receiver, &sender, &trade.receiver_cosmetic_ids)?;
            set_status(tx, trade_id, TradeStatus::Accepted)?;

            info!(trade_id, sender = %sender, receiver = %receiver, "Trade accepted");
            require_trade(tx, trade_id)
        })
    }

    pub fn reject_trade(&self, trade_id: i64, acting_user_id: &str) -> EconomyResult<CosmeticTrade> {
        self.with_tx(|tx| {
            require_pending_for(tx, trade_id, acting_user_id)?;
            set_status(tx, trade_id, TradeStatus::Rejected)?;
            info!(trade_id, "Trade rejected");
            require_trade(tx, trade_id)
        })
    }

    pub fn get_trade(&self, trade_id: i64) -> EconomyResult<CosmeticTrade> {
        self.with_tx(|tx| require_trade(tx, trade_id))
    }

    /// Outstanding trade requests addressed to `user_id`.
    pub fn list_trades_for_user(&self, user_id: &str) -> EconomyResult<Vec<CosmeticTrade>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id FROM cosmetic_trades
                 WHERE receiver_id = ?1 AND status = 'pending'
                 ORDER BY id",
            )?;
            let ids = stmt
                .query_map([user_id], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids.into_iter().map(|id| require_trade(tx, id)).collect()
        })
    }
}

fn validate_offer(
    sender_id: &str,
    receiver_id: &str,
    sender_ids: &[i64],
    receiver_ids: &[i64],
) -> EconomyResult<()> {
    if sender_ids.is_empty() || receiver_ids.is_empty() {
        return Err(EconomyError::InvalidInput(
            "both sides of a trade must list at least one cosmetic".into(),
        ));
    }
    if sender_id == receiver_id {
        return Err(EconomyError::InvalidInput("cannot trade with yourself".into()));
    }

    let mut seen = HashSet::new();
    for &cid in sender_ids.iter().chain(receiver_ids) {
        if !seen.insert(cid) {
            return Err(EconomyError::InvalidInput(format!(
                "cosmetic {} is listed more than once",
                cid
            )));
        }
    }
    Ok(())
}

/// Load a trade that `acting_user_id` may resolve.
fn require_pending_for(conn: &Connection, trade_id: i64, acting_user_id: &str) -> EconomyResult<CosmeticTrade> {
    let trade = require_trade(conn, trade_id)?;
    if trade.status.is_terminal() {
        return Err(EconomyError::TradeNotPending(trade_id));
    }
    if trade.receiver_id.to_string() != acting_user_id {
        warn!(trade_id, acting_user_id, "Trade action by non-receiver");
        return Err(EconomyError::NotAuthorized(format!(
            "only the receiver can resolve trade {}",
            trade_id
        )));
    }
    Ok(trade)
}

fn transfer(conn: &Connection, from: &str, to: &str, cosmetic_ids: &[i64]) -> EconomyResult<()> {
    for &cid in cosmetic_ids {
        conn.execute(
            "UPDATE user_cosmetics SET user_id = ?1 WHERE user_id = ?2 AND cosmetic_id = ?3",
            rusqlite::params![to, from, cid],
        )?;
        // Whatever left the giver's hands can no longer be equipped by them.
        conn.execute(
            "UPDATE active_cosmetics SET active_cosmetic_id = NULL
             WHERE user_id = ?1 AND active_cosmetic_id = ?2",
            rusqlite::params![from, cid],
        )?;
    }
    Ok(())
}

fn set_status(conn: &Connection, trade_id: i64, status: TradeStatus) -> EconomyResult<()> {
    let updated = conn.execute(
        "UPDATE cosmetic_trades SET status = ?1 WHERE id = ?2 AND status = 'pending'",
        rusqlite::params![status.as_str(), trade_id],
    )?;
    if updated == 0 {
        return Err(EconomyError::TradeNotPending(trade_id));
    }
    Ok(())
}

fn require_trade(conn: &Connection, trade_id: i64) -> EconomyResult<CosmeticTrade> {
    let header = conn
        .query_row(
            "SELECT group_id, sender_id, receiver_id, status, created_at
             FROM cosmetic_trades WHERE id = ?1",
            [trade_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?
        .ok_or(EconomyError::TradeNotFound(trade_id))?;
    let (group_id, sender_id, receiver_id, status, created_at) = header;

    let mut stmt = conn.prepare(
        "SELECT side, cosmetic_id FROM trade_items WHERE trade_id = ?1 ORDER BY side, position",
    )?;
    let items = stmt
        .query_map([trade_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let (sender_items, receiver_items): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|(side, _)| *side == SIDE_SENDER);

    Ok(CosmeticTrade {
        id: trade_id,
        group_id,
        sender_id: parse_uuid(1, &sender_id)?,
        receiver_id: parse_uuid(2, &receiver_id)?,
        sender_cosmetic_ids: sender_items.into_iter().map(|(_, cid)| cid).collect(),
        receiver_cosmetic_ids: receiver_items.into_iter().map(|(_, cid)| cid).collect(),
        status: parse_enum(3, &status)?,
        created_at: chrono::NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?,
    })
}
