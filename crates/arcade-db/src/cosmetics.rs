//! Catalog, ownership, and equip state.

use arcade_types::api::PurchaseResponse;
use arcade_types::models::{ActiveCosmetic, Cosmetic, CosmeticType, OwnedCosmetic};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::Database;
use crate::error::{EconomyError, EconomyResult};
use crate::ledger::apply_coin_delta;
use crate::models::{parse_enum, parse_uuid};
use crate::queries::require_user;

const COSMETIC_COLUMNS: &str = "id, name, type, price, value";

impl Database {
    pub fn create_cosmetic(
        &self,
        name: &str,
        cosmetic_type: CosmeticType,
        price: i64,
        value: &str,
    ) -> EconomyResult<Cosmetic> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EconomyError::InvalidInput("cosmetic name is empty".into()));
        }
        if price <= 0 {
            return Err(EconomyError::InvalidInput(format!(
                "cosmetic price must be positive, got {}",
                price
            )));
        }

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO cosmetics (name, type, price, value) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, cosmetic_type.as_str(), price, value],
            )?;
            let id = tx.last_insert_rowid();
            info!(id, name, %cosmetic_type, price, "Cosmetic created");
            require_cosmetic(tx, id)
        })
    }

    pub fn list_cosmetics(&self) -> EconomyResult<Vec<Cosmetic>> {
        Ok(self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM cosmetics ORDER BY id", COSMETIC_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], cosmetic_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?)
    }

    /// Buy `cosmetic_id` for `user_id`: debit the price and record ownership,
    /// both or neither.
    pub fn purchase_cosmetic(&self, user_id: &str, cosmetic_id: i64) -> EconomyResult<PurchaseResponse> {
        self.with_tx(|tx| {
            let user = require_user(tx, user_id)?;
            let cosmetic = require_cosmetic(tx, cosmetic_id)?;

            if owns_cosmetic(tx, user_id, cosmetic_id)? {
                debug!(user_id, cosmetic_id, "Purchase refused: already owned");
                return Err(EconomyError::AlreadyOwned { item: "cosmetic", id: cosmetic_id });
            }
            if user.coins < cosmetic.price {
                debug!(user_id, cosmetic_id, coins = user.coins, "Purchase refused: insufficient funds");
                return Err(EconomyError::InsufficientFunds {
                    required: cosmetic.price,
                    available: user.coins,
                });
            }

            tx.execute(
                "INSERT INTO user_cosmetics (user_id, cosmetic_id) VALUES (?1, ?2)",
                rusqlite::params![user_id, cosmetic_id],
            )?;
            let ownership_id = tx.last_insert_rowid();
            let coins = apply_coin_delta(tx, user_id, -cosmetic.price)?;

            info!(user_id, cosmetic_id, price = cosmetic.price, coins, "Cosmetic purchased");
            Ok(PurchaseResponse {
                ownership: OwnedCosmetic {
                    id: ownership_id,
                    user_id: parse_uuid(1, user_id)?,
                    cosmetic_id,
                },
                coins,
            })
        })
    }

    pub fn owned_cosmetics(&self, user_id: &str) -> EconomyResult<Vec<Cosmetic>> {
        Ok(self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, c.type, c.price, c.value
                 FROM user_cosmetics uc
                 JOIN cosmetics c ON c.id = uc.cosmetic_id
                 WHERE uc.user_id = ?1
                 ORDER BY uc.id",
            )?;
            let rows = stmt
                .query_map([user_id], cosmetic_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?)
    }

    /// Equip `cosmetic_id`, or clear the slot with `None`.
    ///
    /// Equipping requires ownership of the cosmetic.
    pub fn set_active_cosmetic(
        &self,
        user_id: &str,
        cosmetic_id: Option<i64>,
    ) -> EconomyResult<ActiveCosmetic> {
        self.with_tx(|tx| {
            require_user(tx, user_id)?;
            if let Some(cid) = cosmetic_id {
                require_cosmetic(tx, cid)?;
                if !owns_cosmetic(tx, user_id, cid)? {
                    return Err(EconomyError::CosmeticNotOwned {
                        user_id: user_id.to_string(),
                        cosmetic_id: cid,
                    });
                }
            }

            tx.execute(
                "INSERT INTO active_cosmetics (user_id, active_cosmetic_id) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET active_cosmetic_id = excluded.active_cosmetic_id",
                rusqlite::params![user_id, cosmetic_id],
            )?;
            info!(user_id, ?cosmetic_id, "Active cosmetic set");

            Ok(ActiveCosmetic {
                user_id: parse_uuid(0, user_id)?,
                active_cosmetic_id: cosmetic_id,
            })
        })
    }

    pub fn get_active_cosmetic(&self, user_id: &str) -> EconomyResult<ActiveCosmetic> {
        self.with_tx(|tx| {
            require_user(tx, user_id)?;
            let active: Option<Option<i64>> = tx
                .query_row(
                    "SELECT active_cosmetic_id FROM active_cosmetics WHERE user_id = ?1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(ActiveCosmetic {
                user_id: parse_uuid(0, user_id)?,
                active_cosmetic_id: active.flatten(),
            })
        })
    }
}

fn cosmetic_from_row(row: &Row<'_>) -> rusqlite::Result<Cosmetic> {
    let kind: String = row.get(2)?;
    Ok(Cosmetic {
        id: row.get(0)?,
        name: row.get(1)?,
        cosmetic_type: parse_enum(2, &kind)?,
        price: row.get(3)?,
        value: row.get(4)?,
    })
}

pub(crate) fn require_cosmetic(conn: &Connection, id: i64) -> EconomyResult<Cosmetic> {
    let sql = format!("SELECT {} FROM cosmetics WHERE id = ?1", COSMETIC_COLUMNS);
    conn.query_row(&sql, [id], cosmetic_from_row)
        .optional()?
        .ok_or(EconomyError::CosmeticNotFound(id))
}

pub(crate) fn owns_cosmetic(conn: &Connection, user_id: &str, cosmetic_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM user_cosmetics WHERE user_id = ?1 AND cosmetic_id = ?2)",
        rusqlite::params![user_id, cosmetic_id],
        |row| row.get(0),
    )
}
