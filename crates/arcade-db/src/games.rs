//! Game registry and premium game ownership.

use arcade_types::api::GamePurchaseResponse;
use arcade_types::models::Game;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::Database;
use crate::error::{EconomyError, EconomyResult};
use crate::ledger::apply_coin_delta;
use crate::queries::require_user;

impl Database {
    pub fn create_game(&self, name: &str, price: i64) -> EconomyResult<Game> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EconomyError::InvalidInput("game name is empty".into()));
        }
        if price < 0 {
            return Err(EconomyError::InvalidInput(format!("game price must not be negative, got {}", price)));
        }

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO games (name, price) VALUES (?1, ?2)",
                rusqlite::params![name, price],
            )?;
            let id = tx.last_insert_rowid();
            info!(id, name, price, "Game registered");
            require_game(tx, id)
        })
    }

    pub fn purchase_game(&self, user_id: &str, game_id: i64) -> EconomyResult<GamePurchaseResponse> {
        self.with_tx(|tx| {
            let user = require_user(tx, user_id)?;
            let game = require_game(tx, game_id)?;

            if !game.is_premium() {
                return Err(EconomyError::InvalidInput(format!("game {} is free to play", game_id)));
            }
            if owns_game(tx, user_id, game_id)? {
                return Err(EconomyError::AlreadyOwned { item: "game", id: game_id });
            }
            if user.coins < game.price {
                return Err(EconomyError::InsufficientFunds {
                    required: game.price,
                    available: user.coins,
                });
            }

            tx.execute(
                "INSERT INTO user_games (user_id, game_id) VALUES (?1, ?2)",
                rusqlite::params![user_id, game_id],
            )?;
            let coins = apply_coin_delta(tx, user_id, -game.price)?;
            info!(user_id, game_id, price = game.price, coins, "Game purchased");

            Ok(GamePurchaseResponse { game_id, coins })
        })
    }

    pub fn owned_games(&self, user_id: &str) -> EconomyResult<Vec<Game>> {
        Ok(self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.name, g.price FROM user_games ug
                 JOIN games g ON g.id = ug.game_id
                 WHERE ug.user_id = ?1
                 ORDER BY g.id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(Game {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?)
    }
}

pub(crate) fn require_game(conn: &Connection, id: i64) -> EconomyResult<Game> {
    conn.query_row("SELECT id, name, price FROM games WHERE id = ?1", [id], |row| {
        Ok(Game {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
        })
    })
    .optional()?
    .ok_or(EconomyError::GameNotFound(id))
}

fn owns_game(conn: &Connection, user_id: &str, game_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM user_games WHERE user_id = ?1 AND game_id = ?2)",
        rusqlite::params![user_id, game_id],
        |row| row.get(0),
    )
}
