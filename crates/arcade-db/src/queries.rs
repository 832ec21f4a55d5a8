use anyhow::Result;
use arcade_types::models::User;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::Database;
use crate::error::{EconomyError, EconomyResult};
use crate::models::{USER_COLUMNS, UserRow};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let role = if is_admin { "admin" } else { "user" };
            conn.execute(
                "INSERT INTO users (id, username, password, is_admin, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, username, password_hash, is_admin, role],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| Ok(query_user_by_username(conn, username)?))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| Ok(query_user_by_id(conn, id)?))
    }

    pub fn set_banned(&self, username: &str, banned: bool) -> EconomyResult<User> {
        self.with_tx(|tx| {
            let updated = tx.execute(
                "UPDATE users SET is_banned = ?1 WHERE username = ?2",
                rusqlite::params![banned, username],
            )?;
            if updated == 0 {
                return Err(EconomyError::UserNotFound(username.to_string()));
            }
            info!(username, banned, "Ban state changed");
            let row = query_user_by_username(tx, username)?
                .ok_or_else(|| EconomyError::UserNotFound(username.to_string()))?;
            Ok(row.to_public()?)
        })
    }
}

pub(crate) fn query_user_by_username(
    conn: &Connection,
    username: &str,
) -> rusqlite::Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
    conn.query_row(&sql, [username], UserRow::from_row).optional()
}

pub(crate) fn query_user_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    conn.query_row(&sql, [id], UserRow::from_row).optional()
}

/// Load a user inside an economy operation, failing with `UserNotFound`.
pub(crate) fn require_user(conn: &Connection, id: &str) -> EconomyResult<UserRow> {
    query_user_by_id(conn, id)?.ok_or_else(|| EconomyError::UserNotFound(id.to_string()))
}
