//! Difficulty votes.
//!
//! Each call to `vote_difficulty` appends a row, including repeat votes by
//! the same user on the same game; the average is taken over every row.

use arcade_types::models::{DifficultySummary, DifficultyVote};
use tracing::info;

use crate::Database;
use crate::error::{EconomyError, EconomyResult};
use crate::games::require_game;
use crate::models::parse_uuid;
use crate::queries::require_user;

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

impl Database {
    pub fn vote_difficulty(&self, game_id: i64, user_id: &str, difficulty: i64) -> EconomyResult<DifficultyVote> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(EconomyError::InvalidInput(format!(
                "difficulty must be within {}..={}, got {}",
                MIN_DIFFICULTY, MAX_DIFFICULTY, difficulty
            )));
        }

        self.with_tx(|tx| {
            require_user(tx, user_id)?;
            require_game(tx, game_id)?;
            tx.execute(
                "INSERT INTO game_difficulty_votes (game_id, user_id, difficulty) VALUES (?1, ?2, ?3)",
                rusqlite::params![game_id, user_id, difficulty],
            )?;
            let id = tx.last_insert_rowid();
            info!(game_id, user_id, difficulty, "Difficulty vote recorded");
            Ok(DifficultyVote {
                id,
                game_id,
                user_id: parse_uuid(1, user_id)?,
                difficulty,
            })
        })
    }

    /// Mean difficulty rounded to one decimal place; `0.0` with no votes.
    pub fn difficulty_summary(&self, game_id: i64) -> EconomyResult<DifficultySummary> {
        self.with_tx(|tx| {
            require_game(tx, game_id)?;
            let (average, total_votes): (Option<f64>, i64) = tx.query_row(
                "SELECT AVG(difficulty), COUNT(*) FROM game_difficulty_votes WHERE game_id = ?1",
                [game_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(DifficultySummary {
                average: average.map(round_tenth).unwrap_or(0.0),
                total_votes,
            })
        })
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
