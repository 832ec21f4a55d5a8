use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (economy schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                coins       INTEGER NOT NULL DEFAULT 0 CHECK (coins >= 0),
                is_admin    INTEGER NOT NULL DEFAULT 0,
                is_banned   INTEGER NOT NULL DEFAULT 0,
                role        TEXT NOT NULL DEFAULT 'user',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE cosmetics (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                type        TEXT NOT NULL
                            CHECK (type IN ('theme', 'badge', 'profile_frame', 'cursor')),
                price       INTEGER NOT NULL CHECK (price >= 0),
                value       TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE user_cosmetics (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id),
                cosmetic_id INTEGER NOT NULL REFERENCES cosmetics(id),
                UNIQUE(user_id, cosmetic_id)
            );

            CREATE TABLE active_cosmetics (
                user_id             TEXT PRIMARY KEY REFERENCES users(id),
                active_cosmetic_id  INTEGER REFERENCES cosmetics(id)
            );

            CREATE TABLE cosmetic_trades (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                group_id    INTEGER NOT NULL,
                sender_id   TEXT NOT NULL REFERENCES users(id),
                receiver_id TEXT NOT NULL REFERENCES users(id),
                status      TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'accepted', 'rejected')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_trades_receiver ON cosmetic_trades(receiver_id, status);

            -- side: 0 = offered by sender, 1 = requested from receiver
            CREATE TABLE trade_items (
                trade_id    INTEGER NOT NULL REFERENCES cosmetic_trades(id),
                side        INTEGER NOT NULL CHECK (side IN (0, 1)),
                position    INTEGER NOT NULL,
                cosmetic_id INTEGER NOT NULL REFERENCES cosmetics(id),
                PRIMARY KEY (trade_id, side, position)
            );

            CREATE TABLE games (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                price       INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE user_games (
                user_id     TEXT NOT NULL REFERENCES users(id),
                game_id     INTEGER NOT NULL REFERENCES games(id),
                PRIMARY KEY (user_id, game_id)
            );

            CREATE TABLE game_difficulty_votes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id     INTEGER NOT NULL REFERENCES games(id),
                user_id     TEXT NOT NULL REFERENCES users(id),
                difficulty  INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_votes_game ON game_difficulty_votes(game_id);

            CREATE TABLE battle_pass_tiers (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                season              INTEGER NOT NULL,
                tier                INTEGER NOT NULL CHECK (tier BETWEEN 1 AND 50),
                free_cosmetic_id    INTEGER REFERENCES cosmetics(id),
                premium_cosmetic_id INTEGER REFERENCES cosmetics(id),
                free_game_id        INTEGER REFERENCES games(id),
                premium_game_id     INTEGER REFERENCES games(id),
                UNIQUE(season, tier)
            );

            CREATE TABLE user_battle_pass_progress (
                user_id          TEXT PRIMARY KEY REFERENCES users(id),
                current_season   INTEGER NOT NULL DEFAULT 1,
                current_tier     INTEGER NOT NULL DEFAULT 0 CHECK (current_tier BETWEEN 0 AND 50),
                experience       INTEGER NOT NULL DEFAULT 0 CHECK (experience BETWEEN 0 AND 499),
                has_premium_pass INTEGER NOT NULL DEFAULT 0
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
