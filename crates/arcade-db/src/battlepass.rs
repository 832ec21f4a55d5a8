//! Battle-pass progression.
//!
//! Progress stores the tier plus the experience remainder toward the next
//! tier. Tier-ups are applied clamp-then-modulo: the tier is capped at
//! [`MAX_TIER`] and the remainder is always `total % XP_PER_TIER`, so
//! experience earned past the cap is not banked.

use arcade_types::models::{BattlePassProgress, BattlePassTier, MAX_TIER, XP_PER_TIER};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::Database;
use crate::cosmetics::require_cosmetic;
use crate::error::{EconomyError, EconomyResult};
use crate::games::require_game;
use crate::ledger::apply_coin_delta;
use crate::models::parse_uuid;
use crate::queries::require_user;

/// Season assigned to newly created progress rows.
pub const DEFAULT_SEASON: i64 = 1;

/// Apply `amount` experience to `(tier, experience)`.
///
/// Returns `None` when the running total does not fit in an `i64`.
pub fn advance(tier: i64, experience: i64, amount: i64) -> Option<(i64, i64)> {
    let total = experience.checked_add(amount)?;
    let gained = total / XP_PER_TIER;
    Some((tier.saturating_add(gained).min(MAX_TIER), total % XP_PER_TIER))
}

impl Database {
    /// Current progress, created at season 1 / tier 0 on first access.
    pub fn get_progress(&self, user_id: &str) -> EconomyResult<BattlePassProgress> {
        self.with_tx(|tx| ensure_progress(tx, user_id))
    }

    pub fn add_experience(&self, user_id: &str, amount: i64) -> EconomyResult<BattlePassProgress> {
        if amount < 0 {
            return Err(EconomyError::InvalidInput(format!(
                "experience amount must not be negative, got {}",
                amount
            )));
        }

        self.with_tx(|tx| {
            let progress = ensure_progress(tx, user_id)?;
            let (tier, experience) = advance(progress.current_tier, progress.experience, amount)
                .ok_or_else(|| {
                    EconomyError::InvalidInput(format!("experience grant of {} is too large", amount))
                })?;
            tx.execute(
                "UPDATE user_battle_pass_progress SET current_tier = ?1, experience = ?2 WHERE user_id = ?3",
                rusqlite::params![tier, experience, user_id],
            )?;
            if tier > progress.current_tier {
                info!(user_id, from = progress.current_tier, to = tier, "Battle pass tier up");
            }
            Ok(BattlePassProgress {
                current_tier: tier,
                experience,
                ..progress
            })
        })
    }

    /// Charge `price` coins and unlock the premium track, as one step.
    pub fn purchase_premium_pass(&self, user_id: &str, price: i64) -> EconomyResult<BattlePassProgress> {
        self.with_tx(|tx| {
            let progress = ensure_progress(tx, user_id)?;
            if progress.has_premium_pass {
                return Err(EconomyError::AlreadyOwned {
                    item: "premium pass for season",
                    id: progress.current_season,
                });
            }

            let coins = apply_coin_delta(tx, user_id, -price)?;
            tx.execute(
                "UPDATE user_battle_pass_progress SET has_premium_pass = 1 WHERE user_id = ?1",
                [user_id],
            )?;
            info!(user_id, price, coins, season = progress.current_season, "Premium pass purchased");

            Ok(BattlePassProgress {
                has_premium_pass: true,
                ..progress
            })
        })
    }

    /// Reward table for `season`, ordered by tier.
    pub fn list_tiers(&self, season: i64) -> EconomyResult<Vec<BattlePassTier>> {
        Ok(self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, season, tier, free_cosmetic_id, premium_cosmetic_id, free_game_id, premium_game_id
                 FROM battle_pass_tiers WHERE season = ?1 ORDER BY tier",
            )?;
            let rows = stmt
                .query_map([season], tier_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?)
    }

    /// Create or replace the reward row for `(season, tier)`.
    pub fn upsert_tier(
        &self,
        season: i64,
        tier: i64,
        free_cosmetic_id: Option<i64>,
        premium_cosmetic_id: Option<i64>,
        free_game_id: Option<i64>,
        premium_game_id: Option<i64>,
    ) -> EconomyResult<BattlePassTier> {
        if season < 1 {
            return Err(EconomyError::InvalidInput(format!("season must be at least 1, got {}", season)));
        }
        if !(1..=MAX_TIER).contains(&tier) {
            return Err(EconomyError::InvalidInput(format!(
                "tier must be within 1..={}, got {}",
                MAX_TIER, tier
            )));
        }

        self.with_tx(|tx| {
            for cid in [free_cosmetic_id, premium_cosmetic_id].into_iter().flatten() {
                require_cosmetic(tx, cid)?;
            }
            for gid in [free_game_id, premium_game_id].into_iter().flatten() {
                require_game(tx, gid)?;
            }

            tx.execute(
                "INSERT INTO battle_pass_tiers
                    (season, tier, free_cosmetic_id, premium_cosmetic_id, free_game_id, premium_game_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(season, tier) DO UPDATE SET
                    free_cosmetic_id = excluded.free_cosmetic_id,
                    premium_cosmetic_id = excluded.premium_cosmetic_id,
                    free_game_id = excluded.free_game_id,
                    premium_game_id = excluded.premium_game_id",
                rusqlite::params![
                    season,
                    tier,
                    free_cosmetic_id,
                    premium_cosmetic_id,
                    free_game_id,
                    premium_game_id
                ],
            )?;
            info!(season, tier, "Battle pass tier saved");

            let row = tx.query_row(
                "SELECT id, season, tier, free_cosmetic_id, premium_cosmetic_id, free_game_id, premium_game_id
                 FROM battle_pass_tiers WHERE season = ?1 AND tier = ?2",
                [season, tier],
                tier_from_row,
            )?;
            Ok(row)
        })
    }
}

fn tier_from_row(row: &Row<'_>) -> rusqlite::Result<BattlePassTier> {
    Ok(BattlePassTier {
        id: row.get(0)?,
        season: row.get(1)?,
        tier: row.get(2)?,
        free_cosmetic_id: row.get(3)?,
        premium_cosmetic_id: row.get(4)?,
        free_game_id: row.get(5)?,
        premium_game_id: row.get(6)?,
    })
}

fn ensure_progress(conn: &Connection, user_id: &str) -> EconomyResult<BattlePassProgress> {
    require_user(conn, user_id)?;

    let select = |conn: &Connection| {
        conn.query_row(
            "SELECT current_season, current_tier, experience, has_premium_pass
             FROM user_battle_pass_progress WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(BattlePassProgress {
                    user_id: parse_uuid(0, user_id)?,
                    current_season: row.get(0)?,
                    current_tier: row.get(1)?,
                    experience: row.get(2)?,
                    has_premium_pass: row.get(3)?,
                })
            },
        )
        .optional()
    };

    if let Some(progress) = select(conn)? {
        return Ok(progress);
    }

    conn.execute(
        "INSERT INTO user_battle_pass_progress (user_id, current_season) VALUES (?1, ?2)",
        rusqlite::params![user_id, DEFAULT_SEASON],
    )?;
    select(conn)?.ok_or_else(|| anyhow::anyhow!("progress row for {} vanished", user_id).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::*;
    use arcade_types::models::CosmeticType;

    #[test]
    fn advance_rolls_over_tiers() {
        assert_eq!(advance(0, 0, 300), Some((0, 300)));
        assert_eq!(advance(0, 300, 300), Some((1, 100)));
        assert_eq!(advance(0, 0, 600), Some((1, 100)));
        assert_eq!(advance(3, 499, 1), Some((4, 0)));
        assert_eq!(advance(0, 0, 1500), Some((3, 0)));
    }

    #[test]
    fn split_grants_match_single_grant_below_cap() {
        for (a, b) in [(300, 300), (499, 1), (1, 999), (250, 1250)] {
            let (t, e) = advance(10, 40, a).unwrap();
            assert_eq!(advance(t, e, b), advance(10, 40, a + b));
        }
    }

    #[test]
    fn advance_clamps_at_cap() {
        assert_eq!(advance(49, 400, 150), Some((50, 50)));
        assert_eq!(advance(50, 0, 1000), Some((50, 0)));
        assert_eq!(advance(50, 200, 450), Some((50, 150)));
        assert_eq!(advance(45, 0, 100_000), Some((50, 0)));
        assert_eq!(advance(0, 0, i64::MAX), Some((50, i64::MAX % XP_PER_TIER)));
    }

    #[test]
    fn advance_refuses_overflowing_total() {
        assert_eq!(advance(10, 1, i64::MAX), None);
    }

    #[test]
    fn progress_created_lazily() {
        let db = db();
        let id = user(&db, "alice", 0);

        let p = db.get_progress(&id).unwrap();
        assert_eq!(p.current_season, 1);
        assert_eq!(p.current_tier, 0);
        assert_eq!(p.experience, 0);
        assert!(!p.has_premium_pass);

        // Second read hits the same row.
        assert_eq!(db.get_progress(&id).unwrap(), p);
    }

    #[test]
    fn add_experience_persists() {
        let db = db();
        let id = user(&db, "bob", 0);

        db.add_experience(&id, 300).unwrap();
        let p = db.add_experience(&id, 300).unwrap();
        assert_eq!((p.current_tier, p.experience), (1, 100));
        assert_eq!(db.get_progress(&id).unwrap(), p);

        assert!(matches!(db.add_experience(&id, -1), Err(EconomyError::InvalidInput(_))));
        assert!(matches!(db.add_experience("ghost", 10), Err(EconomyError::UserNotFound(_))));
    }

    #[test]
    fn oversized_grant_is_refused_and_db_stays_usable() {
        let db = db();
        let id = user(&db, "dora", 0);
        db.add_experience(&id, 10).unwrap();

        let err = db.add_experience(&id, i64::MAX).unwrap_err();
        assert!(matches!(err, EconomyError::InvalidInput(_)));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);

        let p = db.get_progress(&id).unwrap();
        assert_eq!((p.current_tier, p.experience), (0, 10));
        assert_eq!(db.add_coins(&id, 1).unwrap().coins, 1);
    }

    #[test]
    fn premium_pass_debits_once() {
        let db = db();
        let id = user(&db, "carol", 600);

        let p = db.purchase_premium_pass(&id, 500).unwrap();
        assert!(p.has_premium_pass);
        assert_eq!(db.get_user_by_id(&id).unwrap().unwrap().coins, 100);

        let again = db.purchase_premium_pass(&id, 500).unwrap_err();
        assert_eq!(again.kind(), crate::ErrorKind::Conflict);
        assert_eq!(db.get_user_by_id(&id).unwrap().unwrap().coins, 100);
    }

    #[test]
    fn premium_pass_requires_funds() {
        let db = db();
        let id = user(&db, "dave", 499);

        let err = db.purchase_premium_pass(&id, 500).unwrap_err();
        assert!(matches!(err, EconomyError::InsufficientFunds { required: 500, available: 499 }));
        assert!(!db.get_progress(&id).unwrap().has_premium_pass);
        assert_eq!(db.get_user_by_id(&id).unwrap().unwrap().coins, 499);
    }

    #[test]
    fn tiers_upsert_and_validate() {
        let db = db();
        let badge = db.create_cosmetic("Tier Badge", CosmeticType::Badge, 1, "b").unwrap().id;

        db.upsert_tier(1, 2, Some(badge), None, None, None).unwrap();
        db.upsert_tier(1, 1, None, Some(badge), None, None).unwrap();
        let updated = db.upsert_tier(1, 2, None, Some(badge), None, None).unwrap();
        assert_eq!(updated.free_cosmetic_id, None);

        let tiers = db.list_tiers(1).unwrap();
        assert_eq!(tiers.iter().map(|t| t.tier).collect::<Vec<_>>(), vec![1, 2]);
        assert!(db.list_tiers(2).unwrap().is_empty());

        assert!(matches!(db.upsert_tier(1, 51, None, None, None, None), Err(EconomyError::InvalidInput(_))));
        assert!(matches!(db.upsert_tier(1, 0, None, None, None, None), Err(EconomyError::InvalidInput(_))));
        assert!(matches!(
            db.upsert_tier(1, 3, Some(999), None, None, None),
            Err(EconomyError::CosmeticNotFound(999))
        ));
        assert!(matches!(
            db.upsert_tier(1, 3, None, None, None, Some(77)),
            Err(EconomyError::GameNotFound(77))
        ));
    }
}
