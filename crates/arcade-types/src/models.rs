use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest reachable battle-pass tier.
pub const MAX_TIER: i64 = 50;

/// Experience needed to advance one tier.
pub const XP_PER_TIER: i64 = 500;

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub coins: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticType {
    Theme,
    Badge,
    ProfileFrame,
    Cursor,
}

impl CosmeticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Badge => "badge",
            Self::ProfileFrame => "profile_frame",
            Self::Cursor => "cursor",
        }
    }
}

impl fmt::Display for CosmeticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CosmeticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theme" => Ok(Self::Theme),
            "badge" => Ok(Self::Badge),
            "profile_frame" => Ok(Self::ProfileFrame),
            "cursor" => Ok(Self::Cursor),
            other => Err(format!("unknown cosmetic type '{}'", other)),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cosmetic {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub cosmetic_type: CosmeticType,
    pub price: i64,
    /// Payload interpreted by the client (CSS class, image URL, cursor asset).
    pub value: String,
}

/// One ownership row: `user_id` holds `cosmetic_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCosmetic {
    pub id: i64,
    pub user_id: Uuid,
    pub cosmetic_id: i64,
}

/// Equip state. `active_cosmetic_id == None` means nothing is equipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCosmetic {
    pub user_id: Uuid,
    pub active_cosmetic_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown trade status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticTrade {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub sender_cosmetic_ids: Vec<i64>,
    pub receiver_cosmetic_ids: Vec<i64>,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

/// Registered game metadata. A price of zero means free to play.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

impl Game {
    pub fn is_premium(&self) -> bool {
        self.price > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyVote {
    pub id: i64,
    pub game_id: i64,
    pub user_id: Uuid,
    pub difficulty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultySummary {
    pub average: f64,
    pub total_votes: i64,
}

/// Reward row for one tier of one season.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattlePassTier {
    pub id: i64,
    pub season: i64,
    pub tier: i64,
    pub free_cosmetic_id: Option<i64>,
    pub premium_cosmetic_id: Option<i64>,
    pub free_game_id: Option<i64>,
    pub premium_game_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattlePassProgress {
    pub user_id: Uuid,
    pub current_season: i64,
    pub current_tier: i64,
    /// Remainder toward the next tier, always below `XP_PER_TIER`.
    pub experience: i64,
    pub has_premium_pass: bool,
}
