use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BattlePassProgress, BattlePassTier, CosmeticType, OwnedCosmetic};

// -- JWT Claims --

/// JWT claims shared by the auth handlers and the request middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

// -- Ledger --

/// `username`, when present, must name the authenticated caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddCoinsRequest {
    pub username: Option<String>,
    pub amount: i64,
}

// -- Cosmetics --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCosmeticRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub cosmetic_type: CosmeticType,
    pub price: i64,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseCosmeticRequest {
    pub username: Option<String>,
    pub cosmetic_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub ownership: OwnedCosmetic,
    pub coins: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivateCosmeticRequest {
    pub username: Option<String>,
    pub cosmetic_id: Option<i64>,
}

// -- Trades --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProposeTradeRequest {
    pub username: Option<String>,
    pub receiver_id: Uuid,
    pub group_id: i64,
    pub sender_cosmetic_ids: Vec<i64>,
    pub receiver_cosmetic_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TradeActionRequest {
    pub username: Option<String>,
}

// -- Battle pass --

#[derive(Debug, Serialize, Deserialize)]
pub struct BattlePassResponse {
    pub progress: BattlePassProgress,
    pub tiers: Vec<BattlePassTier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddExperienceRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertTierRequest {
    pub season: i64,
    pub tier: i64,
    pub free_cosmetic_id: Option<i64>,
    pub premium_cosmetic_id: Option<i64>,
    pub free_game_id: Option<i64>,
    pub premium_game_id: Option<i64>,
}

// -- Games --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGameRequest {
    pub name: String,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePurchaseResponse {
    pub game_id: i64,
    pub coins: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DifficultyVoteRequest {
    pub username: Option<String>,
    pub difficulty: i64,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BanRequest {
    pub banned: bool,
}
