pub mod admin;
pub mod auth;
pub mod battlepass;
pub mod cache;
pub mod cosmetics;
pub mod error;
pub mod games;
pub mod ledger;
pub mod middleware;
pub mod trades;
pub mod users;

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use arcade_db::Database;

use crate::cache::TtlCache;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub cache: TtlCache,
    /// Coin price of the premium battle pass.
    pub premium_pass_price: i64,
    /// Usernames granted admin rights when they register.
    pub admin_usernames: HashSet<String>,
}

/// All HTTP routes, with auth applied to everything that acts on behalf of a user.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(users::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/{username}", get(users::get_user))
        .route("/cosmetics", get(cosmetics::list_cosmetics))
        .route("/battlepass/{username}", get(battlepass::get_battle_pass))
        .route("/games/{game_id}/difficulty", get(games::get_difficulty));

    let protected_routes = Router::new()
        .route("/coins/add", post(ledger::add_coins))
        .route("/cosmetics/purchase", post(cosmetics::purchase))
        .route("/cosmetics/activate", post(cosmetics::activate))
        .route("/cosmetics/active", get(cosmetics::get_active))
        .route("/cosmetics/owned", get(cosmetics::list_owned))
        .route("/trades", get(trades::list_trades))
        .route("/trades/propose", post(trades::propose))
        .route("/trades/{trade_id}/accept", post(trades::accept))
        .route("/trades/{trade_id}/reject", post(trades::reject))
        .route("/battlepass/{username}/purchase-premium", post(battlepass::purchase_premium))
        .route("/battlepass/{username}/experience", post(battlepass::add_experience))
        .route("/games/owned", get(games::list_owned))
        .route("/games/{game_id}/purchase", post(games::purchase))
        .route("/games/{game_id}/difficulty-vote", post(games::vote))
        .route("/admin/cosmetics", post(admin::create_cosmetic))
        .route("/admin/games", post(admin::create_game))
        .route("/admin/battlepass/tiers", post(admin::upsert_tier))
        .route("/admin/users/{username}/ban", post(admin::set_ban))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
