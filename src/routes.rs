// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        leaderboard::{ambassador_handler, leaderboard_handler, leaderboard_page},
        referral::{ref_code_page, referral_handler, referral_result_page},
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/leaderboard", leaderboard_handler())
        .nest("/ambassadors", ambassador_handler())
        .nest("/referral", referral_handler());

    Router::new()
        .route("/", get(leaderboard_page))
        .route("/ref/:code", get(ref_code_page))
        .route("/referral-result", get(referral_result_page))
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}
