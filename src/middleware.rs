use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use subtle::ConstantTimeEq;

use crate::{
    error::{ErrorMessage, HttpError},
    service::airdrop::AIRDROP_KEY_HEADER,
    AppState,
};

/// Admits only requests carrying the airdrop service's shared secret.
/// With no secret configured every request is rejected.
pub async fn airdrop_key(
    Extension(app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let provided = req
        .headers()
        .get(AIRDROP_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::AirdropKeyNotProvided.to_string()))?;

    let expected = app_state
        .env
        .airdrop_shared_secret
        .as_deref()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::InvalidAirdropKey.to_string()))?;

    if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::warn!("Rejected request with invalid airdrop key");
        return Err(HttpError::unauthorized(ErrorMessage::InvalidAirdropKey.to_string()));
    }

    Ok(next.run(req).await)
}
