use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{CreateReferralDto, DiscordReferralQueryDto, ReferralResponseDto, ReferralResultQueryDto},
    error::{ErrorMessage, HttpError},
    middleware::airdrop_key,
    models::referralmodel::ReferralSource,
    pages,
    service::{
        error::ReferralError,
        referral::{intake_referral, ReferralIntake},
    },
    AppState,
};

pub fn referral_handler() -> Router {
    Router::new()
        .route("/discord", get(discord_referral_callback))
        .route(
            "/",
            post(create_referral).layer(middleware::from_fn(airdrop_key)),
        )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the referral code that was credited.
async fn process_discord_referral(
    app_state: &AppState,
    query: DiscordReferralQueryDto,
) -> Result<String, ReferralError> {
    let discord_id = non_empty(query.discord_id)
        .ok_or_else(|| ReferralError::InvalidInput("discord-id is required".to_string()))?;
    let referral_code = non_empty(query.referral_code)
        .ok_or_else(|| ReferralError::InvalidInput("referral-code is required".to_string()))?;

    let username = match (non_empty(query.username), &app_state.airdrop) {
        (Some(username), _) => username,
        (None, Some(airdrop)) => airdrop.get_discord_user_info(&discord_id).await?.username,
        (None, None) => {
            return Err(ReferralError::InvalidInput("username is required".to_string()))
        }
    };

    intake_referral(
        app_state.db_client.as_ref(),
        ReferralIntake {
            source: ReferralSource::Discord,
            source_ref_id: discord_id,
            referral_code: referral_code.clone(),
            username,
        },
    )
    .await?;

    Ok(referral_code)
}

/// Never fails outright: every outcome is a redirect to the result page.
pub async fn discord_referral_callback(
    Extension(app_state): Extension<Arc<AppState>>,
    query: Result<Query<DiscordReferralQueryDto>, QueryRejection>,
) -> Redirect {
    let result_url = format!("{}/referral-result", app_state.env.app_url);

    let outcome = match query {
        Ok(Query(query)) => process_discord_referral(&app_state, query).await,
        Err(rejection) => Err(ReferralError::InvalidInput(rejection.body_text())),
    };

    match outcome {
        Ok(referral_code) => Redirect::to(&format!(
            "{}?success=true&ref={}",
            result_url,
            urlencoding::encode(&referral_code)
        )),
        Err(err) => {
            match &err {
                ReferralError::Upstream(_) => tracing::error!("Discord referral failed: {}", err),
                _ => tracing::warn!("Discord referral rejected: {}", err),
            }
            Redirect::to(&format!("{}?success=false&reason={}", result_url, err.reason()))
        }
    }
}

pub async fn create_referral(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateReferralDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let referral = intake_referral(
        app_state.db_client.as_ref(),
        ReferralIntake {
            source: body.source,
            source_ref_id: body.source_ref_id,
            referral_code: body.referral_code,
            username: body.username,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReferralResponseDto {
            status: "success".to_string(),
            data: referral,
        }),
    ))
}

pub async fn ref_code_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let ambassador = app_state
        .db_client
        .get_ambassador_by_referral_code(code.trim())
        .await
        .map_err(|e| {
            tracing::error!("Referral code lookup failed: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Html(pages::ref_code_page(ambassador.as_ref(), &app_state.env)))
}

pub async fn referral_result_page(Query(query): Query<ReferralResultQueryDto>) -> impl IntoResponse {
    let success = query.success.as_deref() == Some("true");
    Html(pages::referral_result_page(
        success,
        query.reason.as_deref(),
        query.ref_code.as_deref(),
    ))
}
