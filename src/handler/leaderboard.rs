use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Json, Router,
};

use crate::{
    dtos::{
        AmbassadorResponseDto, FilterAmbassadorDto, LeaderboardData, LeaderboardQueryDto,
        LeaderboardResponseDto, PaginationDto, PublicAmbassadorDto,
    },
    error::{ErrorMessage, HttpError},
    models::ambassadormodel::{Ambassador, RankedAmbassador},
    pages,
    service::{
        export::{leaderboard_to_csv, ExportScope, CSV_FILENAME},
        leaderboard::{compute_stats, countries},
        referral::generate_referral_link,
    },
    AppState,
};

pub fn leaderboard_handler() -> Router {
    Router::new()
        .route("/", get(get_leaderboard))
        .route("/export", get(export_leaderboard))
}

pub fn ambassador_handler() -> Router {
    Router::new().route("/:code", get(get_ambassador_by_code))
}

/// Full table from the store, ranked. Filtering happens in memory afterwards.
async fn load_ranked(
    app_state: &AppState,
) -> Result<(Vec<Ambassador>, Vec<RankedAmbassador>), HttpError> {
    let ambassadors = app_state
        .db_client
        .get_all_ambassadors()
        .await
        .map_err(|e| {
            tracing::error!("Failed to load leaderboard: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let ranked = RankedAmbassador::rank_all(ambassadors.clone());
    Ok((ambassadors, ranked))
}

pub async fn leaderboard_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query_params): Query<LeaderboardQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = query_params.into_view()?;
    let (ambassadors, ranked) = load_ranked(&app_state).await?;

    let result = view.apply(&ranked);
    let html = pages::leaderboard_page(
        &view,
        &result,
        &compute_stats(&ambassadors),
        &countries(&ambassadors),
    );

    Ok(Html(html))
}

pub async fn get_leaderboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query_params): Query<LeaderboardQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = query_params.into_view()?;
    let (ambassadors, ranked) = load_ranked(&app_state).await?;

    let result = view.apply(&ranked);

    let response = LeaderboardResponseDto {
        status: "success".to_string(),
        data: LeaderboardData {
            ambassadors: FilterAmbassadorDto::filter_ambassadors(&result.page.rows),
            pagination: PaginationDto::from_page(&result.page),
            sort: view.sort,
            stats: compute_stats(&ambassadors),
            countries: countries(&ambassadors),
        },
    };

    Ok(Json(response))
}

pub async fn export_leaderboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query_params): Query<LeaderboardQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let scope = query_params.scope.unwrap_or_default();
    let view = query_params.into_view()?;
    let (_, ranked) = load_ranked(&app_state).await?;

    let result = view.apply(&ranked);
    let rows = match scope {
        ExportScope::All => &result.rows,
        ExportScope::Page => &result.page.rows,
    };

    let csv = leaderboard_to_csv(rows).map_err(|e| {
        tracing::error!("CSV export failed: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    tracing::debug!("Exported {} leaderboard rows ({:?})", rows.len(), scope);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
        ],
        csv,
    ))
}

pub async fn get_ambassador_by_code(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let ambassador = app_state
        .db_client
        .get_ambassador_by_referral_code(code.trim())
        .await
        .map_err(|e| {
            tracing::error!("Ambassador lookup failed: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::AmbassadorNotFound.to_string()))?;

    let referral_link = generate_referral_link(&app_state.env.app_url, &ambassador.referral_code);

    Ok(Json(AmbassadorResponseDto {
        status: "success".to_string(),
        data: PublicAmbassadorDto::from_ambassador(&ambassador, referral_link),
    }))
}
