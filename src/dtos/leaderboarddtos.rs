use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::{
    error::{ErrorMessage, HttpError},
    models::ambassadormodel::{Ambassador, RankedAmbassador},
    service::{
        export::ExportScope,
        leaderboard::{
            LeaderboardFilter, LeaderboardStats, LeaderboardView, Page, SortConfig,
            SortDirection, SortKey,
        },
    },
};

/// HTML forms submit untouched inputs as `key=`; treat those as absent.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct LeaderboardQueryDto {
    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub search: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_score: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_score: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sort: Option<SortKey>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub direction: Option<SortDirection>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    /// Comma-separated ambassador ids whose details are expanded.
    pub expanded: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub scope: Option<ExportScope>,
}

impl LeaderboardQueryDto {
    pub fn into_view(self) -> Result<LeaderboardView, HttpError> {
        self.validate()
            .map_err(|e| HttpError::bad_request(e.to_string()))?;

        if let (Some(min), Some(max)) = (self.min_score, self.max_score) {
            if min > max {
                return Err(HttpError::bad_request(ErrorMessage::InvalidScoreRange.to_string()));
            }
        }

        let filter = LeaderboardFilter {
            search: self.search.unwrap_or_default().trim().to_string(),
            min_score: self.min_score,
            max_score: self.max_score,
            ..Default::default()
        }
        .with_country(self.country.as_deref());

        let expanded = self
            .expanded
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        Ok(LeaderboardView {
            filter,
            sort: SortConfig {
                key: self.sort.unwrap_or_default(),
                direction: self.direction.unwrap_or_default(),
            },
            page: self.page.unwrap_or(1),
            expanded,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FilterAmbassadorDto {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub handle: String,
    pub country: String,
    pub invites: i32,
    pub score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_multiplier: Option<f64>,
}

impl FilterAmbassadorDto {
    pub fn filter_ambassador(row: &RankedAmbassador) -> Self {
        let amb = &row.ambassador;
        FilterAmbassadorDto {
            rank: row.rank,
            id: amb.id.to_owned(),
            name: amb.name.to_owned(),
            handle: amb.handle.to_owned(),
            country: amb.country.to_owned(),
            invites: amb.invites,
            score: amb.score,
            wallet: amb.wallet.clone(),
            bonus_multiplier: amb.bonus_multiplier,
        }
    }

    pub fn filter_ambassadors(rows: &[RankedAmbassador]) -> Vec<FilterAmbassadorDto> {
        rows.iter().map(FilterAmbassadorDto::filter_ambassador).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationDto {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: usize,
    pub start: usize,
    pub end: usize,
    pub summary: String,
}

impl PaginationDto {
    pub fn from_page(page: &Page) -> Self {
        PaginationDto {
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total: page.total,
            start: page.start,
            end: page.end,
            summary: page.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardData {
    pub ambassadors: Vec<FilterAmbassadorDto>,
    pub pagination: PaginationDto,
    pub sort: SortConfig,
    pub stats: LeaderboardStats,
    pub countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponseDto {
    pub status: String,
    pub data: LeaderboardData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicAmbassadorDto {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub country: String,
    pub referral_code: String,
    pub referral_link: String,
}

impl PublicAmbassadorDto {
    pub fn from_ambassador(ambassador: &Ambassador, referral_link: String) -> Self {
        PublicAmbassadorDto {
            id: ambassador.id.to_owned(),
            name: ambassador.name.to_owned(),
            handle: ambassador.handle.to_owned(),
            country: ambassador.country.to_owned(),
            referral_code: ambassador.referral_code.to_owned(),
            referral_link,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AmbassadorResponseDto {
    pub status: String,
    pub data: PublicAmbassadorDto,
}
