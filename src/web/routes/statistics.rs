use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::models::Role;
use crate::services::statistics_service;
use crate::state::AppState;
use crate::web::middleware::auth::{require_team_role, AuthenticatedUser};

#[derive(Debug, Deserialize, Default)]
pub struct StatisticsQuery {
    pub team_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::validation(field, "expected a date formatted as YYYY-MM-DD")),
    }
}

/// Without a team filter the view spans every team in the caller's clubs;
/// the queries themselves enforce that scope.
pub async fn statistics_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<StatisticsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    if let Some(team_id) = query.team_id.as_deref() {
        require_team_role(&state.pool, &auth_user.id, team_id, Role::Member).await?;
    }

    let date_from = parse_date("date_from", query.date_from.as_deref())?;
    let date_to = parse_date("date_to", query.date_to.as_deref())?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if to < from {
            return Err(ApiError::validation("date_to", "range end lies before start"));
        }
    }

    let view = statistics_service::build_statistics(
        &state.pool,
        &auth_user.id,
        query.team_id.as_deref(),
        date_from,
        date_to,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "statistics": view.statistics,
        "overall": view.overall,
    })))
}
