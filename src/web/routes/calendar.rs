use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::database::session_repo;
use crate::error::{ApiError, Result};
use crate::models::Role;
use crate::services::calendar_service::{self, CalendarView};
use crate::state::AppState;
use crate::web::middleware::auth::{require_team_role, AuthenticatedUser};

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub view: Option<String>,
    pub date: Option<String>,
    pub team_id: Option<String>,
}

pub async fn calendar_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<CalendarQuery>,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    if let Some(team_id) = query.team_id.as_deref() {
        require_team_role(&state.pool, &auth_user.id, team_id, Role::Member).await?;
    }

    let view = CalendarView::parse(query.view.as_deref());
    let today = state.clock.today();
    let date = match query.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => today,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::validation("date", "expected a date formatted as YYYY-MM-DD"))?,
    };

    let (from, to) = calendar_service::view_range(view, date);
    let sessions = session_repo::list_visible_range(
        &state.pool,
        &auth_user.id,
        from,
        to,
        query.team_id.as_deref(),
    )
    .await?;

    let body = match view {
        CalendarView::Day => {
            let day = calendar_service::build_day_view(&sessions, date, today);
            serde_json::json!({ "view": "day", "day": day })
        }
        CalendarView::Week => {
            let days = calendar_service::build_week_view(&sessions, date, today);
            serde_json::json!({ "view": "week", "days": days })
        }
        CalendarView::Month => {
            let cells = calendar_service::build_month_view(&sessions, date, today);
            serde_json::json!({ "view": "month", "cells": cells })
        }
    };

    Ok(Json(body))
}
