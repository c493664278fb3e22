use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::Role;
use crate::services::{attendance_service, scheduling_service};
use crate::state::AppState;
use crate::web::middleware::auth::{require_team_role, AuthenticatedUser};

pub async fn fetch_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let session = scheduling_service::load_required(&state.pool, &session_id).await?;
    require_team_role(&state.pool, &auth_user.id, &session.team_id, Role::Member).await?;

    let attendance = attendance_service::fetch_session_attendance(&state.pool, &session).await?;
    Ok(Json(serde_json::json!({ "attendance": attendance })))
}

#[derive(Debug, Deserialize)]
pub struct SaveAttendanceBody {
    pub attendance: Vec<attendance_service::AttendanceEntry>,
}

pub async fn save_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<SaveAttendanceBody>,
) -> Result<Json<Value>> {
    let session = scheduling_service::load_required(&state.pool, &session_id).await?;
    require_team_role(&state.pool, &auth_user.id, &session.team_id, Role::Trainer).await?;

    let saved = attendance_service::save_session_attendance(
        &state.pool,
        state.clock.now(),
        &session,
        body.attendance,
    )
    .await?;

    tracing::info!(session_id = %session_id, saved, "attendance sheet saved");
    Ok(Json(serde_json::json!({ "saved_count": saved })))
}
