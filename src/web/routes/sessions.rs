use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::models::Role;
use crate::services::scheduling_service::{self, DeleteMode, SessionInput};
use crate::state::AppState;
use crate::web::middleware::auth::{require_team_role, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub team_id: String,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_session_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<CreateSessionBody>,
) -> Result<Json<Value>> {
    require_team_role(&state.pool, &auth_user.id, &body.team_id, Role::Trainer).await?;

    let session = scheduling_service::create_standalone_session(
        &state.pool,
        state.clock.now(),
        &body.team_id,
        SessionInput {
            session_date: body.session_date,
            start_time: body.start_time,
            duration_minutes: body.duration_minutes,
            location: body.location,
            notes: body.notes,
        },
    )
    .await?;

    tracing::info!(session_id = %session.session_id, team_id = %session.team_id, "session created");
    Ok(Json(serde_json::json!({ "session": session })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionBody {
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_session_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateSessionBody>,
) -> Result<Json<Value>> {
    let session = scheduling_service::load_required(&state.pool, &session_id).await?;
    require_team_role(&state.pool, &auth_user.id, &session.team_id, Role::Trainer).await?;

    let updated = scheduling_service::update_single_occurrence(
        &state.pool,
        state.clock.now(),
        &session,
        SessionInput {
            session_date: body.session_date,
            start_time: body.start_time,
            duration_minutes: body.duration_minutes,
            location: body.location,
            notes: body.notes,
        },
    )
    .await?;

    Ok(Json(serde_json::json!({ "session": updated })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteSessionBody {
    pub delete_mode: String,
    pub reason: Option<String>,
}

pub async fn delete_session_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<DeleteSessionBody>,
) -> Result<Json<Value>> {
    let mode = DeleteMode::parse(&body.delete_mode).ok_or_else(|| {
        ApiError::validation("delete_mode", "expected 'single' or 'all_future'")
    })?;

    let session = scheduling_service::load_required(&state.pool, &session_id).await?;
    require_team_role(&state.pool, &auth_user.id, &session.team_id, Role::Trainer).await?;

    let outcome = scheduling_service::delete_session(
        &state.pool,
        state.clock.now(),
        &session,
        mode,
        body.reason.as_deref(),
    )
    .await?;

    tracing::info!(
        session_id = %session_id,
        cancelled = outcome.cancelled_count,
        pattern_deactivated = outcome.pattern_deactivated,
        "session delete executed"
    );
    Ok(Json(serde_json::json!({
        "cancelled_count": outcome.cancelled_count,
        "pattern_deactivated": outcome.pattern_deactivated,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesBody {
    pub notes: Option<String>,
}

/// Recap/notes on the session itself, editable before or after it happens.
pub async fn update_notes_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateNotesBody>,
) -> Result<Json<Value>> {
    let session = scheduling_service::load_required(&state.pool, &session_id).await?;
    require_team_role(&state.pool, &auth_user.id, &session.team_id, Role::Trainer).await?;

    crate::database::session_repo::update_session_notes(
        &state.pool,
        &session.session_id,
        body.notes.as_deref(),
        state.clock.now(),
    )
    .await
    .map_err(ApiError::from)?;

    let updated = scheduling_service::load_required(&state.pool, &session_id).await?;
    Ok(Json(serde_json::json!({ "session": updated })))
}
