use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::Role;
use crate::services::scheduling_service::{self, RecurringPatternInput};
use crate::state::AppState;
use crate::web::middleware::auth::{require_team_role, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct CreatePatternBody {
    pub team_id: String,
    pub days_of_week: Vec<u32>,
    pub start_time: String,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub generate_until: String,
}

pub async fn create_pattern_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<CreatePatternBody>,
) -> Result<Json<Value>> {
    require_team_role(&state.pool, &auth_user.id, &body.team_id, Role::Trainer).await?;

    let (pattern, generated_count) = scheduling_service::create_recurring_pattern(
        &state.pool,
        state.clock.today(),
        state.clock.now(),
        &body.team_id,
        RecurringPatternInput {
            days_of_week: body.days_of_week,
            start_time: body.start_time,
            duration_minutes: body.duration_minutes,
            location: body.location,
            notes: body.notes,
            generate_until: body.generate_until,
        },
    )
    .await?;

    tracing::info!(
        recurrence_id = %pattern.recurrence_id,
        team_id = %pattern.team_id,
        generated_count,
        "recurring pattern expanded"
    );
    Ok(Json(serde_json::json!({
        "pattern": pattern,
        "generated_count": generated_count,
    })))
}
