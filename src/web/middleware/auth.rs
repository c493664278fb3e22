use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::{membership_repo, roster_repo};
use crate::error::ApiError;
use crate::models::Role;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[derive(Deserialize)]
struct JwtPayload {
    sub: String,
}

/// Authentication happens once here; the identity provider lives elsewhere
/// and we only read the `sub` claim from its access token cookie. A token
/// for a user without any club membership is treated as unauthorized.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find(|c| c.starts_with("access_token="))
                .and_then(|c| c.strip_prefix("access_token="))
        });

    if let Some(token) = token {
        // Parse JWT payload (middle part)
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            if let Ok(payload_bytes) = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]) {
                if let Ok(payload) = serde_json::from_slice::<JwtPayload>(&payload_bytes) {
                    let known = membership_repo::list_clubs_for_user(&state.pool, &payload.sub)
                        .await
                        .map(|clubs| !clubs.is_empty())
                        .unwrap_or(false);
                    if known {
                        request
                            .extensions_mut()
                            .insert(AuthenticatedUser { id: payload.sub });

                        return next.run(request).await;
                    }
                }
            }
        }
    }

    // No valid token or parse error, return 401
    Response::builder()
        .status(401)
        .body(axum::body::Body::from("Unauthorized - Please login"))
        .unwrap()
}

/// The one capability check every operation runs before touching core
/// logic: the caller must hold at least `min_role` in the club that owns
/// the team. Failures are terminal, never partially served.
pub async fn require_team_role(
    pool: &SqlitePool,
    user_id: &str,
    team_id: &str,
    min_role: Role,
) -> Result<(), ApiError> {
    let club_id = roster_repo::load_team_club(pool, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("team".to_string()))?;

    let role = membership_repo::load_role(pool, user_id, &club_id)
        .await?
        .and_then(|r| Role::parse(&r))
        .ok_or_else(|| ApiError::Forbidden("no membership in this club".to_string()))?;

    if role < min_role {
        tracing::warn!(
            user_id = %user_id,
            team_id = %team_id,
            "role {} below required {}",
            role.as_str(),
            min_role.as_str()
        );
        return Err(ApiError::Forbidden(format!(
            "requires role {} or higher",
            min_role.as_str()
        )));
    }
    Ok(())
}
