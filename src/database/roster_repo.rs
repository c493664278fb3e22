use sqlx::SqlitePool;

const SQL_LOAD_TEAM_CLUB: &str = r#"
SELECT club_id
FROM teams
WHERE team_id = ?1
  AND is_deleted = 0
LIMIT 1
"#;

pub async fn load_team_club(pool: &SqlitePool, team_id: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar(SQL_LOAD_TEAM_CLUB)
        .bind(team_id)
        .fetch_optional(pool)
        .await
}
