use sqlx::SqlitePool;

const SQL_LOAD_ROLE: &str = r#"
SELECT role
FROM memberships
WHERE user_id = ?1
  AND club_id = ?2
LIMIT 1
"#;

pub async fn load_role(
    pool: &SqlitePool,
    user_id: &str,
    club_id: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar(SQL_LOAD_ROLE)
        .bind(user_id)
        .bind(club_id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_CLUBS_FOR_USER: &str = r#"
SELECT club_id
FROM memberships
WHERE user_id = ?1
ORDER BY club_id ASC
"#;

pub async fn list_clubs_for_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(SQL_LIST_CLUBS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
