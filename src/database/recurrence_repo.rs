use sqlx::{Sqlite, SqlitePool};

use crate::models::RecurrencePatternRow;

const SQL_INSERT_PATTERN: &str = r#"
INSERT INTO recurrence_patterns (
  recurrence_id,
  team_id,
  days_of_week,
  start_time,
  duration_minutes,
  location,
  notes,
  is_active,
  created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)
"#;

pub struct NewRecurrencePattern<'a> {
    pub recurrence_id: &'a str,
    pub team_id: &'a str,
    pub days_of_week: &'a str,
    pub start_time: chrono::NaiveTime,
    pub duration_minutes: i64,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: chrono::NaiveDateTime,
}

pub async fn insert_pattern<'e, E>(
    executor: E,
    pattern: NewRecurrencePattern<'_>,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_PATTERN)
        .bind(pattern.recurrence_id)
        .bind(pattern.team_id)
        .bind(pattern.days_of_week)
        .bind(pattern.start_time)
        .bind(pattern.duration_minutes)
        .bind(pattern.location)
        .bind(pattern.notes)
        .bind(pattern.created_at)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_PATTERN: &str = r#"
SELECT
  recurrence_id,
  team_id,
  days_of_week,
  start_time,
  duration_minutes,
  location,
  notes,
  is_active,
  created_at
FROM recurrence_patterns
WHERE recurrence_id = ?1
LIMIT 1
"#;

pub async fn load_pattern(
    pool: &SqlitePool,
    recurrence_id: &str,
) -> sqlx::Result<Option<RecurrencePatternRow>> {
    sqlx::query_as::<_, RecurrencePatternRow>(SQL_LOAD_PATTERN)
        .bind(recurrence_id)
        .fetch_optional(pool)
        .await
}

const SQL_DEACTIVATE_PATTERN: &str = r#"
UPDATE recurrence_patterns
SET is_active = 0
WHERE recurrence_id = ?
"#;

pub async fn deactivate_pattern<'e, E>(executor: E, recurrence_id: &str) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_DEACTIVATE_PATTERN)
        .bind(recurrence_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
