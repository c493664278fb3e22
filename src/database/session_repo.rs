use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{Sqlite, SqlitePool};

use crate::models::SessionRow;

const SESSION_COLUMNS: &str = r#"
  session_id,
  team_id,
  recurrence_id,
  session_date,
  start_time,
  duration_minutes,
  location,
  notes,
  is_override,
  is_cancelled,
  cancel_reason,
  created_at,
  updated_at
"#;

const SQL_INSERT_SESSION: &str = r#"
INSERT INTO sessions (
  session_id,
  team_id,
  recurrence_id,
  session_date,
  start_time,
  duration_minutes,
  location,
  notes,
  is_override,
  is_cancelled,
  created_at,
  updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
"#;

pub struct NewSession<'a> {
    pub session_id: &'a str,
    pub team_id: &'a str,
    pub recurrence_id: Option<&'a str>,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub now: NaiveDateTime,
}

pub async fn insert_session<'e, E>(executor: E, session: NewSession<'_>) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_SESSION)
        .bind(session.session_id)
        .bind(session.team_id)
        .bind(session.recurrence_id)
        .bind(session.session_date)
        .bind(session.start_time)
        .bind(session.duration_minutes)
        .bind(session.location)
        .bind(session.notes)
        .bind(session.now)
        .bind(session.now)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_session(pool: &SqlitePool, session_id: &str) -> sqlx::Result<Option<SessionRow>> {
    let sql = format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1 LIMIT 1"
    );
    sqlx::query_as::<_, SessionRow>(&sql)
        .bind(session_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPDATE_SESSION_FIELDS: &str = r#"
UPDATE sessions
SET session_date = ?,
    start_time = ?,
    duration_minutes = ?,
    location = ?,
    notes = ?,
    is_override = ?,
    updated_at = ?
WHERE session_id = ?
"#;

pub struct SessionFieldUpdate<'a> {
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub is_override: bool,
    pub now: NaiveDateTime,
}

pub async fn update_session_fields(
    pool: &SqlitePool,
    session_id: &str,
    update: SessionFieldUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_SESSION_FIELDS)
        .bind(update.session_date)
        .bind(update.start_time)
        .bind(update.duration_minutes)
        .bind(update.location)
        .bind(update.notes)
        .bind(update.is_override as i64)
        .bind(update.now)
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_CANCEL_SESSION: &str = r#"
UPDATE sessions
SET is_cancelled = 1,
    cancel_reason = ?,
    updated_at = ?
WHERE session_id = ?
"#;

pub async fn cancel_session<'e, E>(
    executor: E,
    session_id: &str,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_CANCEL_SESSION)
        .bind(reason)
        .bind(now)
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

// Cancels only instances at or past the cutoff; history stays untouched.
const SQL_CANCEL_FUTURE_OF_RECURRENCE: &str = r#"
UPDATE sessions
SET is_cancelled = 1,
    cancel_reason = ?,
    updated_at = ?
WHERE recurrence_id = ?
  AND session_date >= ?
  AND is_cancelled = 0
"#;

pub async fn cancel_future_of_recurrence<'e, E>(
    executor: E,
    recurrence_id: &str,
    cutoff: NaiveDate,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_CANCEL_FUTURE_OF_RECURRENCE)
        .bind(reason)
        .bind(now)
        .bind(recurrence_id)
        .bind(cutoff)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_SESSION_NOTES: &str = r#"
UPDATE sessions
SET notes = ?,
    updated_at = ?
WHERE session_id = ?
"#;

pub async fn update_session_notes(
    pool: &SqlitePool,
    session_id: &str,
    notes: Option<&str>,
    now: NaiveDateTime,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_SESSION_NOTES)
        .bind(notes)
        .bind(now)
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Calendar reads are scoped to the clubs the caller belongs to.
const SQL_LIST_VISIBLE_RANGE: &str = r#"
SELECT
  s.session_id,
  s.team_id,
  s.recurrence_id,
  s.session_date,
  s.start_time,
  s.duration_minutes,
  s.location,
  s.notes,
  s.is_override,
  s.is_cancelled,
  s.cancel_reason,
  s.created_at,
  s.updated_at
FROM sessions s
JOIN teams t
  ON t.team_id = s.team_id
 AND t.is_deleted = 0
JOIN memberships m
  ON m.club_id = t.club_id
 AND m.user_id = ?1
WHERE s.session_date >= ?2
  AND s.session_date <= ?3
  AND (?4 IS NULL OR s.team_id = ?4)
ORDER BY s.session_date ASC, s.start_time ASC, s.session_id ASC
"#;

pub async fn list_visible_range(
    pool: &SqlitePool,
    user_id: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
    team_id: Option<&str>,
) -> sqlx::Result<Vec<SessionRow>> {
    sqlx::query_as::<_, SessionRow>(SQL_LIST_VISIBLE_RANGE)
        .bind(user_id)
        .bind(date_from)
        .bind(date_to)
        .bind(team_id)
        .fetch_all(pool)
        .await
}

pub async fn list_for_recurrence(
    pool: &SqlitePool,
    recurrence_id: &str,
) -> sqlx::Result<Vec<SessionRow>> {
    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE recurrence_id = ?1
        ORDER BY session_date ASC
        "#
    );
    sqlx::query_as::<_, SessionRow>(&sql)
        .bind(recurrence_id)
        .fetch_all(pool)
        .await
}
