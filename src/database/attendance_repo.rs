use chrono::{NaiveDateTime, NaiveTime};
use sqlx::{Sqlite, SqlitePool};

use crate::models::AttendanceRosterRow;

// The roster is live: players come from the current team roster, records
// are joined in if present. Players removed from the team simply stop
// appearing here; their old rows stay in the attendance table untouched.
const SQL_FETCH_ROSTER_WITH_ATTENDANCE: &str = r#"
SELECT
  p.player_id,
  p.first_name,
  p.last_name,
  p.jersey_number,
  COALESCE(a.status, 'unmarked') AS status,
  a.arrival_time,
  a.notes
FROM players p
LEFT JOIN attendance a
  ON a.player_id = p.player_id
 AND a.session_id = ?1
WHERE p.team_id = ?2
  AND p.is_deleted = 0
ORDER BY
  p.jersey_number IS NULL,
  p.jersey_number ASC,
  p.last_name ASC,
  p.first_name ASC
"#;

pub async fn fetch_roster_with_attendance(
    pool: &SqlitePool,
    session_id: &str,
    team_id: &str,
) -> sqlx::Result<Vec<AttendanceRosterRow>> {
    sqlx::query_as::<_, AttendanceRosterRow>(SQL_FETCH_ROSTER_WITH_ATTENDANCE)
        .bind(session_id)
        .bind(team_id)
        .fetch_all(pool)
        .await
}

// Resaves overwrite in place; no history is kept.
const SQL_UPSERT_RECORD: &str = r#"
INSERT INTO attendance (session_id, player_id, status, arrival_time, notes, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT (session_id, player_id) DO UPDATE SET
  status = excluded.status,
  arrival_time = excluded.arrival_time,
  notes = excluded.notes,
  updated_at = excluded.updated_at
"#;

pub async fn upsert_record<'e, E>(
    executor: E,
    session_id: &str,
    player_id: &str,
    status: &str,
    arrival_time: Option<NaiveTime>,
    notes: Option<&str>,
    now: NaiveDateTime,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_UPSERT_RECORD)
        .bind(session_id)
        .bind(player_id)
        .bind(status)
        .bind(arrival_time)
        .bind(notes)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_RECORD: &str = r#"
DELETE FROM attendance
WHERE session_id = ? AND player_id = ?
"#;

pub async fn delete_record<'e, E>(
    executor: E,
    session_id: &str,
    player_id: &str,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_DELETE_RECORD)
        .bind(session_id)
        .bind(player_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
