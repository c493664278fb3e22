use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Raw per-player tallies over the marked attendance records in range.
/// Players with zero marked records still produce a row (all zeroes) so the
/// roster-level listing stays complete.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerTallyRow {
    pub player_id: String,
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: Option<i64>,
    pub present_count: i64,
    pub late_count: i64,
    pub absent_count: i64,
    pub excused_count: i64,
    pub injured_count: i64,
}

// Visibility is club-scoped through the caller's memberships; cancelled
// sessions and unmarked records never count.
const SQL_PLAYER_TALLIES: &str = r#"
SELECT
  p.player_id,
  p.team_id,
  p.first_name,
  p.last_name,
  p.jersey_number,
  COALESCE(SUM(CASE WHEN m.status = 'present' THEN 1 ELSE 0 END), 0) AS present_count,
  COALESCE(SUM(CASE WHEN m.status = 'late'    THEN 1 ELSE 0 END), 0) AS late_count,
  COALESCE(SUM(CASE WHEN m.status = 'absent'  THEN 1 ELSE 0 END), 0) AS absent_count,
  COALESCE(SUM(CASE WHEN m.status = 'excused' THEN 1 ELSE 0 END), 0) AS excused_count,
  COALESCE(SUM(CASE WHEN m.status = 'injured' THEN 1 ELSE 0 END), 0) AS injured_count
FROM players p
JOIN teams t
  ON t.team_id = p.team_id
 AND t.is_deleted = 0
JOIN memberships mem
  ON mem.club_id = t.club_id
 AND mem.user_id = ?4
LEFT JOIN (
  SELECT a.player_id, a.status
  FROM attendance a
  JOIN sessions s ON s.session_id = a.session_id
  WHERE s.is_cancelled = 0
    AND a.status != 'unmarked'
    AND (?1 IS NULL OR s.team_id = ?1)
    AND (?2 IS NULL OR s.session_date >= ?2)
    AND (?3 IS NULL OR s.session_date <= ?3)
) m ON m.player_id = p.player_id
WHERE p.is_deleted = 0
  AND (?1 IS NULL OR p.team_id = ?1)
GROUP BY p.player_id
ORDER BY p.last_name ASC, p.first_name ASC
"#;

pub async fn player_tallies(
    pool: &SqlitePool,
    user_id: &str,
    team_id: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> sqlx::Result<Vec<PlayerTallyRow>> {
    sqlx::query_as::<_, PlayerTallyRow>(SQL_PLAYER_TALLIES)
        .bind(team_id)
        .bind(date_from)
        .bind(date_to)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_VISIBLE_SESSIONS: &str = r#"
SELECT COUNT(*)
FROM sessions s
JOIN teams t
  ON t.team_id = s.team_id
 AND t.is_deleted = 0
JOIN memberships mem
  ON mem.club_id = t.club_id
 AND mem.user_id = ?4
WHERE s.is_cancelled = 0
  AND (?1 IS NULL OR s.team_id = ?1)
  AND (?2 IS NULL OR s.session_date >= ?2)
  AND (?3 IS NULL OR s.session_date <= ?3)
"#;

pub async fn count_visible_sessions(
    pool: &SqlitePool,
    user_id: &str,
    team_id: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar(SQL_COUNT_VISIBLE_SESSIONS)
        .bind(team_id)
        .bind(date_from)
        .bind(date_to)
        .bind(user_id)
        .fetch_one(pool)
        .await
}
