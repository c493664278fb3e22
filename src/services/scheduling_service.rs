use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{recurrence_repo, session_repo};
use crate::error::{ApiError, FailedDate, Result};
use crate::models::{
    recurrence_patterns::encode_days_of_week, RecurrencePatternRow, SessionLink, SessionRow,
};

#[derive(Debug, Deserialize)]
pub struct SessionInput {
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecurringPatternInput {
    pub days_of_week: Vec<u32>,
    pub start_time: String,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub generate_until: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Single,
    AllFuture,
}

impl DeleteMode {
    pub fn parse(input: &str) -> Option<DeleteMode> {
        match input {
            "single" => Some(DeleteMode::Single),
            "all_future" => Some(DeleteMode::AllFuture),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DeleteOutcome {
    pub cancelled_count: u64,
    pub pattern_deactivated: bool,
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation(field, "expected a date formatted as YYYY-MM-DD"))
}

fn parse_time(field: &str, raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ApiError::validation(field, "expected a time formatted as HH:MM"))
}

fn validate_duration(duration_minutes: i64) -> Result<()> {
    if duration_minutes <= 0 {
        return Err(ApiError::validation(
            "duration_minutes",
            "duration must be positive",
        ));
    }
    Ok(())
}

/// Creates a one-off session that belongs to no pattern.
pub async fn create_standalone_session(
    pool: &SqlitePool,
    now: NaiveDateTime,
    team_id: &str,
    input: SessionInput,
) -> Result<SessionRow> {
    let session_date = parse_date("session_date", &input.session_date)?;
    let start_time = parse_time("start_time", &input.start_time)?;
    validate_duration(input.duration_minutes)?;

    let session_id = Uuid::new_v4().to_string();
    session_repo::insert_session(
        pool,
        session_repo::NewSession {
            session_id: &session_id,
            team_id,
            recurrence_id: None,
            session_date,
            start_time,
            duration_minutes: input.duration_minutes,
            location: input.location.as_deref(),
            notes: input.notes.as_deref(),
            now,
        },
    )
    .await?;

    load_required(pool, &session_id).await
}

/// All dates in `[start, until]` whose weekday (0 = Sunday .. 6 = Saturday)
/// is in `weekdays`. The caller has already validated the inputs.
pub fn expand_weekly_dates(start: NaiveDate, until: NaiveDate, weekdays: &[u32]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= until {
        if weekdays.contains(&cursor.weekday().num_days_from_sunday()) {
            dates.push(cursor);
        }
        cursor += Duration::days(1);
    }
    dates
}

/// Creates the pattern and every matching instance up to the horizon as one
/// transaction: either all instances commit or nothing does.
pub async fn create_recurring_pattern(
    pool: &SqlitePool,
    today: NaiveDate,
    now: NaiveDateTime,
    team_id: &str,
    input: RecurringPatternInput,
) -> Result<(RecurrencePatternRow, i64)> {
    if input.days_of_week.is_empty() {
        return Err(ApiError::validation(
            "days_of_week",
            "at least one weekday is required",
        ));
    }
    if let Some(bad) = input.days_of_week.iter().find(|d| **d > 6) {
        return Err(ApiError::validation(
            "days_of_week",
            format!("weekday {} is out of range 0-6", bad),
        ));
    }
    let start_time = parse_time("start_time", &input.start_time)?;
    validate_duration(input.duration_minutes)?;
    let generate_until = parse_date("generate_until", &input.generate_until)?;
    if generate_until < today {
        return Err(ApiError::validation(
            "generate_until",
            "horizon lies before the generation start date",
        ));
    }

    let recurrence_id = Uuid::new_v4().to_string();
    let days = encode_days_of_week(&input.days_of_week);
    let dates = expand_weekly_dates(today, generate_until, &input.days_of_week);

    let generated = commit_expansion(
        pool,
        recurrence_repo::NewRecurrencePattern {
            recurrence_id: &recurrence_id,
            team_id,
            days_of_week: &days,
            start_time,
            duration_minutes: input.duration_minutes,
            location: input.location.as_deref(),
            notes: input.notes.as_deref(),
            created_at: now,
        },
        &dates,
        now,
    )
    .await?;

    let pattern = recurrence_repo::load_pattern(pool, &recurrence_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recurrence pattern".to_string()))?;

    Ok((pattern, generated))
}

/// Transactional core of expansion. On any per-date failure the whole
/// transaction rolls back and the error reports exactly which dates failed
/// and which would have succeeded.
pub async fn commit_expansion(
    pool: &SqlitePool,
    pattern: recurrence_repo::NewRecurrencePattern<'_>,
    dates: &[NaiveDate],
    now: NaiveDateTime,
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let recurrence_id = pattern.recurrence_id.to_string();
    let team_id = pattern.team_id.to_string();
    let start_time = pattern.start_time;
    let duration_minutes = pattern.duration_minutes;
    let location = pattern.location.map(str::to_string);
    let notes = pattern.notes.map(str::to_string);

    recurrence_repo::insert_pattern(&mut *tx, pattern).await?;

    let mut failed: Vec<FailedDate> = Vec::new();
    let mut succeeded: Vec<NaiveDate> = Vec::new();

    for date in dates {
        let session_id = Uuid::new_v4().to_string();
        let res = session_repo::insert_session(
            &mut *tx,
            session_repo::NewSession {
                session_id: &session_id,
                team_id: &team_id,
                recurrence_id: Some(&recurrence_id),
                session_date: *date,
                start_time,
                duration_minutes,
                location: location.as_deref(),
                notes: notes.as_deref(),
                now,
            },
        )
        .await;

        match res {
            Ok(_) => succeeded.push(*date),
            Err(e) => {
                let reason = match e.as_database_error() {
                    Some(db) if db.is_unique_violation() => {
                        "an instance already exists for this date".to_string()
                    }
                    _ => e.to_string(),
                };
                failed.push(FailedDate {
                    date: *date,
                    reason,
                });
            }
        }
    }

    if !failed.is_empty() {
        tx.rollback().await?;
        tracing::warn!(
            failed = failed.len(),
            "pattern expansion rolled back, nothing committed"
        );
        return Err(ApiError::Expansion { failed, succeeded });
    }

    tx.commit().await?;
    Ok(succeeded.len() as i64)
}

/// Edits one occurrence. A pattern instance becomes an override; its
/// siblings and the pattern itself are never touched.
pub async fn update_single_occurrence(
    pool: &SqlitePool,
    now: NaiveDateTime,
    session: &SessionRow,
    input: SessionInput,
) -> Result<SessionRow> {
    let session_date = parse_date("session_date", &input.session_date)?;
    let start_time = parse_time("start_time", &input.start_time)?;
    validate_duration(input.duration_minutes)?;

    let is_override = !matches!(session.link(), SessionLink::Standalone);

    session_repo::update_session_fields(
        pool,
        &session.session_id,
        session_repo::SessionFieldUpdate {
            session_date,
            start_time,
            duration_minutes: input.duration_minutes,
            location: input.location.as_deref(),
            notes: input.notes.as_deref(),
            is_override,
            now,
        },
    )
    .await?;

    load_required(pool, &session.session_id).await
}

/// Cancels one occurrence or, in all-future mode, deactivates the pattern
/// and cancels every instance on or after the target's date. All-future on
/// a standalone session degrades to a single cancellation.
pub async fn delete_session(
    pool: &SqlitePool,
    now: NaiveDateTime,
    session: &SessionRow,
    mode: DeleteMode,
    reason: Option<&str>,
) -> Result<DeleteOutcome> {
    let recurrence_id = match (mode, session.link()) {
        (DeleteMode::Single, _) | (_, SessionLink::Standalone) => {
            let n = session_repo::cancel_session(pool, &session.session_id, reason, now).await?;
            return Ok(DeleteOutcome {
                cancelled_count: n,
                pattern_deactivated: false,
            });
        }
        (DeleteMode::AllFuture, SessionLink::PatternInstance { recurrence_id })
        | (DeleteMode::AllFuture, SessionLink::OverriddenPatternInstance { recurrence_id }) => {
            recurrence_id
        }
    };

    let mut tx = pool.begin().await?;
    recurrence_repo::deactivate_pattern(&mut *tx, &recurrence_id).await?;
    let cancelled = session_repo::cancel_future_of_recurrence(
        &mut *tx,
        &recurrence_id,
        session.session_date,
        reason,
        now,
    )
    .await?;
    tx.commit().await?;

    Ok(DeleteOutcome {
        cancelled_count: cancelled,
        pattern_deactivated: true,
    })
}

pub async fn load_required(pool: &SqlitePool, session_id: &str) -> Result<SessionRow> {
    session_repo::load_session(pool, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("session".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init_schema(&pool).await.unwrap();
        sqlx::query("INSERT INTO teams (team_id, club_id, name) VALUES ('t1', 'c1', 'U15')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ts() -> NaiveDateTime {
        d(2026, 3, 2).and_hms_opt(12, 0, 0).unwrap()
    }

    fn pattern_input(days: Vec<u32>, until: &str) -> RecurringPatternInput {
        RecurringPatternInput {
            days_of_week: days,
            start_time: "18:00".to_string(),
            duration_minutes: 90,
            location: Some("Veld 2".to_string()),
            notes: None,
            generate_until: until.to_string(),
        }
    }

    #[test]
    fn expand_monday_wednesday_two_weeks() {
        // 2026-03-02 is a Monday; Monday = 1, Wednesday = 3 (Sunday = 0).
        let dates = expand_weekly_dates(d(2026, 3, 2), d(2026, 3, 15), &[1, 3]);
        assert_eq!(
            dates,
            vec![d(2026, 3, 2), d(2026, 3, 4), d(2026, 3, 9), d(2026, 3, 11)]
        );
    }

    #[test]
    fn expand_empty_range_boundaries() {
        // Horizon equal to start keeps the start if it matches.
        let dates = expand_weekly_dates(d(2026, 3, 2), d(2026, 3, 2), &[1]);
        assert_eq!(dates, vec![d(2026, 3, 2)]);
        let dates = expand_weekly_dates(d(2026, 3, 2), d(2026, 3, 2), &[2]);
        assert!(dates.is_empty());
    }

    #[tokio::test]
    async fn create_pattern_generates_matching_instances() {
        let pool = setup_pool().await;
        let (pattern, generated) = create_recurring_pattern(
            &pool,
            d(2026, 3, 2),
            ts(),
            "t1",
            pattern_input(vec![1, 3], "2026-03-15"),
        )
        .await
        .unwrap();

        assert_eq!(generated, 4);
        assert_eq!(pattern.weekdays(), vec![1, 3]);
        assert_eq!(pattern.is_active, 1);

        let instances = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        assert_eq!(instances.len(), 4);
        for s in &instances {
            assert_eq!(s.duration_minutes, 90);
            assert_eq!(s.recurrence_id.as_deref(), Some(pattern.recurrence_id.as_str()));
            assert_eq!(s.is_override, 0);
        }
    }

    #[tokio::test]
    async fn create_pattern_rejects_bad_input() {
        let pool = setup_pool().await;
        let today = d(2026, 3, 2);

        let err = create_recurring_pattern(
            &pool,
            today,
            ts(),
            "t1",
            pattern_input(vec![], "2026-03-15"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "days_of_week"));

        let mut input = pattern_input(vec![1], "2026-03-15");
        input.duration_minutes = 0;
        let err = create_recurring_pattern(&pool, today, ts(), "t1", input)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Validation { ref field, .. } if field == "duration_minutes")
        );

        // Horizon before today.
        let err = create_recurring_pattern(
            &pool,
            today,
            ts(),
            "t1",
            pattern_input(vec![1], "2026-03-01"),
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, ApiError::Validation { ref field, .. } if field == "generate_until")
        );

        // Nothing persisted by any of the rejected calls.
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recurrence_patterns")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn expansion_rolls_back_completely_on_duplicate() {
        let pool = setup_pool().await;
        let start = parse_time("start_time", "18:00").unwrap();

        // A leftover instance occupies one of the candidate dates for the
        // recurrence id we are about to expand.
        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, team_id, recurrence_id, session_date, start_time,
                                  duration_minutes, created_at, updated_at)
            VALUES ('stale', 't1', 'r-fixed', '2026-03-04', '18:00', 90, '2026-03-01T00:00:00', '2026-03-01T00:00:00')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = commit_expansion(
            &pool,
            recurrence_repo::NewRecurrencePattern {
                recurrence_id: "r-fixed",
                team_id: "t1",
                days_of_week: "1,3",
                start_time: start,
                duration_minutes: 90,
                location: None,
                notes: None,
                created_at: ts(),
            },
            &[d(2026, 3, 2), d(2026, 3, 4), d(2026, 3, 9)],
            ts(),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::Expansion { failed, succeeded } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].date, d(2026, 3, 4));
                assert_eq!(succeeded, vec![d(2026, 3, 2), d(2026, 3, 9)]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Rolled back: no pattern row, only the stale instance remains.
        let patterns: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recurrence_patterns")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(patterns, 0);
        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions, 1);
    }

    #[tokio::test]
    async fn editing_one_occurrence_leaves_siblings_alone() {
        let pool = setup_pool().await;
        let (pattern, _) = create_recurring_pattern(
            &pool,
            d(2026, 3, 2),
            ts(),
            "t1",
            pattern_input(vec![1, 3], "2026-03-15"),
        )
        .await
        .unwrap();

        let instances = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        let target = instances[1].clone();

        let updated = update_single_occurrence(
            &pool,
            ts(),
            &target,
            SessionInput {
                session_date: target.session_date.to_string(),
                start_time: "19:30".to_string(),
                duration_minutes: 60,
                location: Some("Zaal".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.is_override, 1);
        assert_eq!(updated.duration_minutes, 60);
        assert!(matches!(
            updated.link(),
            SessionLink::OverriddenPatternInstance { .. }
        ));

        let after = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        for s in after {
            if s.session_id == target.session_id {
                continue;
            }
            assert_eq!(s.is_override, 0);
            assert_eq!(s.duration_minutes, 90);
        }

        // Pattern row unchanged.
        let p = recurrence_repo::load_pattern(&pool, &pattern.recurrence_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.is_active, 1);
        assert_eq!(p.duration_minutes, 90);
    }

    #[tokio::test]
    async fn editing_standalone_session_never_sets_override() {
        let pool = setup_pool().await;
        let session = create_standalone_session(
            &pool,
            ts(),
            "t1",
            SessionInput {
                session_date: "2026-03-06".to_string(),
                start_time: "18:00".to_string(),
                duration_minutes: 75,
                location: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let updated = update_single_occurrence(
            &pool,
            ts(),
            &session,
            SessionInput {
                session_date: "2026-03-06".to_string(),
                start_time: "20:00".to_string(),
                duration_minutes: 75,
                location: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.is_override, 0);
        assert_eq!(updated.link(), SessionLink::Standalone);
    }

    #[tokio::test]
    async fn delete_single_cancels_only_target() {
        let pool = setup_pool().await;
        let (pattern, _) = create_recurring_pattern(
            &pool,
            d(2026, 3, 2),
            ts(),
            "t1",
            pattern_input(vec![1, 3], "2026-03-15"),
        )
        .await
        .unwrap();

        let instances = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        let target = instances[0].clone();

        let outcome = delete_session(
            &pool,
            ts(),
            &target,
            DeleteMode::Single,
            Some("veld afgekeurd"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.cancelled_count, 1);
        assert!(!outcome.pattern_deactivated);

        let after = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        for s in after {
            if s.session_id == target.session_id {
                assert_eq!(s.is_cancelled, 1);
                assert_eq!(s.cancel_reason.as_deref(), Some("veld afgekeurd"));
            } else {
                assert_eq!(s.is_cancelled, 0);
            }
        }

        let p = recurrence_repo::load_pattern(&pool, &pattern.recurrence_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.is_active, 1);
    }

    #[tokio::test]
    async fn delete_all_future_preserves_history() {
        let pool = setup_pool().await;
        let (pattern, _) = create_recurring_pattern(
            &pool,
            d(2026, 3, 2),
            ts(),
            "t1",
            pattern_input(vec![1, 3], "2026-03-15"),
        )
        .await
        .unwrap();

        // Cut off from the third instance (2026-03-09) onwards.
        let instances = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        let cutoff_instance = instances[2].clone();

        let outcome = delete_session(&pool, ts(), &cutoff_instance, DeleteMode::AllFuture, None)
            .await
            .unwrap();
        assert_eq!(outcome.cancelled_count, 2);
        assert!(outcome.pattern_deactivated);

        let after = session_repo::list_for_recurrence(&pool, &pattern.recurrence_id)
            .await
            .unwrap();
        assert_eq!(after.len(), 4, "past instances stay queryable");
        for s in after {
            if s.session_date >= cutoff_instance.session_date {
                assert_eq!(s.is_cancelled, 1);
            } else {
                assert_eq!(s.is_cancelled, 0);
            }
        }

        let p = recurrence_repo::load_pattern(&pool, &pattern.recurrence_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.is_active, 0);
    }

    #[tokio::test]
    async fn delete_all_future_on_standalone_degrades_to_single() {
        let pool = setup_pool().await;
        let session = create_standalone_session(
            &pool,
            ts(),
            "t1",
            SessionInput {
                session_date: "2026-03-06".to_string(),
                start_time: "18:00".to_string(),
                duration_minutes: 75,
                location: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let outcome = delete_session(&pool, ts(), &session, DeleteMode::AllFuture, None)
            .await
            .unwrap();
        assert_eq!(outcome.cancelled_count, 1);
        assert!(!outcome.pattern_deactivated);
    }
}
