use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::attendance_repo;
use crate::error::{ApiError, Result};
use crate::models::{AttendanceRosterRow, AttendanceStatus, SessionRow};

#[derive(Debug, Deserialize)]
pub struct AttendanceEntry {
    pub player_id: String,
    pub status: String,
    pub arrival_time: Option<String>,
    pub notes: Option<String>,
}

struct ValidatedEntry {
    player_id: String,
    status: AttendanceStatus,
    arrival_time: Option<NaiveTime>,
    notes: Option<String>,
}

/// The live roster joined with whatever records exist for this session;
/// players without a record come back as `unmarked`.
pub async fn fetch_session_attendance(
    pool: &SqlitePool,
    session: &SessionRow,
) -> Result<Vec<AttendanceRosterRow>> {
    let rows =
        attendance_repo::fetch_roster_with_attendance(pool, &session.session_id, &session.team_id)
            .await?;
    Ok(rows)
}

/// Batch save of the whole sheet in one transaction. Every entry is
/// validated before anything is written. `arrival_time` survives only on a
/// `late` status; marking a player `unmarked` removes their record again.
/// Concurrent saves are last-write-wins.
pub async fn save_session_attendance(
    pool: &SqlitePool,
    now: NaiveDateTime,
    session: &SessionRow,
    entries: Vec<AttendanceEntry>,
) -> Result<usize> {
    let mut validated = Vec::with_capacity(entries.len());
    for entry in entries {
        let status = AttendanceStatus::parse(&entry.status).ok_or_else(|| {
            ApiError::validation(
                "status",
                format!(
                    "unknown status '{}' for player {}",
                    entry.status, entry.player_id
                ),
            )
        })?;

        let arrival_time = if status == AttendanceStatus::Late {
            match entry.arrival_time.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => Some(
                    NaiveTime::parse_from_str(raw, "%H:%M")
                        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                        .map_err(|_| {
                            ApiError::validation(
                                "arrival_time",
                                format!("invalid arrival time for player {}", entry.player_id),
                            )
                        })?,
                ),
                _ => None,
            }
        } else {
            // Any non-late status drops the arrival time, whatever was sent.
            None
        };

        validated.push(ValidatedEntry {
            player_id: entry.player_id,
            status,
            arrival_time,
            notes: entry.notes.filter(|n| !n.trim().is_empty()),
        });
    }

    let mut tx = pool.begin().await?;
    let mut saved = 0usize;
    for entry in &validated {
        if entry.status == AttendanceStatus::Unmarked {
            attendance_repo::delete_record(&mut *tx, &session.session_id, &entry.player_id)
                .await?;
            continue;
        }
        attendance_repo::upsert_record(
            &mut *tx,
            &session.session_id,
            &entry.player_id,
            entry.status.as_str(),
            entry.arrival_time,
            entry.notes.as_deref(),
            now,
        )
        .await?;
        saved += 1;
    }
    tx.commit().await?;

    Ok(saved)
}
