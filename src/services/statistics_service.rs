use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::statistics_repo;
use crate::error::Result;

/// Players under this percentage count towards the low-attendance figure.
pub const LOW_ATTENDANCE_THRESHOLD: i64 = 60;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatistics {
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
    pub total_sessions: i64,
    /// `round(100 * (present + late) / total)`; absent when the player has
    /// no marked sessions in range.
    pub percentage: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallStatistics {
    pub total_sessions: i64,
    /// Mean percentage over players with at least one marked session.
    pub average_percentage: Option<i64>,
    pub perfect_attendance_count: i64,
    pub low_attendance_count: i64,
    pub low_attendance_threshold: i64,
}

#[derive(Debug, Serialize)]
pub struct StatisticsView {
    pub statistics: Vec<PlayerStatistics>,
    pub overall: OverallStatistics,
}

pub fn attendance_percentage(present: i64, late: i64, total: i64) -> Option<i64> {
    if total <= 0 {
        return None;
    }
    Some((100.0 * (present + late) as f64 / total as f64).round() as i64)
}

pub async fn build_statistics(
    pool: &SqlitePool,
    user_id: &str,
    team_id: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Result<StatisticsView> {
    let tallies =
        statistics_repo::player_tallies(pool, user_id, team_id, date_from, date_to).await?;
    let total_sessions =
        statistics_repo::count_visible_sessions(pool, user_id, team_id, date_from, date_to)
            .await?;

    let mut statistics = Vec::with_capacity(tallies.len());
    for t in tallies {
        let total = t.present_count + t.late_count + t.absent_count + t.excused_count
            + t.injured_count;
        let percentage = attendance_percentage(t.present_count, t.late_count, total);
        statistics.push(PlayerStatistics {
            player_id: t.player_id,
            team_id: t.team_id,
            first_name: t.first_name,
            last_name: t.last_name,
            jersey_number: t.jersey_number,
            present_count: t.present_count,
            late_count: t.late_count,
            absent_count: t.absent_count,
            excused_count: t.excused_count,
            injured_count: t.injured_count,
            total_sessions: total,
            percentage,
        });
    }

    let rated: Vec<i64> = statistics.iter().filter_map(|s| s.percentage).collect();
    let average_percentage = if rated.is_empty() {
        None
    } else {
        Some((rated.iter().sum::<i64>() as f64 / rated.len() as f64).round() as i64)
    };
    let perfect_attendance_count = rated.iter().filter(|p| **p == 100).count() as i64;
    let low_attendance_count = rated
        .iter()
        .filter(|p| **p < LOW_ATTENDANCE_THRESHOLD)
        .count() as i64;

    Ok(StatisticsView {
        statistics,
        overall: OverallStatistics {
            total_sessions,
            average_percentage,
            perfect_attendance_count,
            low_attendance_count,
            low_attendance_threshold: LOW_ATTENDANCE_THRESHOLD,
        },
    })
}
