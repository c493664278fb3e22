use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

/// A weekly repeating training slot. Immutable after creation except for
/// the `is_active` flag, which flips off when the pattern is deleted in
/// "all future" mode.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RecurrencePatternRow {
    pub recurrence_id: String,
    pub team_id: String,
    /// Comma-separated weekday numbers, 0 = Sunday .. 6 = Saturday.
    pub days_of_week: String,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_active: i64,
    pub created_at: NaiveDateTime,
}

impl RecurrencePatternRow {
    pub fn weekdays(&self) -> Vec<u32> {
        parse_days_of_week(&self.days_of_week)
    }
}

pub fn parse_days_of_week(raw: &str) -> Vec<u32> {
    let mut days: Vec<u32> = raw
        .split(',')
        .filter_map(|p| p.trim().parse::<u32>().ok())
        .filter(|d| *d <= 6)
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

pub fn encode_days_of_week(days: &[u32]) -> String {
    let mut sorted = days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_of_week_round_trip() {
        assert_eq!(encode_days_of_week(&[3, 1, 3]), "1,3");
        assert_eq!(parse_days_of_week("1,3"), vec![1, 3]);
        // Garbage and out-of-range entries are dropped, not an error.
        assert_eq!(parse_days_of_week("5, x, 9,0"), vec![0, 5]);
    }
}
