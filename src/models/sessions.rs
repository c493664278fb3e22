use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// One concrete training occurrence on the calendar, either standalone or
/// generated from a recurrence pattern.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SessionRow {
    pub session_id: String,
    pub team_id: String,
    pub recurrence_id: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_override: i64,
    pub is_cancelled: i64,
    pub cancel_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Relationship between a session and its recurrence pattern, as a proper
/// variant so "override without pattern" cannot occur in service code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLink {
    Standalone,
    PatternInstance { recurrence_id: String },
    OverriddenPatternInstance { recurrence_id: String },
}

impl SessionRow {
    /// A stray override flag on a standalone row (impossible through our
    /// write paths) degrades to `Standalone` on read.
    pub fn link(&self) -> SessionLink {
        match (&self.recurrence_id, self.is_override != 0) {
            (Some(id), false) => SessionLink::PatternInstance {
                recurrence_id: id.clone(),
            },
            (Some(id), true) => SessionLink::OverriddenPatternInstance {
                recurrence_id: id.clone(),
            },
            (None, _) => SessionLink::Standalone,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(recurrence_id: Option<&str>, is_override: i64) -> SessionRow {
        let ts = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        SessionRow {
            session_id: "s1".into(),
            team_id: "t1".into(),
            recurrence_id: recurrence_id.map(str::to_string),
            session_date: ts.date(),
            start_time: ts.time(),
            duration_minutes: 90,
            location: None,
            notes: None,
            is_override,
            is_cancelled: 0,
            cancel_reason: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn link_variants() {
        assert_eq!(row(None, 0).link(), SessionLink::Standalone);
        assert_eq!(
            row(Some("r1"), 0).link(),
            SessionLink::PatternInstance {
                recurrence_id: "r1".into()
            }
        );
        assert_eq!(
            row(Some("r1"), 1).link(),
            SessionLink::OverriddenPatternInstance {
                recurrence_id: "r1".into()
            }
        );
        // Illegal combination collapses to Standalone instead of lying.
        assert_eq!(row(None, 1).link(), SessionLink::Standalone);
    }
}
