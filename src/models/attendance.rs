use chrono::NaiveTime;
use serde::Serialize;

/// Per-player attendance state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Unmarked,
    Present,
    Absent,
    Late,
    Excused,
    Injured,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Unmarked => "unmarked",
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Injured => "injured",
        }
    }

    pub fn parse(input: &str) -> Option<AttendanceStatus> {
        match input {
            "unmarked" => Some(AttendanceStatus::Unmarked),
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            "excused" => Some(AttendanceStatus::Excused),
            "injured" => Some(AttendanceStatus::Injured),
            _ => None,
        }
    }

    /// Attended for percentage purposes: present or late.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// One roster line as the attendance view reads it: the player joined live
/// from the team roster with whatever record exists for the session,
/// defaulting to `unmarked`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceRosterRow {
    pub player_id: String,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: Option<i64>,
    pub status: String,
    pub arrival_time: Option<NaiveTime>,
    pub notes: Option<String>,
}
