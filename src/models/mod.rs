pub mod attendance;
pub mod memberships;
pub mod recurrence_patterns;
pub mod sessions;

pub use attendance::{AttendanceRosterRow, AttendanceStatus};
pub use memberships::Role;
pub use recurrence_patterns::RecurrencePatternRow;
pub use sessions::{SessionLink, SessionRow};
