pub mod attendance_repo;
pub mod membership_repo;
pub mod recurrence_repo;
pub mod roster_repo;
pub mod schema;
pub mod session_repo;
pub mod statistics_repo;
