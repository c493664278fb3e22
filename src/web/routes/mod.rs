pub mod attendance;
pub mod calendar;
pub mod patterns;
pub mod sessions;
pub mod statistics;
