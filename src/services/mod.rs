pub mod attendance_service;
pub mod calendar_service;
pub mod scheduling_service;
pub mod statistics_service;
