pub mod clock;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
