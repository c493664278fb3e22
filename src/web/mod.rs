pub mod middleware;
pub mod routes;
