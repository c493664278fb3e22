use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::catch_panic::CatchPanicLayer;

use trainingsplanner::clock::SystemClock;
use trainingsplanner::database::schema;
use trainingsplanner::state::AppState;
use trainingsplanner::web::middleware::auth as auth_middleware;
use trainingsplanner::web::routes::{attendance, calendar, patterns, sessions, statistics};

#[tokio::main]
async fn main() {
    // Laad .env bestand
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Verbind met de Database
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL moet in .env staan");
    println!("Verbinden met database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Kan niet verbinden met DB");

    schema::init_schema(&pool)
        .await
        .expect("Kan schema niet initialiseren");

    let state = AppState::new(pool, Arc::new(SystemClock));

    // 3. Alle API-routes achter één auth-middleware layer
    let api_routes = Router::new()
        .route("/api/sessions", post(sessions::create_session_handler))
        .route(
            "/api/sessions/:session_id",
            put(sessions::update_session_handler),
        )
        .route(
            "/api/sessions/:session_id/delete",
            post(sessions::delete_session_handler),
        )
        .route(
            "/api/sessions/:session_id/notes",
            put(sessions::update_notes_handler),
        )
        .route(
            "/api/sessions/:session_id/attendance",
            get(attendance::fetch_attendance_handler).put(attendance::save_attendance_handler),
        )
        .route("/api/patterns", post(patterns::create_pattern_handler))
        .route("/api/statistics", get(statistics::statistics_handler))
        .route("/api/calendar", get(calendar::calendar_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    // 4. Bouw de hele applicatie
    let app = Router::new()
        .merge(api_routes)
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // 5. Start de server (met fallback poort)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Kan host/port niet parsen");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Kon niet binden op {}: {}. Probeer fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Kan fallback niet parsen");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Kan niet binden op fallback poort")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Trainingsplanner draait op http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
