pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod mail;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;

use crate::{
    config::{Config, ConfigError},
    doc::ApiDoc,
    mail::{MailQueue, spawn_worker},
    routes::{admin, auth, availability, calendar, health, reservation, root},
    state::AppState,
    utils::shutdown::shutdown_signal,
};
use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use database::{db::create_connection, error::ServiceError, services::UserService};
use log::{info, warn};
use migration::{Migrator, MigratorTrait};
use sea_orm::DbErr;
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use utoipa::OpenApi;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("failed to create administrator: {0}")]
    Admin(#[from] ServiceError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application router over `state`
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.in_production)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            state.config.session_lifetime_hours,
        )));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/new-reservations", get(admin::new_reservations))
        .route("/all-reservations", get(admin::all_reservations))
        .route(
            "/reservations/{src}/{id}",
            get(admin::show_reservation).post(admin::post_show_reservation),
        )
        .route(
            "/process-reservation/{src}/{id}",
            get(admin::process_reservation),
        )
        .route(
            "/delete-reservation/{src}/{id}",
            get(admin::delete_reservation),
        )
        .route(
            "/reservations-calendar",
            get(calendar::reservations_calendar).post(calendar::post_reservations_calendar),
        )
        .route_layer(middleware::from_fn(auth::require_auth));

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route(
            "/search-availability",
            get(availability::search_availability).post(availability::post_search_availability),
        )
        .route(
            "/search-availability-json",
            post(availability::search_availability_json),
        )
        .route("/choose-room/{id}", get(availability::choose_room))
        .route("/book-room", get(availability::book_room))
        .route(
            "/make-reservation",
            get(reservation::make_reservation).post(reservation::post_make_reservation),
        )
        .route(
            "/reservation-summary",
            get(reservation::reservation_summary),
        )
        .route("/user/login", get(auth::login).post(auth::post_login))
        .route("/user/logout", get(auth::logout))
        .nest("/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(session_layer),
        )
        .with_state(state)
}

/// Loads configuration, prepares the database and serves until a shutdown signal
pub async fn run() -> Result<(), StartupError> {
    let config = Arc::new(Config::load()?);

    let db = create_connection(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            UserService::ensure_admin(&db, email, password).await?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set to create an administrator");
        }
        (None, None) => {}
    }

    let (mailer, receiver) = MailQueue::new();
    let worker = spawn_worker(Arc::clone(&config), receiver);

    let state = AppState {
        db,
        config: Arc::clone(&config),
        mailer,
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Listening on http://localhost:{}", config.port);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its mail senders are gone, so the worker drains and stops
    if let Err(e) = worker.await {
        warn!("Mail worker ended abnormally: {e}");
    }

    Ok(())
}
