//! # clubctl: Control Layer for Sports-Class Academies
//!
//! `clubctl` is a self-hostable backend for businesses that sell recurring
//! scheduled classes (padel academies, dive centers, and similar). It
//! manages clubs, trainers, students, and weekly class slots, enforces a
//! hard per-class capacity invariant, and runs the waitlist pipeline that
//! turns freed spots into enrollments: a background sweeper detects
//! openings, a notifier pushes time-boxed offers to the club's WhatsApp
//! group, and a browser-facing confirmation endpoint drives the
//! `notified -> accepted | skipped` state machine. Leagues (teams, match
//! results, standings) and Stripe-consumed enrollment payments round out
//! the management surface.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum)
//! for the HTTP layer and uses PostgreSQL (SQLx) for all persistence.
//!
//! ### Request Flow
//!
//! Staff requests hit `/api/v1/*`, authenticate with a bearer staff key
//! (club-scoped, or a platform key for club/key administration), and reach
//! handlers that use the repository layer in [`db`]. Two public surfaces
//! exist outside the staff API: `GET /confirm-waitlist` renders the
//! accept/decline pages linked from offer messages, and
//! `POST /webhooks/payments` receives provider webhooks.
//!
//! ### Core Components
//!
//! - the **API layer** ([`api`]): management handlers plus the public
//!   confirmation endpoint.
//! - the **database layer** ([`db`]): repositories over models; every
//!   capacity mutation funnels through one locked transaction
//!   ([`db::handlers::participants`]).
//! - the **waitlist subsystem** ([`waitlist`]): capacity checker, notifier,
//!   and the background sweeper daemon.
//! - **providers**: outbound messaging ([`messaging`]) and payments
//!   ([`payment_providers`]), both behind traits with dummy
//!   implementations for development and tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use clubctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = clubctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     clubctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
pub mod errors;
pub mod messaging;
mod openapi;
mod pages;
pub mod payment_providers;
pub mod schedule;
pub mod standings;
pub mod telemetry;
pub mod types;
pub mod waitlist;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod test;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    db::handlers::StaffKeys,
    db::models::staff_keys::StaffKeyCreateDBRequest,
    messaging::MessagingProvider,
    openapi::ApiDoc,
    payment_providers::PaymentProvider,
    waitlist::{CapacityChecker, Notifier},
};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub messaging: Arc<dyn MessagingProvider>,
    pub payments: Option<Arc<dyn PaymentProvider>>,
}

/// Get the clubctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Seed the bootstrap platform key if configured and not present yet.
///
/// Idempotent: an existing key with the same secret is left untouched, so
/// restarts don't mint duplicates.
#[instrument(skip_all)]
pub async fn seed_bootstrap_key(config: &Config, db: &PgPool) -> Result<(), anyhow::Error> {
    let Some(secret) = config.bootstrap_key.as_deref() else {
        return Ok(());
    };

    let mut tx = db.begin().await?;
    let mut keys = StaffKeys::new(&mut tx);

    if keys.find_by_secret(secret).await?.is_some() {
        tracing::debug!("Bootstrap platform key already present");
        tx.commit().await?;
        return Ok(());
    }

    keys.create(&StaffKeyCreateDBRequest {
        club_id: None,
        name: "bootstrap".to_string(),
        secret: secret.to_string(),
    })
    .await?;

    tx.commit().await?;
    info!("Seeded bootstrap platform key");

    Ok(())
}

/// Build the main application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> Router {
    use api::handlers::{classes, clubs, confirm, leagues, payments, students, trainers, waitlist};

    let api_routes = Router::new()
        // Club administration (platform keys)
        .route("/clubs", post(clubs::create_club).get(clubs::list_clubs))
        .route(
            "/clubs/{id}",
            get(clubs::get_club).patch(clubs::update_club).delete(clubs::delete_club),
        )
        .route("/clubs/{id}/keys", post(clubs::create_club_key))
        .route("/keys/{id}", delete(clubs::revoke_key))
        // Trainers
        .route("/trainers", post(trainers::create_trainer).get(trainers::list_trainers))
        .route(
            "/trainers/{id}",
            get(trainers::get_trainer)
                .patch(trainers::update_trainer)
                .delete(trainers::delete_trainer),
        )
        // Students
        .route("/students", post(students::create_student).get(students::list_students))
        .route(
            "/students/{id}",
            get(students::get_student)
                .patch(students::update_student)
                .delete(students::delete_student),
        )
        // Classes and enrollment
        .route("/classes", post(classes::create_class).get(classes::list_classes))
        .route("/classes/bulk", post(classes::bulk_create_classes))
        .route(
            "/classes/{id}",
            get(classes::get_class).patch(classes::update_class).delete(classes::delete_class),
        )
        .route(
            "/classes/{id}/participants",
            get(classes::list_participants).post(classes::enroll_participant),
        )
        .route(
            "/classes/{id}/participants/{participant_id}",
            delete(classes::cancel_participant),
        )
        // Waitlist
        .route("/classes/{id}/waitlist", get(waitlist::list_waitlist).post(waitlist::join_waitlist))
        .route("/classes/{id}/waitlist/notify", post(waitlist::notify_next))
        .route("/waitlist/sweep", post(waitlist::sweep_now))
        // Leagues
        .route("/leagues", post(leagues::create_league).get(leagues::list_leagues))
        .route("/leagues/{id}", get(leagues::get_league).delete(leagues::delete_league))
        .route("/leagues/{id}/teams", post(leagues::add_team).get(leagues::list_teams))
        .route("/leagues/{id}/matches", post(leagues::record_match).get(leagues::list_matches))
        .route("/leagues/{id}/standings", get(leagues::get_standings))
        // Payments
        .route("/payments/checkout", post(payments::create_checkout))
        .route("/payments/{session_id}/process", patch(payments::process_payment).post(payments::process_payment))
        .with_state(state.clone());

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        // Public, browser-facing confirmation flow
        .route("/confirm-waitlist", get(confirm::confirm_waitlist))
        // Webhook routes (external services, not part of the staff API)
        .route("/webhooks/payments", post(payments::webhook_handler))
        .with_state(state.clone())
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Container for background services and their lifecycle management.
///
/// Currently one daemon: the capacity sweeper. Task handles plus a shared
/// cancellation token, so further daemons slot in without touching
/// `Application`.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
}

impl BackgroundServices {
    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();

        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// Setup background services (capacity sweeper)
fn setup_background_services(
    pool: PgPool,
    config: Config,
    messaging: Arc<dyn MessagingProvider>,
    shutdown_token: tokio_util::sync::CancellationToken,
) -> BackgroundServices {
    let mut background_tasks = Vec::new();

    if config.background_services.capacity_sweeper.enabled {
        let notifier = Notifier::new(pool.clone(), messaging, &config);
        let checker = CapacityChecker::new(pool, notifier, &config);
        let interval = config.waitlist.sweep_interval;
        let sweeper_shutdown = shutdown_token.clone();

        let handle = tokio::spawn(async move {
            waitlist::sweeper::run_capacity_sweeper(checker, interval, sweeper_shutdown).await;
        });
        background_tasks.push(handle);
    } else {
        info!("Capacity sweeper disabled; sweeps only run via the manual endpoint");
    }

    BackgroundServices {
        background_tasks,
        shutdown_token,
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the bootstrap key, and starts background services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse an existing pool (tests).
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let pool = match pool {
            Some(pool) => pool,
            None => {
                let settings = &config.database.pool;
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .min_connections(settings.min_connections)
                    .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
                    .connect(&config.database.url)
                    .await?
            }
        };

        migrator().run(&pool).await?;
        seed_bootstrap_key(&config, &pool).await?;

        let messaging = messaging::create_provider(&config.messaging);
        let payments = config.payment.as_ref().map(payment_providers::create_provider);

        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let bg_services = setup_background_services(pool.clone(), config.clone(), messaging.clone(), shutdown_token);

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .messaging(messaging)
            .maybe_payments(payments)
            .build();

        let router = build_router(&state);

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("clubctl listening on http://{bind_addr}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Shutdown background services and wait for tasks to complete
        self.bg_services.shutdown().await;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
