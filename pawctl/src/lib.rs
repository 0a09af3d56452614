//! # pawctl: Dog Daycare Booking Engine
//!
//! `pawctl` books daycare days for dogs against an owner's prepaid subscription.
//! An owner picks weekday dates and approved dogs, sees a quote, and confirms.
//! Each confirmed date becomes one booking covering every selected dog and
//! costs one subscription day, however many dogs attend.
//!
//! ## Architecture
//!
//! - **[`booking`]**: calendar, availability, selection, pricing and the
//!   [`BookingAllocator`](booking::BookingAllocator) that commits a selection
//!   atomically
//! - **[`store`]**: the [`BookingStore`](store::BookingStore) seam, with
//!   PostgreSQL and in-memory implementations
//! - **[`api`]**: axum handlers and request/response models
//! - **[`config`]**: YAML plus environment configuration via figment
//! - **[`telemetry`]**: tracing subscriber and optional OTLP export
//!
//! ## Quick Start
//!
//! ```no_run
//! use pawctl::{Application, Config};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = pawctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     pawctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! With `storage.type: postgres` (or `DATABASE_URL` set) migrations run on
//! startup. To run them by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! pawctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod booking;
pub mod clock;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
mod openapi;
pub mod store;
pub mod telemetry;
pub mod types;

use crate::{
    booking::{BookingAllocator, PricingSource},
    clock::{Clock, SystemClock},
    config::{PoolSettings, StorageConfig},
    errors::Error,
    metrics::BookingMetrics,
    openapi::ApiDoc,
    store::{BookingStore, InMemoryBookingStore, PgBookingStore},
};
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;

/// Application state shared across all request handlers.
///
/// `store` and `pricing` are often the same object (the PostgreSQL store
/// serves both); they are separate so the in-memory store can pair with a
/// pricing table taken straight from configuration.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(store.clone())
///     .pricing(pricing.clone())
///     .allocator(Arc::new(BookingAllocator::new(store, pricing, capacity)))
///     .clock(Arc::new(SystemClock))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn BookingStore>,
    pub pricing: Arc<dyn PricingSource>,
    pub allocator: Arc<BookingAllocator>,
    pub clock: Arc<dyn Clock>,
    /// Present when `enable_metrics` is set
    pub metrics: Option<BookingMetrics>,
}

/// Get the pawctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

async fn connect(url: &str, settings: &PoolSettings) -> anyhow::Result<PgPool> {
    let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds(settings.idle_timeout_secs))
        .max_lifetime(seconds(settings.max_lifetime_secs))
        .connect(url)
        .await?;
    Ok(pool)
}

/// Build the application router.
///
/// - `/healthz`
/// - `/api/v1/*`: booking API
/// - `/api/openapi.json`: OpenAPI document for the booking API
/// - `/internal/metrics`: Prometheus text, only when `state.metrics` is set
pub fn build_router(state: &AppState) -> Router {
    let api_routes = Router::new()
        .route("/calendar/{year}/{month}", get(api::handlers::calendar::get_month))
        .route("/owners/{owner_id}/subscription", get(api::handlers::owners::get_subscription))
        .route("/owners/{owner_id}/dogs", get(api::handlers::owners::list_dogs))
        .route("/owners/{owner_id}/quote", post(api::handlers::bookings::quote))
        .route(
            "/owners/{owner_id}/bookings",
            get(api::handlers::bookings::list_bookings).post(api::handlers::bookings::confirm),
        )
        .route("/pricing", get(api::handlers::pricing::get_pricing))
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/v1", api_routes);

    if let Some(metrics) = state.metrics.clone() {
        router = router.route(
            "/internal/metrics",
            get(move || {
                let metrics = metrics.clone();
                async move { metrics.render().map_err(|e| Error::Other(e.into())) }
            }),
        );
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Open storage, run migrations when on PostgreSQL, and build the router
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting pawctl with configuration: {:#?}", config);

        let lock_timeout = config.booking.lock_timeout;
        let (store, pricing, pool): (Arc<dyn BookingStore>, Arc<dyn PricingSource>, Option<PgPool>) = match &config.storage {
            StorageConfig::Postgres { url, pool: settings } => {
                let pool = connect(url, settings).await?;
                migrator().run(&pool).await?;
                info!("Using PostgreSQL storage");

                let store = Arc::new(PgBookingStore::new(pool.clone(), lock_timeout, config.pricing.table()));
                let booking_store: Arc<dyn BookingStore> = store.clone();
                let pricing: Arc<dyn PricingSource> = store;
                (booking_store, pricing, Some(pool))
            }
            StorageConfig::InMemory { fixtures } => {
                info!(
                    subscriptions = fixtures.subscriptions.len(),
                    dogs = fixtures.dogs.len(),
                    "Using in-memory storage; bookings are lost on restart"
                );
                let store: Arc<dyn BookingStore> = Arc::new(InMemoryBookingStore::from_fixtures(fixtures, lock_timeout).await?);
                let pricing: Arc<dyn PricingSource> = Arc::new(config.pricing.table());
                (store, pricing, None)
            }
        };

        let metrics = if config.enable_metrics {
            Some(BookingMetrics::new(&prometheus::Registry::new())?)
        } else {
            None
        };

        let mut allocator = BookingAllocator::new(store.clone(), pricing.clone(), config.booking.capacity());
        if let Some(metrics) = &metrics {
            allocator = allocator.with_metrics(metrics.clone());
        }

        let app_state = AppState::builder()
            .config(config.clone())
            .store(store)
            .pricing(pricing)
            .allocator(Arc::new(allocator))
            .clock(Arc::new(SystemClock))
            .maybe_metrics(metrics)
            .build();

        let router = build_router(&app_state);

        Ok(Self { router, config, pool })
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "pawctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{
        bookings::{BookingResponse, ConfirmationResponse, QuoteResponse},
        calendar::{CalendarMonthResponse, MonthCursor},
        owners::{DogResponse, SubscriptionResponse},
        pricing::PricingResponse,
    };
    use crate::booking::{Availability, PricingTable};
    use crate::clock::FixedClock;
    use crate::models::{Dog, SessionType, Subscription, Tier};
    use crate::types::OwnerId;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct TestApp {
        server: TestServer,
        owner_id: OwnerId,
        subscription: Subscription,
        approved: Dog,
        unapproved: Dog,
    }

    fn dog(owner_id: OwnerId, name: &str, is_approved: bool) -> Dog {
        Dog {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            is_approved,
        }
    }

    async fn test_app_with(config: Config, tier: Tier) -> TestApp {
        let store = Arc::new(InMemoryBookingStore::new(config.booking.lock_timeout));
        let owner_id = Uuid::new_v4();
        let subscription = Subscription::issue(owner_id, tier);
        store.insert_subscription(subscription.clone()).await;
        let approved = dog(owner_id, "Biscuit", true);
        let unapproved = dog(owner_id, "Pickle", false);
        store.insert_dog(approved.clone()).await;
        store.insert_dog(unapproved.clone()).await;

        let booking_store: Arc<dyn BookingStore> = store;
        let pricing: Arc<dyn PricingSource> = Arc::new(PricingTable::default());
        let metrics = config
            .enable_metrics
            .then(|| BookingMetrics::new(&prometheus::Registry::new()).unwrap());
        let mut allocator = BookingAllocator::new(booking_store.clone(), pricing.clone(), config.booking.capacity());
        if let Some(metrics) = &metrics {
            allocator = allocator.with_metrics(metrics.clone());
        }

        let state = AppState::builder()
            .config(config)
            .store(booking_store)
            .pricing(pricing)
            .allocator(Arc::new(allocator))
            .clock(Arc::new(FixedClock(date(2026, 10, 19))))
            .maybe_metrics(metrics)
            .build();
        let server = TestServer::new(build_router(&state)).expect("Failed to create test server");

        TestApp {
            server,
            owner_id,
            subscription,
            approved,
            unapproved,
        }
    }

    async fn test_app() -> TestApp {
        test_app_with(Config::default(), Tier::TwelveDays).await
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = test_app().await;
        let response = app.server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = test_app().await;
        let response = app.server.get("/api/openapi.json").await;
        response.assert_status_ok();
        let doc: Value = response.json();
        assert!(doc["paths"]["/owners/{owner_id}/bookings"].is_object());
    }

    #[test_log::test(tokio::test)]
    async fn test_calendar_month_layout_and_statuses() {
        let app = test_app().await;
        let response = app
            .server
            .get(&format!("/api/v1/calendar/2026/10?owner_id={}", app.owner_id))
            .await;
        response.assert_status_ok();

        let month: CalendarMonthResponse = response.json();
        assert_eq!(month.day_count, 31);
        // 1 October 2026 is a Thursday
        assert_eq!(month.first_weekday_offset, 4);
        assert_eq!(month.today, date(2026, 10, 19));
        assert_eq!(month.previous, MonthCursor { year: 2026, month: 9 });
        assert_eq!(month.next, MonthCursor { year: 2026, month: 11 });
        assert_eq!(month.days.len(), 31);

        let status = |day: u32| month.days[day as usize - 1].status;
        assert_eq!(status(16), Availability::Past);
        assert_eq!(status(18), Availability::Past);
        assert_eq!(status(19), Availability::Available);
        assert_eq!(status(23), Availability::Available);
        assert_eq!(status(24), Availability::Weekend);
        assert_eq!(status(25), Availability::Weekend);
        assert!(month.days.iter().all(|d| d.headcount.is_none()));
    }

    #[tokio::test]
    async fn test_calendar_marks_owner_bookings() {
        let app = test_app().await;
        app.server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id] }))
            .await
            .assert_status(StatusCode::CREATED);

        let month: CalendarMonthResponse = app
            .server
            .get(&format!("/api/v1/calendar/2026/10?owner_id={}", app.owner_id))
            .await
            .json();
        let friday = month.days.iter().find(|d| d.date == date(2026, 10, 23)).unwrap();
        assert_eq!(friday.status, Availability::Booked);
        assert!(!friday.selectable);

        // Anonymous view does not know whose booking it is
        let month: CalendarMonthResponse = app.server.get("/api/v1/calendar/2026/10").await.json();
        let friday = month.days.iter().find(|d| d.date == date(2026, 10, 23)).unwrap();
        assert_eq!(friday.status, Availability::Available);
    }

    #[tokio::test]
    async fn test_calendar_rejects_invalid_month() {
        let app = test_app().await;
        let response = app.server.get("/api/v1/calendar/2026/13").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_calendar_reports_full_days_when_capped() {
        let mut config = Config::default();
        config.booking.max_dogs_per_day = Some(1);
        let app = test_app_with(config, Tier::TwelveDays).await;
        app.server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id] }))
            .await
            .assert_status(StatusCode::CREATED);

        let month: CalendarMonthResponse = app.server.get("/api/v1/calendar/2026/10").await.json();
        let friday = month.days.iter().find(|d| d.date == date(2026, 10, 23)).unwrap();
        assert_eq!(friday.status, Availability::Full);
        assert_eq!(friday.headcount, Some(1));
        let thursday = month.days.iter().find(|d| d.date == date(2026, 10, 22)).unwrap();
        assert_eq!(thursday.status, Availability::Available);
        assert_eq!(thursday.headcount, Some(0));
    }

    #[tokio::test]
    async fn test_get_subscription() {
        let app = test_app().await;
        let response = app.server.get(&format!("/api/v1/owners/{}/subscription", app.owner_id)).await;
        response.assert_status_ok();
        let subscription: SubscriptionResponse = response.json();
        assert_eq!(subscription.id, app.subscription.id);
        assert_eq!(subscription.tier, Tier::TwelveDays);
        assert_eq!(subscription.days_remaining, 12);
    }

    #[tokio::test]
    async fn test_get_subscription_not_found() {
        let app = test_app().await;
        let response = app.server.get(&format!("/api/v1/owners/{}/subscription", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_list_dogs() {
        let app = test_app().await;
        let mut dogs: Vec<DogResponse> = app.server.get(&format!("/api/v1/owners/{}/dogs", app.owner_id)).await.json();
        dogs.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(dogs.len(), 2);
        assert_eq!(dogs[0].id, app.approved.id);
        assert!(dogs[0].is_approved);
        assert!(!dogs[1].is_approved);
    }

    #[tokio::test]
    async fn test_quote_splits_bookable_from_unavailable() {
        let app = test_app().await;
        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/quote", app.owner_id))
            .json(&json!({
                "dates": ["2026-10-30", "2026-10-23", "2026-10-24", "2026-10-16", "2026-10-23"],
                "dog_ids": [app.approved.id, app.unapproved.id],
            }))
            .await;
        response.assert_status_ok();

        let quote: QuoteResponse = response.json();
        assert_eq!(quote.tier, Tier::TwelveDays);
        assert_eq!(quote.session_type, SessionType::FullDay);
        assert_eq!(quote.dates, vec![date(2026, 10, 23), date(2026, 10, 30)]);
        assert_eq!(quote.unavailable_dates, vec![date(2026, 10, 16), date(2026, 10, 24)]);
        assert_eq!(quote.ineligible_dog_ids, vec![app.unapproved.id]);
        assert_eq!(quote.dog_count, 1);
        assert_eq!(quote.date_count, 2);
        assert_eq!(quote.daily_rate, Decimal::new(3700, 2));
        assert_eq!(quote.per_date_total, Decimal::new(3700, 2));
        assert_eq!(quote.grand_total, Decimal::new(7400, 2));
        assert_eq!(quote.days_remaining, 12);
        assert!(quote.sufficient_days);
    }

    #[tokio::test]
    async fn test_quote_flags_insufficient_days() {
        let app = test_app_with(Config::default(), Tier::FourDays).await;
        let quote: QuoteResponse = app
            .server
            .post(&format!("/api/v1/owners/{}/quote", app.owner_id))
            .json(&json!({
                "dates": ["2026-10-19", "2026-10-20", "2026-10-21", "2026-10-22", "2026-10-23"],
                "dog_ids": [app.approved.id],
                "session_type": "half_day",
            }))
            .await
            .json();
        assert_eq!(quote.date_count, 5);
        assert_eq!(quote.daily_rate, Decimal::new(2500, 2));
        assert!(!quote.sufficient_days);
    }

    #[tokio::test]
    async fn test_quote_without_subscription() {
        let app = test_app().await;
        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/quote", Uuid::new_v4()))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [] }))
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);
    }

    #[test_log::test(tokio::test)]
    async fn test_confirm_books_dates_and_debits_days() {
        let app = test_app().await;
        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({
                "dates": ["2026-10-23", "2026-10-30", "2026-11-06"],
                "dog_ids": [app.approved.id],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let confirmation: ConfirmationResponse = response.json();
        assert_eq!(confirmation.bookings.len(), 3);
        assert_eq!(confirmation.days_remaining, 9);
        assert_eq!(confirmation.days_used, 3);
        assert_eq!(confirmation.grand_total, Decimal::new(11100, 2));
        let dates: Vec<NaiveDate> = confirmation.bookings.iter().map(|b| b.booking_date).collect();
        assert_eq!(dates, vec![date(2026, 10, 23), date(2026, 10, 30), date(2026, 11, 6)]);

        let bookings: Vec<BookingResponse> = app.server.get(&format!("/api/v1/owners/{}/bookings", app.owner_id)).await.json();
        assert_eq!(bookings.len(), 3);
        assert_eq!(bookings[0].booking_date, date(2026, 11, 6));

        let subscription: SubscriptionResponse = app
            .server
            .get(&format!("/api/v1/owners/{}/subscription", app.owner_id))
            .await
            .json();
        assert_eq!(subscription.days_remaining, 9);
    }

    #[tokio::test]
    async fn test_confirm_same_date_twice_conflicts() {
        let app = test_app().await;
        let path = format!("/api/v1/owners/{}/bookings", app.owner_id);
        let body = json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id] });
        app.server.post(&path).json(&body).await.assert_status(StatusCode::CREATED);

        let response = app.server.post(&path).json(&body).await;
        response.assert_status(StatusCode::CONFLICT);
        let error: Value = response.json();
        assert_eq!(error["code"], "date_no_longer_available");
        assert_eq!(error["date"], "2026-10-23");
    }

    #[tokio::test]
    async fn test_confirm_insufficient_days_reports_deficit() {
        let app = test_app_with(Config::default(), Tier::FourDays).await;
        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({
                "dates": ["2026-10-19", "2026-10-20", "2026-10-21", "2026-10-22", "2026-10-23", "2026-10-26"],
                "dog_ids": [app.approved.id],
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: Value = response.json();
        assert_eq!(error["code"], "insufficient_days_remaining");
        assert_eq!(error["requested"], 6);
        assert_eq!(error["remaining"], 4);
        assert_eq!(error["deficit"], 2);
    }

    #[tokio::test]
    async fn test_confirm_validation_errors() {
        let app = test_app().await;
        let path = format!("/api/v1/owners/{}/bookings", app.owner_id);

        let response = app.server.post(&path).json(&json!({ "dates": ["2026-10-23"], "dog_ids": [] })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "no_dogs_selected");

        let response = app
            .server
            .post(&path)
            .json(&json!({ "dates": [], "dog_ids": [app.approved.id] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "no_dates_selected");

        let response = app
            .server
            .post(&path)
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.unapproved.id] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["code"], "dog_not_eligible");
        assert_eq!(error["dog_id"], app.unapproved.id.to_string());

        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/bookings", Uuid::new_v4()))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id] }))
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);
        assert_eq!(response.json::<Value>()["code"], "no_active_subscription");
    }

    #[tokio::test]
    async fn test_confirm_rejects_too_many_dates() {
        let mut config = Config::default();
        config.booking.max_dates_per_confirmation = 2;
        let app = test_app_with(config, Tier::TwelveDays).await;

        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({
                "dates": ["2026-10-21", "2026-10-22", "2026-10-23"],
                "dog_ids": [app.approved.id],
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let subscription: SubscriptionResponse = app
            .server
            .get(&format!("/api/v1/owners/{}/subscription", app.owner_id))
            .await
            .json();
        assert_eq!(subscription.days_remaining, 12);
    }

    #[tokio::test]
    async fn test_confirm_rejects_unknown_fields() {
        let app = test_app().await;
        let response = app
            .server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id], "price": "0" }))
            .await;
        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn test_get_pricing() {
        let app = test_app().await;
        let pricing: PricingResponse = app.server.get("/api/v1/pricing").await.json();
        assert_eq!(pricing.default_full_day_rate, Decimal::new(4000, 2));
        assert_eq!(pricing.default_half_day_rate, Decimal::new(2500, 2));
        assert_eq!(pricing.rates.len(), 10);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = test_app().await;
        app.server.get("/internal/metrics").await.assert_status_not_found();

        let config = Config {
            enable_metrics: true,
            ..Config::default()
        };
        let app = test_app_with(config, Tier::TwelveDays).await;
        app.server
            .post(&format!("/api/v1/owners/{}/bookings", app.owner_id))
            .json(&json!({ "dates": ["2026-10-23"], "dog_ids": [app.approved.id] }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app.server.get("/internal/metrics").await;
        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("pawctl_bookings_confirmed_total{session_type=\"full_day\"} 1"));
        assert!(text.contains("pawctl_subscription_days_debited_total 1"));
    }

    #[tokio::test]
    async fn test_application_builds_from_in_memory_config() {
        let owner_id = Uuid::new_v4();
        let mut config = Config::default();
        config.storage = StorageConfig::InMemory {
            fixtures: serde_json::from_value(json!({
                "subscriptions": [{ "owner_id": owner_id, "tier": "8_days" }],
                "dogs": [{ "owner_id": owner_id, "name": "Biscuit" }],
            }))
            .unwrap(),
        };

        let app = Application::new(config).await.unwrap();
        let server = TestServer::new(app.router).unwrap();
        let subscription: SubscriptionResponse = server.get(&format!("/api/v1/owners/{owner_id}/subscription")).await.json();
        assert_eq!(subscription.days_remaining, 8);
    }
}
