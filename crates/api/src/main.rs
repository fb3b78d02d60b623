use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finedge_core::alerts::summary::{badge_count, filter_alerts, AlertSummary, UrgencyFilter};
use finedge_core::config::Settings;
use finedge_core::dataset::DashboardDataset;
use finedge_core::domain::alert::Alert;
use finedge_core::domain::snapshot::FinancialSnapshot;
use finedge_core::health::HealthReport;
use finedge_core::tax::{Deadline, DeadlineUrgency};
use finedge_core::AlertEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let engine = settings.build_engine()?;

    let dataset = match settings.load_dashboard() {
        Ok(dataset) => Some(Arc::new(dataset)),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "dashboard dataset unavailable; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        engine: Arc::new(engine),
        dataset,
        settings: Arc::new(settings),
    };

    let port = state.settings.port_or_default();
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/alerts", post(post_alerts))
        .route("/tax/next-deadline", get(get_next_tax_deadline))
        .route("/dashboard/months", get(list_months))
        .route("/dashboard/:month/alerts", get(get_month_alerts))
        .route("/dashboard/:month/health", get(get_month_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    engine: Arc<AlertEngine>,
    dataset: Option<Arc<DashboardDataset>>,
    settings: Arc<Settings>,
}

#[derive(Debug, Default, Deserialize)]
struct AlertsQuery {
    #[serde(default)]
    urgency: UrgencyFilter,
}

#[derive(Debug, Serialize)]
struct AlertsResponse {
    filter: UrgencyFilter,
    alerts: Vec<Alert>,
    // Summary and badge cover the unfiltered list.
    summary: AlertSummary,
    badge_count: usize,
}

async fn post_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
    Json(snapshot): Json<FinancialSnapshot>,
) -> Result<Json<AlertsResponse>, StatusCode> {
    evaluate(&state, &snapshot, query.urgency).map(Json)
}

#[derive(Debug, Serialize)]
struct NextDeadlineResponse {
    reference_date: String,
    deadline: Deadline,
    urgency_level: DeadlineUrgency,
    description: String,
}

async fn get_next_tax_deadline(
    State(state): State<AppState>,
) -> Result<Json<NextDeadlineResponse>, StatusCode> {
    let ctx = state.settings.evaluation_context().map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let deadline = state
        .engine
        .tax_schedule()
        .next_deadline(ctx.reference_date)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(NextDeadlineResponse {
        reference_date: ctx.reference_date.to_string(),
        urgency_level: deadline.urgency_level(),
        description: deadline.describe(),
        deadline,
    }))
}

async fn list_months(State(state): State<AppState>) -> Result<Json<Vec<String>>, StatusCode> {
    let Some(dataset) = &state.dataset else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    Ok(Json(dataset.months().map(str::to_string).collect()))
}

async fn get_month_alerts(
    State(state): State<AppState>,
    Path(month): Path<String>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsResponse>, StatusCode> {
    let Some(dataset) = &state.dataset else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let record = dataset.get(&month).ok_or(StatusCode::NOT_FOUND)?;
    evaluate(&state, &record.to_snapshot(), query.urgency).map(Json)
}

async fn get_month_health(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<HealthReport>, StatusCode> {
    let Some(dataset) = &state.dataset else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let record = dataset.get(&month).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(HealthReport::for_month(record, dataset.previous(&month))))
}

fn evaluate(
    state: &AppState,
    snapshot: &FinancialSnapshot,
    filter: UrgencyFilter,
) -> Result<AlertsResponse, StatusCode> {
    let ctx = state.settings.evaluation_context().map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %format!("{e:#}"), "failed to resolve reference date");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let all = state.engine.evaluate(snapshot, &ctx);
    let summary = AlertSummary::from_alerts(&all);
    tracing::info!(
        reference_date = %ctx.reference_date,
        total = summary.total,
        critical = summary.critical,
        "alerts evaluated"
    );

    Ok(AlertsResponse {
        filter,
        alerts: filter_alerts(&all, filter),
        summary,
        badge_count: badge_count(&all),
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
