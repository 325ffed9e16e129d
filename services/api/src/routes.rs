use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use clinic_core::directory::{directory_router, DirectoryService};
use clinic_core::reports::{report_router, ReportService};
use clinic_core::revisits::{revisit_router, RevisitService};
use clinic_core::visits::{visit_router, VisitService};
use serde_json::json;

use crate::infra::{AppState, InMemoryDirectory, InMemoryRevisitLog, InMemoryVisitStore};

pub(crate) type Directory =
    DirectoryService<InMemoryDirectory, InMemoryDirectory, InMemoryDirectory>;
pub(crate) type Visits = VisitService<InMemoryVisitStore>;
pub(crate) type Reports = ReportService<InMemoryDirectory, InMemoryVisitStore>;
pub(crate) type Revisits = RevisitService<InMemoryRevisitLog>;

/// Every service of the clinic wired to the shared in-memory stores.
pub(crate) struct ClinicServices {
    pub(crate) directory: Arc<Directory>,
    pub(crate) visits: Arc<Visits>,
    pub(crate) reports: Arc<Reports>,
    pub(crate) revisits: Arc<Revisits>,
}

impl ClinicServices {
    pub(crate) fn in_memory() -> Self {
        let directory_store = Arc::new(InMemoryDirectory::default());
        let visit_store = Arc::new(InMemoryVisitStore::default());
        let revisit_store = Arc::new(InMemoryRevisitLog::default());

        Self {
            directory: Arc::new(DirectoryService::new(
                directory_store.clone(),
                directory_store.clone(),
                directory_store.clone(),
            )),
            visits: Arc::new(VisitService::new(visit_store.clone())),
            reports: Arc::new(ReportService::new(directory_store, visit_store)),
            revisits: Arc::new(RevisitService::new(revisit_store)),
        }
    }
}

pub(crate) fn app_router(services: &ClinicServices) -> Router {
    directory_router(services.directory.clone())
        .merge(visit_router(services.visits.clone()))
        .merge(report_router(services.reports.clone()))
        .merge(revisit_router(services.revisits.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
