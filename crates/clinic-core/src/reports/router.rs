use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::service::{ReportService, ReportServiceError};
use crate::directory::repository::EmployeeStore;
use crate::visits::repository::VisitStore;

/// Router builder exposing the performance report endpoint.
pub fn report_router<E, V>(service: Arc<ReportService<E, V>>) -> Router
where
    E: EmployeeStore + 'static,
    V: VisitStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports/performance",
            get(performance_handler::<E, V>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PerformanceQuery {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

pub(crate) async fn performance_handler<E, V>(
    State(service): State<Arc<ReportService<E, V>>>,
    Query(query): Query<PerformanceQuery>,
) -> Response
where
    E: EmployeeStore + 'static,
    V: VisitStore + 'static,
{
    match service.performance(query.date_from, query.date_to) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err @ ReportServiceError::Store(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
