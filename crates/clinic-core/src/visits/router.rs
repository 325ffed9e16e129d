use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Visit, VisitDraft, VisitId, VisitItem, VisitItemDraft, VisitItemId};
use super::repository::{VisitFilter, VisitStore};
use super::service::{VisitService, VisitServiceError};
use crate::directory::domain::{CustomerId, EmployeeId};
use crate::store::{PageRequest, StoreError};

/// Router builder exposing visit and visit-item endpoints.
pub fn visit_router<S>(service: Arc<VisitService<S>>) -> Router
where
    S: VisitStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/visits",
            get(list_visits::<S>).post(create_visit::<S>),
        )
        .route(
            "/api/v1/visits/:id",
            get(get_visit::<S>)
                .put(update_visit::<S>)
                .delete(delete_visit::<S>),
        )
        .route(
            "/api/v1/visit-items",
            get(list_items::<S>).post(create_item::<S>),
        )
        .route(
            "/api/v1/visit-items/:id",
            get(get_item::<S>)
                .put(update_item::<S>)
                .delete(delete_item::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VisitListQuery {
    customer: Option<u64>,
    consultant: Option<u64>,
    ticket_no: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ItemListQuery {
    visit: Option<u64>,
    page: Option<u32>,
    page_size: Option<u32>,
}

/// A visit together with its itemized lines, as returned by the detail
/// endpoint.
#[derive(Debug, Serialize)]
pub struct VisitDetailView {
    #[serde(flatten)]
    pub visit: Visit,
    pub items: Vec<VisitItem>,
}

fn error_response(err: VisitServiceError) -> Response {
    let status = match &err {
        VisitServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VisitServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        VisitServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        VisitServiceError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

async fn list_visits<S>(
    State(service): State<Arc<VisitService<S>>>,
    Query(query): Query<VisitListQuery>,
) -> Response
where
    S: VisitStore + 'static,
{
    let filter = VisitFilter {
        customer: query.customer.map(CustomerId),
        consultant: query.consultant.map(EmployeeId),
        ticket_no: query.ticket_no,
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(0));
    match service.list_visits(&filter, page) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_visit<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: VisitStore + 'static,
{
    let id = VisitId(id);
    let visit = match service.visit(id) {
        Ok(visit) => visit,
        Err(err) => return error_response(err),
    };
    match service.visit_items(id) {
        Ok(items) => (
            StatusCode::OK,
            axum::Json(VisitDetailView { visit, items }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_visit<S>(
    State(service): State<Arc<VisitService<S>>>,
    axum::Json(draft): axum::Json<VisitDraft>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.create_visit(draft) {
        Ok(visit) => (StatusCode::CREATED, axum::Json(visit)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_visit<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<VisitDraft>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.update_visit(VisitId(id), draft) {
        Ok(visit) => (StatusCode::OK, axum::Json(visit)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_visit<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.remove_visit(VisitId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_items<S>(
    State(service): State<Arc<VisitService<S>>>,
    Query(query): Query<ItemListQuery>,
) -> Response
where
    S: VisitStore + 'static,
{
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(0));
    match service.list_items(query.visit.map(VisitId), page) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_item<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.item(VisitItemId(id)) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_item<S>(
    State(service): State<Arc<VisitService<S>>>,
    axum::Json(draft): axum::Json<VisitItemDraft>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.create_item(draft) {
        Ok(item) => (StatusCode::CREATED, axum::Json(item)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_item<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<VisitItemDraft>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.update_item(VisitItemId(id), draft) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_item<S>(
    State(service): State<Arc<VisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: VisitStore + 'static,
{
    match service.remove_item(VisitItemId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
