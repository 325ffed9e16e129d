//! Nurse revisit logs: daily reception, contact, and follow-up counters.

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

use crate::directory::domain::EmployeeId;
use crate::store::{Page, PageRequest, StoreError};

/// Identifier wrapper for revisit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RevisitRecordId(pub u64);

/// One nurse's follow-up counters for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisitRecord {
    pub id: RevisitRecordId,
    pub nurse: EmployeeId,
    pub date: NaiveDate,
    pub reception_count: u32,
    pub contacts_added: u32,
    pub revisit_count: u32,
    pub remark: Option<String>,
}

/// Intake payload for creating or wholesale-replacing a revisit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisitDraft {
    pub nurse: Option<EmployeeId>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub reception_count: u32,
    #[serde(default)]
    pub contacts_added: u32,
    #[serde(default)]
    pub revisit_count: u32,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Validated payload handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisitRecordDraft {
    pub nurse: EmployeeId,
    pub date: NaiveDate,
    pub reception_count: u32,
    pub contacts_added: u32,
    pub revisit_count: u32,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisitFilter {
    pub nurse: Option<EmployeeId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Storage abstraction for revisit records.
pub trait RevisitStore: Send + Sync {
    fn insert(&self, draft: RevisitRecordDraft) -> Result<RevisitRecord, StoreError>;
    fn update(
        &self,
        id: RevisitRecordId,
        draft: RevisitRecordDraft,
    ) -> Result<RevisitRecord, StoreError>;
    fn fetch(&self, id: RevisitRecordId) -> Result<Option<RevisitRecord>, StoreError>;
    fn list(
        &self,
        filter: &RevisitFilter,
        page: PageRequest,
    ) -> Result<Page<RevisitRecord>, StoreError>;
    fn remove(&self, id: RevisitRecordId) -> Result<(), StoreError>;
}

/// Service owning revisit-record maintenance.
pub struct RevisitService<S> {
    store: Arc<S>,
}

impl<S> RevisitService<S>
where
    S: RevisitStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(&self, draft: RevisitDraft) -> Result<RevisitRecord, RevisitServiceError> {
        Ok(self.store.insert(validate(draft)?)?)
    }

    pub fn update(
        &self,
        id: RevisitRecordId,
        draft: RevisitDraft,
    ) -> Result<RevisitRecord, RevisitServiceError> {
        Ok(self.store.update(id, validate(draft)?)?)
    }

    pub fn record(&self, id: RevisitRecordId) -> Result<RevisitRecord, RevisitServiceError> {
        self.store
            .fetch(id)?
            .ok_or(RevisitServiceError::Store(StoreError::NotFound))
    }

    pub fn list(
        &self,
        filter: &RevisitFilter,
        page: PageRequest,
    ) -> Result<Page<RevisitRecord>, RevisitServiceError> {
        Ok(self.store.list(filter, page)?)
    }

    pub fn remove(&self, id: RevisitRecordId) -> Result<(), RevisitServiceError> {
        Ok(self.store.remove(id)?)
    }
}

fn validate(draft: RevisitDraft) -> Result<RevisitRecordDraft, RevisitServiceError> {
    let nurse = draft.nurse.ok_or(RevisitServiceError::MissingNurse)?;
    let date = draft.date.ok_or(RevisitServiceError::MissingDate)?;
    Ok(RevisitRecordDraft {
        nurse,
        date,
        reception_count: draft.reception_count,
        contacts_added: draft.contacts_added,
        revisit_count: draft.revisit_count,
        remark: draft.remark,
    })
}

/// Error raised by the revisit service.
#[derive(Debug, thiserror::Error)]
pub enum RevisitServiceError {
    #[error("nurse is required")]
    MissingNurse,
    #[error("date is required")]
    MissingDate,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Router builder exposing revisit-record endpoints.
pub fn revisit_router<S>(service: Arc<RevisitService<S>>) -> Router
where
    S: RevisitStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/revisit-records",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/revisit-records/:id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
struct RevisitListQuery {
    nurse: Option<u64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    page: Option<u32>,
    page_size: Option<u32>,
}

fn error_response(err: RevisitServiceError) -> Response {
    let status = match &err {
        RevisitServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        RevisitServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        RevisitServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

async fn list_handler<S>(
    State(service): State<Arc<RevisitService<S>>>,
    Query(query): Query<RevisitListQuery>,
) -> Response
where
    S: RevisitStore + 'static,
{
    let filter = RevisitFilter {
        nurse: query.nurse.map(EmployeeId),
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(0));
    match service.list(&filter, page) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_handler<S>(
    State(service): State<Arc<RevisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: RevisitStore + 'static,
{
    match service.record(RevisitRecordId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_handler<S>(
    State(service): State<Arc<RevisitService<S>>>,
    axum::Json(draft): axum::Json<RevisitDraft>,
) -> Response
where
    S: RevisitStore + 'static,
{
    match service.create(draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_handler<S>(
    State(service): State<Arc<RevisitService<S>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<RevisitDraft>,
) -> Response
where
    S: RevisitStore + 'static,
{
    match service.update(RevisitRecordId(id), draft) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_handler<S>(
    State(service): State<Arc<RevisitService<S>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: RevisitStore + 'static,
{
    match service.remove(RevisitRecordId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
