use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CustomerDraft, CustomerId, EmployeeDraft, EmployeeId, EmployeeRole, ProjectDraft, ProjectId,
};
use super::repository::{
    CustomerFilter, CustomerStore, EmployeeFilter, EmployeeStore, ProjectFilter, ProjectStore,
};
use super::service::{DirectoryService, DirectoryServiceError};
use crate::store::{PageRequest, StoreError};

/// Router builder exposing directory maintenance endpoints.
pub fn directory_router<E, C, P>(service: Arc<DirectoryService<E, C, P>>) -> Router
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            get(list_employees::<E, C, P>).post(create_employee::<E, C, P>),
        )
        .route(
            "/api/v1/employees/:id",
            get(get_employee::<E, C, P>)
                .put(update_employee::<E, C, P>)
                .delete(delete_employee::<E, C, P>),
        )
        .route(
            "/api/v1/customers",
            get(list_customers::<E, C, P>).post(create_customer::<E, C, P>),
        )
        .route(
            "/api/v1/customers/:id",
            get(get_customer::<E, C, P>)
                .put(update_customer::<E, C, P>)
                .delete(delete_customer::<E, C, P>),
        )
        .route(
            "/api/v1/projects",
            get(list_projects::<E, C, P>).post(create_project::<E, C, P>),
        )
        .route(
            "/api/v1/projects/:id",
            get(get_project::<E, C, P>)
                .put(update_project::<E, C, P>)
                .delete(delete_project::<E, C, P>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmployeeListQuery {
    name: Option<String>,
    role: Option<EmployeeRole>,
    department: Option<String>,
    #[serde(default)]
    active_only: bool,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CustomerListQuery {
    name: Option<String>,
    phone: Option<String>,
    customer_type: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProjectListQuery {
    name: Option<String>,
    category: Option<String>,
    #[serde(default)]
    active_only: bool,
    page: Option<u32>,
    page_size: Option<u32>,
}

fn page_request(page: Option<u32>, page_size: Option<u32>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), page_size.unwrap_or(0))
}

fn error_response(err: DirectoryServiceError) -> Response {
    let status = match &err {
        DirectoryServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        DirectoryServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        DirectoryServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

macro_rules! respond {
    ($result:expr, $status:expr) => {
        match $result {
            Ok(value) => ($status, axum::Json(value)).into_response(),
            Err(err) => error_response(err),
        }
    };
}

async fn list_employees<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Query(query): Query<EmployeeListQuery>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    let filter = EmployeeFilter {
        name: query.name,
        role: query.role,
        department: query.department,
        active_only: query.active_only,
    };
    let page = page_request(query.page, query.page_size);
    respond!(service.list_employees(&filter, page), StatusCode::OK)
}

async fn get_employee<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.employee(EmployeeId(id)), StatusCode::OK)
}

async fn create_employee<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    axum::Json(draft): axum::Json<EmployeeDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.create_employee(draft), StatusCode::CREATED)
}

async fn update_employee<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<EmployeeDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.update_employee(EmployeeId(id), draft), StatusCode::OK)
}

async fn delete_employee<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    match service.remove_employee(EmployeeId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_customers<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Query(query): Query<CustomerListQuery>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    let filter = CustomerFilter {
        name: query.name,
        phone: query.phone,
        customer_type: query.customer_type,
    };
    let page = page_request(query.page, query.page_size);
    respond!(service.list_customers(&filter, page), StatusCode::OK)
}

async fn get_customer<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.customer(CustomerId(id)), StatusCode::OK)
}

async fn create_customer<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    axum::Json(draft): axum::Json<CustomerDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.create_customer(draft), StatusCode::CREATED)
}

async fn update_customer<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<CustomerDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.update_customer(CustomerId(id), draft), StatusCode::OK)
}

async fn delete_customer<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    match service.remove_customer(CustomerId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_projects<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Query(query): Query<ProjectListQuery>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    let filter = ProjectFilter {
        name: query.name,
        category: query.category,
        active_only: query.active_only,
    };
    let page = page_request(query.page, query.page_size);
    respond!(service.list_projects(&filter, page), StatusCode::OK)
}

async fn get_project<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.project(ProjectId(id)), StatusCode::OK)
}

async fn create_project<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    axum::Json(draft): axum::Json<ProjectDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.create_project(draft), StatusCode::CREATED)
}

async fn update_project<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
    axum::Json(draft): axum::Json<ProjectDraft>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    respond!(service.update_project(ProjectId(id), draft), StatusCode::OK)
}

async fn delete_project<E, C, P>(
    State(service): State<Arc<DirectoryService<E, C, P>>>,
    Path(id): Path<u64>,
) -> Response
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    match service.remove_project(ProjectId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
