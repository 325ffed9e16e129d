use serde::Deserialize;

use super::domain::{
    Customer, CustomerDraft, CustomerId, Employee, EmployeeDraft, EmployeeId, EmployeeRole,
    Project, ProjectDraft, ProjectId,
};
use crate::store::{Page, PageRequest, StoreError};

/// Listing filter for staff queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub department: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub customer_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

/// Storage abstraction for staff records. `active` feeds the performance
/// aggregator and must return every employee whose `is_active` flag is set.
pub trait EmployeeStore: Send + Sync {
    fn insert(&self, draft: EmployeeDraft) -> Result<Employee, StoreError>;
    fn update(&self, id: EmployeeId, draft: EmployeeDraft) -> Result<Employee, StoreError>;
    fn fetch(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError>;
    fn list(&self, filter: &EmployeeFilter, page: PageRequest)
        -> Result<Page<Employee>, StoreError>;
    fn active(&self) -> Result<Vec<Employee>, StoreError>;
    fn remove(&self, id: EmployeeId) -> Result<(), StoreError>;
}

/// Storage abstraction for customer records. Duplicate phone numbers
/// surface as `StoreError::Conflict`.
pub trait CustomerStore: Send + Sync {
    fn insert(&self, draft: CustomerDraft) -> Result<Customer, StoreError>;
    fn update(&self, id: CustomerId, draft: CustomerDraft) -> Result<Customer, StoreError>;
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    fn list(&self, filter: &CustomerFilter, page: PageRequest)
        -> Result<Page<Customer>, StoreError>;
    fn remove(&self, id: CustomerId) -> Result<(), StoreError>;
}

/// Storage abstraction for the treatment catalog. Duplicate names surface
/// as `StoreError::Conflict`.
pub trait ProjectStore: Send + Sync {
    fn insert(&self, draft: ProjectDraft) -> Result<Project, StoreError>;
    fn update(&self, id: ProjectId, draft: ProjectDraft) -> Result<Project, StoreError>;
    fn fetch(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;
    fn list(&self, filter: &ProjectFilter, page: PageRequest) -> Result<Page<Project>, StoreError>;
    fn remove(&self, id: ProjectId) -> Result<(), StoreError>;
}
