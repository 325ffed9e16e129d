//! Staff, customer, and treatment-catalog directory.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{
    Customer, CustomerDraft, CustomerId, Employee, EmployeeDraft, EmployeeId, EmployeeRole,
    Project, ProjectDraft, ProjectId,
};
pub use repository::{
    CustomerFilter, CustomerStore, EmployeeFilter, EmployeeStore, ProjectFilter, ProjectStore,
};
pub use router::directory_router;
pub use service::{DirectoryService, DirectoryServiceError};
