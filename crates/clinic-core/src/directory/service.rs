use std::sync::Arc;

use super::domain::{
    Customer, CustomerDraft, CustomerId, Employee, EmployeeDraft, EmployeeId, Project,
    ProjectDraft, ProjectId,
};
use super::repository::{
    CustomerFilter, CustomerStore, EmployeeFilter, EmployeeStore, ProjectFilter, ProjectStore,
};
use crate::store::{Page, PageRequest, StoreError};

/// Service exposing staff, customer, and treatment-catalog maintenance.
pub struct DirectoryService<E, C, P> {
    employees: Arc<E>,
    customers: Arc<C>,
    projects: Arc<P>,
}

impl<E, C, P> DirectoryService<E, C, P>
where
    E: EmployeeStore + 'static,
    C: CustomerStore + 'static,
    P: ProjectStore + 'static,
{
    pub fn new(employees: Arc<E>, customers: Arc<C>, projects: Arc<P>) -> Self {
        Self {
            employees,
            customers,
            projects,
        }
    }

    pub fn create_employee(&self, draft: EmployeeDraft) -> Result<Employee, DirectoryServiceError> {
        if draft.name.trim().is_empty() {
            return Err(DirectoryServiceError::MissingEmployeeName);
        }
        Ok(self.employees.insert(draft)?)
    }

    pub fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<Employee, DirectoryServiceError> {
        if draft.name.trim().is_empty() {
            return Err(DirectoryServiceError::MissingEmployeeName);
        }
        Ok(self.employees.update(id, draft)?)
    }

    pub fn employee(&self, id: EmployeeId) -> Result<Employee, DirectoryServiceError> {
        self.employees
            .fetch(id)?
            .ok_or(DirectoryServiceError::Store(StoreError::NotFound))
    }

    pub fn list_employees(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, DirectoryServiceError> {
        Ok(self.employees.list(filter, page)?)
    }

    pub fn remove_employee(&self, id: EmployeeId) -> Result<(), DirectoryServiceError> {
        Ok(self.employees.remove(id)?)
    }

    pub fn create_customer(&self, draft: CustomerDraft) -> Result<Customer, DirectoryServiceError> {
        validate_customer(&draft)?;
        Ok(self.customers.insert(draft)?)
    }

    pub fn update_customer(
        &self,
        id: CustomerId,
        draft: CustomerDraft,
    ) -> Result<Customer, DirectoryServiceError> {
        validate_customer(&draft)?;
        Ok(self.customers.update(id, draft)?)
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer, DirectoryServiceError> {
        self.customers
            .fetch(id)?
            .ok_or(DirectoryServiceError::Store(StoreError::NotFound))
    }

    pub fn list_customers(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, DirectoryServiceError> {
        Ok(self.customers.list(filter, page)?)
    }

    pub fn remove_customer(&self, id: CustomerId) -> Result<(), DirectoryServiceError> {
        Ok(self.customers.remove(id)?)
    }

    pub fn create_project(&self, draft: ProjectDraft) -> Result<Project, DirectoryServiceError> {
        if draft.name.trim().is_empty() {
            return Err(DirectoryServiceError::MissingProjectName);
        }
        Ok(self.projects.insert(draft)?)
    }

    pub fn update_project(
        &self,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> Result<Project, DirectoryServiceError> {
        if draft.name.trim().is_empty() {
            return Err(DirectoryServiceError::MissingProjectName);
        }
        Ok(self.projects.update(id, draft)?)
    }

    pub fn project(&self, id: ProjectId) -> Result<Project, DirectoryServiceError> {
        self.projects
            .fetch(id)?
            .ok_or(DirectoryServiceError::Store(StoreError::NotFound))
    }

    pub fn list_projects(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Page<Project>, DirectoryServiceError> {
        Ok(self.projects.list(filter, page)?)
    }

    pub fn remove_project(&self, id: ProjectId) -> Result<(), DirectoryServiceError> {
        Ok(self.projects.remove(id)?)
    }
}

fn validate_customer(draft: &CustomerDraft) -> Result<(), DirectoryServiceError> {
    if draft.name.trim().is_empty() {
        return Err(DirectoryServiceError::MissingCustomerName);
    }
    if draft.phone.trim().is_empty() {
        return Err(DirectoryServiceError::MissingCustomerPhone);
    }
    Ok(())
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error("employee name is required")]
    MissingEmployeeName,
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("customer phone is required")]
    MissingCustomerPhone,
    #[error("project name is required")]
    MissingProjectName,
    #[error(transparent)]
    Store(#[from] StoreError),
}
