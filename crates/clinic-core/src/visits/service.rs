use std::sync::Arc;

use tracing::debug;

use super::commission::allocate;
use super::domain::{
    StaffAssignment, Visit, VisitDraft, VisitId, VisitItem, VisitItemDraft, VisitItemId,
    VisitItemRecord, VisitRecord,
};
use super::repository::{VisitFilter, VisitStore};
use crate::store::{Page, PageRequest, StoreError};

/// Service owning the visit write path: visit CRUD, item CRUD with
/// commission allocation, and the derived visit totals maintained through
/// the store's transactional contract.
pub struct VisitService<S> {
    store: Arc<S>,
}

impl<S> VisitService<S>
where
    S: VisitStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_visit(&self, draft: VisitDraft) -> Result<Visit, VisitServiceError> {
        let record = validate_visit(draft)?;
        Ok(self.store.insert_visit(record)?)
    }

    pub fn update_visit(
        &self,
        id: VisitId,
        draft: VisitDraft,
    ) -> Result<Visit, VisitServiceError> {
        let record = validate_visit(draft)?;
        Ok(self.store.update_visit(id, record)?)
    }

    pub fn visit(&self, id: VisitId) -> Result<Visit, VisitServiceError> {
        self.store
            .fetch_visit(id)?
            .ok_or(VisitServiceError::Store(StoreError::NotFound))
    }

    pub fn visit_items(&self, id: VisitId) -> Result<Vec<VisitItem>, VisitServiceError> {
        Ok(self.store.visit_items(id)?)
    }

    pub fn list_visits(
        &self,
        filter: &VisitFilter,
        page: PageRequest,
    ) -> Result<Page<Visit>, VisitServiceError> {
        Ok(self.store.list_visits(filter, page)?)
    }

    pub fn remove_visit(&self, id: VisitId) -> Result<(), VisitServiceError> {
        Ok(self.store.remove_visit(id)?)
    }

    /// Create a visit item: validate, allocate the commission split, then
    /// persist item and parent total in one store transaction.
    pub fn create_item(&self, draft: VisitItemDraft) -> Result<VisitItem, VisitServiceError> {
        let record = validate_item(draft)?;
        debug!(
            visit = record.visit.0,
            amount = record.amount,
            main_share = record.split.main_doctor,
            "allocated commission split"
        );
        Ok(self.store.insert_item(record)?)
    }

    /// Replace a visit item wholesale. The split is recomputed from the new
    /// inputs; nothing of the previous allocation survives.
    pub fn update_item(
        &self,
        id: VisitItemId,
        draft: VisitItemDraft,
    ) -> Result<VisitItem, VisitServiceError> {
        let record = validate_item(draft)?;
        debug!(
            item = id.0,
            amount = record.amount,
            main_share = record.split.main_doctor,
            "reallocated commission split"
        );
        Ok(self.store.update_item(id, record)?)
    }

    pub fn item(&self, id: VisitItemId) -> Result<VisitItem, VisitServiceError> {
        self.store
            .fetch_item(id)?
            .ok_or(VisitServiceError::Store(StoreError::NotFound))
    }

    pub fn list_items(
        &self,
        visit: Option<VisitId>,
        page: PageRequest,
    ) -> Result<Page<VisitItem>, VisitServiceError> {
        Ok(self.store.list_items(visit, page)?)
    }

    pub fn remove_item(&self, id: VisitItemId) -> Result<(), VisitServiceError> {
        Ok(self.store.remove_item(id)?)
    }
}

fn validate_visit(draft: VisitDraft) -> Result<VisitRecord, VisitValidationError> {
    if draft.ticket_no.trim().is_empty() {
        return Err(VisitValidationError::MissingTicketNumber);
    }
    let customer = draft.customer.ok_or(VisitValidationError::MissingCustomer)?;

    Ok(VisitRecord {
        ticket_no: draft.ticket_no,
        customer,
        consultant: draft.consultant,
        visit_date: draft.visit_date,
        remark: draft.remark,
    })
}

fn validate_item(draft: VisitItemDraft) -> Result<VisitItemRecord, VisitValidationError> {
    let visit = draft.visit.ok_or(VisitValidationError::MissingVisit)?;
    let project = draft.project.ok_or(VisitValidationError::MissingProject)?;
    let main_doctor = draft
        .main_doctor
        .ok_or(VisitValidationError::MissingMainDoctor)?;
    if draft.amount <= 0.0 {
        return Err(VisitValidationError::NonPositiveAmount);
    }

    let staff = StaffAssignment {
        main_doctor,
        co_doctor1: draft.co_doctor1,
        co_ratio1: draft.co_ratio1,
        co_doctor2: draft.co_doctor2,
        co_ratio2: draft.co_ratio2,
        nurse1: draft.nurse1,
        nurse2: draft.nurse2,
    };
    let split = allocate(draft.amount, &staff);

    Ok(VisitItemRecord {
        visit,
        project,
        amount: draft.amount,
        staff,
        split,
        remark: draft.remark,
    })
}

/// Rejections raised before any allocation or store call happens.
#[derive(Debug, thiserror::Error)]
pub enum VisitValidationError {
    #[error("ticket number is required")]
    MissingTicketNumber,
    #[error("customer is required")]
    MissingCustomer,
    #[error("visit is required")]
    MissingVisit,
    #[error("project is required")]
    MissingProject,
    #[error("main doctor is required")]
    MissingMainDoctor,
    #[error("amount must be positive")]
    NonPositiveAmount,
}

/// Error raised by the visit service.
#[derive(Debug, thiserror::Error)]
pub enum VisitServiceError {
    #[error(transparent)]
    Validation(#[from] VisitValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
