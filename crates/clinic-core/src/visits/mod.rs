//! Visits, itemized treatment lines, and the commission write path.

pub mod commission;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use commission::{allocate, CommissionSplit, NURSE_BONUS_RATE};
pub use domain::{
    visit_total, DatedVisitItem, StaffAssignment, Visit, VisitDraft, VisitId, VisitItem,
    VisitItemDraft, VisitItemId, VisitItemRecord, VisitRecord,
};
pub use repository::{VisitFilter, VisitStore};
pub use router::{visit_router, VisitDetailView};
pub use service::{VisitService, VisitServiceError, VisitValidationError};
