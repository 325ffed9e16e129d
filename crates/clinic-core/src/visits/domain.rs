use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::commission::CommissionSplit;
use crate::directory::domain::{CustomerId, EmployeeId, ProjectId};

/// Identifier wrapper for visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitId(pub u64);

/// Identifier wrapper for itemized visit lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitItemId(pub u64);

/// One customer encounter. `total_amount` is derived storage: the sum of
/// the amounts of the visit's items, maintained by the store on every item
/// write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub ticket_no: String,
    pub customer: CustomerId,
    pub consultant: Option<EmployeeId>,
    pub visit_date: NaiveDateTime,
    pub total_amount: f64,
    pub remark: Option<String>,
}

/// Intake payload for creating or wholesale-replacing a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitDraft {
    #[serde(default)]
    pub ticket_no: String,
    pub customer: Option<CustomerId>,
    #[serde(default)]
    pub consultant: Option<EmployeeId>,
    pub visit_date: NaiveDateTime,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Validated visit payload handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub ticket_no: String,
    pub customer: CustomerId,
    pub consultant: Option<EmployeeId>,
    pub visit_date: NaiveDateTime,
    pub remark: Option<String>,
}

/// Staff attribution for one visit item. A fixed-shape set of slots rather
/// than a list: exactly one main doctor, up to two co-doctors each with a
/// ratio, up to two nurses. The ratio fields exist independently of the
/// corresponding id being set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub main_doctor: EmployeeId,
    #[serde(default)]
    pub co_doctor1: Option<EmployeeId>,
    #[serde(default)]
    pub co_ratio1: f64,
    #[serde(default)]
    pub co_doctor2: Option<EmployeeId>,
    #[serde(default)]
    pub co_ratio2: f64,
    #[serde(default)]
    pub nurse1: Option<EmployeeId>,
    #[serde(default)]
    pub nurse2: Option<EmployeeId>,
}

/// One billed treatment line with staff attribution and the commission
/// split computed at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitItem {
    pub id: VisitItemId,
    pub visit: VisitId,
    pub project: ProjectId,
    pub amount: f64,
    pub staff: StaffAssignment,
    pub split: CommissionSplit,
    pub remark: Option<String>,
}

/// Intake payload for creating or wholesale-replacing a visit item. Every
/// update replaces the full input set; the split is never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitItemDraft {
    pub visit: Option<VisitId>,
    pub project: Option<ProjectId>,
    #[serde(default)]
    pub amount: f64,
    pub main_doctor: Option<EmployeeId>,
    #[serde(default)]
    pub co_doctor1: Option<EmployeeId>,
    #[serde(default)]
    pub co_ratio1: f64,
    #[serde(default)]
    pub co_doctor2: Option<EmployeeId>,
    #[serde(default)]
    pub co_ratio2: f64,
    #[serde(default)]
    pub nurse1: Option<EmployeeId>,
    #[serde(default)]
    pub nurse2: Option<EmployeeId>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Validated item payload handed to the store, split already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitItemRecord {
    pub visit: VisitId,
    pub project: ProjectId,
    pub amount: f64,
    pub staff: StaffAssignment,
    pub split: CommissionSplit,
    pub remark: Option<String>,
}

/// A visit item joined with its parent visit's date, as returned by range
/// queries for the performance aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedVisitItem {
    pub item: VisitItem,
    pub visit_date: NaiveDateTime,
}

/// Sum of item amounts, the definition of a visit's `total_amount`.
pub fn visit_total(items: &[VisitItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}
