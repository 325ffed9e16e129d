//! Read-side performance aggregation.
//!
//! The aggregator re-derives every figure from item amounts and role
//! assignments; it never reads the splits stored at write time. The two
//! paths agree for co-doctor and nurse figures but intentionally diverge
//! for the main doctor: the stored split credits the residual after the
//! co-ratio clamp, while the report credits the full item amount. That
//! divergence is long-standing payout policy and both sides of it are
//! covered by tests; reconciling them needs product sign-off, not a code
//! change.

use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::directory::domain::{Employee, EmployeeId, EmployeeRole};
use crate::visits::commission::NURSE_BONUS_RATE;
use crate::visits::domain::DatedVisitItem;

/// Resolved reporting window. The end date is inclusive through 23:59:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl ReportWindow {
    /// Resolve optional bounds against the caller's notion of today:
    /// missing bounds default to the trailing month.
    pub fn resolve(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>, today: NaiveDate) -> Self {
        let date_from = date_from.unwrap_or_else(|| {
            today.checked_sub_months(Months::new(1)).unwrap_or(today)
        });
        let date_to = date_to.unwrap_or(today);
        Self { date_from, date_to }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date_from
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always representable")
    }

    pub fn end(&self) -> NaiveDateTime {
        self.date_to
            .and_hms_opt(23, 59, 59)
            .expect("end of day is always representable")
    }
}

/// One employee's aggregated figures over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub employee_role: EmployeeRole,
    pub main_performance: f64,
    pub co_performance: f64,
    pub nurse_performance: f64,
    pub total_performance: f64,
}

/// The full report: resolved window, ranked rows, and the attribution-free
/// billed total.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_amount: f64,
    pub rows: Vec<PerformanceRow>,
}

/// Aggregate in-range items into ranked per-employee rows.
///
/// `employees` is expected to be pre-filtered to active staff. Within one
/// item an employee is credited for the first co-doctor slot naming them
/// and at most one nurse bonus, matching the precedence the report has
/// always used. Employees with no positive component are dropped; rows
/// sort descending by total with ties left in directory order.
pub fn aggregate_rows(employees: &[Employee], items: &[DatedVisitItem]) -> Vec<PerformanceRow> {
    let mut rows: Vec<PerformanceRow> = employees
        .iter()
        .map(|employee| row_for(employee, items))
        .filter(|row| {
            row.main_performance > 0.0 || row.co_performance > 0.0 || row.nurse_performance > 0.0
        })
        .collect();

    rows.sort_by(|a, b| b.total_performance.total_cmp(&a.total_performance));
    rows
}

fn row_for(employee: &Employee, items: &[DatedVisitItem]) -> PerformanceRow {
    let id = employee.id;
    let mut main = 0.0;
    let mut co = 0.0;
    let mut nurse = 0.0;

    for dated in items {
        let item = &dated.item;
        if item.staff.main_doctor == id {
            // Full amount by design, not the clamped residual stored on
            // the item (see module docs).
            main += item.amount;
        }
        if item.staff.co_doctor1 == Some(id) {
            co += item.amount * item.staff.co_ratio1;
        } else if item.staff.co_doctor2 == Some(id) {
            co += item.amount * item.staff.co_ratio2;
        }
        if item.staff.nurse1 == Some(id) || item.staff.nurse2 == Some(id) {
            nurse += item.amount * NURSE_BONUS_RATE;
        }
    }

    PerformanceRow {
        employee_id: id,
        employee_name: employee.name.clone(),
        employee_role: employee.role,
        main_performance: main,
        co_performance: co,
        nurse_performance: nurse,
        total_performance: main + co + nurse,
    }
}

/// Billed total over the window: each item counted exactly once, no matter
/// how many staff touched it.
pub fn billed_total(items: &[DatedVisitItem]) -> f64 {
    items.iter().map(|dated| dated.item.amount).sum()
}
