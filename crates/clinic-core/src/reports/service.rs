use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::domain::{aggregate_rows, billed_total, PerformanceReport, ReportWindow};
use crate::directory::repository::EmployeeStore;
use crate::store::StoreError;
use crate::visits::repository::VisitStore;

/// Service producing the aggregate performance report.
pub struct ReportService<E, V> {
    employees: Arc<E>,
    visits: Arc<V>,
}

impl<E, V> ReportService<E, V>
where
    E: EmployeeStore + 'static,
    V: VisitStore + 'static,
{
    pub fn new(employees: Arc<E>, visits: Arc<V>) -> Self {
        Self { employees, visits }
    }

    /// Performance report over `[date_from, date_to]`, both bounds
    /// defaulting to the trailing month ending today. Store failures abort
    /// the whole report; a partial report is never returned.
    pub fn performance(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<PerformanceReport, ReportServiceError> {
        let window = ReportWindow::resolve(date_from, date_to, Local::now().date_naive());
        self.performance_for_window(window)
    }

    pub fn performance_for_window(
        &self,
        window: ReportWindow,
    ) -> Result<PerformanceReport, ReportServiceError> {
        let employees = self.employees.active()?;
        let items = self.visits.items_between(window.start(), window.end())?;

        Ok(PerformanceReport {
            date_from: window.date_from,
            date_to: window.date_to,
            total_amount: billed_total(&items),
            rows: aggregate_rows(&employees, &items),
        })
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
