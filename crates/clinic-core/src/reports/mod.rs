//! Aggregate performance reporting over a date window.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    aggregate_rows, billed_total, PerformanceReport, PerformanceRow, ReportWindow,
};
pub use router::report_router;
pub use service::{ReportService, ReportServiceError};
