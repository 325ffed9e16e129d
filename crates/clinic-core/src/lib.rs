//! Domain core for the clinic performance back end.
//!
//! The crate is organized around the clinic's aggregates: the staff and
//! customer directory, treatment visits with their itemized lines and
//! commission splits, nurse revisit logs, and the aggregate performance
//! report. Storage is abstracted behind per-aggregate traits so services can
//! be exercised against in-memory fakes; the `services/api` crate supplies
//! the production implementations and mounts the routers defined here.

pub mod config;
pub mod directory;
pub mod error;
pub mod reports;
pub mod revisits;
pub mod store;
pub mod telemetry;
pub mod visits;
