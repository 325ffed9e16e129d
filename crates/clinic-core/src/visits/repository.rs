use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::domain::{
    DatedVisitItem, Visit, VisitId, VisitItem, VisitItemId, VisitItemRecord, VisitRecord,
};
use crate::directory::domain::{CustomerId, EmployeeId};
use crate::store::{Page, PageRequest, StoreError};

/// Listing filter for visit queries. Date bounds apply to the visit date,
/// with `date_to` extended to the end of its day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitFilter {
    pub customer: Option<CustomerId>,
    pub consultant: Option<EmployeeId>,
    pub ticket_no: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Storage abstraction for visits and their itemized lines.
///
/// Item writes are transactional with the derived data they touch: insert,
/// update, and remove of an item recompute the owning visit's
/// `total_amount` as the sum of its remaining items within the same atomic
/// operation, so a failure leaves both the item set and the total
/// untouched. `update_visit` re-derives the total as well, and
/// `remove_visit` cascades to the visit's items.
pub trait VisitStore: Send + Sync {
    fn insert_visit(&self, record: VisitRecord) -> Result<Visit, StoreError>;
    fn update_visit(&self, id: VisitId, record: VisitRecord) -> Result<Visit, StoreError>;
    fn fetch_visit(&self, id: VisitId) -> Result<Option<Visit>, StoreError>;
    fn list_visits(&self, filter: &VisitFilter, page: PageRequest)
        -> Result<Page<Visit>, StoreError>;
    fn remove_visit(&self, id: VisitId) -> Result<(), StoreError>;
    fn visit_items(&self, id: VisitId) -> Result<Vec<VisitItem>, StoreError>;

    fn insert_item(&self, record: VisitItemRecord) -> Result<VisitItem, StoreError>;
    fn update_item(&self, id: VisitItemId, record: VisitItemRecord)
        -> Result<VisitItem, StoreError>;
    fn fetch_item(&self, id: VisitItemId) -> Result<Option<VisitItem>, StoreError>;
    fn list_items(
        &self,
        visit: Option<VisitId>,
        page: PageRequest,
    ) -> Result<Page<VisitItem>, StoreError>;
    fn remove_item(&self, id: VisitItemId) -> Result<(), StoreError>;

    /// Items whose parent visit's date falls within `[start, end]`, joined
    /// with that date. Feeds the performance aggregator.
    fn items_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DatedVisitItem>, StoreError>;
}
