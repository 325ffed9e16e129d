use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::directory::domain::{CustomerId, EmployeeId, ProjectId};
use crate::store::{Page, PageRequest, StoreError};
use crate::visits::domain::{
    visit_total, DatedVisitItem, Visit, VisitDraft, VisitId, VisitItem, VisitItemDraft,
    VisitItemId, VisitItemRecord, VisitRecord,
};
use crate::visits::repository::{VisitFilter, VisitStore};

pub(super) fn sample_date(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .expect("valid date")
        .and_hms_opt(10, 30, 0)
        .expect("valid time")
}

pub(super) fn visit_draft(ticket: &str, day: u32) -> VisitDraft {
    VisitDraft {
        ticket_no: ticket.to_string(),
        customer: Some(CustomerId(1)),
        consultant: None,
        visit_date: sample_date(day),
        remark: None,
    }
}

pub(super) fn item_draft(visit: VisitId, amount: f64) -> VisitItemDraft {
    VisitItemDraft {
        visit: Some(visit),
        project: Some(ProjectId(1)),
        amount,
        main_doctor: Some(EmployeeId(10)),
        co_doctor1: None,
        co_ratio1: 0.0,
        co_doctor2: None,
        co_ratio2: 0.0,
        nurse1: None,
        nurse2: None,
        remark: None,
    }
}

#[derive(Default)]
struct Inner {
    visits: BTreeMap<u64, Visit>,
    items: BTreeMap<u64, VisitItem>,
    next_visit: u64,
    next_item: u64,
}

impl Inner {
    fn recompute_total(&mut self, visit: VisitId) {
        let items: Vec<VisitItem> = self
            .items
            .values()
            .filter(|item| item.visit == visit)
            .cloned()
            .collect();
        if let Some(record) = self.visits.get_mut(&visit.0) {
            record.total_amount = visit_total(&items);
        }
    }
}

/// In-memory visit store keeping the whole aggregate under one mutex so
/// item writes and total recomputes are atomic by construction.
#[derive(Default)]
pub(super) struct MemoryVisitStore {
    inner: Mutex<Inner>,
}

impl VisitStore for MemoryVisitStore {
    fn insert_visit(&self, record: VisitRecord) -> Result<Visit, StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        if inner
            .visits
            .values()
            .any(|visit| visit.ticket_no == record.ticket_no)
        {
            return Err(StoreError::Conflict);
        }
        inner.next_visit += 1;
        let visit = Visit {
            id: VisitId(inner.next_visit),
            ticket_no: record.ticket_no,
            customer: record.customer,
            consultant: record.consultant,
            visit_date: record.visit_date,
            total_amount: 0.0,
            remark: record.remark,
        };
        inner.visits.insert(visit.id.0, visit.clone());
        Ok(visit)
    }

    fn update_visit(&self, id: VisitId, record: VisitRecord) -> Result<Visit, StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        if !inner.visits.contains_key(&id.0) {
            return Err(StoreError::NotFound);
        }
        if inner
            .visits
            .values()
            .any(|visit| visit.id != id && visit.ticket_no == record.ticket_no)
        {
            return Err(StoreError::Conflict);
        }
        let visit = inner.visits.get_mut(&id.0).expect("checked above");
        visit.ticket_no = record.ticket_no;
        visit.customer = record.customer;
        visit.consultant = record.consultant;
        visit.visit_date = record.visit_date;
        visit.remark = record.remark;
        inner.recompute_total(id);
        Ok(inner.visits.get(&id.0).expect("checked above").clone())
    }

    fn fetch_visit(&self, id: VisitId) -> Result<Option<Visit>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        Ok(inner.visits.get(&id.0).cloned())
    }

    fn list_visits(
        &self,
        filter: &VisitFilter,
        page: PageRequest,
    ) -> Result<Page<Visit>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        let mut visits: Vec<Visit> = inner
            .visits
            .values()
            .filter(|visit| {
                filter.customer.map_or(true, |c| visit.customer == c)
                    && filter.consultant.map_or(true, |c| visit.consultant == Some(c))
                    && filter
                        .ticket_no
                        .as_deref()
                        .map_or(true, |t| visit.ticket_no.contains(t))
                    && filter
                        .date_from
                        .map_or(true, |d| visit.visit_date.date() >= d)
                    && filter.date_to.map_or(true, |d| visit.visit_date.date() <= d)
            })
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        Ok(Page::from_filtered(visits, page))
    }

    fn remove_visit(&self, id: VisitId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        if inner.visits.remove(&id.0).is_none() {
            return Err(StoreError::NotFound);
        }
        inner.items.retain(|_, item| item.visit != id);
        Ok(())
    }

    fn visit_items(&self, id: VisitId) -> Result<Vec<VisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        Ok(inner
            .items
            .values()
            .filter(|item| item.visit == id)
            .cloned()
            .collect())
    }

    fn insert_item(&self, record: VisitItemRecord) -> Result<VisitItem, StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        if !inner.visits.contains_key(&record.visit.0) {
            return Err(StoreError::NotFound);
        }
        inner.next_item += 1;
        let item = VisitItem {
            id: VisitItemId(inner.next_item),
            visit: record.visit,
            project: record.project,
            amount: record.amount,
            staff: record.staff,
            split: record.split,
            remark: record.remark,
        };
        inner.items.insert(item.id.0, item.clone());
        inner.recompute_total(item.visit);
        Ok(item)
    }

    fn update_item(
        &self,
        id: VisitItemId,
        record: VisitItemRecord,
    ) -> Result<VisitItem, StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        let previous_visit = match inner.items.get(&id.0) {
            Some(item) => item.visit,
            None => return Err(StoreError::NotFound),
        };
        if !inner.visits.contains_key(&record.visit.0) {
            return Err(StoreError::NotFound);
        }
        let item = VisitItem {
            id,
            visit: record.visit,
            project: record.project,
            amount: record.amount,
            staff: record.staff,
            split: record.split,
            remark: record.remark,
        };
        inner.items.insert(id.0, item.clone());
        inner.recompute_total(previous_visit);
        inner.recompute_total(item.visit);
        Ok(item)
    }

    fn fetch_item(&self, id: VisitItemId) -> Result<Option<VisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        Ok(inner.items.get(&id.0).cloned())
    }

    fn list_items(
        &self,
        visit: Option<VisitId>,
        page: PageRequest,
    ) -> Result<Page<VisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        let mut items: Vec<VisitItem> = inner
            .items
            .values()
            .filter(|item| visit.map_or(true, |v| item.visit == v))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(Page::from_filtered(items, page))
    }

    fn remove_item(&self, id: VisitItemId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("visit store mutex poisoned");
        let item = inner.items.remove(&id.0).ok_or(StoreError::NotFound)?;
        inner.recompute_total(item.visit);
        Ok(())
    }

    fn items_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DatedVisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit store mutex poisoned");
        Ok(inner
            .items
            .values()
            .filter_map(|item| {
                let visit = inner.visits.get(&item.visit.0)?;
                if visit.visit_date >= start && visit.visit_date <= end {
                    Some(DatedVisitItem {
                        item: item.clone(),
                        visit_date: visit.visit_date,
                    })
                } else {
                    None
                }
            })
            .collect())
    }
}

/// Store that fails every call, for propagation tests.
pub(super) struct UnavailableVisitStore;

impl UnavailableVisitStore {
    fn unavailable<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl VisitStore for UnavailableVisitStore {
    fn insert_visit(&self, _record: VisitRecord) -> Result<Visit, StoreError> {
        Self::unavailable()
    }

    fn update_visit(&self, _id: VisitId, _record: VisitRecord) -> Result<Visit, StoreError> {
        Self::unavailable()
    }

    fn fetch_visit(&self, _id: VisitId) -> Result<Option<Visit>, StoreError> {
        Self::unavailable()
    }

    fn list_visits(
        &self,
        _filter: &VisitFilter,
        _page: PageRequest,
    ) -> Result<Page<Visit>, StoreError> {
        Self::unavailable()
    }

    fn remove_visit(&self, _id: VisitId) -> Result<(), StoreError> {
        Self::unavailable()
    }

    fn visit_items(&self, _id: VisitId) -> Result<Vec<VisitItem>, StoreError> {
        Self::unavailable()
    }

    fn insert_item(&self, _record: VisitItemRecord) -> Result<VisitItem, StoreError> {
        Self::unavailable()
    }

    fn update_item(
        &self,
        _id: VisitItemId,
        _record: VisitItemRecord,
    ) -> Result<VisitItem, StoreError> {
        Self::unavailable()
    }

    fn fetch_item(&self, _id: VisitItemId) -> Result<Option<VisitItem>, StoreError> {
        Self::unavailable()
    }

    fn list_items(
        &self,
        _visit: Option<VisitId>,
        _page: PageRequest,
    ) -> Result<Page<VisitItem>, StoreError> {
        Self::unavailable()
    }

    fn remove_item(&self, _id: VisitItemId) -> Result<(), StoreError> {
        Self::unavailable()
    }

    fn items_between(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> Result<Vec<DatedVisitItem>, StoreError> {
        Self::unavailable()
    }
}
