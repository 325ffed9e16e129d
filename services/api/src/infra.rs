use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use clinic_core::directory::{
    Customer, CustomerDraft, CustomerFilter, CustomerId, CustomerStore, Employee, EmployeeDraft,
    EmployeeFilter, EmployeeId, EmployeeStore, Project, ProjectDraft, ProjectFilter, ProjectId,
    ProjectStore,
};
use clinic_core::revisits::{
    RevisitFilter, RevisitRecord, RevisitRecordDraft, RevisitRecordId, RevisitStore,
};
use clinic_core::store::{Page, PageRequest, StoreError};
use clinic_core::visits::{
    visit_total, DatedVisitItem, Visit, VisitFilter, VisitId, VisitItem, VisitItemId,
    VisitItemRecord, VisitRecord, VisitStore,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Directory tables, one mutex per aggregate. `BTreeMap` keeps listing and
/// `active()` output in id order, which the report relies on for stable
/// tie-breaks.
#[derive(Default)]
pub(crate) struct InMemoryDirectory {
    employees: Mutex<Table<Employee>>,
    customers: Mutex<Table<Customer>>,
    projects: Mutex<Table<Project>>,
}

struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl EmployeeStore for InMemoryDirectory {
    fn insert(&self, draft: EmployeeDraft) -> Result<Employee, StoreError> {
        let mut table = self.employees.lock().expect("employee mutex poisoned");
        if let Some(job_number) = draft.job_number.as_deref() {
            if table
                .rows
                .values()
                .any(|e| e.job_number.as_deref() == Some(job_number))
            {
                return Err(StoreError::Conflict);
            }
        }
        let id = EmployeeId(table.next_id());
        let employee = Employee {
            id,
            name: draft.name,
            role: draft.role,
            department: draft.department,
            job_number: draft.job_number,
            phone: draft.phone,
            is_active: draft.is_active,
            remark: draft.remark,
        };
        table.rows.insert(id.0, employee.clone());
        Ok(employee)
    }

    fn update(&self, id: EmployeeId, draft: EmployeeDraft) -> Result<Employee, StoreError> {
        let mut table = self.employees.lock().expect("employee mutex poisoned");
        if !table.rows.contains_key(&id.0) {
            return Err(StoreError::NotFound);
        }
        if let Some(job_number) = draft.job_number.as_deref() {
            if table
                .rows
                .values()
                .any(|e| e.id != id && e.job_number.as_deref() == Some(job_number))
            {
                return Err(StoreError::Conflict);
            }
        }
        let employee = Employee {
            id,
            name: draft.name,
            role: draft.role,
            department: draft.department,
            job_number: draft.job_number,
            phone: draft.phone,
            is_active: draft.is_active,
            remark: draft.remark,
        };
        table.rows.insert(id.0, employee.clone());
        Ok(employee)
    }

    fn fetch(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError> {
        let table = self.employees.lock().expect("employee mutex poisoned");
        Ok(table.rows.get(&id.0).cloned())
    }

    fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, StoreError> {
        let table = self.employees.lock().expect("employee mutex poisoned");
        let matches: Vec<Employee> = table
            .rows
            .values()
            .filter(|e| {
                filter.name.as_deref().map_or(true, |n| e.name.contains(n))
                    && filter.role.map_or(true, |r| e.role == r)
                    && filter
                        .department
                        .as_deref()
                        .map_or(true, |d| e.department.as_deref() == Some(d))
                    && (!filter.active_only || e.is_active)
            })
            .cloned()
            .collect();
        Ok(Page::from_filtered(matches, page))
    }

    fn active(&self) -> Result<Vec<Employee>, StoreError> {
        let table = self.employees.lock().expect("employee mutex poisoned");
        Ok(table.rows.values().filter(|e| e.is_active).cloned().collect())
    }

    fn remove(&self, id: EmployeeId) -> Result<(), StoreError> {
        let mut table = self.employees.lock().expect("employee mutex poisoned");
        table.rows.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

impl CustomerStore for InMemoryDirectory {
    fn insert(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
        let mut table = self.customers.lock().expect("customer mutex poisoned");
        if table.rows.values().any(|c| c.phone == draft.phone) {
            return Err(StoreError::Conflict);
        }
        let id = CustomerId(table.next_id());
        let customer = Customer {
            id,
            name: draft.name,
            phone: draft.phone,
            customer_type: draft.customer_type,
            first_visit_date: draft.first_visit_date,
            remark: draft.remark,
        };
        table.rows.insert(id.0, customer.clone());
        Ok(customer)
    }

    fn update(&self, id: CustomerId, draft: CustomerDraft) -> Result<Customer, StoreError> {
        let mut table = self.customers.lock().expect("customer mutex poisoned");
        if !table.rows.contains_key(&id.0) {
            return Err(StoreError::NotFound);
        }
        if table
            .rows
            .values()
            .any(|c| c.id != id && c.phone == draft.phone)
        {
            return Err(StoreError::Conflict);
        }
        let customer = Customer {
            id,
            name: draft.name,
            phone: draft.phone,
            customer_type: draft.customer_type,
            first_visit_date: draft.first_visit_date,
            remark: draft.remark,
        };
        table.rows.insert(id.0, customer.clone());
        Ok(customer)
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let table = self.customers.lock().expect("customer mutex poisoned");
        Ok(table.rows.get(&id.0).cloned())
    }

    fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, StoreError> {
        let table = self.customers.lock().expect("customer mutex poisoned");
        let matches: Vec<Customer> = table
            .rows
            .values()
            .filter(|c| {
                filter.name.as_deref().map_or(true, |n| c.name.contains(n))
                    && filter.phone.as_deref().map_or(true, |p| c.phone.contains(p))
                    && filter
                        .customer_type
                        .as_deref()
                        .map_or(true, |t| c.customer_type.as_deref() == Some(t))
            })
            .cloned()
            .collect();
        Ok(Page::from_filtered(matches, page))
    }

    fn remove(&self, id: CustomerId) -> Result<(), StoreError> {
        let mut table = self.customers.lock().expect("customer mutex poisoned");
        table.rows.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

impl ProjectStore for InMemoryDirectory {
    fn insert(&self, draft: ProjectDraft) -> Result<Project, StoreError> {
        let mut table = self.projects.lock().expect("project mutex poisoned");
        if table.rows.values().any(|p| p.name == draft.name) {
            return Err(StoreError::Conflict);
        }
        let id = ProjectId(table.next_id());
        let project = Project {
            id,
            name: draft.name,
            category: draft.category,
            standard_price: draft.standard_price,
            is_active: draft.is_active,
            remark: draft.remark,
        };
        table.rows.insert(id.0, project.clone());
        Ok(project)
    }

    fn update(&self, id: ProjectId, draft: ProjectDraft) -> Result<Project, StoreError> {
        let mut table = self.projects.lock().expect("project mutex poisoned");
        if !table.rows.contains_key(&id.0) {
            return Err(StoreError::NotFound);
        }
        if table
            .rows
            .values()
            .any(|p| p.id != id && p.name == draft.name)
        {
            return Err(StoreError::Conflict);
        }
        let project = Project {
            id,
            name: draft.name,
            category: draft.category,
            standard_price: draft.standard_price,
            is_active: draft.is_active,
            remark: draft.remark,
        };
        table.rows.insert(id.0, project.clone());
        Ok(project)
    }

    fn fetch(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        let table = self.projects.lock().expect("project mutex poisoned");
        Ok(table.rows.get(&id.0).cloned())
    }

    fn list(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Page<Project>, StoreError> {
        let table = self.projects.lock().expect("project mutex poisoned");
        let matches: Vec<Project> = table
            .rows
            .values()
            .filter(|p| {
                filter.name.as_deref().map_or(true, |n| p.name.contains(n))
                    && filter
                        .category
                        .as_deref()
                        .map_or(true, |c| p.category.as_deref() == Some(c))
                    && (!filter.active_only || p.is_active)
            })
            .cloned()
            .collect();
        Ok(Page::from_filtered(matches, page))
    }

    fn remove(&self, id: ProjectId) -> Result<(), StoreError> {
        let mut table = self.projects.lock().expect("project mutex poisoned");
        table.rows.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// Visits and their items under a single mutex: the trait's contract that
/// an item write and the parent total recompute happen atomically falls
/// out of holding the lock across both.
#[derive(Default)]
pub(crate) struct InMemoryVisitStore {
    inner: Mutex<VisitTables>,
}

#[derive(Default)]
struct VisitTables {
    visits: BTreeMap<u64, Visit>,
    items: BTreeMap<u64, VisitItem>,
    next_visit_id: u64,
    next_item_id: u64,
}

impl VisitTables {
    fn recompute_total(&mut self, visit: VisitId) {
        let items: Vec<VisitItem> = self
            .items
            .values()
            .filter(|item| item.visit == visit)
            .cloned()
            .collect();
        if let Some(row) = self.visits.get_mut(&visit.0) {
            row.total_amount = visit_total(&items);
        }
    }
}

impl VisitStore for InMemoryVisitStore {
    fn insert_visit(&self, record: VisitRecord) -> Result<Visit, StoreError> {
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
        if inner
            .visits
            .values()
            .any(|visit| visit.ticket_no == record.ticket_no)
        {
            return Err(StoreError::Conflict);
        }
        inner.next_visit_id += 1;
        let visit = Visit {
            id: VisitId(inner.next_visit_id),
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
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
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
        {
            let visit = inner.visits.get_mut(&id.0).expect("checked above");
            visit.ticket_no = record.ticket_no;
            visit.customer = record.customer;
            visit.consultant = record.consultant;
            visit.visit_date = record.visit_date;
            visit.remark = record.remark;
        }
        inner.recompute_total(id);
        Ok(inner.visits.get(&id.0).expect("checked above").clone())
    }

    fn fetch_visit(&self, id: VisitId) -> Result<Option<Visit>, StoreError> {
        let inner = self.inner.lock().expect("visit mutex poisoned");
        Ok(inner.visits.get(&id.0).cloned())
    }

    fn list_visits(
        &self,
        filter: &VisitFilter,
        page: PageRequest,
    ) -> Result<Page<Visit>, StoreError> {
        let inner = self.inner.lock().expect("visit mutex poisoned");
        let mut visits: Vec<Visit> = inner
            .visits
            .values()
            .filter(|visit| {
                filter.customer.map_or(true, |c| visit.customer == c)
                    && filter
                        .consultant
                        .map_or(true, |c| visit.consultant == Some(c))
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
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
        if inner.visits.remove(&id.0).is_none() {
            return Err(StoreError::NotFound);
        }
        inner.items.retain(|_, item| item.visit != id);
        Ok(())
    }

    fn visit_items(&self, id: VisitId) -> Result<Vec<VisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit mutex poisoned");
        Ok(inner
            .items
            .values()
            .filter(|item| item.visit == id)
            .cloned()
            .collect())
    }

    fn insert_item(&self, record: VisitItemRecord) -> Result<VisitItem, StoreError> {
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
        if !inner.visits.contains_key(&record.visit.0) {
            return Err(StoreError::NotFound);
        }
        inner.next_item_id += 1;
        let item = VisitItem {
            id: VisitItemId(inner.next_item_id),
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
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
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
        let inner = self.inner.lock().expect("visit mutex poisoned");
        Ok(inner.items.get(&id.0).cloned())
    }

    fn list_items(
        &self,
        visit: Option<VisitId>,
        page: PageRequest,
    ) -> Result<Page<VisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit mutex poisoned");
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
        let mut inner = self.inner.lock().expect("visit mutex poisoned");
        let item = inner.items.remove(&id.0).ok_or(StoreError::NotFound)?;
        inner.recompute_total(item.visit);
        Ok(())
    }

    fn items_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DatedVisitItem>, StoreError> {
        let inner = self.inner.lock().expect("visit mutex poisoned");
        Ok(inner
            .items
            .values()
            .filter_map(|item| {
                let visit = inner.visits.get(&item.visit.0)?;
                (visit.visit_date >= start && visit.visit_date <= end).then(|| DatedVisitItem {
                    item: item.clone(),
                    visit_date: visit.visit_date,
                })
            })
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryRevisitLog {
    inner: Mutex<Table<RevisitRecord>>,
}

impl RevisitStore for InMemoryRevisitLog {
    fn insert(&self, draft: RevisitRecordDraft) -> Result<RevisitRecord, StoreError> {
        let mut table = self.inner.lock().expect("revisit mutex poisoned");
        let id = RevisitRecordId(table.next_id());
        let record = RevisitRecord {
            id,
            nurse: draft.nurse,
            date: draft.date,
            reception_count: draft.reception_count,
            contacts_added: draft.contacts_added,
            revisit_count: draft.revisit_count,
            remark: draft.remark,
        };
        table.rows.insert(id.0, record.clone());
        Ok(record)
    }

    fn update(
        &self,
        id: RevisitRecordId,
        draft: RevisitRecordDraft,
    ) -> Result<RevisitRecord, StoreError> {
        let mut table = self.inner.lock().expect("revisit mutex poisoned");
        if !table.rows.contains_key(&id.0) {
            return Err(StoreError::NotFound);
        }
        let record = RevisitRecord {
            id,
            nurse: draft.nurse,
            date: draft.date,
            reception_count: draft.reception_count,
            contacts_added: draft.contacts_added,
            revisit_count: draft.revisit_count,
            remark: draft.remark,
        };
        table.rows.insert(id.0, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: RevisitRecordId) -> Result<Option<RevisitRecord>, StoreError> {
        let table = self.inner.lock().expect("revisit mutex poisoned");
        Ok(table.rows.get(&id.0).cloned())
    }

    fn list(
        &self,
        filter: &RevisitFilter,
        page: PageRequest,
    ) -> Result<Page<RevisitRecord>, StoreError> {
        let table = self.inner.lock().expect("revisit mutex poisoned");
        let mut records: Vec<RevisitRecord> = table
            .rows
            .values()
            .filter(|record| {
                filter.nurse.map_or(true, |n| record.nurse == n)
                    && filter.date_from.map_or(true, |d| record.date >= d)
                    && filter.date_to.map_or(true, |d| record.date <= d)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(Page::from_filtered(records, page))
    }

    fn remove(&self, id: RevisitRecordId) -> Result<(), StoreError> {
        let mut table = self.inner.lock().expect("revisit mutex poisoned");
        table.rows.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
