//! End-to-end specifications for the commission write path and the
//! aggregate performance report, driven through the public service facades
//! the way the HTTP layer uses them.

mod common {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::{NaiveDate, NaiveDateTime};

    use clinic_core::directory::{
        Customer, CustomerDraft, CustomerFilter, CustomerId, CustomerStore, Employee,
        EmployeeDraft, EmployeeFilter, EmployeeId, EmployeeRole, EmployeeStore, Project,
        ProjectDraft, ProjectFilter, ProjectId, ProjectStore,
    };
    use clinic_core::store::{Page, PageRequest, StoreError};
    use clinic_core::visits::{
        visit_total, DatedVisitItem, Visit, VisitDraft, VisitFilter, VisitId, VisitItem,
        VisitItemDraft, VisitItemId, VisitItemRecord, VisitRecord, VisitStore,
    };

    #[derive(Default)]
    pub struct MemoryDirectory {
        employees: Mutex<(BTreeMap<u64, Employee>, u64)>,
        customers: Mutex<(BTreeMap<u64, Customer>, u64)>,
        projects: Mutex<(BTreeMap<u64, Project>, u64)>,
    }

    impl EmployeeStore for MemoryDirectory {
        fn insert(&self, draft: EmployeeDraft) -> Result<Employee, StoreError> {
            let mut guard = self.employees.lock().expect("employee mutex poisoned");
            guard.1 += 1;
            let employee = Employee {
                id: EmployeeId(guard.1),
                name: draft.name,
                role: draft.role,
                department: draft.department,
                job_number: draft.job_number,
                phone: draft.phone,
                is_active: draft.is_active,
                remark: draft.remark,
            };
            guard.0.insert(employee.id.0, employee.clone());
            Ok(employee)
        }

        fn update(&self, id: EmployeeId, draft: EmployeeDraft) -> Result<Employee, StoreError> {
            let mut guard = self.employees.lock().expect("employee mutex poisoned");
            if !guard.0.contains_key(&id.0) {
                return Err(StoreError::NotFound);
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
            guard.0.insert(id.0, employee.clone());
            Ok(employee)
        }

        fn fetch(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError> {
            let guard = self.employees.lock().expect("employee mutex poisoned");
            Ok(guard.0.get(&id.0).cloned())
        }

        fn list(
            &self,
            _filter: &EmployeeFilter,
            page: PageRequest,
        ) -> Result<Page<Employee>, StoreError> {
            let guard = self.employees.lock().expect("employee mutex poisoned");
            Ok(Page::from_filtered(guard.0.values().cloned().collect(), page))
        }

        fn active(&self) -> Result<Vec<Employee>, StoreError> {
            let guard = self.employees.lock().expect("employee mutex poisoned");
            Ok(guard.0.values().filter(|e| e.is_active).cloned().collect())
        }

        fn remove(&self, id: EmployeeId) -> Result<(), StoreError> {
            let mut guard = self.employees.lock().expect("employee mutex poisoned");
            guard.0.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
        }
    }

    impl CustomerStore for MemoryDirectory {
        fn insert(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
            let mut guard = self.customers.lock().expect("customer mutex poisoned");
            guard.1 += 1;
            let customer = Customer {
                id: CustomerId(guard.1),
                name: draft.name,
                phone: draft.phone,
                customer_type: draft.customer_type,
                first_visit_date: draft.first_visit_date,
                remark: draft.remark,
            };
            guard.0.insert(customer.id.0, customer.clone());
            Ok(customer)
        }

        fn update(&self, id: CustomerId, draft: CustomerDraft) -> Result<Customer, StoreError> {
            let mut guard = self.customers.lock().expect("customer mutex poisoned");
            if !guard.0.contains_key(&id.0) {
                return Err(StoreError::NotFound);
            }
            let customer = Customer {
                id,
                name: draft.name,
                phone: draft.phone,
                customer_type: draft.customer_type,
                first_visit_date: draft.first_visit_date,
                remark: draft.remark,
            };
            guard.0.insert(id.0, customer.clone());
            Ok(customer)
        }

        fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
            let guard = self.customers.lock().expect("customer mutex poisoned");
            Ok(guard.0.get(&id.0).cloned())
        }

        fn list(
            &self,
            _filter: &CustomerFilter,
            page: PageRequest,
        ) -> Result<Page<Customer>, StoreError> {
            let guard = self.customers.lock().expect("customer mutex poisoned");
            Ok(Page::from_filtered(guard.0.values().cloned().collect(), page))
        }

        fn remove(&self, id: CustomerId) -> Result<(), StoreError> {
            let mut guard = self.customers.lock().expect("customer mutex poisoned");
            guard.0.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
        }
    }

    impl ProjectStore for MemoryDirectory {
        fn insert(&self, draft: ProjectDraft) -> Result<Project, StoreError> {
            let mut guard = self.projects.lock().expect("project mutex poisoned");
            guard.1 += 1;
            let project = Project {
                id: ProjectId(guard.1),
                name: draft.name,
                category: draft.category,
                standard_price: draft.standard_price,
                is_active: draft.is_active,
                remark: draft.remark,
            };
            guard.0.insert(project.id.0, project.clone());
            Ok(project)
        }

        fn update(&self, id: ProjectId, draft: ProjectDraft) -> Result<Project, StoreError> {
            let mut guard = self.projects.lock().expect("project mutex poisoned");
            if !guard.0.contains_key(&id.0) {
                return Err(StoreError::NotFound);
            }
            let project = Project {
                id,
                name: draft.name,
                category: draft.category,
                standard_price: draft.standard_price,
                is_active: draft.is_active,
                remark: draft.remark,
            };
            guard.0.insert(id.0, project.clone());
            Ok(project)
        }

        fn fetch(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
            let guard = self.projects.lock().expect("project mutex poisoned");
            Ok(guard.0.get(&id.0).cloned())
        }

        fn list(
            &self,
            _filter: &ProjectFilter,
            page: PageRequest,
        ) -> Result<Page<Project>, StoreError> {
            let guard = self.projects.lock().expect("project mutex poisoned");
            Ok(Page::from_filtered(guard.0.values().cloned().collect(), page))
        }

        fn remove(&self, id: ProjectId) -> Result<(), StoreError> {
            let mut guard = self.projects.lock().expect("project mutex poisoned");
            guard.0.remove(&id.0).map(|_| ()).ok_or(StoreError::NotFound)
        }
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

    #[derive(Default)]
    pub struct MemoryVisits {
        inner: Mutex<VisitTables>,
    }

    impl VisitStore for MemoryVisits {
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
            _filter: &VisitFilter,
            page: PageRequest,
        ) -> Result<Page<Visit>, StoreError> {
            let inner = self.inner.lock().expect("visit mutex poisoned");
            Ok(Page::from_filtered(
                inner.visits.values().cloned().collect(),
                page,
            ))
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
            let items: Vec<VisitItem> = inner
                .items
                .values()
                .filter(|item| visit.map_or(true, |v| item.visit == v))
                .cloned()
                .collect();
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
                    (visit.visit_date >= start && visit.visit_date <= end).then(|| {
                        DatedVisitItem {
                            item: item.clone(),
                            visit_date: visit.visit_date,
                        }
                    })
                })
                .collect())
        }
    }

    pub fn employee(name: &str, role: EmployeeRole, active: bool) -> EmployeeDraft {
        EmployeeDraft {
            name: name.to_string(),
            role,
            department: None,
            job_number: None,
            phone: None,
            is_active: active,
            remark: None,
        }
    }

    pub fn visit(ticket: &str, day: u32, hour: u32) -> VisitDraft {
        VisitDraft {
            ticket_no: ticket.to_string(),
            customer: Some(CustomerId(1)),
            consultant: None,
            visit_date: NaiveDate::from_ymd_opt(2026, 6, day)
                .expect("valid date")
                .and_hms_opt(hour, 30, 0)
                .expect("valid time"),
            remark: None,
        }
    }

    pub fn item(visit: VisitId, amount: f64, main_doctor: EmployeeId) -> VisitItemDraft {
        VisitItemDraft {
            visit: Some(visit),
            project: Some(ProjectId(1)),
            amount,
            main_doctor: Some(main_doctor),
            co_doctor1: None,
            co_ratio1: 0.0,
            co_doctor2: None,
            co_ratio2: 0.0,
            nurse1: None,
            nurse2: None,
            remark: None,
        }
    }
}

use std::sync::Arc;

use chrono::NaiveDate;
use clinic_core::directory::EmployeeRole;
use clinic_core::reports::{ReportService, ReportWindow};
use clinic_core::visits::VisitService;

use common::{employee, item, visit, MemoryDirectory, MemoryVisits};

struct Clinic {
    directory: Arc<MemoryDirectory>,
    visits: Arc<VisitService<MemoryVisits>>,
    reports: ReportService<MemoryDirectory, MemoryVisits>,
}

fn clinic() -> Clinic {
    let directory = Arc::new(MemoryDirectory::default());
    let visit_store = Arc::new(MemoryVisits::default());
    Clinic {
        directory: directory.clone(),
        visits: Arc::new(VisitService::new(visit_store.clone())),
        reports: ReportService::new(directory, visit_store),
    }
}

fn window(from_day: u32, to_day: u32) -> ReportWindow {
    ReportWindow::resolve(
        NaiveDate::from_ymd_opt(2026, 6, from_day),
        NaiveDate::from_ymd_opt(2026, 6, to_day),
        NaiveDate::from_ymd_opt(2026, 6, 30).expect("valid date"),
    )
}

#[test]
fn write_path_and_report_agree_on_the_documented_policy() {
    use clinic_core::directory::EmployeeStore;

    let clinic = clinic();
    let dr_zhang = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Zhang", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;
    let dr_li = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Li", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;
    let nurse_wang = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Nurse Wang", EmployeeRole::Nurse, true),
    )
    .expect("nurse stored")
    .id;

    let first = clinic
        .visits
        .create_visit(visit("T-1", 10, 10))
        .expect("visit created");

    // 1000 billed with a 30% co-doctor and one nurse.
    let mut draft = item(first.id, 1000.0, dr_zhang);
    draft.co_doctor1 = Some(dr_li);
    draft.co_ratio1 = 0.3;
    draft.nurse1 = Some(nurse_wang);
    let stored = clinic.visits.create_item(draft).expect("item created");

    assert_eq!(stored.split.main_doctor, 700.0);
    assert_eq!(stored.split.co_doctor1, 300.0);
    assert_eq!(stored.split.co_doctor2, 0.0);
    assert_eq!(stored.split.nurse1, 50.0);
    let recorded = stored.split.main_doctor
        + stored.split.co_doctor1
        + stored.split.co_doctor2
        + stored.split.nurse1
        + stored.split.nurse2;
    assert_eq!(recorded, 1050.0);

    let report = clinic
        .reports
        .performance_for_window(window(1, 30))
        .expect("report builds");

    assert_eq!(report.total_amount, 1000.0);
    let zhang = report
        .rows
        .iter()
        .find(|row| row.employee_id == dr_zhang)
        .expect("main doctor row");
    assert_eq!(zhang.main_performance, 1000.0);
    let li = report
        .rows
        .iter()
        .find(|row| row.employee_id == dr_li)
        .expect("co doctor row");
    assert_eq!(li.co_performance, 300.0);
    let wang = report
        .rows
        .iter()
        .find(|row| row.employee_id == nurse_wang)
        .expect("nurse row");
    assert_eq!(wang.nurse_performance, 50.0);
}

#[test]
fn over_allocated_ratios_stay_clamped_at_write_time_but_not_in_the_report() {
    use clinic_core::directory::EmployeeStore;

    let clinic = clinic();
    let main = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Zhang", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;
    let co1 = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Li", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;
    let co2 = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Qian", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;

    let first = clinic
        .visits
        .create_visit(visit("T-1", 12, 9))
        .expect("visit created");

    let mut draft = item(first.id, 1000.0, main);
    draft.co_doctor1 = Some(co1);
    draft.co_ratio1 = 0.7;
    draft.co_doctor2 = Some(co2);
    draft.co_ratio2 = 0.6;
    let stored = clinic.visits.create_item(draft).expect("item created");

    // Write time: the clamp zeroes the residual but the co shares stay
    // unclamped, so the allocation exceeds the amount.
    assert_eq!(stored.split.main_doctor, 0.0);
    assert_eq!(stored.split.co_doctor1, 700.0);
    assert_eq!(stored.split.co_doctor2, 600.0);

    // Read time: the same item credits the main doctor the full amount.
    let report = clinic
        .reports
        .performance_for_window(window(1, 30))
        .expect("report builds");
    let main_row = report
        .rows
        .iter()
        .find(|row| row.employee_id == main)
        .expect("main doctor row");
    assert_eq!(main_row.main_performance, 1000.0);
}

#[test]
fn report_honors_window_bounds_and_activity() {
    use clinic_core::directory::EmployeeStore;

    let clinic = clinic();
    let active = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Zhang", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;
    let former = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Gone", EmployeeRole::Doctor, false),
    )
    .expect("doctor stored")
    .id;

    // End-of-day boundary: a visit on the last day at 23:30 still counts.
    let boundary = clinic
        .visits
        .create_visit(visit("T-boundary", 15, 23))
        .expect("visit created");
    clinic
        .visits
        .create_item(item(boundary.id, 400.0, active))
        .expect("item created");

    // Outside the window entirely.
    let outside = clinic
        .visits
        .create_visit(visit("T-outside", 25, 10))
        .expect("visit created");
    clinic
        .visits
        .create_item(item(outside.id, 900.0, active))
        .expect("item created");

    // Attributed to an inactive employee: excluded from rows, still billed.
    let inactive_work = clinic
        .visits
        .create_visit(visit("T-former", 14, 11))
        .expect("visit created");
    clinic
        .visits
        .create_item(item(inactive_work.id, 500.0, former))
        .expect("item created");

    let report = clinic
        .reports
        .performance_for_window(window(10, 15))
        .expect("report builds");

    assert_eq!(report.total_amount, 900.0);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].employee_id, active);
    assert_eq!(report.rows[0].main_performance, 400.0);
}

#[test]
fn deleting_every_item_empties_both_the_total_and_the_report() {
    use clinic_core::directory::EmployeeStore;

    let clinic = clinic();
    let doctor = EmployeeStore::insert(
        clinic.directory.as_ref(),
        employee("Dr. Zhang", EmployeeRole::Doctor, true),
    )
    .expect("doctor stored")
    .id;

    let first = clinic
        .visits
        .create_visit(visit("T-1", 10, 10))
        .expect("visit created");
    let a = clinic
        .visits
        .create_item(item(first.id, 600.0, doctor))
        .expect("item created");
    let b = clinic
        .visits
        .create_item(item(first.id, 150.0, doctor))
        .expect("item created");

    clinic.visits.remove_item(a.id).expect("item removed");
    clinic.visits.remove_item(b.id).expect("item removed");

    let stored = clinic.visits.visit(first.id).expect("visit fetched");
    assert_eq!(stored.total_amount, 0.0);

    let report = clinic
        .reports
        .performance_for_window(window(1, 30))
        .expect("report builds");
    assert_eq!(report.total_amount, 0.0);
    assert!(report.rows.is_empty());
}
