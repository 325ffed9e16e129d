use std::error::Error;

use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use clinic_core::directory::{CustomerDraft, EmployeeDraft, EmployeeId, EmployeeRole, ProjectDraft};
use clinic_core::error::AppError;
use clinic_core::reports::{PerformanceReport, ReportWindow};
use clinic_core::visits::{VisitDraft, VisitItemDraft};

use crate::infra::parse_date;
use crate::routes::ClinicServices;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Report window start (YYYY-MM-DD, defaults to one month before today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date_from: Option<NaiveDate>,
    /// Report window end (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date_to: Option<NaiveDate>,
}

/// The service keeps no durable state, so the standalone report command
/// seeds the same sample clinic the demo uses and reports over it.
pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let today = Local::now().date_naive();
    if let Err(err) = report_inner(args, today) {
        println!("report failed: {err}");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    if let Err(err) = demo_inner(today) {
        println!("demo failed: {err}");
    }
    Ok(())
}

fn report_inner(args: ReportArgs, today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let services = ClinicServices::in_memory();
    seed_sample_clinic(&services, today)?;

    let window = ReportWindow::resolve(args.date_from, args.date_to, today);
    let report = services.reports.performance_for_window(window)?;
    render_report(&report);
    Ok(())
}

fn demo_inner(today: NaiveDate) -> Result<(), Box<dyn Error>> {
    println!("Clinic performance demo (evaluated {today})");

    let services = ClinicServices::in_memory();
    let seeded = seed_sample_clinic(&services, today)?;

    println!("\nSeeded staff, catalog, and customers");
    println!("- 2 doctors, 2 nurses, 1 consultant");
    println!("- 4 treatment projects, 3 customers");

    let first_visit = services.visits.visit(seeded.first_visit)?;
    println!(
        "\nVisit {} billed a total of {:.2} across {} items",
        first_visit.ticket_no,
        first_visit.total_amount,
        services.visits.visit_items(first_visit.id)?.len()
    );

    // Rework one line to show the wholesale reallocation: the filler gains
    // a 40% co-doctor and a second nurse.
    let updated = services.visits.update_item(
        seeded.filler_item,
        VisitItemDraft {
            visit: Some(seeded.second_visit),
            project: Some(seeded.filler_project),
            amount: 3500.0,
            main_doctor: Some(seeded.dr_li),
            co_doctor1: Some(seeded.dr_zhang),
            co_ratio1: 0.4,
            co_doctor2: None,
            co_ratio2: 0.0,
            nurse1: Some(seeded.nurse_wang),
            nurse2: Some(seeded.nurse_liu),
            remark: None,
        },
    )?;
    println!(
        "\nReworked item {}: main {:.2} | co1 {:.2} | nurse bonuses {:.2} + {:.2}",
        updated.id.0,
        updated.split.main_doctor,
        updated.split.co_doctor1,
        updated.split.nurse1,
        updated.split.nurse2
    );

    let window = ReportWindow::resolve(None, None, today);
    let report = services.reports.performance_for_window(window)?;
    render_report(&report);

    Ok(())
}

pub(crate) struct SeededClinic {
    pub(crate) dr_zhang: EmployeeId,
    pub(crate) dr_li: EmployeeId,
    pub(crate) nurse_wang: EmployeeId,
    pub(crate) nurse_liu: EmployeeId,
    pub(crate) first_visit: clinic_core::visits::VisitId,
    pub(crate) second_visit: clinic_core::visits::VisitId,
    pub(crate) filler_item: clinic_core::visits::VisitItemId,
    pub(crate) filler_project: clinic_core::directory::ProjectId,
}

/// Seed the sample clinic: the staff roster, treatment catalog, customers,
/// and two recent visits with allocated items.
pub(crate) fn seed_sample_clinic(
    services: &ClinicServices,
    today: NaiveDate,
) -> Result<SeededClinic, Box<dyn Error>> {
    let employee = |name: &str, role, department: &str, job_number: &str, phone: &str| {
        EmployeeDraft {
            name: name.to_string(),
            role,
            department: Some(department.to_string()),
            job_number: Some(job_number.to_string()),
            phone: Some(phone.to_string()),
            is_active: true,
            remark: None,
        }
    };

    let directory = &services.directory;
    directory.create_employee(employee(
        "Administrator",
        EmployeeRole::Admin,
        "Management",
        "A001",
        "13800138000",
    ))?;
    let dr_zhang = directory
        .create_employee(employee(
            "Dr. Zhang",
            EmployeeRole::Doctor,
            "Dermatology",
            "D001",
            "13800138001",
        ))?
        .id;
    let dr_li = directory
        .create_employee(employee(
            "Dr. Li",
            EmployeeRole::Doctor,
            "Aesthetics",
            "D002",
            "13800138002",
        ))?
        .id;
    let nurse_wang = directory
        .create_employee(employee(
            "Nurse Wang",
            EmployeeRole::Nurse,
            "Dermatology",
            "N001",
            "13800138003",
        ))?
        .id;
    let nurse_liu = directory
        .create_employee(employee(
            "Nurse Liu",
            EmployeeRole::Nurse,
            "Aesthetics",
            "N002",
            "13800138004",
        ))?
        .id;
    let consultant = directory
        .create_employee(employee(
            "Consultant Chen",
            EmployeeRole::Consultant,
            "Front Desk",
            "C001",
            "13800138005",
        ))?
        .id;

    let project = |name: &str, category: &str, price: f64| ProjectDraft {
        name: name.to_string(),
        category: Some(category.to_string()),
        standard_price: Some(price),
        is_active: true,
        remark: None,
    };
    let photofacial = directory
        .create_project(project("Photofacial", "laser", 1200.0))?
        .id;
    let botulinum = directory
        .create_project(project("Botulinum Injection", "injection", 2800.0))?
        .id;
    let filler = directory
        .create_project(project("Hyaluronic Filler", "injection", 3500.0))?
        .id;
    let booster = directory
        .create_project(project("Hydra Booster", "injection", 800.0))?
        .id;

    let customer = |name: &str, phone: &str, kind: &str, first_days_ago: i64| CustomerDraft {
        name: name.to_string(),
        phone: phone.to_string(),
        customer_type: Some(kind.to_string()),
        first_visit_date: Some(today - Duration::days(first_days_ago)),
        remark: None,
    };
    let ms_wang = directory
        .create_customer(customer("Ms. Wang", "13900139001", "first-visit", 30))?
        .id;
    let mr_li = directory
        .create_customer(customer("Mr. Li", "13900139002", "returning", 60))?
        .id;
    directory.create_customer(customer("Ms. Zhang", "13900139003", "repeat", 90))?;

    let visits = &services.visits;
    let first_visit = visits
        .create_visit(VisitDraft {
            ticket_no: "T-20260401-001".to_string(),
            customer: Some(ms_wang),
            consultant: Some(consultant),
            visit_date: (today - Duration::days(5))
                .and_hms_opt(10, 30, 0)
                .expect("valid time"),
            remark: None,
        })?
        .id;
    visits.create_item(VisitItemDraft {
        visit: Some(first_visit),
        project: Some(photofacial),
        amount: 1200.0,
        main_doctor: Some(dr_zhang),
        co_doctor1: None,
        co_ratio1: 0.0,
        co_doctor2: None,
        co_ratio2: 0.0,
        nurse1: Some(nurse_wang),
        nurse2: None,
        remark: None,
    })?;
    visits.create_item(VisitItemDraft {
        visit: Some(first_visit),
        project: Some(booster),
        amount: 800.0,
        main_doctor: Some(dr_zhang),
        co_doctor1: Some(dr_li),
        co_ratio1: 0.3,
        co_doctor2: None,
        co_ratio2: 0.0,
        nurse1: Some(nurse_liu),
        nurse2: None,
        remark: None,
    })?;

    let second_visit = visits
        .create_visit(VisitDraft {
            ticket_no: "T-20260403-002".to_string(),
            customer: Some(mr_li),
            consultant: Some(consultant),
            visit_date: (today - Duration::days(2))
                .and_hms_opt(15, 0, 0)
                .expect("valid time"),
            remark: None,
        })?
        .id;
    let filler_item = visits
        .create_item(VisitItemDraft {
            visit: Some(second_visit),
            project: Some(filler),
            amount: 3500.0,
            main_doctor: Some(dr_li),
            co_doctor1: None,
            co_ratio1: 0.0,
            co_doctor2: None,
            co_ratio2: 0.0,
            nurse1: Some(nurse_wang),
            nurse2: None,
            remark: None,
        })?
        .id;
    visits.create_item(VisitItemDraft {
        visit: Some(second_visit),
        project: Some(botulinum),
        amount: 2800.0,
        main_doctor: Some(dr_zhang),
        co_doctor1: None,
        co_ratio1: 0.0,
        co_doctor2: None,
        co_ratio2: 0.0,
        nurse1: None,
        nurse2: None,
        remark: None,
    })?;

    Ok(SeededClinic {
        dr_zhang,
        dr_li,
        nurse_wang,
        nurse_liu,
        first_visit,
        second_visit,
        filler_item,
        filler_project: filler,
    })
}

pub(crate) fn render_report(report: &PerformanceReport) {
    println!(
        "\nPerformance report {} -> {}",
        report.date_from, report.date_to
    );
    println!("Total billed: {:.2}", report.total_amount);

    if report.rows.is_empty() {
        println!("No performance recorded in this window");
        return;
    }

    println!("Ranking:");
    for (rank, row) in report.rows.iter().enumerate() {
        println!(
            "{:>2}. {} ({}) | main {:.2} | co {:.2} | nurse {:.2} | total {:.2}",
            rank + 1,
            row.employee_name,
            row.employee_role.label(),
            row.main_performance,
            row.co_performance,
            row.nurse_performance,
            row.total_performance
        );
    }
}
