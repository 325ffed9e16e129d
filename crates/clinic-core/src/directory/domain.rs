use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for staff members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub u64);

/// Identifier wrapper for clinic customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

/// Identifier wrapper for treatment catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub u64);

/// Staff roles recognized by the clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Doctor,
    Nurse,
    Consultant,
    Admin,
}

impl EmployeeRole {
    pub const fn label(self) -> &'static str {
        match self {
            EmployeeRole::Doctor => "doctor",
            EmployeeRole::Nurse => "nurse",
            EmployeeRole::Consultant => "consultant",
            EmployeeRole::Admin => "admin",
        }
    }
}

/// A staff member. Deactivated employees keep their history but are excluded
/// from performance reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: EmployeeRole,
    pub department: Option<String>,
    pub job_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub remark: Option<String>,
}

/// Intake payload for creating or wholesale-replacing an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub role: EmployeeRole,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub remark: Option<String>,
}

/// A clinic customer. Phone numbers are unique across the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub customer_type: Option<String>,
    pub first_visit_date: Option<NaiveDate>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub first_visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// One entry of the treatment catalog. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub category: Option<String>,
    pub standard_price: Option<f64>,
    pub is_active: bool,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub standard_price: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub remark: Option<String>,
}

fn default_active() -> bool {
    true
}
