//! Employee records: field contract, upload-time upsert, and record management.

pub mod service;
pub mod upsert;
pub mod validation;

pub use service::{EmployeePage, EmployeeService, ListQuery, Pagination, UpdateOutcome};
pub use upsert::{BatchSummary, UpsertDecision, UpsertReconciler};
pub use validation::{default_rules, validate_data, validate_employee, ColumnRule, FieldType};

pub const EMPLOYEE_COLLECTION: &str = "employee";

pub const NAME: &str = "NAME";
pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
pub const PHONE_NUMBER: &str = "PHONE_NUMBER";
pub const DEPARTMENT: &str = "DEPARTMENT";
pub const ROLE: &str = "ROLE";
pub const IS_PART_TIME: &str = "IS_PART_TIME";
pub const END_OF_PROBATION: &str = "END_OF_PROBATION";

/// Fields every employee record carries.
pub const MANDATORY_FIELDS: [&str; 7] =
    [NAME, PHONE_NUMBER, EMAIL_ADDRESS, DEPARTMENT, ROLE, END_OF_PROBATION, IS_PART_TIME];
