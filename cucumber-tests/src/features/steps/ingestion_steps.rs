use crate::features::world::RosterWorld;
use cucumber::{given, then, when};
use roster_core::employee::EMPLOYEE_COLLECTION;
use roster_core::mapping::MAPPING_COLLECTION;
use roster_core::record::DynamicRecord;
use roster_core::store::{DocumentStore, Filter};
use serde_json::json;

const STANDARD_COLUMNS: [&str; 7] = [
    "Name",
    "Email Address",
    "Role",
    "Department",
    "Phone Number",
    "Is Part Time",
    "End Of Probation",
];

fn standard_row(email: &str) -> Vec<String> {
    ["Ada Lovelace", email, "Engineer", "R&D", "5550100", "No", "Yes"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ==================== TABLE SETUP ====================

#[given(expr = "a roster table with the standard columns")]
async fn given_standard_table(world: &mut RosterWorld) {
    world.headers = STANDARD_COLUMNS.iter().map(|s| s.to_string()).collect();
    world.rows = vec![standard_row("ada@x.com")];
}

#[given(expr = "the {string} column is removed")]
async fn given_column_removed(world: &mut RosterWorld, column: String) {
    let index = world.headers.iter().position(|h| *h == column).expect("column present");
    world.headers.remove(index);
    for row in &mut world.rows {
        row.remove(index);
    }
}

#[given(expr = "an extra column {string} with value {string}")]
async fn given_extra_column(world: &mut RosterWorld, column: String, value: String) {
    world.headers.push(column);
    for row in &mut world.rows {
        row.push(value.clone());
    }
}

// ==================== UPLOAD ====================

#[when(expr = "the table is uploaded")]
async fn when_uploaded(world: &mut RosterWorld) {
    world.upload(None).await;
}

#[when(expr = "the table is uploaded again against the same mapping")]
async fn when_uploaded_again(world: &mut RosterWorld) {
    let uuid = world.report().mapping.uuid.clone();
    world.upload(Some(uuid)).await;
}

#[when(expr = "the table is uploaded against mapping {string}")]
async fn when_uploaded_against(world: &mut RosterWorld, uuid: String) {
    world.upload(Some(uuid)).await;
}

#[then(expr = "the upload succeeds")]
async fn then_upload_succeeds(world: &mut RosterWorld) {
    assert!(world.last_error.is_none(), "upload failed: {:?}", world.last_error);
}

#[then(expr = "the upload fails with status {int}")]
async fn then_upload_fails(world: &mut RosterWorld, status: u16) {
    let err = world.last_error.as_ref().expect("upload should have failed");
    assert_eq!(err.status(), status);
}

#[then(expr = "the missing columns are exactly {string}")]
async fn then_missing_columns(world: &mut RosterWorld, columns: String) {
    let err = world.last_error.as_ref().expect("upload should have failed");
    let expected: Vec<String> = columns.split(',').map(|c| c.trim().to_string()).collect();
    assert_eq!(err.errors(), expected);
}

#[then(expr = "{int} columns are required and {int} are not")]
async fn then_bucket_sizes(world: &mut RosterWorld, required: usize, non_required: usize) {
    let mapping = world.mapping().await;
    assert_eq!(mapping.columns.required_columns.len(), required);
    assert_eq!(mapping.columns.non_required_columns.len(), non_required);
}

#[then(expr = "the mapping version is {string}")]
async fn then_mapping_version(world: &mut RosterWorld, version: String) {
    assert_eq!(world.report().mapping.version, version);
    assert_eq!(world.mapping().await.version, version);
}

#[then(expr = "{int} mapping document(s) exist(s)")]
async fn then_mapping_count(world: &mut RosterWorld, count: u64) {
    let stored = world.store.count(MAPPING_COLLECTION, &Filter::All).await.expect("count");
    assert_eq!(stored, count);
}

#[then(expr = "{int} employee document(s) exist(s)")]
async fn then_employee_count(world: &mut RosterWorld, count: u64) {
    let stored = world.store.count(EMPLOYEE_COLLECTION, &Filter::All).await.expect("count");
    assert_eq!(stored, count);
}

// ==================== UPSERT ====================

#[when(expr = "an employee {string} with phone {string} in department {string} is upserted")]
async fn when_employee_upserted(
    world: &mut RosterWorld,
    email: String,
    phone: String,
    department: String,
) {
    let record = DynamicRecord::from_fields([
        ("email_address", json!(email)),
        ("phone_number", json!(phone)),
        ("department", json!(department)),
    ]);
    let summary = world.upserts().upsert_batch(&[record]).await.expect("upsert");
    world.summary.inserted += summary.inserted;
    world.summary.updated += summary.updated;
    world.summary.unchanged += summary.unchanged;
    world.summary.skipped += summary.skipped;
}

#[then(expr = "the upserts report {int} inserted and {int} updated")]
async fn then_upsert_summary(world: &mut RosterWorld, inserted: usize, updated: usize) {
    assert_eq!(world.summary.inserted, inserted);
    assert_eq!(world.summary.updated, updated);
}

#[then(expr = "the only employee has department {string}")]
async fn then_employee_department(world: &mut RosterWorld, department: String) {
    let employees = world.employees().await;
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["DEPARTMENT"], json!(department));
}
