//! End-to-end checks of the HTTP routes against an in-memory store.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use roster_core::config::RosterConfig;
use roster_core::http::RosterServer;
use roster_core::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

const ROSTER_CSV: &str = concat!(
    "Name,Email Address,Role,Department,Phone Number,Is Part Time,End Of Probation,Office\n",
    "Ada Lovelace,ada@x.com,Engineer,R&D,5550100,No,Yes,Lyon\n",
    "Grace Hopper,grace@x.com,Admiral,Navy,5550101,No,Yes,Arlington\n",
);

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = RosterServer::new(RosterConfig::default(), Arc::new(MemoryStore::new()));
    tokio::spawn(async move {
        let _ = server.serve_with_listener(listener).await;
    });
    format!("http://{}", addr)
}

async fn upload(
    client: &reqwest::Client,
    base: &str,
    csv: &str,
    mapping: Option<&str>,
) -> reqwest::Response {
    let part = Part::bytes(csv.as_bytes().to_vec()).file_name("roster.csv");
    let mut form = Form::new().part("file", part);
    if let Some(uuid) = mapping {
        form = form.text("mapping_uuid", uuid.to_string());
    }
    client.post(format!("{}/api/excel/upload", base)).multipart(form).send().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_upload_then_list_and_reconcile_mapping() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let resp = upload(&client, &base, ROSTER_CSV, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["file_info"]["rows"], 2);
    assert_eq!(body["summary"]["inserted"], 2);
    let uuid = body["mapping"]["uuid"].as_str().unwrap().to_string();

    let columns_url = format!("{}/api/employee_column", base);
    let resp = client.get(&columns_url).send().await.unwrap();
    let mappings: Value = resp.json().await.unwrap();
    assert_eq!(mappings["success"], true);
    assert_eq!(mappings["data"].as_array().unwrap().len(), 1);
    assert_eq!(mappings["data"][0]["_id"], uuid.as_str());
    assert_eq!(mappings["data"][0]["non_required_columns"][0]["engine_name"], "OFFICE");

    let edit = json!({
        "uuid": uuid,
        "non_required_columns": [{"engine_name": "OFFICE", "description": "Primary work site"}]
    });
    let resp = client.post(&columns_url).json(&edit).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["version"], "2");

    // Same edit again changes nothing.
    let resp = client.post(&columns_url).json(&edit).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No changes made to profile mapping");
}

#[tokio::test]
async fn test_upload_errors_are_problem_details() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let resp = upload(&client, &base, "Name,Email Address\nAda,ada@x.com\n", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Validation Error");
    assert_eq!(body["status"], 400);
    assert_eq!(body["instance"], "uri=/api/excel/upload");
    assert!(body["errors"].as_array().unwrap().contains(&json!("ROLE")));

    let resp = upload(&client, &base, ROSTER_CSV, Some("missing-uuid")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Profile mapping not found");
}

#[tokio::test]
async fn test_employee_lifecycle() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    let employee = json!({
        "NAME": "Ada Lovelace",
        "EMAIL_ADDRESS": "ada@x.com",
        "ROLE": "Engineer",
        "DEPARTMENT": "R&D",
        "PHONE_NUMBER": "5550100",
        "IS_PART_TIME": "No",
        "END_OF_PROBATION": "Yes"
    });

    let resp = client.post(format!("{}/api/employee", base)).json(&employee).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["PHONE_NUMBER"], 5550100);
    assert_eq!(created["data"]["NAME"], "ADA LOVELACE");

    let resp = client.post(format!("{}/api/employee", base)).json(&employee).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .put(format!("{}/api/employee/{}", base, id))
        .json(&json!({"DEPARTMENT": "Analytics"}))
        .send()
        .await
        .unwrap();
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["data"]["DEPARTMENT"], "Analytics");

    let found: Value = client
        .get(format!("{}/api/employee/search?q=analyt", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["count"], 1);

    let page: Value = client
        .get(format!("{}/api/employee?page=1&limit=5&department=Analytics", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["pagination"]["total"], 1);

    let resp = client.delete(format!("{}/api/employee/{}", base, id)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = client.get(format!("{}/api/employee/{}", base, id)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_rejects_overflowing_page() {
    let base = start_server().await;
    let url = format!("{}/api/employee?page=9223372036854775807", base);
    let resp = reqwest::get(url).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "page and limit must be positive integers");
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    let resp = client.get(format!("{}/api/nowhere", base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = client.patch(format!("{}/api/employee", base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
