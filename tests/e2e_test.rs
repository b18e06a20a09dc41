//! Black-box tests against the HTTP intake, backed by the in-memory store.

mod fixtures;
mod helpers;

use fixtures::*;
use helpers::*;
use label_print_queue::models::job::{JobStatus, Orientation};
use label_print_queue::models::print::{EnqueueResponse, JobStatusResponse};
use label_print_queue::services::job_store::JobStore;
use reqwest::StatusCode;
use serde_json::Value;

async fn submit(client: &reqwest::Client, base_url: &str, body: &Value) -> reqwest::Response {
    client
        .post(format!("{}/api/v1/print-jobs", base_url))
        .json(body)
        .send()
        .await
        .expect("request failed")
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let response = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["reachable"], true);
    assert_eq!(body["queue"]["pending"], 0);
}

#[tokio::test]
async fn test_submit_applies_defaults() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &server.base_url, &minimal_request("ABC123")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: EnqueueResponse = response.json().await.unwrap();
    assert_eq!(body.status, JobStatus::Pending);

    let job = server.store.get(body.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.attempts, 0);
    assert_eq!(job.spec.print_count, 1);
    assert_eq!(job.spec.width_mm, 45);
    assert_eq!(job.spec.height_mm, 35);
    assert_eq!(job.spec.vendor_id, "0x0fe6");
    assert_eq!(job.spec.product_id, "0x8800");
}

#[tokio::test]
async fn test_submit_clamps_and_truncates() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &server.base_url, &full_request("W12345678")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: EnqueueResponse = response.json().await.unwrap();

    let job = server.store.get(body.job_id).await.unwrap().unwrap();
    assert_eq!(job.spec.print_count, 1000);
    assert_eq!(job.spec.top_text.chars().count(), 50);
    assert_eq!(job.spec.orientation, Orientation::Reversed);
    assert_eq!(job.spec.vendor_id, "0x1234");
    assert_eq!(job.spec.width_mm, 60);
}

#[tokio::test]
async fn test_oversized_barcode_rejected_without_insert() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &server.base_url, &oversized_barcode_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(server.store.all().await.is_empty());
}

#[tokio::test]
async fn test_missing_barcode_rejected() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &server.base_url, &missing_barcode_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.store.all().await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/print-jobs", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");
}

#[tokio::test]
async fn test_unreachable_printer_rejected() {
    let server = TestServer::spawn(ScriptedPrinter::unreachable()).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &server.base_url, &minimal_request("ABC123")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "device_unavailable");
    assert!(server.store.all().await.is_empty());
}

#[tokio::test]
async fn test_unknown_job_not_found() {
    let server = TestServer::spawn(ScriptedPrinter::healthy()).await;
    let response = reqwest::get(format!("{}/api/v1/print-jobs/999", server.base_url))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_job_printed_and_observable_via_status() {
    let server =
        TestServer::spawn_with_workers(ScriptedPrinter::failing_first(1), quick_settings(3, 2))
            .await;
    let client = reqwest::Client::new();

    let body: EnqueueResponse = submit(&client, &server.base_url, &minimal_request("ABC123"))
        .await
        .json()
        .await
        .unwrap();

    wait_for_terminal(server.store.as_ref(), body.job_id).await;

    let status: JobStatusResponse = client
        .get(format!("{}/api/v1/print-jobs/{}", server.base_url, body.job_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status.job_id, body.job_id);
    assert_eq!(status.status, JobStatus::Done);
    assert_eq!(status.attempts, 2);
    assert!(status.last_error.is_some());
    assert_eq!(server.printer.calls_for("ABC123"), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_queue_stats() {
    let server =
        TestServer::spawn_with_workers(ScriptedPrinter::always_failing(), quick_settings(1, 1))
            .await;
    let client = reqwest::Client::new();

    for barcode in ["A1", "A2"] {
        let response = submit(&client, &server.base_url, &minimal_request(barcode)).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
    wait_for_all_terminal(&server.store).await;

    let stats: Value = client
        .get(format!("{}/api/v1/print-jobs/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["failed"], 2);
    assert_eq!(stats["pending"], 0);
    assert_eq!(stats["inProgress"], 0);
    assert_eq!(stats["done"], 0);

    server.stop().await;
}
