//! CLI integration tests.
//!
//! These run the `tempgopher` binary against an in-process server, with the
//! configuration directory pointed at an empty temporary directory.

use std::path::Path;
use std::process::{Command, Output};

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

fn run(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tempgopher"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("TEMPGOPHER_URL")
        .env_remove("TEMPGOPHER_USER")
        .env_remove("TEMPGOPHER_PASSWORD")
        .env_remove("TEMPGOPHER_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run tempgopher binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn router() -> Router {
    Router::new()
        .route("/api/version", get(|| async { Json(json!({ "version": "0.4.1" })) }))
        .route(
            "/api/status/",
            get(|| async {
                Json(json!({
                    "fermenter": { "alias": "fermenter", "temp": 19.5, "heating": false, "cooling": true }
                }))
            }),
        )
        .route(
            "/api/config/sensors/{alias}",
            get(|| async {
                Json(json!({
                    "id": "28-0000071cbc72",
                    "alias": "fermenter",
                    "hightemp": 20.0,
                    "lowtemp": 18.0,
                    "heatgpio": 5,
                    "heatinvert": true,
                    "heatminutes": 5,
                    "heatdisable": false,
                    "coolgpio": 17,
                    "coolinvert": false,
                    "coolminutes": 10,
                    "cooldisable": false,
                    "verbose": false
                }))
            }),
        )
        .route(
            "/api/config/sensors",
            post(|Json(_body): Json<Value>| async { Json(json!({})) }),
        )
}

async fn serve() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn run_async(config_home: &Path, args: Vec<String>) -> Output {
    let config_home = config_home.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run(&config_home, &args)
    })
    .await
    .unwrap()
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Dashboard for TempGopher thermostats"));
    assert!(text.contains("status"));
    assert!(text.contains("set"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("tempgopher "));
}

#[test]
fn test_zero_poll_interval_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["status", "--poll-interval", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Poll interval must be at least 1 second"));
}

#[test]
fn test_set_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["set", "fermenter"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Nothing to change"));
}

#[test]
fn test_status_unreachable_server() {
    let dir = tempfile::tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let output = run(dir.path(), &["status", "--url", &url, "--timeout", "2"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read device status"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_version_banner() {
    let dir = tempfile::tempdir().unwrap();
    let url = serve().await;
    let output = run_async(dir.path(), vec!["version".into(), "--url".into(), url]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "TempGopher | Version: 0.4.1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_text_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let url = serve().await;

    let output = run_async(
        dir.path(),
        vec!["status".into(), "--url".into(), url.clone(), "--fahrenheit".into()],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("fermenter"));
    assert!(text.contains("67.1°F"));
    assert!(text.contains("Chills for 10 minutes when > 68.0°F"));

    let output = run_async(
        dir.path(),
        vec!["status".into(), "--format".into(), "json".into(), "--url".into(), url],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["unit"], "celsius");
    assert_eq!(value["devices"][0]["status_label"], "Cooling");
    assert_eq!(value["devices"][0]["controls"]["low_temp"], "18.0");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_submits() {
    let dir = tempfile::tempdir().unwrap();
    let url = serve().await;
    let output = run_async(
        dir.path(),
        vec![
            "set".into(),
            "fermenter".into(),
            "--cool-minutes".into(),
            "12".into(),
            "--url".into(),
            url,
        ],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("Updated fermenter"));
}
