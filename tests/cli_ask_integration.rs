//! CLI integration tests for `askform ask`.
//!
//! Runs the compiled binary against the fake answer service.

mod common;

use std::process::{Command, Output};

fn run_ask(api_url: &str, question: &str, locale: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_askform"))
        .args(["ask", question, "--api-url", api_url])
        .env("ASKFORM_LOCALE", locale)
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env_remove("ASKFORM_TIMEOUT_SECS")
        .env_remove("ASKFORM_API_URL")
        .output()
        .expect("failed to run askform")
}

#[test]
fn ask_prints_answer_and_exits_zero() {
    let url = common::spawn_answer_service();
    let output = run_ask(&url, "Who won?", "zh");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "Team A");
}

#[test]
fn ask_prints_failure_message_when_service_unreachable() {
    let url = common::unreachable_url();
    let output = run_ask(&url, "Who won?", "zh");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "请求失败，请稍后再试");
}

#[test]
fn ask_uses_configured_locale_for_failure_message() {
    let url = common::unreachable_url();
    let output = run_ask(&url, "Who won?", "en");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "Request failed, please try again later"
    );
}

#[test]
fn ask_rejects_invalid_api_url() {
    let output = run_ask("not a url", "Who won?", "zh");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: invalid API URL"));
}

#[test]
fn ask_rejects_api_url_without_http_scheme() {
    let output = run_ask("localhost:5000", "Who won?", "zh");

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: invalid API URL 'localhost:5000'"));
}

#[test]
fn ask_rejects_zero_timeout() {
    let url = common::spawn_answer_service();
    let output = Command::new(env!("CARGO_BIN_EXE_askform"))
        .args(["ask", "Who won?", "--api-url", &url, "--timeout", "0"])
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env_remove("ASKFORM_TIMEOUT_SECS")
        .output()
        .expect("failed to run askform");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: invalid timeout '0'"));
}

#[test]
fn ask_prints_empty_line_when_reply_has_no_answer() {
    let url = common::spawn_answer_service();
    let output = run_ask(&url, "no answer", "zh");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "\n");
}
