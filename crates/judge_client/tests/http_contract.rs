//! Wire contract against a mock judge.

use std::time::Duration;

use codenest_judge_client::{
    JudgeClient, JudgeClientConfig, JudgeError, PollPolicy, SubmissionBackend, SubmissionStatus,
    SubmissionToken,
};
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> JudgeClient {
    let mut config = JudgeClientConfig::new(server.base_url());
    config.api_key = Some("test-key".into());
    config.host = Some("judge.test".into());
    config.poll = PollPolicy { interval: Duration::ZERO, max_attempts: 3 };
    JudgeClient::new(config).unwrap()
}

#[test]
fn test_submit_sends_language_id_and_vendor_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/submissions")
            .query_param("base64_encoded", "false")
            .query_param("wait", "false")
            .header("X-RapidAPI-Key", "test-key")
            .header("X-RapidAPI-Host", "judge.test")
            .json_body(json!({
                "source_code": "print(1)",
                "language_id": 71,
                "stdin": ""
            }));
        then.status(201).json_body(json!({ "token": "tok-abc" }));
    });

    let token = client_for(&server).submit_code("print(1)", "python", None).unwrap();
    mock.assert();
    assert_eq!(token, SubmissionToken("tok-abc".into()));
}

#[test]
fn test_submit_forwards_stdin() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/submissions").json_body(json!({
            "source_code": "read x; echo $x",
            "language_id": 46,
            "stdin": "hello"
        }));
        then.status(201).json_body(json!({ "token": "tok-sh" }));
    });

    client_for(&server)
        .submit_code("read x; echo $x", "bash", Some("hello"))
        .unwrap();
    mock.assert();
}

#[test]
fn test_unsupported_language_makes_no_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/submissions");
        then.status(201).json_body(json!({ "token": "never" }));
    });

    let err = client_for(&server).submit_code("x", "cobol", None).unwrap_err();
    assert!(matches!(err, JudgeError::UnsupportedLanguage(ref l) if l == "cobol"));
    mock.assert_calls(0);
}

#[test]
fn test_get_submission_result_parses_fields() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/submissions/tok-abc")
            .query_param("base64_encoded", "false")
            .query_param_exists("fields");
        then.status(200).json_body(json!({
            "token": "tok-abc",
            "status": { "id": 3, "description": "Accepted" },
            "stdout": "1\n",
            "stderr": null,
            "compile_output": null,
            "message": null,
            "time": "0.012",
            "memory": 3300
        }));
    });

    let sub = client_for(&server)
        .get_submission_result(&SubmissionToken("tok-abc".into()))
        .unwrap();
    mock.assert();
    assert_eq!(sub.status, SubmissionStatus::Accepted);
    assert_eq!(sub.stdout.as_deref(), Some("1\n"));
    assert_eq!(sub.time, Some(0.012));
    assert_eq!(sub.memory, Some(3300));
}

#[test]
fn test_server_error_maps_to_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/submissions");
        then.status(500).body("upstream exploded");
    });

    let err = client_for(&server).submit_code("x", "javascript", None).unwrap_err();
    match err {
        JudgeError::Http(status, body) => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("expected Http, got {:?}", other),
    }
}

#[test]
fn test_execute_code_end_to_end() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/submissions");
        then.status(201).json_body(json!({ "token": "tok-run" }));
    });
    let poll = server.mock(|when, then| {
        when.method(GET).path("/submissions/tok-run");
        then.status(200).json_body(json!({
            "status": { "id": 11, "description": "Runtime Error (NZEC)" },
            "stdout": "",
            "stderr": "Traceback (most recent call last):\nZeroDivisionError",
            "time": 0.02,
            "memory": 9000
        }));
    });

    let result = client_for(&server).execute_code("1/0", "python", None).unwrap();
    poll.assert_calls(1);
    assert!(!result.success);
    assert!(result.status.is_runtime_error());
    assert!(result.error.unwrap().contains("ZeroDivisionError"));
}

#[test]
fn test_execute_code_times_out_while_processing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/submissions");
        then.status(201).json_body(json!({ "token": "tok-slow" }));
    });
    let poll = server.mock(|when, then| {
        when.method(GET).path("/submissions/tok-slow");
        then.status(200).json_body(json!({ "status": { "id": 2, "description": "Processing" } }));
    });

    let err = client_for(&server).execute_code("loop {}", "rust", None).unwrap_err();
    poll.assert_calls(3);
    assert!(matches!(err, JudgeError::PollTimeout { attempts: 3, .. }));
}
