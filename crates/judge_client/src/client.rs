//! Judge HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! `POST /submissions` to enqueue, `GET /submissions/{token}` to poll.

use std::time::Duration;

use serde::Deserialize;

use crate::execution::{JudgeError, PollPolicy, Submission, SubmissionBackend, SubmissionToken};
use crate::languages::language_id;
use crate::status::SubmissionStatus;

const KEY_HEADER: &str = "X-RapidAPI-Key";
const HOST_HEADER: &str = "X-RapidAPI-Host";
const RESULT_FIELDS: &str = "token,status,stdout,stderr,compile_output,message,time,memory";

/// Connection settings for the judge service
#[derive(Debug, Clone)]
pub struct JudgeClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub host: Option<String>,
    pub poll: PollPolicy,
}

impl JudgeClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            host: None,
            poll: PollPolicy::default(),
        }
    }
}

/// Judge API client (blocking).
#[derive(Clone)]
pub struct JudgeClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    host: Option<String>,
    poll: PollPolicy,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct StatusBody {
    id: u32,
}

#[derive(Deserialize)]
struct SubmissionBody {
    status: StatusBody,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    #[serde(default)]
    message: Option<String>,
    /// The judge reports seconds as a decimal string ("0.002")
    #[serde(default)]
    time: Option<serde_json::Value>,
    #[serde(default)]
    memory: Option<u64>,
}

impl From<SubmissionBody> for Submission {
    fn from(body: SubmissionBody) -> Self {
        Self {
            status: SubmissionStatus::from_id(body.status.id),
            stdout: body.stdout,
            stderr: body.stderr,
            compile_output: body.compile_output,
            message: body.message,
            time: body.time.as_ref().and_then(parse_seconds),
            memory: body.memory,
        }
    }
}

fn parse_seconds(value: &serde_json::Value) -> Option<f64> {
    value.as_f64().or_else(|| value.as_str()?.trim().parse().ok())
}

impl JudgeClient {
    pub fn new(config: JudgeClientConfig) -> Result<Self, JudgeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("codenest/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| JudgeError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            host: config.host,
            poll: config.poll,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn with_vendor_headers(&self, mut req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        if let Some(ref key) = self.api_key {
            req = req.header(KEY_HEADER, key);
        }
        if let Some(ref host) = self.host {
            req = req.header(HOST_HEADER, host);
        }
        req
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, JudgeError> {
        let response = self
            .with_vendor_headers(req)
            .send()
            .map_err(|e| JudgeError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            log::debug!("Judge request failed: HTTP {} {}", status, body);
            return Err(JudgeError::Http(status, body));
        }
        Ok(response)
    }
}

impl SubmissionBackend for JudgeClient {
    fn submit_code(&self, source: &str, language: &str, stdin: Option<&str>) -> Result<SubmissionToken, JudgeError> {
        let language_id = language_id(language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(language.to_string()))?;

        let url = format!("{}/submissions", self.base_url);
        let body = serde_json::json!({
            "source_code": source,
            "language_id": language_id,
            "stdin": stdin.unwrap_or(""),
        });
        let req = self
            .http
            .post(&url)
            .query(&[("base64_encoded", "false"), ("wait", "false")])
            .json(&body);

        let resp: TokenResponse = self
            .send(req)?
            .json()
            .map_err(|e| JudgeError::Parse(e.to_string()))?;
        Ok(SubmissionToken(resp.token))
    }

    fn get_submission_result(&self, token: &SubmissionToken) -> Result<Submission, JudgeError> {
        let url = format!("{}/submissions/{}", self.base_url, token);
        let req = self
            .http
            .get(&url)
            .query(&[("base64_encoded", "false"), ("fields", RESULT_FIELDS)]);

        let body: SubmissionBody = self
            .send(req)?
            .json()
            .map_err(|e| JudgeError::Parse(e.to_string()))?;
        Ok(body.into())
    }

    fn poll_policy(&self) -> PollPolicy {
        self.poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds(&json!("0.002")), Some(0.002));
        assert_eq!(parse_seconds(&json!(1.5)), Some(1.5));
        assert_eq!(parse_seconds(&json!("n/a")), None);
        assert_eq!(parse_seconds(&json!(null)), None);
    }

    #[test]
    fn test_submission_body_mapping() {
        let body: SubmissionBody = serde_json::from_value(json!({
            "token": "abc",
            "status": {"id": 6, "description": "Compilation Error"},
            "stdout": null,
            "compile_output": "error",
            "time": null,
            "memory": null
        }))
        .unwrap();
        let sub = Submission::from(body);
        assert_eq!(sub.status, SubmissionStatus::CompilationError);
        assert_eq!(sub.compile_output.as_deref(), Some("error"));
        assert_eq!(sub.time, None);
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = JudgeClient::new(JudgeClientConfig::new("http://judge.local/")).unwrap();
        assert_eq!(client.base_url(), "http://judge.local");
    }
}
