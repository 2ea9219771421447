//! Submit → poll → normalize.
//!
//! The loop lives on [`SubmissionBackend`] as a provided method so any
//! backend (the HTTP client, a test double) gets identical polling behaviour.

use std::fmt;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::SubmissionStatus;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Execution did not finish after {attempts} polls (last status: {last_status})")]
    PollTimeout {
        attempts: u32,
        last_status: SubmissionStatus,
    },
}

/// Opaque submission token issued by the judge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionToken(pub String);

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw submission state from one status fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub status: SubmissionStatus,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    /// Seconds
    pub time: Option<f64>,
    /// Kilobytes
    pub memory: Option<u64>,
}

impl Submission {
    /// A submission with only a status set
    pub fn with_status(status: SubmissionStatus) -> Self {
        Self {
            status,
            stdout: None,
            stderr: None,
            compile_output: None,
            message: None,
            time: None,
            memory: None,
        }
    }
}

/// Normalized outcome of a finished execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub status: SubmissionStatus,
    pub output: String,
    pub error: Option<String>,
    /// Seconds
    pub execution_time: Option<f64>,
    /// Kilobytes
    pub memory_usage: Option<u64>,
}

impl From<Submission> for ExecutionResult {
    fn from(sub: Submission) -> Self {
        let error = [sub.stderr, sub.compile_output, sub.message]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty());
        Self {
            success: sub.status.is_success(),
            status: sub.status,
            output: sub.stdout.unwrap_or_default(),
            error,
            execution_time: sub.time,
            memory_usage: sub.memory,
        }
    }
}

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1), max_attempts: 30 }
    }
}

pub trait SubmissionBackend {
    /// Submit source for execution. `language` is an editor language name.
    fn submit_code(&self, source: &str, language: &str, stdin: Option<&str>) -> Result<SubmissionToken, JudgeError>;

    /// One-shot status fetch
    fn get_submission_result(&self, token: &SubmissionToken) -> Result<Submission, JudgeError>;

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Submit, then poll until the job leaves the queued/processing states.
    ///
    /// Running out of attempts is reported as [`JudgeError::PollTimeout`]
    /// rather than handing back a result that is still pending.
    fn execute_code(&self, source: &str, language: &str, stdin: Option<&str>) -> Result<ExecutionResult, JudgeError> {
        let token = self.submit_code(source, language, stdin)?;
        let policy = self.poll_policy();
        let mut last_status = SubmissionStatus::InQueue;

        for attempt in 1..=policy.max_attempts {
            self.sleep(policy.interval);
            let submission = self.get_submission_result(&token)?;
            log::debug!("Submission {} poll {}: {}", token, attempt, submission.status);
            if !submission.status.is_pending() {
                return Ok(submission.into());
            }
            last_status = submission.status;
        }

        Err(JudgeError::PollTimeout { attempts: policy.max_attempts, last_status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays a fixed sequence of poll results
    struct Scripted {
        polls: RefCell<VecDeque<Submission>>,
        fetches: Cell<u32>,
        sleeps: Cell<u32>,
        policy: PollPolicy,
    }

    impl Scripted {
        fn new(polls: Vec<Submission>, max_attempts: u32) -> Self {
            Self {
                polls: RefCell::new(polls.into()),
                fetches: Cell::new(0),
                sleeps: Cell::new(0),
                policy: PollPolicy { interval: Duration::from_millis(1), max_attempts },
            }
        }
    }

    impl SubmissionBackend for Scripted {
        fn submit_code(&self, _source: &str, language: &str, _stdin: Option<&str>) -> Result<SubmissionToken, JudgeError> {
            crate::languages::language_id(language)
                .ok_or_else(|| JudgeError::UnsupportedLanguage(language.to_string()))?;
            Ok(SubmissionToken("tok-1".into()))
        }

        fn get_submission_result(&self, _token: &SubmissionToken) -> Result<Submission, JudgeError> {
            self.fetches.set(self.fetches.get() + 1);
            let next = self.polls.borrow_mut().pop_front();
            Ok(next.unwrap_or_else(|| Submission::with_status(SubmissionStatus::Processing)))
        }

        fn poll_policy(&self) -> PollPolicy {
            self.policy
        }

        fn sleep(&self, _duration: Duration) {
            self.sleeps.set(self.sleeps.get() + 1);
        }
    }

    #[test]
    fn test_accepted_on_third_poll() {
        let accepted = Submission {
            stdout: Some("Hello, World!\n".into()),
            time: Some(0.004),
            memory: Some(3200),
            ..Submission::with_status(SubmissionStatus::Accepted)
        };
        let backend = Scripted::new(
            vec![
                Submission::with_status(SubmissionStatus::InQueue),
                Submission::with_status(SubmissionStatus::Processing),
                accepted,
            ],
            30,
        );

        let result = backend.execute_code("print('Hello, World!')", "python", None).unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Hello, World!\n");
        assert_eq!(result.status, SubmissionStatus::Accepted);
        assert_eq!(result.error, None);
        assert_eq!(result.execution_time, Some(0.004));
        assert_eq!(result.memory_usage, Some(3200));
        assert_eq!(backend.fetches.get(), 3);
        assert_eq!(backend.sleeps.get(), 3);
    }

    #[test]
    fn test_exhausted_polls_is_timeout() {
        let backend = Scripted::new(vec![], 4);
        let err = backend.execute_code("loop {}", "rust", None).unwrap_err();
        match err {
            JudgeError::PollTimeout { attempts, last_status } => {
                assert_eq!(attempts, 4);
                assert_eq!(last_status, SubmissionStatus::Processing);
            }
            other => panic!("expected PollTimeout, got {:?}", other),
        }
        assert_eq!(backend.fetches.get(), 4);
    }

    #[test]
    fn test_unsupported_language_never_polls() {
        let backend = Scripted::new(vec![], 30);
        let err = backend.execute_code("x", "not-a-real-language", None).unwrap_err();
        assert!(matches!(err, JudgeError::UnsupportedLanguage(ref l) if l == "not-a-real-language"));
        assert_eq!(backend.fetches.get(), 0);
    }

    #[test]
    fn test_compile_error_normalization() {
        let sub = Submission {
            stderr: Some("   ".into()),
            compile_output: Some("main.c:1: error: expected ';'".into()),
            message: Some("Exited with error status 1".into()),
            ..Submission::with_status(SubmissionStatus::CompilationError)
        };
        let result = ExecutionResult::from(sub);
        assert!(!result.success);
        assert_eq!(result.output, "");
        assert_eq!(result.error.as_deref(), Some("main.c:1: error: expected ';'"));
    }

    #[test]
    fn test_result_json_shape() {
        let result = ExecutionResult::from(Submission {
            stdout: Some("42\n".into()),
            ..Submission::with_status(SubmissionStatus::Accepted)
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["output"], "42\n");
        assert_eq!(json["status"]["id"], 3);
        assert!(json.get("executionTime").is_some());
        assert!(json.get("memoryUsage").is_some());
    }
}
