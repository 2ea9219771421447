//! Remote code execution client.
//!
//! Single owner of the judge wire contract: language table, submit,
//! status fetch, and the submit-then-poll loop.
//!
//! No editor concepts. No retries. Blocking I/O only.

mod client;
mod execution;
mod languages;
mod status;

pub use client::{JudgeClient, JudgeClientConfig};
pub use execution::{
    ExecutionResult, JudgeError, PollPolicy, Submission, SubmissionBackend, SubmissionToken,
};
pub use languages::{find_language, language_for_extension, language_id, supported_languages, Language};
pub use status::SubmissionStatus;
