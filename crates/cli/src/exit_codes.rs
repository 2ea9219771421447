//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 1       | Universal  | General error (unspecified)              |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 3-9     | local      | Config and device storage                |
//! | 10-19   | auth       | Backend auth and account calls           |
//! | 20-29   | run        | Remote execution                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use codenest_api_client::ApiError;
use codenest_judge_client::JudgeError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local (3-9)
// =============================================================================

/// Config file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 3;

/// Device storage could not be read or written.
pub const EXIT_STORAGE: u8 = 4;

/// Setting key, group or value rejected.
pub const EXIT_INVALID_SETTING: u8 = 5;

// =============================================================================
// Auth (10-19)
// =============================================================================

/// No stored session for a command that needs one.
pub const EXIT_NOT_AUTH: u8 = 10;

/// Server rejected the credentials or token (401).
pub const EXIT_AUTH_REJECTED: u8 = 11;

/// Server refused the request with a message (4xx/5xx).
pub const EXIT_API_SERVER: u8 = 12;

/// Backend unreachable or returned something unparseable.
pub const EXIT_API_NETWORK: u8 = 13;

// =============================================================================
// Run (20-29)
// =============================================================================

/// Program ran but did not finish with Accepted.
pub const EXIT_RUN_FAILED: u8 = 20;

/// No judge language for the file or `--language`.
pub const EXIT_RUN_UNSUPPORTED: u8 = 21;

/// Still queued or processing after the last poll.
pub const EXIT_RUN_TIMEOUT: u8 = 22;

/// Judge unreachable or returned an HTTP error.
pub const EXIT_RUN_JUDGE: u8 = 23;

/// Map an ApiError to its exit code.
pub fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::NotAuthenticated => EXIT_NOT_AUTH,
        ApiError::Unauthorized(_) => EXIT_AUTH_REJECTED,
        ApiError::Server { .. } => EXIT_API_SERVER,
        ApiError::Network(_) | ApiError::Parse(_) => EXIT_API_NETWORK,
        ApiError::Storage(_) => EXIT_STORAGE,
        ApiError::InvalidRequest(_) => EXIT_USAGE,
    }
}

/// Map a JudgeError to its exit code.
pub fn judge_exit_code(err: &JudgeError) -> u8 {
    match err {
        JudgeError::UnsupportedLanguage(_) => EXIT_RUN_UNSUPPORTED,
        JudgeError::PollTimeout { .. } => EXIT_RUN_TIMEOUT,
        JudgeError::Network(_) | JudgeError::Http(..) | JudgeError::Parse(_) => EXIT_RUN_JUDGE,
    }
}
