//! Judge submission status codes.

use serde::{Serialize, Serializer};

/// Vendor status enum (ids 1-14). Ids outside the table are kept as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeErrorSigsegv,
    RuntimeErrorSigxfsz,
    RuntimeErrorSigfpe,
    RuntimeErrorSigabrt,
    RuntimeErrorNzec,
    RuntimeErrorOther,
    InternalError,
    ExecFormatError,
    Unknown(u32),
}

impl SubmissionStatus {
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => Self::InQueue,
            2 => Self::Processing,
            3 => Self::Accepted,
            4 => Self::WrongAnswer,
            5 => Self::TimeLimitExceeded,
            6 => Self::CompilationError,
            7 => Self::RuntimeErrorSigsegv,
            8 => Self::RuntimeErrorSigxfsz,
            9 => Self::RuntimeErrorSigfpe,
            10 => Self::RuntimeErrorSigabrt,
            11 => Self::RuntimeErrorNzec,
            12 => Self::RuntimeErrorOther,
            13 => Self::InternalError,
            14 => Self::ExecFormatError,
            other => Self::Unknown(other),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::InQueue => 1,
            Self::Processing => 2,
            Self::Accepted => 3,
            Self::WrongAnswer => 4,
            Self::TimeLimitExceeded => 5,
            Self::CompilationError => 6,
            Self::RuntimeErrorSigsegv => 7,
            Self::RuntimeErrorSigxfsz => 8,
            Self::RuntimeErrorSigfpe => 9,
            Self::RuntimeErrorSigabrt => 10,
            Self::RuntimeErrorNzec => 11,
            Self::RuntimeErrorOther => 12,
            Self::InternalError => 13,
            Self::ExecFormatError => 14,
            Self::Unknown(id) => *id,
        }
    }

    /// Still queued or running
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::InQueue | Self::Processing)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(
            self,
            Self::RuntimeErrorSigsegv
                | Self::RuntimeErrorSigxfsz
                | Self::RuntimeErrorSigfpe
                | Self::RuntimeErrorSigabrt
                | Self::RuntimeErrorNzec
                | Self::RuntimeErrorOther
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InQueue => "In Queue",
            Self::Processing => "Processing",
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "Wrong Answer",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::CompilationError => "Compilation Error",
            Self::RuntimeErrorSigsegv => "Runtime Error (SIGSEGV)",
            Self::RuntimeErrorSigxfsz => "Runtime Error (SIGXFSZ)",
            Self::RuntimeErrorSigfpe => "Runtime Error (SIGFPE)",
            Self::RuntimeErrorSigabrt => "Runtime Error (SIGABRT)",
            Self::RuntimeErrorNzec => "Runtime Error (NZEC)",
            Self::RuntimeErrorOther => "Runtime Error (Other)",
            Self::InternalError => "Internal Error",
            Self::ExecFormatError => "Exec Format Error",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Serialized as `{ "id": 3, "description": "Accepted" }`, matching the vendor shape
impl Serialize for SubmissionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("SubmissionStatus", 2)?;
        s.serialize_field("id", &self.id())?;
        s.serialize_field("description", self.description())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for id in 1..=14 {
            assert_eq!(SubmissionStatus::from_id(id).id(), id);
        }
        assert_eq!(SubmissionStatus::from_id(99), SubmissionStatus::Unknown(99));
    }

    #[test]
    fn test_pending_and_success() {
        assert!(SubmissionStatus::InQueue.is_pending());
        assert!(SubmissionStatus::Processing.is_pending());
        assert!(!SubmissionStatus::Accepted.is_pending());
        assert!(SubmissionStatus::Accepted.is_success());
        assert!(!SubmissionStatus::WrongAnswer.is_success());
        assert!(SubmissionStatus::from_id(11).is_runtime_error());
        assert!(!SubmissionStatus::Unknown(42).is_pending());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(SubmissionStatus::TimeLimitExceeded).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "description": "Time Limit Exceeded"}));
    }
}
