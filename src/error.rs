// Error types for the fitness coach engine
//
// This module defines custom error types for pose-frame decoding and session
// management, providing structured error handling with error codes suitable
// for the HTTP service layer.
//
// Per-frame analysis conditions (no person, low keypoint confidence,
// degenerate joint geometry) are NOT errors: the counters represent them as
// sentinel states and keep running. The enums here cover the cases where a
// request or shared-state access genuinely cannot proceed.

use log::error;
use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the service boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a session error with structured context
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=SessionStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Pose-frame decoding errors
///
/// These cover malformed keypoint payloads handed to the engine by the
/// service layer. A well-formed frame has exactly 17 `[x, y, confidence]`
/// rows with finite coordinates.
///
/// Error code ranges: 1001-1002
#[derive(Debug, Clone, PartialEq)]
pub enum PoseError {
    /// Keypoint array has the wrong number of joints
    MalformedFrame { expected: usize, got: usize },

    /// A keypoint row contains a non-finite coordinate or confidence
    NonFiniteValue { index: usize },
}

impl ErrorCode for PoseError {
    fn code(&self) -> i32 {
        match self {
            PoseError::MalformedFrame { .. } => 1001,
            PoseError::NonFiniteValue { .. } => 1002,
        }
    }

    fn message(&self) -> String {
        match self {
            PoseError::MalformedFrame { expected, got } => {
                format!("Keypoint frame must have {} joints (got {})", expected, got)
            }
            PoseError::NonFiniteValue { index } => {
                format!("Keypoint {} contains a non-finite value", index)
            }
        }
    }
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoseError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PoseError {}

/// Session management errors
///
/// These cover session-store operations: lock health and lookups of
/// sessions that were never created.
///
/// Error code ranges: 2001-2002
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Mutex guarding shared session state was poisoned
    LockPoisoned { component: String },

    /// No session exists for the requested id
    UnknownSession { id: String },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::LockPoisoned { .. } => 2001,
            SessionError::UnknownSession { .. } => 2002,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::LockPoisoned { component } => {
                format!("Lock poisoned for component: {}", component)
            }
            SessionError::UnknownSession { id } => {
                format!("No workout session exists for id '{}'", id)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_error_codes() {
        assert_eq!(
            PoseError::MalformedFrame {
                expected: 17,
                got: 4
            }
            .code(),
            1001
        );
        assert_eq!(PoseError::NonFiniteValue { index: 3 }.code(), 1002);
    }

    #[test]
    fn test_session_error_codes() {
        assert_eq!(
            SessionError::LockPoisoned {
                component: "SessionStore".to_string()
            }
            .code(),
            2001
        );
        assert_eq!(
            SessionError::UnknownSession {
                id: "default".to_string()
            }
            .code(),
            2002
        );
    }

    #[test]
    fn test_pose_error_display() {
        let err = PoseError::MalformedFrame {
            expected: 17,
            got: 12,
        };
        assert!(err.message().contains("17"));
        assert!(err.message().contains("12"));

        let err = PoseError::NonFiniteValue { index: 9 };
        assert!(err.message().contains("9"));
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::UnknownSession {
            id: "abc".to_string(),
        };
        assert!(err.message().contains("abc"));
    }

    #[test]
    fn test_error_code_trait() {
        let pose_err: &dyn ErrorCode = &PoseError::NonFiniteValue { index: 0 };
        assert_eq!(pose_err.code(), 1002);

        let session_err: &dyn ErrorCode = &SessionError::UnknownSession {
            id: "x".to_string(),
        };
        assert_eq!(session_err.code(), 2002);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), SessionError> {
            Err(SessionError::UnknownSession {
                id: "missing".to_string(),
            })
        }

        fn caller() -> Result<(), SessionError> {
            may_fail()?;
            Ok(())
        }

        assert!(caller().is_err());
    }
}
