//! Run lifecycle errors

use std::fmt;

use crate::domain::error::DomainError;

/// Errors raised by run state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Attempted transition the state machine does not allow
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },
}

impl RunError {
    pub fn invalid_transition(from: &str, to: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid run transition from '{}' to '{}': {}",
                    from, to, reason
                )
            }
        }
    }
}

impl std::error::Error for RunError {}

impl From<RunError> for DomainError {
    fn from(err: RunError) -> Self {
        DomainError::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RunError::invalid_transition("done", "running", "run is terminal");
        assert!(err.to_string().contains("Invalid run transition"));
        assert!(err.to_string().contains("'done' to 'running'"));
    }
}
