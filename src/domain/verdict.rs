//! Validation outcomes.
//!
//! A rejection is a normal outcome, not an error. The reason exists only so
//! callers and logs can tell an empty submission from a stale or forged one.

use std::fmt;

/// Which window a presented token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptPath {
    /// Matched the current window's token
    Current,
    /// Matched the previous window's token during the grace period
    Grace,
}

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing was presented (empty or whitespace only)
    EmptyToken,
    /// Matched neither the current window nor, when eligible, the previous one
    WindowMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyToken => write!(f, "token is empty"),
            RejectReason::WindowMismatch => {
                write!(f, "token does not match the current rotation window")
            }
        }
    }
}

/// Result of checking a presented token.
///
/// # Example
/// ```
/// use timeclock_token::{AcceptPath, RejectReason, Verdict};
///
/// assert!(Verdict::Accept(AcceptPath::Grace).is_accept());
/// assert!(Verdict::Reject(RejectReason::EmptyToken).is_reject());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The token is valid right now
    Accept(AcceptPath),
    /// The token is not valid right now
    Reject(RejectReason),
}

impl Verdict {
    /// Check if this verdict accepts the token.
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept(_))
    }

    /// Check if this verdict rejects the token.
    pub fn is_reject(&self) -> bool {
        matches!(self, Verdict::Reject(_))
    }

    /// The rejection reason, if any.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Verdict::Reject(reason) => Some(*reason),
            Verdict::Accept(_) => None,
        }
    }
}

impl From<Verdict> for bool {
    fn from(verdict: Verdict) -> bool {
        verdict.is_accept()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_predicates() {
        let current = Verdict::Accept(AcceptPath::Current);
        let grace = Verdict::Accept(AcceptPath::Grace);
        let empty = Verdict::Reject(RejectReason::EmptyToken);
        let mismatch = Verdict::Reject(RejectReason::WindowMismatch);

        assert!(current.is_accept() && grace.is_accept());
        assert!(empty.is_reject() && mismatch.is_reject());
        assert_eq!(current.reject_reason(), None);
        assert_eq!(mismatch.reject_reason(), Some(RejectReason::WindowMismatch));
        assert!(bool::from(grace));
        assert!(!bool::from(empty));
    }
}
