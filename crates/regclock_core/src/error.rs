use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::domain::{DeadlineKind, Severity};

/// Failure raised by the civil-time resolver.
///
/// Ambiguous (overlap) local times are not errors: the resolver applies the
/// `earlier` default and records it. Only non-existent (gap) times fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockError {
    /// The requested local time falls inside a forward-transition gap.
    /// `suggested` is the first valid instant after the gap; the resolver
    /// never rounds on its own.
    NonExistentLocalTime {
        requested: PrimitiveDateTime,
        #[serde(with = "time::serde::rfc3339")]
        suggested: OffsetDateTime,
        transition: String,
    },
}

impl ClockError {
    pub fn code(&self) -> &'static str {
        match self {
            ClockError::NonExistentLocalTime { .. } => "NON_EXISTENT_LOCAL_TIME",
        }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::NonExistentLocalTime {
                requested,
                suggested,
                transition,
            } => write!(
                f,
                "[{}] local time {requested} does not exist (transition {transition}); \
                 nearest valid instant is {suggested}",
                self.code()
            ),
        }
    }
}

impl std::error::Error for ClockError {}

/// Every way a classification request can fail.
///
/// All variants are plain inspectable values: a failed classification is
/// itself an auditable event and must serialize cleanly. Nothing here is
/// retried internally and nothing panics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationError {
    /// None of the three candidate anchor timestamps was supplied.
    MissingAnchorTimestamp,
    /// The supplied anchor falls inside a civil-time gap.
    NonExistentLocalTime {
        requested: PrimitiveDateTime,
        #[serde(with = "time::serde::rfc3339")]
        suggested: OffsetDateTime,
        transition: String,
    },
    /// A projected deadline target fell inside a civil-time gap. Carries the
    /// originating local target and the deadline being computed; the
    /// calculator never corrects this silently.
    DeadlineComputationFailed {
        severity: Severity,
        deadline: DeadlineKind,
        requested: PrimitiveDateTime,
        #[serde(with = "time::serde::rfc3339")]
        suggested: OffsetDateTime,
        transition: String,
    },
}

impl ClassificationError {
    pub fn code(&self) -> &'static str {
        match self {
            ClassificationError::MissingAnchorTimestamp => "MISSING_ANCHOR_TIMESTAMP",
            ClassificationError::NonExistentLocalTime { .. } => "NON_EXISTENT_LOCAL_TIME",
            ClassificationError::DeadlineComputationFailed { .. } => "DEADLINE_COMPUTATION_FAILED",
        }
    }

    /// Lift a resolver failure on the anchor itself.
    pub fn from_anchor_clock(err: ClockError) -> Self {
        match err {
            ClockError::NonExistentLocalTime {
                requested,
                suggested,
                transition,
            } => ClassificationError::NonExistentLocalTime {
                requested,
                suggested,
                transition,
            },
        }
    }

    /// Lift a resolver failure hit while projecting a deadline target.
    pub fn from_deadline_clock(severity: Severity, deadline: DeadlineKind, err: ClockError) -> Self {
        match err {
            ClockError::NonExistentLocalTime {
                requested,
                suggested,
                transition,
            } => ClassificationError::DeadlineComputationFailed {
                severity,
                deadline,
                requested,
                suggested,
                transition,
            },
        }
    }
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::MissingAnchorTimestamp => write!(
                f,
                "[{}] none of detected_at, confirmed_at, occurred_at supplied",
                self.code()
            ),
            ClassificationError::NonExistentLocalTime {
                requested,
                suggested,
                transition,
            } => write!(
                f,
                "[{}] anchor {requested} does not exist (transition {transition}); \
                 nearest valid instant is {suggested}",
                self.code()
            ),
            ClassificationError::DeadlineComputationFailed {
                severity,
                deadline,
                requested,
                suggested,
                transition,
            } => write!(
                f,
                "[{}] {} target {requested} for {} severity does not exist \
                 (transition {transition}); nearest valid instant is {suggested}",
                self.code(),
                deadline.as_str(),
                severity.as_str()
            ),
        }
    }
}

impl std::error::Error for ClassificationError {}
