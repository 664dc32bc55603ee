use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Fixed confidence reported on every classification.
///
/// The value never varies: it signals "deterministic rule evaluation, not a
/// probabilistic estimate" to downstream consumers (export, ledger). Exporters
/// must refuse any result where this is not exactly 1.0.
pub const CALCULATION_CONFIDENCE: f64 = 1.0;

/// Immutable incident facts supplied by the persistence collaborator.
///
/// Notes:
/// - Timestamps are naive local civil times in the regulator's calendar; the
///   engine resolves them to absolute instants, never the caller.
/// - `critical_services_affected` is a `BTreeSet` so serialization order (and
///   therefore the evidence fingerprint) is deterministic.
/// - At least one of the three timestamps must be present or classification
///   fails with `MISSING_ANCHOR_TIMESTAMP`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentFacts {
    pub clients_affected: u32,
    pub downtime_minutes: u32,
    pub critical_services_affected: BTreeSet<String>,
    pub detected_at: Option<PrimitiveDateTime>,
    pub confirmed_at: Option<PrimitiveDateTime>,
    pub occurred_at: Option<PrimitiveDateTime>,
}

/// Regulatory severity tiers, ordered by reporting weight.
///
/// The classifier only ever produces `NoReport`, `Significant` or `Major`;
/// `Minor` exists so a downstream business-policy promotion can still request
/// deadlines for it.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    NoReport,
    Minor,
    Significant,
    Major,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::NoReport => "no_report",
            Severity::Minor => "minor",
            Severity::Significant => "significant",
            Severity::Major => "major",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which incident field the anchor timestamp was taken from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    DetectedAt,
    ConfirmedAt,
    OccurredAt,
}

impl AnchorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorSource::DetectedAt => "detected_at",
            AnchorSource::ConfirmedAt => "confirmed_at",
            AnchorSource::OccurredAt => "occurred_at",
        }
    }
}

/// Caller choice between the two absolute instants of an overlapped local time.
///
/// There is deliberately no `Default` impl: when the caller supplies nothing
/// the resolver applies `Earlier` itself and records that it did so.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Disambiguation {
    Earlier,
    Later,
}

/// Audit record of how an ambiguous (overlap) local time was resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmbiguityNote {
    /// Identifier of the backward transition that caused the overlap.
    pub transition: String,
    pub chosen: Disambiguation,
    /// True when the caller supplied no choice and the `earlier` policy applied.
    pub defaulted: bool,
}

/// Which deadline of the set was being projected when a computation failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    InitialNotification,
    IntermediateReport,
    FinalReport,
}

impl DeadlineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineKind::InitialNotification => "initial_notification",
            DeadlineKind::IntermediateReport => "intermediate_report",
            DeadlineKind::FinalReport => "final_report",
        }
    }
}

/// Outcome of severity classification plus the anchor audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub severity: Severity,
    /// Names of every rule that matched, in rule-table order.
    /// Non-empty exactly when `severity` is above `NoReport`.
    pub matched_criteria: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub anchor_instant: OffsetDateTime,
    pub anchor_source: AnchorSource,
    /// Present when the anchor fell inside a civil-time overlap.
    pub anchor_ambiguity: Option<AmbiguityNote>,
    pub rule_table_version: u32,
    /// Always [`CALCULATION_CONFIDENCE`].
    pub confidence: f64,
}

/// Absolute notification deadlines derived from `(anchor, severity)`.
///
/// Invariant: `anchor < initial_notification <= intermediate_report (when
/// present) < final_report`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineSet {
    pub severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub initial_notification: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub intermediate_report: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub final_report: OffsetDateTime,
    /// Name of the regulator's civil calendar the offsets were projected in.
    pub display_time_zone: String,
    /// Identifiers of every transition inside `(anchor, final_report]`,
    /// in chronological order. Empty when the window is transition-free.
    pub transitions_crossed: Vec<String>,
}
