use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::civil::CivilCalendar;
use crate::domain::{DeadlineKind, DeadlineSet, Disambiguation, Severity};
use crate::error::ClassificationError;

/// Notification offsets for one severity tier, counted from the anchor.
///
/// Hours are wall-clock hours in the regulator's calendar; days are calendar
/// days (same local time-of-day N days later).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineOffsets {
    pub initial_hours: i64,
    pub intermediate_hours: Option<i64>,
    pub final_days: i64,
}

/// The regulatory offset table. `NoReport` carries no notification obligation.
pub fn offsets_for(severity: Severity) -> Option<DeadlineOffsets> {
    match severity {
        Severity::Major => Some(DeadlineOffsets {
            initial_hours: 4,
            intermediate_hours: Some(72),
            final_days: 14,
        }),
        Severity::Significant | Severity::Minor => Some(DeadlineOffsets {
            initial_hours: 24,
            intermediate_hours: None,
            final_days: 14,
        }),
        Severity::NoReport => None,
    }
}

/// Resolve one wall-clock deadline target back to an absolute instant.
///
/// Overlap targets take the earlier occurrence (the conservative reading of a
/// repeated hour for a legal deadline); gap targets propagate as
/// `DEADLINE_COMPUTATION_FAILED` with the suggestion attached, never adjusted
/// here.
fn project(
    calendar: &CivilCalendar,
    severity: Severity,
    deadline: DeadlineKind,
    target_local: PrimitiveDateTime,
) -> Result<OffsetDateTime, ClassificationError> {
    calendar
        .resolve(target_local, Some(Disambiguation::Earlier))
        .map(|resolved| resolved.instant)
        .map_err(|err| ClassificationError::from_deadline_clock(severity, deadline, err))
}

/// Compute the deadline set for `(anchor, severity)`.
///
/// Contract:
/// - Hour-scale offsets land N local wall-clock hours after the anchor's
///   local time; day-scale offsets land at the same local time-of-day N
///   calendar days later. Naive instant arithmetic would drift by an hour
///   whenever a transition falls inside the window.
/// - `transitions_crossed` reports every transition in `(anchor, final]`.
/// - Returns `Ok(None)` for `NoReport`.
pub fn calculate_deadlines(
    calendar: &CivilCalendar,
    anchor: OffsetDateTime,
    severity: Severity,
) -> Result<Option<DeadlineSet>, ClassificationError> {
    let Some(offsets) = offsets_for(severity) else {
        return Ok(None);
    };
    let anchor_local = calendar.to_local(anchor);

    let initial_notification = project(
        calendar,
        severity,
        DeadlineKind::InitialNotification,
        anchor_local + Duration::hours(offsets.initial_hours),
    )?;
    let intermediate_report = match offsets.intermediate_hours {
        Some(hours) => Some(project(
            calendar,
            severity,
            DeadlineKind::IntermediateReport,
            anchor_local + Duration::hours(hours),
        )?),
        None => None,
    };
    let final_report = project(
        calendar,
        severity,
        DeadlineKind::FinalReport,
        anchor_local + Duration::days(offsets.final_days),
    )?;

    let transitions_crossed: Vec<String> = calendar
        .transitions_between(anchor, final_report)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    if !transitions_crossed.is_empty() {
        tracing::debug!(
            severity = %severity,
            ?transitions_crossed,
            "deadline window crosses civil-time transitions"
        );
    }

    Ok(Some(DeadlineSet {
        severity,
        initial_notification,
        intermediate_report,
        final_report,
        display_time_zone: calendar.name().to_string(),
        transitions_crossed,
    }))
}
