use time::PrimitiveDateTime;

use crate::domain::{AnchorSource, IncidentFacts};
use crate::error::ClassificationError;

/// Pick the single local timestamp all deadline math anchors on.
///
/// Priority: `detected_at` → `confirmed_at` → `occurred_at`; the first present
/// value wins, tagged with its source field. The selector never consults the
/// wall clock; reclassifying identical facts must pick an identical anchor.
pub fn select_anchor(
    facts: &IncidentFacts,
) -> Result<(PrimitiveDateTime, AnchorSource), ClassificationError> {
    if let Some(ts) = facts.detected_at {
        return Ok((ts, AnchorSource::DetectedAt));
    }
    if let Some(ts) = facts.confirmed_at {
        return Ok((ts, AnchorSource::ConfirmedAt));
    }
    if let Some(ts) = facts.occurred_at {
        return Ok((ts, AnchorSource::OccurredAt));
    }
    Err(ClassificationError::MissingAnchorTimestamp)
}
