use serde::{Deserialize, Serialize};

use crate::anchor::select_anchor;
use crate::civil::{regulator_calendar, CivilCalendar};
use crate::deadline::calculate_deadlines;
use crate::domain::{
    ClassificationResult, DeadlineSet, Disambiguation, IncidentFacts, CALCULATION_CONFIDENCE,
};
use crate::error::ClassificationError;
use crate::severity::{classify_severity, RULE_TABLE_VERSION};

/// Complete output of one classification request.
///
/// `deadlines` is `None` exactly when `result.severity` is `NoReport`: no
/// notification obligation, no deadline math.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    pub deadlines: Option<DeadlineSet>,
}

/// Classify an incident and compute its notification deadlines.
///
/// Composition root: anchor selection → anchor resolution in `calendar` →
/// severity classification → deadline projection. Pure over its arguments;
/// identical inputs (including the disambiguation choice) yield byte-identical
/// serialized output, which the evidence ledger and duplicate detection rely
/// on. `disambiguation` applies when the anchor falls inside a civil-time
/// overlap; left unset, the earlier occurrence is used and recorded in
/// `result.anchor_ambiguity`.
pub fn classify(
    calendar: &CivilCalendar,
    facts: &IncidentFacts,
    disambiguation: Option<Disambiguation>,
) -> Result<Classification, ClassificationError> {
    let (anchor_local, anchor_source) = select_anchor(facts)?;
    let resolved = calendar
        .resolve(anchor_local, disambiguation)
        .map_err(ClassificationError::from_anchor_clock)?;

    let (severity, matched_criteria) = classify_severity(facts);
    let deadlines = calculate_deadlines(calendar, resolved.instant, severity)?;

    Ok(Classification {
        result: ClassificationResult {
            severity,
            matched_criteria,
            anchor_instant: resolved.instant,
            anchor_source,
            anchor_ambiguity: resolved.ambiguity,
            rule_table_version: RULE_TABLE_VERSION,
            confidence: CALCULATION_CONFIDENCE,
        },
        deadlines,
    })
}

/// [`classify`] against the process-wide regulator calendar.
pub fn classify_with_regulator_calendar(
    facts: &IncidentFacts,
    disambiguation: Option<Disambiguation>,
) -> Result<Classification, ClassificationError> {
    classify(regulator_calendar(), facts, disambiguation)
}
