use crate::domain::{IncidentFacts, Severity};

/// Version of the threshold table below. Bump on any threshold change so
/// persisted results remain attributable to the rules that produced them.
pub const RULE_TABLE_VERSION: u32 = 1;

/// One named classification rule.
///
/// The table is data; the evaluation loop in [`classify_severity`] is fixed.
/// Threshold changes are edits to the table (auditable diffs), never to the
/// evaluator.
pub struct SeverityRule {
    pub name: &'static str,
    pub tier: Severity,
    predicate: fn(&IncidentFacts) -> bool,
}

impl SeverityRule {
    pub fn matches(&self, facts: &IncidentFacts) -> bool {
        (self.predicate)(facts)
    }
}

fn major_critical_service_outage(f: &IncidentFacts) -> bool {
    f.downtime_minutes >= 60 && !f.critical_services_affected.is_empty()
}

fn major_mass_client_impact(f: &IncidentFacts) -> bool {
    f.clients_affected >= 1000
}

fn major_payment_disruption(f: &IncidentFacts) -> bool {
    f.critical_services_affected.contains("payment") && f.downtime_minutes >= 30
}

fn significant_client_band(f: &IncidentFacts) -> bool {
    (100..1000).contains(&f.clients_affected)
}

fn significant_critical_service_degradation(f: &IncidentFacts) -> bool {
    (15..60).contains(&f.downtime_minutes) && !f.critical_services_affected.is_empty()
}

const RULE_TABLE: &[SeverityRule] = &[
    SeverityRule {
        name: "major_critical_service_outage",
        tier: Severity::Major,
        predicate: major_critical_service_outage,
    },
    SeverityRule {
        name: "major_mass_client_impact",
        tier: Severity::Major,
        predicate: major_mass_client_impact,
    },
    SeverityRule {
        name: "major_payment_disruption",
        tier: Severity::Major,
        predicate: major_payment_disruption,
    },
    SeverityRule {
        name: "significant_client_band",
        tier: Severity::Significant,
        predicate: significant_client_band,
    },
    SeverityRule {
        name: "significant_critical_service_degradation",
        tier: Severity::Significant,
        predicate: significant_critical_service_degradation,
    },
];

/// The threshold table in evaluation order.
pub fn rule_table() -> &'static [SeverityRule] {
    RULE_TABLE
}

/// Evaluate every rule and return the highest matched tier plus the names of
/// all matching rules in table order.
///
/// Contract:
/// - Total over all well-formed facts; never fails.
/// - When multiple tiers match, the higher severity wins.
/// - The matched list is non-empty exactly when the result is above
///   `NoReport` (every table entry sits above that tier).
pub fn classify_severity(facts: &IncidentFacts) -> (Severity, Vec<String>) {
    let mut severity = Severity::NoReport;
    let mut matched = Vec::new();
    for rule in RULE_TABLE {
        if rule.matches(facts) {
            matched.push(rule.name.to_string());
            if rule.tier > severity {
                severity = rule.tier;
            }
        }
    }
    (severity, matched)
}
