use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{ClassificationResult, DeadlineSet, IncidentFacts};
use crate::engine::Classification;

/// The unit the evidence-ledger collaborator hash-chains: input facts plus
/// the full classification output, serialized in this fixed field order.
#[derive(Debug, Serialize)]
pub struct EvidenceUnit<'a> {
    pub facts: &'a IncidentFacts,
    pub result: &'a ClassificationResult,
    pub deadlines: Option<&'a DeadlineSet>,
}

impl<'a> EvidenceUnit<'a> {
    pub fn new(facts: &'a IncidentFacts, classification: &'a Classification) -> Self {
        Self {
            facts,
            result: &classification.result,
            deadlines: classification.deadlines.as_ref(),
        }
    }
}

/// Lowercase-hex SHA-256 over the unit's canonical JSON bytes.
///
/// This is the byte-identity surface of the determinism guarantee: two calls
/// with identical facts and disambiguation must produce identical
/// fingerprints, forever, independent of thread or process.
pub fn evidence_fingerprint(unit: &EvidenceUnit<'_>) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(unit)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
