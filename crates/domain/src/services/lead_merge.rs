//! Rules for merging a repeated submission into an existing lead.

use crate::models::{Lead, LeadSubmission};

/// Field values written when a known email submits again.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadMerge {
    pub name: String,
    pub phone: Option<String>,
    pub source: String,
    pub tool_result: serde_json::Value,
    pub tags: Vec<String>,
}

/// Tags for a lead created from `submission`.
pub fn initial_tags(submission: &LeadSubmission) -> Vec<String> {
    vec![submission.source.clone()]
}

/// Latest submission wins for name, source and result. The phone number is
/// only replaced when a new one was given, and the source tag is appended once.
pub fn merge(existing: &Lead, submission: &LeadSubmission) -> LeadMerge {
    let mut tags = existing.tags.clone();
    if !tags.iter().any(|t| t == &submission.source) {
        tags.push(submission.source.clone());
    }

    LeadMerge {
        name: submission.name.clone(),
        phone: submission.phone.clone().or_else(|| existing.phone.clone()),
        source: submission.source.clone(),
        tool_result: submission.tool_result.clone(),
        tags,
    }
}
