//! Typed model for captured message profiles and the derivations the
//! dashboard is driven by.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

/// One profiling record: the message that was traced and the ordered
/// sequence of states it passed through.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfiledMessage {
    pub message: Message,
    pub states: Vec<StateVisit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Optional display name; rows without one are labeled by position.
    #[serde(default)]
    pub name: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateVisit {
    pub name: String,
}

/// Normalize the raw payload text into typed records, one per input row,
/// input order preserved. No filtering, no deduplication. A row missing
/// `message`, `states`, `message.tags`, or a state `name` fails the whole
/// parse; unknown extra fields are ignored.
pub fn parse_profiles(raw: &str) -> Result<Vec<ProfiledMessage>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Distinct tags across all records, first-seen order.
pub fn distinct_tags(profiles: &[ProfiledMessage]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    for profile in profiles {
        for tag in &profile.message.tags {
            if seen.insert(tag.as_str()) {
                tags.push(tag.clone());
            }
        }
    }

    tags
}

/// State name -> occurrence count over every state visit in the subset.
/// Recomputed from scratch on each orchestration pass.
pub fn state_counts(profiles: &[&ProfiledMessage]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();

    for profile in profiles {
        for state in &profile.states {
            *counts.entry(state.name.clone()).or_insert(0) += 1;
        }
    }

    counts
}

/// Row label shared by the history and timeline views: the message's own
/// name when it carries a non-blank one, otherwise its position.
pub fn display_label(profile: &ProfiledMessage, index: usize) -> String {
    match profile.message.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("message #{}", index + 1),
    }
}
