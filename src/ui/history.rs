//! Message history: one row per visible record, in record order.

use crate::profile::{self, ProfiledMessage};
use crate::view::{Compose, HistoryBody, HistoryEntry, NodeBody, ViewNode};

pub const HISTORY_VIEW_ID: &str = "history-view";

/// Listing of the visible records: display label, tags, and the state path
/// the message walked.
#[derive(Debug)]
pub struct HistoryView {
    id: String,
    entries: Vec<HistoryEntry>,
}

impl HistoryView {
    pub fn new(id: impl Into<String>, visible: &[&ProfiledMessage]) -> Self {
        let entries = visible
            .iter()
            .enumerate()
            .map(|(index, record)| HistoryEntry {
                label: profile::display_label(record, index),
                tags: record.message.tags.clone(),
                path: record
                    .states
                    .iter()
                    .map(|visit| visit.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" → "),
            })
            .collect();

        Self {
            id: id.into(),
            entries,
        }
    }
}

impl Compose for HistoryView {
    fn compose(&self) -> ViewNode {
        ViewNode::new(
            self.id.clone(),
            NodeBody::History(HistoryBody {
                entries: self.entries.clone(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::profile::parse_profiles;

    #[test]
    fn entries_carry_label_tags_and_state_path() {
        let profiles = parse_profiles(
            r#"[
                {
                    "message": { "name": "checkout", "tags": ["web"] },
                    "states": [ { "name": "Received" }, { "name": "Charged" }, { "name": "Done" } ]
                }
            ]"#,
        )
        .expect("fixture should parse");
        let visible: Vec<_> = profiles.iter().collect();

        let node = HistoryView::new(HISTORY_VIEW_ID, &visible).compose();

        assert_eq!(node.id(), HISTORY_VIEW_ID);
        let NodeBody::History(body) = node.body() else {
            panic!("history view should compose a history body");
        };
        assert_eq!(body.entries.len(), 1);
        assert_eq!(body.entries[0].label, "checkout");
        assert_eq!(body.entries[0].tags, vec!["web"]);
        assert_eq!(body.entries[0].path, "Received → Charged → Done");
    }

    #[test]
    fn unnamed_records_are_labelled_by_position() {
        let profiles = parse_profiles(
            r#"[
                { "message": { "name": "first", "tags": [] }, "states": [] },
                { "message": { "tags": [] }, "states": [] }
            ]"#,
        )
        .expect("fixture should parse");
        let visible: Vec<_> = profiles.iter().collect();

        let node = HistoryView::new(HISTORY_VIEW_ID, &visible).compose();

        let NodeBody::History(body) = node.body() else {
            panic!("history view should compose a history body");
        };
        assert_eq!(body.entries[1].label, "message #2");
        assert_eq!(body.entries[1].path, "");
    }

    #[test]
    fn empty_subset_composes_an_empty_body() {
        let node = HistoryView::new(HISTORY_VIEW_ID, &[]).compose();

        let NodeBody::History(body) = node.body() else {
            panic!("history view should compose a history body");
        };
        assert!(body.entries.is_empty());
    }
}
