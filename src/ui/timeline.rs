//! Per-record timeline: each visible record as a lane of state visits.

use crate::profile::{self, ProfiledMessage};
use crate::view::{Compose, NodeBody, TimelineBody, TimelineRow, ViewNode};

pub const TIMELINE_VIEW_ID: &str = "timeline-view";

#[derive(Debug)]
pub struct TimelineView {
    id: String,
    rows: Vec<TimelineRow>,
}

impl TimelineView {
    pub fn new(id: impl Into<String>, visible: &[&ProfiledMessage]) -> Self {
        let rows = visible
            .iter()
            .enumerate()
            .map(|(index, record)| TimelineRow {
                label: profile::display_label(record, index),
                states: record
                    .states
                    .iter()
                    .map(|visit| visit.name.clone())
                    .collect(),
            })
            .collect();

        Self {
            id: id.into(),
            rows,
        }
    }
}

impl Compose for TimelineView {
    fn compose(&self) -> ViewNode {
        ViewNode::new(
            self.id.clone(),
            NodeBody::Timeline(TimelineBody {
                rows: self.rows.clone(),
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
    fn rows_keep_visit_order_per_record() {
        let profiles = parse_profiles(
            r#"[
                {
                    "message": { "name": "ingest", "tags": [] },
                    "states": [ { "name": "Read" }, { "name": "Parse" }, { "name": "Store" } ]
                },
                {
                    "message": { "tags": [] },
                    "states": [ { "name": "Read" } ]
                }
            ]"#,
        )
        .expect("fixture should parse");
        let visible: Vec<_> = profiles.iter().collect();

        let node = TimelineView::new(TIMELINE_VIEW_ID, &visible).compose();

        assert_eq!(node.id(), TIMELINE_VIEW_ID);
        let NodeBody::Timeline(body) = node.body() else {
            panic!("timeline view should compose a timeline body");
        };
        assert_eq!(body.rows.len(), 2);
        assert_eq!(body.rows[0].label, "ingest");
        assert_eq!(body.rows[0].states, vec!["Read", "Parse", "Store"]);
        assert_eq!(body.rows[1].label, "message #2");
        assert_eq!(body.rows[1].states, vec!["Read"]);
    }
}
