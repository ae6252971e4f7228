//! Interactive tag checklist. The panel owns the checked set and is the
//! sole emitter of [`FilterEvent::Changed`]; derived views refresh on the
//! listening side of the channel.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::filter::FilterEvent;
use crate::view::{Compose, FilterBody, FilterEntry, NodeBody, ViewNode};

pub const TAG_FILTER_VIEW_ID: &str = "tag-filter-view";

#[derive(Debug)]
pub struct FilterPanel {
    id: String,
    tags: Vec<String>,
    checked: HashSet<String>,
    cursor: usize,
    events: mpsc::UnboundedSender<FilterEvent>,
}

impl FilterPanel {
    pub fn new(
        id: impl Into<String>,
        tags: Vec<String>,
        events: mpsc::UnboundedSender<FilterEvent>,
    ) -> Self {
        Self {
            id: id.into(),
            tags,
            checked: HashSet::new(),
            cursor: 0,
            events,
        }
    }

    /// Checked tags, reported in tag-universe order rather than check order.
    pub fn checked_filters(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter(|tag| self.checked.contains(*tag))
            .cloned()
            .collect()
    }

    /// Flip the check under the cursor and notify the listener. No-op on an
    /// empty universe. Receiver gone means shutdown; the refresh is dropped.
    pub fn toggle_current(&mut self) {
        let Some(tag) = self.tags.get(self.cursor) else {
            return;
        };
        if !self.checked.remove(tag) {
            self.checked.insert(tag.clone());
        }

        let _ = self.events.send(FilterEvent::Changed);
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.tags.is_empty() {
            return;
        }
        let last = (self.tags.len() - 1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    /// Adopt a freshly extracted tag universe. Checks on tags that survived
    /// are kept; checks on vanished tags go with them. Emits nothing: the
    /// reload path refreshes every view itself.
    pub fn rebuild(&mut self, tags: Vec<String>) {
        self.checked.retain(|tag| tags.contains(tag));
        self.tags = tags;
        self.cursor = self.cursor.min(self.tags.len().saturating_sub(1));
    }
}

impl Compose for FilterPanel {
    fn compose(&self) -> ViewNode {
        ViewNode::new(
            self.id.clone(),
            NodeBody::Filter(FilterBody {
                entries: self
                    .tags
                    .iter()
                    .map(|tag| FilterEntry {
                        tag: tag.clone(),
                        checked: self.checked.contains(tag),
                    })
                    .collect(),
                cursor: self.cursor,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn panel(tags: &[&str]) -> (FilterPanel, mpsc::UnboundedReceiver<FilterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tags = tags.iter().map(|tag| tag.to_string()).collect();
        (FilterPanel::new(TAG_FILTER_VIEW_ID, tags, tx), rx)
    }

    #[test]
    fn toggle_checks_the_tag_under_the_cursor_and_notifies() {
        let (mut panel, mut rx) = panel(&["alpha", "beta"]);

        panel.move_cursor(1);
        panel.toggle_current();

        assert_eq!(panel.checked_filters(), vec!["beta"]);
        assert_eq!(
            rx.try_recv().expect("toggle should notify"),
            FilterEvent::Changed
        );
    }

    #[test]
    fn toggling_twice_unchecks_and_notifies_both_times() {
        let (mut panel, mut rx) = panel(&["alpha"]);

        panel.toggle_current();
        panel.toggle_current();

        assert!(panel.checked_filters().is_empty());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn checked_filters_follow_universe_order_not_check_order() {
        let (mut panel, _rx) = panel(&["alpha", "beta", "gamma"]);

        panel.move_cursor(2);
        panel.toggle_current();
        panel.move_cursor(-2);
        panel.toggle_current();

        assert_eq!(panel.checked_filters(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn toggle_on_an_empty_universe_is_silent() {
        let (mut panel, mut rx) = panel(&[]);

        panel.toggle_current();

        assert!(panel.checked_filters().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let (mut panel, _rx) = panel(&["alpha", "beta", "gamma"]);

        panel.move_cursor(-5);
        let NodeBody::Filter(body) = panel.compose().body().clone() else {
            panic!("filter panel should compose a filter body");
        };
        assert_eq!(body.cursor, 0);

        panel.move_cursor(99);
        let NodeBody::Filter(body) = panel.compose().body().clone() else {
            panic!("filter panel should compose a filter body");
        };
        assert_eq!(body.cursor, 2);
    }

    #[test]
    fn rebuild_keeps_checks_only_for_surviving_tags() {
        let (mut panel, _rx) = panel(&["alpha", "beta", "gamma"]);
        panel.toggle_current();
        panel.move_cursor(1);
        panel.toggle_current();

        panel.rebuild(vec!["beta".to_string(), "delta".to_string()]);

        assert_eq!(panel.checked_filters(), vec!["beta"]);

        let NodeBody::Filter(body) = panel.compose().body().clone() else {
            panic!("filter panel should compose a filter body");
        };
        assert_eq!(body.cursor, 1);
    }

    #[test]
    fn a_dropped_listener_does_not_break_toggling() {
        let (mut panel, rx) = panel(&["alpha"]);
        drop(rx);

        panel.toggle_current();

        assert_eq!(panel.checked_filters(), vec!["alpha"]);
    }

    #[test]
    fn compose_projects_entries_with_their_checks() {
        let (mut panel, _rx) = panel(&["alpha", "beta"]);
        panel.toggle_current();

        let node = panel.compose();

        assert_eq!(node.id(), TAG_FILTER_VIEW_ID);
        let NodeBody::Filter(body) = node.body() else {
            panic!("filter panel should compose a filter body");
        };
        let entries: Vec<_> = body
            .entries
            .iter()
            .map(|entry| (entry.tag.as_str(), entry.checked))
            .collect();
        assert_eq!(entries, vec![("alpha", true), ("beta", false)]);
    }
}
