//! Tag filtering applied to the record set.
//!
//! The empty selection is deliberately asymmetric: [`filtered_profiles`]
//! falls back to every record, while [`filter_mask`] marks none of them.
//! The first keeps the dashboard populated before any checkbox is touched;
//! the second keeps "nothing selected" from reading as "everything matches".

use crate::profile::{Message, ProfiledMessage};

/// Notification that the checked tag set changed. Carried over the update
/// channel so derived views refresh on the next pass of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    Changed,
}

/// Anything carrying a tag list that can be matched against the active
/// selection.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

impl Tagged for Message {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for ProfiledMessage {
    fn tags(&self) -> &[String] {
        &self.message.tags
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn tags(&self) -> &[String] {
        (**self).tags()
    }
}

/// True when the item carries at least one of the active tags. Always false
/// for an empty selection.
fn matches_any<T: Tagged>(item: &T, active: &[String]) -> bool {
    item.tags().iter().any(|tag| active.contains(tag))
}

/// The records the dashboard should show for `active`, in record order. An
/// empty selection selects everything; otherwise a record qualifies by
/// sharing any tag with the selection.
pub fn filtered_profiles<'a>(
    profiles: &'a [ProfiledMessage],
    active: &[String],
) -> Vec<&'a ProfiledMessage> {
    if active.is_empty() {
        return profiles.iter().collect();
    }

    profiles
        .iter()
        .filter(|profile| matches_any(profile, active))
        .collect()
}

/// Per-record match flags for `active`, in record order. Unlike
/// [`filtered_profiles`], an empty selection marks nothing.
pub fn filter_mask<T: Tagged>(items: &[T], active: &[String]) -> Vec<bool> {
    items.iter().map(|item| matches_any(item, active)).collect()
}
