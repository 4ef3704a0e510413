//! Merged, deduplicated item view over a well's content.
//!
//! # Responsibility
//! - Combine node-derived items with externally supplied sequences.
//! - Provide stable random access and restartable iteration.
//!
//! # Invariants
//! - Node-derived items come first, in node order.
//! - Merged entries keep their own order; entries whose id is already
//!   present are skipped.
//! - The view is request-scoped and never persisted.

use crate::content::{ContentId, ContentItem};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Index;
use std::slice::Iter;

/// Errors from merged view access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergedViewError {
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for MergedViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "item index {index} out of range for view of length {len}")
            }
        }
    }
}

impl Error for MergedViewError {}

/// Finite, restartable sequence of content items.
///
/// Identity for deduplication is `ContentItem.uuid`, never field equality.
#[derive(Debug, Clone, Default)]
pub struct MergedItems {
    items: Vec<ContentItem>,
    seen: HashSet<ContentId>,
}

impl MergedItems {
    /// Builds the base view from node-derived items, kept as-is in order.
    pub fn new(items: Vec<ContentItem>) -> Self {
        let seen = items.iter().map(|item| item.uuid).collect();
        Self { items, seen }
    }

    /// Appends entries whose id is not already present, preserving the
    /// extra sequence's order.
    pub fn merge_with(&mut self, extra: impl IntoIterator<Item = ContentItem>) {
        for item in extra {
            if self.seen.insert(item.uuid) {
                self.items.push(item);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Random access without panicking.
    pub fn get(&self, index: usize) -> Option<&ContentItem> {
        self.items.get(index)
    }

    /// Random access with an explicit out-of-range error.
    pub fn item(&self, index: usize) -> Result<&ContentItem, MergedViewError> {
        self.items.get(index).ok_or(MergedViewError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn iter(&self) -> Iter<'_, ContentItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ContentItem] {
        self.items.as_slice()
    }
}

impl Index<usize> for MergedItems {
    type Output = ContentItem;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a MergedItems {
    type Item = &'a ContentItem;
    type IntoIter = Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{MergedItems, MergedViewError};
    use crate::content::ContentItem;
    use uuid::Uuid;

    fn item(title: &str) -> ContentItem {
        ContentItem::new(Uuid::new_v4(), "story", title)
    }

    #[test]
    fn merge_skips_entries_already_present() {
        let shared = item("shared");
        let base_only = item("base");
        let extra_only = item("extra");

        let mut view = MergedItems::new(vec![base_only.clone(), shared.clone()]);
        view.merge_with(vec![shared.clone(), extra_only.clone(), extra_only.clone()]);

        let titles: Vec<&str> = view.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["base", "shared", "extra"]);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn item_reports_index_and_length_when_out_of_range() {
        let view = MergedItems::new(vec![item("only")]);
        assert_eq!(view.item(0).unwrap().title, "only");
        assert_eq!(
            view.item(3).unwrap_err(),
            MergedViewError::IndexOutOfRange { index: 3, len: 1 }
        );
        assert!(view.get(3).is_none());
    }

    #[test]
    fn iteration_is_restartable() {
        let mut view = MergedItems::new(vec![item("a"), item("b")]);
        view.merge_with(vec![item("c")]);

        let first: Vec<String> = view.iter().map(|i| i.title.clone()).collect();
        let second: Vec<String> = (&view).into_iter().map(|i| i.title.clone()).collect();
        assert_eq!(first, second);
    }
}
