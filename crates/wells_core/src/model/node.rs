//! Node domain record: ordered membership of content in a well.

use crate::content::{ContentItem, ContentRef};
use crate::model::well::{Well, WellId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a node.
pub type NodeId = Uuid;

/// Ordered membership record linking one well to one content object.
///
/// Both relations are required by construction. The content slot is a
/// registry reference (`ContentRef`), resolved at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable id.
    pub uuid: NodeId,
    /// Owning well.
    pub well_uuid: WellId,
    /// Polymorphic content reference.
    pub content: ContentRef,
    /// Sort key within the well. Lower values come first; ties keep
    /// insertion order.
    pub sort_order: i64,
}

impl Node {
    /// Creates a node with a generated stable id.
    pub fn new(well_uuid: WellId, content: ContentRef, sort_order: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            well_uuid,
            content,
            sort_order,
        }
    }

    /// Canonical label form: `"{well title} ({sort_order}): {content title}"`.
    ///
    /// Takes the owning well and resolved content item because the node
    /// record itself stores only their ids.
    pub fn label(&self, well: &Well, item: &ContentItem) -> String {
        format!("{} ({}): {}", well.title(), self.sort_order, item.title)
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::content::{ContentItem, ContentRef};
    use crate::model::well::{Well, WellType};
    use uuid::Uuid;

    #[test]
    fn label_combines_well_order_and_content_title() {
        let well = Well::new(WellType::new("homepage", "homepage").unwrap());
        let item = ContentItem::new(Uuid::new_v4(), "story", "Big Story");
        let node = Node::new(well.uuid, ContentRef::new("story", item.uuid), 142);

        assert_eq!(node.label(&well, &item), "homepage (142): Big Story");
    }
}
