//! The retained view tree the dashboard paints from.
//!
//! Widgets compose plain data nodes rather than drawing directly; the tree
//! reconciles each composed node against the previous pass by identifier.
//! The paint side walks the tree afterwards and turns bodies into terminal
//! widgets.

/// A widget that can project its current state into a [`ViewNode`].
/// Composition is total: it never fails, it only describes.
pub trait Compose {
    fn compose(&self) -> ViewNode;
}

/// A composed view: a stable identifier plus the screen-ready body derived
/// from the latest data pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    id: String,
    body: NodeBody,
}

impl ViewNode {
    pub fn new(id: impl Into<String>, body: NodeBody) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Filter(FilterBody),
    History(HistoryBody),
    StateChart(ChartBody),
    Timeline(TimelineBody),
    RelationGraph(GraphBody),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterBody {
    pub entries: Vec<FilterEntry>,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub tag: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryBody {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub label: String,
    pub tags: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartBody {
    pub bars: Vec<ChartBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub state: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineBody {
    pub rows: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub label: String,
    pub states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphBody {
    pub nodes: Vec<String>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub count: u64,
}

/// Ordered child list of the display root. Children are whole subtrees
/// keyed by identifier; reconciliation swaps a subtree wholesale rather
/// than diffing inside it.
#[derive(Debug, Default)]
pub struct ViewTree {
    children: Vec<ViewNode>,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a freshly composed node into the tree. A child with the
    /// same identifier is replaced in place, keeping its position; an
    /// unknown identifier appends. Afterwards exactly one child carries
    /// that identifier and its body reflects this composition.
    pub fn render_or_update(&mut self, node: ViewNode) {
        match self
            .children
            .iter_mut()
            .find(|child| child.id() == node.id())
        {
            Some(slot) => *slot = node,
            None => self.children.push(node),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ViewNode> {
        self.children.iter().find(|child| child.id() == id)
    }

    pub fn nodes(&self) -> &[ViewNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
