//! Mind-map layout: turns the lesson's summary tree into positioned nodes and
//! edges for the canvas renderer.
//!
//! The layout is a plain depth-first pass: depth decides the horizontal
//! column, subtree weight decides the vertical slot. Same tree in, same
//! coordinates out, which keeps the renderings snapshot-friendly.

use serde::Deserialize;

/// Horizontal distance between depth columns, in canvas units.
pub const HORIZONTAL_SPACING: f32 = 240.0;
/// Vertical distance reserved per leaf, in canvas units.
pub const VERTICAL_SPACING: f32 = 90.0;

const ROOT_ID: &str = "root";

/// One node of the backend-provided summary tree.
#[derive(Debug, Clone, Deserialize)]
pub struct MindMapNode {
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub children: Vec<MindMapNode>,
}

/// The mind-map payload as the lesson file carries it.
#[derive(Debug, Clone, Deserialize)]
pub struct MindMapSource {
    /// Label for the synthetic root the forest hangs under.
    pub root: String,
    #[serde(default)]
    pub nodes: Vec<MindMapNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct MindMapLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
}

/// Lay out the forest under a synthetic root.
///
/// A leaf weighs 1, an internal node the sum of its children; a node sits
/// vertically at the middle of its subtree's band. An empty forest still
/// yields the root node and no edges.
pub fn layout(source: &MindMapSource) -> MindMapLayout {
    let mut out = MindMapLayout::default();
    let mut ids = IdAllocator::default();

    let total_weight: f32 = source.nodes.iter().map(subtree_weight).sum();
    out.nodes.push(PositionedNode {
        id: ROOT_ID.to_string(),
        label: source.root.clone(),
        x: 0.0,
        y: total_weight.max(1.0) * VERTICAL_SPACING / 2.0,
    });

    let mut offset = 0.0;
    for node in &source.nodes {
        offset += place(node, 1, offset, ROOT_ID, &mut out, &mut ids);
    }

    out
}

fn subtree_weight(node: &MindMapNode) -> f32 {
    if node.children.is_empty() {
        1.0
    } else {
        node.children.iter().map(subtree_weight).sum()
    }
}

/// Position `node` and its subtree; returns the subtree weight consumed.
fn place(
    node: &MindMapNode,
    depth: usize,
    offset: f32,
    parent_id: &str,
    out: &mut MindMapLayout,
    ids: &mut IdAllocator,
) -> f32 {
    let weight = subtree_weight(node);
    let id = ids.resolve(node.id.as_deref());

    out.nodes.push(PositionedNode {
        id: id.clone(),
        label: node.label.clone(),
        x: depth as f32 * HORIZONTAL_SPACING,
        y: (offset + weight / 2.0) * VERTICAL_SPACING,
    });
    out.edges.push(LayoutEdge {
        id: format!("e-{parent_id}-{id}"),
        source: parent_id.to_string(),
        target: id.clone(),
    });

    let mut child_offset = offset;
    for child in &node.children {
        child_offset += place(child, depth + 1, child_offset, &id, out, ids);
    }

    weight
}

/// Hands out synthetic ids for nodes the backend left unnamed. Unique within
/// one layout invocation.
#[derive(Default)]
struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    fn resolve(&mut self, explicit: Option<&str>) -> String {
        match explicit {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = format!("n{}", self.next);
                self.next += 1;
                id
            }
        }
    }
}
