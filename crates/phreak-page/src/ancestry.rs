//! Marker ancestry resolution
//!
//! Text and attributes nested inside a link or button (an icon plus a label, a span
//! inside an anchor) belong to that single clickable ancestor. For every node this
//! module answers: is it inside a marker, and which marker owns it?
//!
//! The tree arrives as parent pointers in a flat array, so resolution walks upward with
//! an explicit stack and fills a memo table top-down. Each node is resolved at most once
//! per marker kind, and deep trees never grow the call stack.

use crate::snapshot::RawNode;

/// The two kinds of attribution roots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `<a>`
    Anchor,
    /// `<button>`
    Button,
}

impl Marker {
    pub fn tag(&self) -> &'static str {
        match self {
            Marker::Anchor => "a",
            Marker::Button => "button",
        }
    }
}

/// Resolved ancestry of one node for one marker kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AncestryEntry {
    pub is_descendant: bool,
    /// The marker that owns this node; a marker owns itself
    pub marker: Option<usize>,
}

impl AncestryEntry {
    const ROOT: AncestryEntry = AncestryEntry {
        is_descendant: false,
        marker: None,
    };
}

/// Memoized ancestry for one marker kind over one capture
pub struct AncestryResolver<'a> {
    nodes: &'a [RawNode],
    marker: Marker,
    memo: Vec<Option<AncestryEntry>>,
}

impl<'a> AncestryResolver<'a> {
    pub fn new(nodes: &'a [RawNode], marker: Marker) -> Self {
        Self {
            nodes,
            marker,
            memo: vec![None; nodes.len()],
        }
    }

    /// Resolve `index`, filling any unresolved ancestors on the way
    ///
    /// Indices outside the tree resolve like the root sentinel.
    pub fn resolve(&mut self, index: usize) -> AncestryEntry {
        if index >= self.nodes.len() {
            return AncestryEntry::ROOT;
        }
        if let Some(entry) = self.memo[index] {
            return entry;
        }

        // Climb until a resolved ancestor or the root. The walk is bounded by the node
        // count so a parent cycle ends as if it had reached the root.
        let mut pending = vec![index];
        let mut inherited = AncestryEntry::ROOT;
        let mut current = index;
        while let Some(parent) = self.nodes[current].parent {
            if let Some(entry) = self.memo[parent] {
                inherited = entry;
                break;
            }
            if pending.len() > self.nodes.len() {
                break;
            }
            pending.push(parent);
            current = parent;
        }

        // Resolve from the topmost pending node back down to `index`
        while let Some(node) = pending.pop() {
            let entry = if self.nodes[node].name == self.marker.tag() {
                AncestryEntry {
                    is_descendant: true,
                    marker: Some(node),
                }
            } else {
                inherited
            };
            self.memo[node] = Some(entry);
            inherited = entry;
        }

        inherited
    }
}

/// Ancestry for both marker kinds, combined into a single owner per node
pub struct Ownership<'a> {
    anchors: AncestryResolver<'a>,
    buttons: AncestryResolver<'a>,
}

impl<'a> Ownership<'a> {
    pub fn new(nodes: &'a [RawNode]) -> Self {
        Self {
            anchors: AncestryResolver::new(nodes, Marker::Anchor),
            buttons: AncestryResolver::new(nodes, Marker::Button),
        }
    }

    /// The marker `index` contributes to, anchors taking precedence over buttons
    ///
    /// A marker node is returned as its own owner.
    pub fn owner(&mut self, index: usize) -> Option<usize> {
        let anchor = self.anchors.resolve(index);
        let button = self.buttons.resolve(index);

        if anchor.is_descendant {
            anchor.marker
        } else if button.is_descendant {
            button.marker
        } else {
            None
        }
    }
}
