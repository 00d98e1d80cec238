//! Element reduction
//!
//! Walks the decoded nodes in index order, keeps what is visible, folds the content of
//! links and buttons into the marker that owns it, and numbers what survives.
//!
//! Two passes are needed because a marker precedes its descendants in index order: the
//! first pass collects candidates and the contributions descendants make to their
//! owners, the second merges those contributions and assigns ids.

use std::collections::BTreeMap;
use tracing::debug;

use crate::ancestry::{Marker, Ownership};
use crate::element::{classify, ActuationTable, ActuationTarget, ElementKind, InterestElement};
use crate::payload::PageGeometry;
use crate::snapshot::RawNode;
use crate::viewport::{effective_pixel_ratio, is_blocklisted, LogicalBox, Point, Viewport};

/// Attributes worth showing, in no particular priority
const DESCRIPTIVE_ATTRIBUTES: &[&str] = &["type", "placeholder", "aria-label", "title", "alt"];

/// Separator glyphs that add nothing but tokens
const SEPARATORS: &[&str] = &["|", "•"];

/// Knobs for a single compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Treat a pixel ratio of 1 reported on macOS as 2
    pub correct_macos_ratio: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            correct_macos_ratio: true,
        }
    }
}

/// Something a descendant hands up to the marker that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contribution {
    Text(String),
    Attribute { key: String, value: String },
}

/// Output of a reduction: the numbered elements and how to act on them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reduction {
    pub elements: Vec<InterestElement>,
    pub actuation: ActuationTable,
}

/// A visible node that may become an element once contributions are merged
struct Candidate<'a> {
    node: &'a RawNode,
    /// Tag after submit inputs have become buttons
    tag: &'a str,
    value: Option<&'a str>,
    metadata: Vec<String>,
    bounds: LogicalBox,
}

/// Reduce decoded nodes to the elements visible in the viewport described by `geometry`
pub fn reduce(nodes: &[RawNode], geometry: &PageGeometry, options: &CompileOptions) -> Reduction {
    let ratio = effective_pixel_ratio(geometry.device_pixel_ratio, options.correct_macos_ratio);
    let viewport = Viewport::from_geometry(geometry);

    let mut ownership = Ownership::new(nodes);
    let mut contributions: BTreeMap<usize, Vec<Contribution>> = BTreeMap::new();
    let mut candidates = Vec::new();

    for node in nodes {
        let owner = ownership.owner(node.index);

        let Some(layout_box) = node.layout_box else {
            continue;
        };
        if is_blocklisted(&node.name) {
            continue;
        }
        let bounds = layout_box.to_logical(ratio);
        if !viewport.intersects(&bounds) {
            continue;
        }

        if let (Some(owner), "#text") = (owner, node.name.as_str()) {
            let text = collapse_whitespace(node.value.as_deref().unwrap_or_default());
            if !text.is_empty() && !SEPARATORS.contains(&text.as_str()) {
                contributions
                    .entry(owner)
                    .or_default()
                    .push(Contribution::Text(text));
            }
            continue;
        }

        let acts_as_button =
            classify(&node.name, false, node.attribute("type")) == ElementKind::Button;
        let tag = if acts_as_button { "button" } else { node.name.as_str() };

        let mut metadata = Vec::new();
        let attributes = node.attributes.iter().filter(|(key, _)| {
            DESCRIPTIVE_ATTRIBUTES.contains(&key.as_str()) && !(acts_as_button && key == "type")
        });
        for (key, value) in attributes {
            match owner {
                Some(owner) => contributions
                    .entry(owner)
                    .or_default()
                    .push(Contribution::Attribute {
                        key: key.clone(),
                        value: collapse_whitespace(value),
                    }),
                None => {
                    let value = collapse_whitespace(value);
                    if !value.is_empty() {
                        metadata.push(value);
                    }
                }
            }
        }

        let value = match node.value.as_deref() {
            Some(v) if SEPARATORS.contains(&v.trim()) => continue,
            Some(v) => Some(v),
            None if node.name == "input" => node.input_value.as_deref(),
            None => None,
        };

        // Content of a link or button is rendered through its owner
        if owner.is_some() && !is_marker_tag(tag) {
            continue;
        }

        candidates.push(Candidate {
            node,
            tag,
            value,
            metadata,
            bounds,
        });
    }

    let mut reduction = Reduction::default();
    for candidate in candidates {
        let mut metadata = candidate.metadata;
        let mut label_parts: Vec<String> = candidate
            .value
            .map(collapse_whitespace)
            .filter(|v| !v.is_empty())
            .into_iter()
            .collect();

        if let Some(owned) = contributions.get(&candidate.node.index) {
            for contribution in owned {
                match contribution {
                    Contribution::Text(text) => label_parts.push(text.clone()),
                    Contribution::Attribute { key, value } => {
                        metadata.push(format!("{}=\"{}\"", key, value))
                    }
                }
            }
        }

        let label = label_parts.join(" ");
        let kind = classify(candidate.tag, candidate.node.is_clickable, None);

        if label.is_empty() && metadata.is_empty() && !kind.always_retained() {
            continue;
        }

        // Bounds are document coordinates; pointer events want the viewport's
        let center = candidate.bounds.center();
        let target = ActuationTarget {
            click_point: Point {
                x: center.x - geometry.scroll_x,
                y: center.y - geometry.scroll_y,
            },
            backend_node_id: candidate.node.backend_node_id,
        };
        let display_index = reduction.actuation.push(target);

        reduction.elements.push(InterestElement {
            display_index,
            kind,
            label,
            metadata,
            click_point: target.click_point,
            backend_node_id: target.backend_node_id,
            node_index: candidate.node.index,
        });
    }

    debug!(
        "Reduced {} nodes to {} elements ({} markers received contributions)",
        nodes.len(),
        reduction.elements.len(),
        contributions.len()
    );

    reduction
}

/// One line per element: newlines and runs of spaces inside a value become single spaces
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_marker_tag(tag: &str) -> bool {
    tag == Marker::Anchor.tag() || tag == Marker::Button.tag()
}
