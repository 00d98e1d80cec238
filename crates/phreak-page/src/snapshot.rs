//! Snapshot decoding
//!
//! Turns the string-table-referenced parallel arrays of a [`SnapshotPayload`] into one
//! [`RawNode`] per node, aligned to the original node indices.

use phreak_core::{PhreakError, Result};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::payload::{DocumentSnapshot, SnapshotPayload};
use crate::viewport::LayoutBox;

/// One decoded node of the page
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub index: usize,
    /// Lower-cased tag name (`a`, `#text`, `::marker`, ...)
    pub name: String,
    pub value: Option<String>,
    /// Current value of a form control, when the snapshot reports one
    pub input_value: Option<String>,
    /// `None` for the root
    pub parent: Option<usize>,
    /// Attribute pairs in document order, first occurrence of each key only
    pub attributes: Vec<(String, String)>,
    pub is_clickable: bool,
    /// Only set for nodes with a layout entry
    pub layout_box: Option<LayoutBox>,
    pub backend_node_id: Option<i64>,
}

impl RawNode {
    /// Look up an attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolves indices against the shared string table
struct StringTable<'a> {
    strings: &'a [String],
}

impl<'a> StringTable<'a> {
    fn get(&self, index: i64) -> Option<&'a str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
    }
}

/// Decode the top-level document of a snapshot
///
/// Fails with [`PhreakError::MalformedSnapshot`] when a node name cannot be resolved.
/// Unresolvable values and attributes are dropped from the node and logged.
pub fn decode(payload: &SnapshotPayload) -> Result<Vec<RawNode>> {
    let document = payload
        .documents
        .first()
        .ok_or_else(|| PhreakError::MalformedSnapshot("snapshot has no documents".to_string()))?;

    let table = StringTable {
        strings: &payload.strings,
    };
    let nodes = &document.nodes;
    let count = nodes.node_name.len();

    let layout = layout_index(document, count);
    let input_values = rare_strings(&nodes.input_value.index, &nodes.input_value.value, count);
    let clickable: HashSet<usize> = nodes
        .is_clickable
        .index
        .iter()
        .filter_map(|&i| usize::try_from(i).ok())
        .collect();

    let mut decoded = Vec::with_capacity(count);
    for (index, &name_index) in nodes.node_name.iter().enumerate() {
        let name = table.get(name_index).ok_or_else(|| {
            PhreakError::MalformedSnapshot(format!(
                "node {} references missing name string {}",
                index, name_index
            ))
        })?;

        let parent = nodes
            .parent_index
            .get(index)
            .and_then(|&p| usize::try_from(p).ok())
            .filter(|&p| p < count);

        let value = match nodes.node_value.get(index) {
            Some(&v) if v >= 0 => {
                let resolved = table.get(v);
                if resolved.is_none() {
                    report_partial(index, format!("value string {} out of range", v));
                }
                resolved.map(str::to_string)
            }
            _ => None,
        };

        let input_value = input_values
            .get(&index)
            .and_then(|&v| table.get(v))
            .map(str::to_string);

        let attributes = nodes
            .attributes
            .get(index)
            .map(|flat| decode_attributes(index, flat, &table))
            .unwrap_or_default();

        decoded.push(RawNode {
            index,
            name: name.to_lowercase(),
            value,
            input_value,
            parent,
            attributes,
            is_clickable: clickable.contains(&index),
            layout_box: layout.get(&index).copied(),
            backend_node_id: nodes.backend_node_id.get(index).copied(),
        });
    }

    debug!(
        "Decoded {} nodes ({} with layout, {} clickable)",
        decoded.len(),
        layout.len(),
        clickable.len()
    );

    Ok(decoded)
}

/// Node index -> layout box, built once per capture
fn layout_index(document: &DocumentSnapshot, count: usize) -> HashMap<usize, LayoutBox> {
    let layout = &document.layout;
    layout
        .node_index
        .iter()
        .zip(layout.bounds.iter())
        .filter_map(|(&node, bounds)| {
            let node = usize::try_from(node).ok().filter(|&n| n < count)?;
            Some((node, LayoutBox::from_bounds(bounds)?))
        })
        .fold(HashMap::new(), |mut map, (node, layout_box)| {
            // A node can own several layout entries; the first is its principal box
            map.entry(node).or_insert(layout_box);
            map
        })
}

fn rare_strings(index: &[i64], value: &[i64], count: usize) -> HashMap<usize, i64> {
    index
        .iter()
        .zip(value.iter())
        .filter_map(|(&node, &v)| {
            let node = usize::try_from(node).ok().filter(|&n| n < count)?;
            (v >= 0).then_some((node, v))
        })
        .collect()
}

fn decode_attributes(node: usize, flat: &[i64], table: &StringTable<'_>) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();

    for pair in flat.chunks(2) {
        let [key_index, value_index] = pair else {
            report_partial(node, "odd-length attribute list".to_string());
            continue;
        };
        if *value_index < 0 {
            continue;
        }

        let (Some(key), Some(value)) = (table.get(*key_index), table.get(*value_index)) else {
            report_partial(
                node,
                format!("attribute pair ({}, {}) out of range", key_index, value_index),
            );
            continue;
        };

        if !attributes.iter().any(|(k, _)| k == key) {
            attributes.push((key.to_string(), value.to_string()));
        }
    }

    attributes
}

fn report_partial(node: usize, detail: String) {
    debug!("{}", PhreakError::AttributeExtractionPartial { node, detail });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{LayoutTreeSnapshot, NodeTreeSnapshot, RareBooleanData, RareStringData};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// html > body > a > #text, plus an input with a typed value
    fn sample_payload() -> SnapshotPayload {
        SnapshotPayload {
            strings: strings(&[
                "HTML", "BODY", "A", "#text", "Privacy", "href", "/privacy", "INPUT", "type",
                "text", "hunter2", "href",
            ]),
            documents: vec![DocumentSnapshot {
                nodes: NodeTreeSnapshot {
                    parent_index: vec![-1, 0, 1, 2, 1],
                    node_type: vec![1, 1, 1, 3, 1],
                    node_name: vec![0, 1, 2, 3, 7],
                    node_value: vec![-1, -1, -1, 4, -1],
                    backend_node_id: vec![10, 11, 12, 13, 14],
                    attributes: vec![vec![], vec![], vec![5, 6, 11, 9], vec![], vec![8, 9]],
                    input_value: RareStringData {
                        index: vec![4],
                        value: vec![10],
                    },
                    is_clickable: RareBooleanData { index: vec![2] },
                },
                layout: LayoutTreeSnapshot {
                    node_index: vec![2, 3, 4],
                    bounds: vec![
                        vec![0.0, 0.0, 100.0, 20.0],
                        vec![0.0, 0.0, 60.0, 20.0],
                        vec![0.0, 40.0, 200.0, 30.0],
                    ],
                },
            }],
        }
    }

    #[test]
    fn test_decode_aligns_to_indices() {
        let nodes = decode(&sample_payload()).unwrap();
        assert_eq!(nodes.len(), 5);
        assert!(nodes.iter().enumerate().all(|(i, n)| n.index == i));

        assert_eq!(nodes[0].name, "html");
        assert_eq!(nodes[0].parent, None);
        assert_eq!(nodes[3].parent, Some(2));
        assert_eq!(nodes[3].value.as_deref(), Some("Privacy"));
        assert_eq!(nodes[2].backend_node_id, Some(12));
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let nodes = decode(&sample_payload()).unwrap();
        assert_eq!(nodes[2].attributes, vec![("href".to_string(), "/privacy".to_string())]);
        assert_eq!(nodes[2].attribute("href"), Some("/privacy"));
    }

    #[test]
    fn test_sparse_layout_and_rare_data() {
        let nodes = decode(&sample_payload()).unwrap();
        assert!(nodes[0].layout_box.is_none());
        assert!(nodes[1].layout_box.is_none());
        assert_eq!(nodes[4].layout_box.map(|b| b.y), Some(40.0));
        assert!(nodes[2].is_clickable);
        assert!(!nodes[3].is_clickable);
        assert_eq!(nodes[4].input_value.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let mut payload = sample_payload();
        payload.documents[0].nodes.node_name[3] = 99;
        let err = decode(&payload).unwrap_err();
        assert!(matches!(err, PhreakError::MalformedSnapshot(_)));
    }

    #[test]
    fn test_no_documents_is_malformed() {
        let payload = SnapshotPayload::default();
        assert!(matches!(
            decode(&payload).unwrap_err(),
            PhreakError::MalformedSnapshot(_)
        ));
    }

    #[test]
    fn test_bad_attribute_is_omitted() {
        let mut payload = sample_payload();
        payload.documents[0].nodes.attributes[4] = vec![8, 99, 8, 9];
        let nodes = decode(&payload).unwrap();
        assert_eq!(nodes[4].attributes, vec![("type".to_string(), "text".to_string())]);
    }

    #[test]
    fn test_out_of_range_parent_is_root() {
        let mut payload = sample_payload();
        payload.documents[0].nodes.parent_index[3] = 42;
        let nodes = decode(&payload).unwrap();
        assert_eq!(nodes[3].parent, None);
    }
}
