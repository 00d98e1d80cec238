//! Wire types for a single page capture
//!
//! [`SnapshotPayload`] mirrors the result of the Chrome DevTools Protocol
//! `DOMSnapshot.captureSnapshot` command. Only the fields the compiler reads are
//! declared; everything else in the response is ignored. Missing arrays decode as empty
//! so a sparse payload never fails deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// Result of `DOMSnapshot.captureSnapshot`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    /// Documents in the page; the first is the top-level frame
    #[serde(default, deserialize_with = "nullable")]
    pub documents: Vec<DocumentSnapshot>,
    /// Shared string table referenced by index from every array
    #[serde(default, deserialize_with = "nullable")]
    pub strings: Vec<String>,
}

/// One document of the snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: NodeTreeSnapshot,
    #[serde(default, deserialize_with = "nullable")]
    pub layout: LayoutTreeSnapshot,
}

/// Per-node parallel arrays
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTreeSnapshot {
    /// Parent of each node, -1 for the root
    #[serde(default, deserialize_with = "nullable")]
    pub parent_index: Vec<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub node_type: Vec<i64>,
    /// String table index of each tag name
    #[serde(default, deserialize_with = "nullable")]
    pub node_name: Vec<i64>,
    /// String table index of each node value, -1 when absent
    #[serde(default, deserialize_with = "nullable")]
    pub node_value: Vec<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub backend_node_id: Vec<i64>,
    /// Flattened `[key, value, key, value, ...]` string indices per node
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: Vec<Vec<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub input_value: RareStringData,
    #[serde(default, deserialize_with = "nullable")]
    pub is_clickable: RareBooleanData,
}

/// Sparse string data: `value[i]` belongs to node `index[i]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RareStringData {
    #[serde(default, deserialize_with = "nullable")]
    pub index: Vec<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub value: Vec<i64>,
}

/// Sparse boolean data: every listed node index is `true`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RareBooleanData {
    #[serde(default, deserialize_with = "nullable")]
    pub index: Vec<i64>,
}

/// Layout entries for nodes that have a box
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTreeSnapshot {
    /// Node each layout entry belongs to
    #[serde(default, deserialize_with = "nullable")]
    pub node_index: Vec<i64>,
    /// `[x, y, width, height]` in device pixels
    #[serde(default, deserialize_with = "nullable")]
    pub bounds: Vec<Vec<f64>>,
}

/// Accepts `null` wherever a collection is expected
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Window geometry read alongside the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Horizontal page offset (`window.pageXOffset`)
    pub scroll_x: f64,
    /// Vertical page offset (`window.pageYOffset`)
    pub scroll_y: f64,
    /// `window.screen.width`
    pub screen_width: f64,
    /// `window.screen.height`
    pub screen_height: f64,
    /// `window.devicePixelRatio`
    pub device_pixel_ratio: f64,
    /// `document.body.scrollHeight`
    #[serde(default)]
    pub document_height: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            screen_width: 1280.0,
            screen_height: 1080.0,
            device_pixel_ratio: 1.0,
            document_height: 0.0,
        }
    }
}

/// Everything one capture produces: where the page is, how it is scrolled, what it holds
///
/// Serializable so a capture can be saved and compiled again offline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapturedPage {
    pub url: String,
    pub geometry: PageGeometry,
    pub snapshot: SnapshotPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_payload_deserializes() {
        let json = r#"{
            "documents": [{
                "nodes": { "parentIndex": [-1, 0], "nodeName": [0, 1] },
                "layout": { "nodeIndex": [1], "bounds": [[0, 0, 10, 10]] },
                "textBoxes": {}
            }],
            "strings": ["html", "a"]
        }"#;

        let payload: SnapshotPayload = serde_json::from_str(json).unwrap();
        let doc = &payload.documents[0];
        assert_eq!(doc.nodes.parent_index, vec![-1, 0]);
        assert!(doc.nodes.node_value.is_empty());
        assert!(doc.nodes.is_clickable.index.is_empty());
        assert_eq!(doc.layout.bounds[0], vec![0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn test_null_arrays_decode_as_empty() {
        let json = r#"{
            "documents": [{
                "nodes": { "parentIndex": [-1], "nodeName": [0], "nodeValue": null, "inputValue": null },
                "layout": { "nodeIndex": [], "bounds": [] }
            }],
            "strings": ["html"]
        }"#;

        let payload: SnapshotPayload = serde_json::from_str(json).unwrap();
        assert!(payload.documents[0].nodes.node_value.is_empty());
        assert!(payload.documents[0].nodes.input_value.index.is_empty());
    }

    #[test]
    fn test_geometry_document_height_optional() {
        let json = r#"{
            "scrollX": 0, "scrollY": 40,
            "screenWidth": 1280, "screenHeight": 1080,
            "devicePixelRatio": 2
        }"#;

        let geometry: PageGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.scroll_y, 40.0);
        assert_eq!(geometry.device_pixel_ratio, 2.0);
        assert_eq!(geometry.document_height, 0.0);
    }
}
