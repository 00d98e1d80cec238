//! Elements of interest and the table used to act on them

use serde::{Deserialize, Serialize};

use crate::viewport::Point;

/// What an element is, as far as the planner is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Link,
    Button,
    Input,
    Image,
    Text,
}

impl ElementKind {
    /// Tag used when rendering the element
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Link => "link",
            ElementKind::Button => "button",
            ElementKind::Input => "input",
            ElementKind::Image => "img",
            ElementKind::Text => "text",
        }
    }

    /// Kinds the planner may act on even without any text
    pub fn always_retained(&self) -> bool {
        matches!(
            self,
            ElementKind::Link | ElementKind::Input | ElementKind::Image
        )
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Classify a node from its tag, click handler and `type` attribute
///
/// Submit inputs act as buttons, and so does anything with a click handler that is not
/// already a link, input or image. Some pages only work with that last rule.
pub fn classify(tag: &str, has_click_handler: bool, input_type: Option<&str>) -> ElementKind {
    match tag {
        "input" if input_type == Some("submit") => ElementKind::Button,
        "a" => ElementKind::Link,
        "input" => ElementKind::Input,
        "img" => ElementKind::Image,
        "button" => ElementKind::Button,
        _ if has_click_handler => ElementKind::Button,
        _ => ElementKind::Text,
    }
}

/// One line of the compiled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestElement {
    /// Dense id, valid for the capture that produced it only
    pub display_index: usize,
    pub kind: ElementKind,
    pub label: String,
    /// Rendered attribute strings in extraction order
    pub metadata: Vec<String>,
    pub click_point: Point,
    pub backend_node_id: Option<i64>,
    /// Index of the node in the snapshot
    pub node_index: usize,
}

/// What the interpreter needs to act on an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuationTarget {
    pub click_point: Point,
    pub backend_node_id: Option<i64>,
}

/// Display id -> actuation target for one capture
///
/// Ids are dense, so the table is a vector indexed by id. A new capture builds a new
/// table; tables are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuationTable {
    targets: Vec<ActuationTarget>,
}

impl ActuationTable {
    /// The table for a page with nothing actionable
    pub const EMPTY: Self = Self {
        targets: Vec::new(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a target and return its id
    pub(crate) fn push(&mut self, target: ActuationTarget) -> usize {
        self.targets.push(target);
        self.targets.len() - 1
    }

    pub fn get(&self, id: usize) -> Option<&ActuationTarget> {
        self.targets.get(id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<ActuationTarget> for ActuationTable {
    fn from_iter<I: IntoIterator<Item = ActuationTarget>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(classify("a", false, None), ElementKind::Link);
        assert_eq!(classify("a", true, None), ElementKind::Link);
        assert_eq!(classify("input", false, Some("text")), ElementKind::Input);
        assert_eq!(classify("img", false, None), ElementKind::Image);
        assert_eq!(classify("button", false, None), ElementKind::Button);
        assert_eq!(classify("div", false, None), ElementKind::Text);
        assert_eq!(classify("#text", false, None), ElementKind::Text);
    }

    #[test]
    fn test_classify_reclassifies_as_button() {
        assert_eq!(classify("input", false, Some("submit")), ElementKind::Button);
        assert_eq!(classify("div", true, None), ElementKind::Button);
        assert_eq!(classify("span", true, Some("submit")), ElementKind::Button);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ElementKind::Image.to_string(), "img");
        assert_eq!(ElementKind::Link.tag(), "link");
        assert!(ElementKind::Input.always_retained());
        assert!(!ElementKind::Button.always_retained());
        assert!(!ElementKind::Text.always_retained());
    }

    #[test]
    fn test_actuation_table_ids_are_dense() {
        let point = Point { x: 1.0, y: 2.0 };
        let mut table = ActuationTable::new();
        for expected in 0..3 {
            let id = table.push(ActuationTarget {
                click_point: point,
                backend_node_id: None,
            });
            assert_eq!(id, expected);
        }
        assert_eq!(table.len(), 3);
        assert!(table.get(2).is_some());
        assert!(table.get(3).is_none());
    }
}
