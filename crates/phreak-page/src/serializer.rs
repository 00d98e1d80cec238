//! Line-oriented rendering of compiled elements
//!
//! ```text
//! <link id=0>Privacy</link>
//! <input id=1 password/>
//! <button id=2 alt="search">Search</button>
//! ```

use std::fmt;

use crate::element::InterestElement;

impl fmt::Display for InterestElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.kind.tag();
        write!(f, "<{} id={}", tag, self.display_index)?;
        for meta in &self.metadata {
            write!(f, " {}", meta)?;
        }

        if self.label.is_empty() {
            write!(f, "/>")
        } else {
            write!(f, ">{}</{}>", self.label, tag)
        }
    }
}

/// Render elements one per line, in id order
pub fn render(elements: &[InterestElement]) -> String {
    elements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::viewport::Point;

    fn element(id: usize, kind: ElementKind, label: &str, metadata: &[&str]) -> InterestElement {
        InterestElement {
            display_index: id,
            kind,
            label: label.to_string(),
            metadata: metadata.iter().map(|m| m.to_string()).collect(),
            click_point: Point { x: 0.0, y: 0.0 },
            backend_node_id: None,
            node_index: id,
        }
    }

    #[test]
    fn test_labelled_element() {
        let link = element(0, ElementKind::Link, "Privacy", &[]);
        assert_eq!(link.to_string(), "<link id=0>Privacy</link>");
    }

    #[test]
    fn test_self_closing_element() {
        let input = element(4, ElementKind::Input, "", &["password"]);
        assert_eq!(input.to_string(), "<input id=4 password/>");

        let img = element(0, ElementKind::Image, "", &[]);
        assert_eq!(img.to_string(), "<img id=0/>");
    }

    #[test]
    fn test_metadata_order_preserved() {
        let button = element(
            2,
            ElementKind::Button,
            "EN",
            &["alt=\"Language Picker\"", "title=\"Language\""],
        );
        assert_eq!(
            button.to_string(),
            "<button id=2 alt=\"Language Picker\" title=\"Language\">EN</button>"
        );
    }

    #[test]
    fn test_render_joins_lines() {
        let elements = vec![
            element(0, ElementKind::Text, "Username", &[]),
            element(1, ElementKind::Input, "", &["text"]),
        ];
        assert_eq!(
            render(&elements),
            "<text id=0>Username</text>\n<input id=1 text/>"
        );
        assert_eq!(render(&[]), "");
    }
}
