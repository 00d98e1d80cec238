//! Integration tests for page compilation.
//!
//! These tests feed JSON shaped like a real `DOMSnapshot.captureSnapshot` response
//! through the whole pipeline and check the rendered text and actuation table.

use phreak_core::PhreakError;
use phreak_page::{compile, CapturedPage, CompileOptions, ElementKind};
use serde_json::json;

fn options() -> CompileOptions {
    CompileOptions {
        correct_macos_ratio: false,
    }
}

fn page(snapshot: serde_json::Value, scroll_y: f64) -> CapturedPage {
    serde_json::from_value(json!({
        "url": "http://localhost/",
        "geometry": {
            "scrollX": 0,
            "scrollY": scroll_y,
            "screenWidth": 1280,
            "screenHeight": 1080,
            "devicePixelRatio": 1,
            "documentHeight": 3000
        },
        "snapshot": snapshot
    }))
    .unwrap()
}

/// html > body > a > "Privacy"
fn privacy_link() -> serde_json::Value {
    json!({
        "strings": ["HTML", "BODY", "A", "#text", "Privacy", "href", "/privacy"],
        "documents": [{
            "nodes": {
                "parentIndex": [-1, 0, 1, 2],
                "nodeType": [1, 1, 1, 3],
                "nodeName": [0, 1, 2, 3],
                "nodeValue": [-1, -1, -1, 4],
                "backendNodeId": [1, 2, 3, 4],
                "attributes": [[], [], [5, 6], []],
                "isClickable": { "index": [2] }
            },
            "layout": {
                "nodeIndex": [0, 1, 2, 3],
                "bounds": [
                    [0, 0, 1280, 3000],
                    [0, 0, 1280, 3000],
                    [20, 40, 80, 18],
                    [20, 40, 60, 18]
                ]
            }
        }]
    })
}

/// A login form: logo, two labelled inputs, a submit button and a footer link
fn login_form() -> serde_json::Value {
    json!({
        "strings": [
            "HTML", "BODY", "IMG", "#text", "Username", "INPUT", "type", "text",
            "Password", "password", "submit", "value", "Login", "A", "Terms",
            "DIV", "alt", "logo", "Way down"
        ],
        "documents": [{
            "nodes": {
                "parentIndex": [-1, 0, 1, 1, 1, 1, 1, 1, 1, 8, 1, 10],
                "nodeName":    [0, 1, 2, 3, 5, 3, 5, 5, 13, 3, 15, 3],
                "nodeValue":   [-1, -1, -1, 4, -1, 8, -1, -1, -1, 14, -1, 18],
                "backendNodeId": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
                "attributes": [
                    [], [], [16, 17], [], [6, 7], [], [6, 9], [6, 10, 11, 12], [], [], [], []
                ],
                "inputValue": { "index": [7], "value": [12] }
            },
            "layout": {
                "nodeIndex": [2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
                "bounds": [
                    [10, 10, 100, 50],
                    [10, 70, 80, 20],
                    [100, 70, 200, 20],
                    [10, 100, 80, 20],
                    [100, 100, 200, 20],
                    [100, 130, 80, 30],
                    [10, 200, 60, 20],
                    [10, 200, 60, 20],
                    [10, 2000, 300, 20],
                    [10, 2000, 300, 20]
                ]
            }
        }]
    })
}

#[test]
fn test_privacy_link_renders_single_element() {
    let state = compile(&page(privacy_link(), 0.0), &options()).unwrap();

    assert_eq!(state.elements.len(), 1);
    assert_eq!(state.elements[0].kind, ElementKind::Link);
    assert_eq!(state.elements[0].label, "Privacy");
    assert_eq!(state.text, "<link id=0>Privacy</link>");

    let target = state.actuation.get(0).unwrap();
    assert_eq!(target.click_point.x, 60.0);
    assert_eq!(target.click_point.y, 49.0);
    assert_eq!(target.backend_node_id, Some(3));
}

#[test]
fn test_login_form() {
    let state = compile(&page(login_form(), 0.0), &options()).unwrap();

    assert_eq!(
        state.text,
        [
            "<img id=0 logo/>",
            "<text id=1>Username</text>",
            "<input id=2 text/>",
            "<text id=3>Password</text>",
            "<input id=4 password/>",
            "<button id=5>Login</button>",
            "<link id=6>Terms</link>",
        ]
        .join("\n")
    );
}

#[test]
fn test_ids_are_dense() {
    let state = compile(&page(login_form(), 0.0), &options()).unwrap();
    let ids: Vec<usize> = state.elements.iter().map(|e| e.display_index).collect();
    let expected: Vec<usize> = (0..state.elements.len()).collect();
    assert_eq!(ids, expected);
    assert_eq!(state.actuation.len(), state.elements.len());
}

#[test]
fn test_compile_is_deterministic() {
    let captured = page(login_form(), 0.0);
    let first = compile(&captured, &options()).unwrap();
    let second = compile(&captured, &options()).unwrap();
    assert_eq!(first.text, second.text);
    assert_eq!(first, second);
}

#[test]
fn test_scrolling_changes_visible_elements() {
    let state = compile(&page(login_form(), 1500.0), &options()).unwrap();
    assert_eq!(state.text, "<text id=0>Way down</text>");
    assert_eq!(state.scroll.start, 50.0);

    // Laid out at y=2000 in the document, 500px into the scrolled viewport
    let target = state.actuation.get(0).unwrap();
    assert_eq!(target.click_point.x, 160.0);
    assert_eq!(target.click_point.y, 510.0);
}

#[test]
fn test_multiline_text_renders_one_line_per_element() {
    let snapshot = json!({
        "strings": [
            "HTML", "BODY", "A", "#text", "\n      Privacy\n      Policy\n    ",
            "Terms of\n service"
        ],
        "documents": [{
            "nodes": {
                "parentIndex": [-1, 0, 1, 2, 1],
                "nodeName": [0, 1, 2, 3, 3],
                "nodeValue": [-1, -1, -1, 4, 5],
                "backendNodeId": [1, 2, 3, 4, 5]
            },
            "layout": {
                "nodeIndex": [2, 3, 4],
                "bounds": [
                    [20, 40, 80, 18],
                    [20, 40, 60, 18],
                    [20, 80, 200, 18]
                ]
            }
        }]
    });

    let state = compile(&page(snapshot, 0.0), &options()).unwrap();
    assert_eq!(state.text.lines().count(), state.elements.len());
    assert_eq!(
        state.text,
        "<link id=0>Privacy Policy</link>\n<text id=1>Terms of service</text>"
    );
}

#[test]
fn test_text_inside_anchor_never_standalone() {
    let state = compile(&page(login_form(), 0.0), &options()).unwrap();
    assert!(!state
        .elements
        .iter()
        .any(|e| e.kind == ElementKind::Text && e.label == "Terms"));
}

#[test]
fn test_malformed_snapshot_rejected() {
    let mut snapshot = privacy_link();
    snapshot["documents"][0]["nodes"]["nodeName"][3] = json!(42);

    let err = compile(&page(snapshot, 0.0), &options()).unwrap_err();
    assert!(matches!(err, PhreakError::MalformedSnapshot(_)));
}

#[test]
fn test_saved_capture_round_trips() {
    let captured = page(privacy_link(), 0.0);
    let saved = serde_json::to_string(&captured).unwrap();
    let restored: CapturedPage = serde_json::from_str(&saved).unwrap();

    let state = compile(&restored, &options()).unwrap();
    assert_eq!(state.text, "<link id=0>Privacy</link>");
}
