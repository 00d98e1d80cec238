//! Viewport geometry and coordinate normalization
//!
//! Layout boxes in a snapshot are in device pixels; pointer actions and the viewport
//! are in CSS (logical) pixels. Everything that leaves this module is logical.

use serde::{Deserialize, Serialize};

use crate::payload::PageGeometry;

/// Tags that never carry content worth showing
const BLOCKLISTED_TAGS: &[&str] = &[
    "html", "head", "title", "meta", "iframe", "body", "script", "style", "path", "svg", "br",
    "::marker",
];

/// Whether `tag` (lower-case) is a structural or decorative tag that is always dropped
pub fn is_blocklisted(tag: &str) -> bool {
    BLOCKLISTED_TAGS.contains(&tag)
}

/// A point in logical page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A layout box as reported by the snapshot, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    /// Build a box from a `[x, y, width, height]` bounds entry
    pub fn from_bounds(bounds: &[f64]) -> Option<Self> {
        match bounds {
            [x, y, width, height, ..] => Some(Self {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }

    /// Divide every coordinate by the device pixel ratio
    pub fn to_logical(&self, pixel_ratio: f64) -> LogicalBox {
        let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        LogicalBox {
            x: self.x / ratio,
            y: self.y / ratio,
            width: self.width / ratio,
            height: self.height / ratio,
        }
    }
}

/// A layout box in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// The visible rectangle of the page in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Viewport {
    pub fn from_geometry(geometry: &PageGeometry) -> Self {
        Self {
            left: geometry.scroll_x,
            top: geometry.scroll_y,
            right: geometry.scroll_x + geometry.screen_width,
            bottom: geometry.scroll_y + geometry.screen_height,
        }
    }

    /// Partial intersection with half-open bounds
    ///
    /// A box touching the left or top edge from outside still counts; one starting
    /// exactly at the right or bottom edge does not.
    pub fn intersects(&self, b: &LogicalBox) -> bool {
        b.x < self.right && b.right() >= self.left && b.y < self.bottom && b.bottom() >= self.top
    }
}

/// Pixel ratio to divide layout boxes by
///
/// macOS reports 1 for scaled displays whose backing store is really 2x.
pub fn effective_pixel_ratio(reported: f64, correct_macos_ratio: bool) -> f64 {
    if correct_macos_ratio && cfg!(target_os = "macos") && reported == 1.0 {
        2.0
    } else {
        reported
    }
}

/// How far down the document the viewport sits, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollProgress {
    pub start: f64,
    pub end: f64,
}

impl ScrollProgress {
    pub fn from_geometry(geometry: &PageGeometry) -> Self {
        if geometry.document_height <= 0.0 {
            return Self {
                start: 0.0,
                end: 100.0,
            };
        }

        let percent = |offset: f64| (offset / geometry.document_height * 100.0).clamp(0.0, 100.0);
        Self {
            start: percent(geometry.scroll_y),
            end: percent(geometry.scroll_y + geometry.screen_height),
        }
    }
}

impl std::fmt::Display for ScrollProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[scrollbar {:.2}-{:.2}%]", self.start, self.end)
    }
}
