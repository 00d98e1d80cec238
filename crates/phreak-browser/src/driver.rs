//! The browser-control seam
//!
//! Everything the capture cycle needs from a browser goes through [`BrowserDriver`], so
//! the interpreter and session can be exercised against a recording fake.

use async_trait::async_trait;
use phreak_page::{CapturedPage, Point};

use crate::error::Result;

/// Direction for a one-page scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollDirection::Up => write!(f, "up"),
            ScrollDirection::Down => write!(f, "down"),
        }
    }
}

/// Trait for controlling a browser tab (allows mocking in tests)
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Capture the page structure, layout and window geometry
    async fn capture(&self) -> Result<CapturedPage>;

    /// Click at a point in logical page coordinates
    async fn pointer_click(&self, point: Point) -> Result<()>;

    /// Type text into whatever has focus
    async fn keyboard_type(&self, text: &str) -> Result<()>;

    /// Press Enter
    async fn keyboard_submit(&self) -> Result<()>;

    /// Scroll one window height
    async fn scroll_by(&self, direction: ScrollDirection) -> Result<()>;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Remove `target` from every link so clicks stay in the current tab
    async fn strip_link_targets(&self) -> Result<()>;
}
