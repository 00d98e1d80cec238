//! Page state compilation for the Phreak browsing agent
//!
//! This crate turns one raw `DOMSnapshot.captureSnapshot` result into the compact text a
//! planner reads, plus the table the command interpreter uses to act on it.
//!
//! # Pipeline
//!
//! ```text
//! SnapshotPayload --decode--> RawNode[] --reduce--> InterestElement[] --render--> text
//!                                              \
//!                                               `--> ActuationTable
//! ```
//!
//! - [`snapshot`]: string-table decoding into per-node records
//! - [`ancestry`]: which link or button owns each node
//! - [`viewport`]: pixel-ratio correction, viewport intersection, scroll progress
//! - [`reducer`]: merging, filtering and dense id assignment
//! - [`serializer`]: the `<kind id=N ...>label</kind>` line format
//!
//! # Example
//!
//! ```no_run
//! use phreak_page::{compile, CapturedPage, CompileOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let saved = std::fs::read_to_string("capture.json")?;
//! let page: CapturedPage = serde_json::from_str(&saved)?;
//!
//! let state = compile(&page, &CompileOptions::default())?;
//! println!("{}", state.text);
//! # Ok(())
//! # }
//! ```

pub mod ancestry;
pub mod element;
pub mod payload;
pub mod reducer;
pub mod serializer;
pub mod snapshot;
pub mod viewport;

pub use element::{classify, ActuationTable, ActuationTarget, ElementKind, InterestElement};
pub use payload::{CapturedPage, PageGeometry, SnapshotPayload};
pub use reducer::{reduce, CompileOptions, Contribution, Reduction};
pub use serializer::render;
pub use snapshot::{decode, RawNode};
pub use viewport::{Point, ScrollProgress};

use phreak_core::Result;
use std::time::Instant;
use tracing::info;

/// Everything one capture compiles to
///
/// Owned by the capture that produced it. The next capture builds a new one; nothing in
/// here is carried forward.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub url: String,
    pub elements: Vec<InterestElement>,
    pub actuation: ActuationTable,
    pub scroll: ScrollProgress,
    /// Rendered elements, one per line
    pub text: String,
}

/// Decode, reduce and render one captured page
pub fn compile(page: &CapturedPage, options: &CompileOptions) -> Result<PageState> {
    let start = Instant::now();

    let nodes = decode(&page.snapshot)?;
    let Reduction {
        elements,
        actuation,
    } = reduce(&nodes, &page.geometry, options);
    let text = render(&elements);

    info!(
        "Compiled {} ({} nodes -> {} elements) in {:.2}s",
        page.url,
        nodes.len(),
        elements.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(PageState {
        url: page.url.clone(),
        elements,
        actuation,
        scroll: ScrollProgress::from_geometry(&page.geometry),
        text,
    })
}
