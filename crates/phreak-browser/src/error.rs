//! Browser error types - re-exports unified PhreakError from phreak-core
//!
//! Browser failures use the PhreakError variants:
//! - Browser(String) - launch, navigation and actuation failures
//! - CaptureUnavailable(String) - the page could not be captured this cycle
//! - UnknownElement(usize) - a command referenced an id not in the current table
//!
//! Error messages should say which operation failed and on what.

pub use phreak_core::{PhreakError, Result};

pub type BrowserError = PhreakError;
