//! Browser control and command interpretation for the Phreak browsing agent
//!
//! This crate drives a Chrome tab over the DevTools Protocol, captures pages for
//! `phreak-page` to compile, and executes planner commands against the result.
//!
//! # Example
//!
//! ```no_run
//! use phreak_browser::{BrowserSession, Session};
//! use phreak_core::PhreakConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PhreakConfig::default();
//!     let browser = BrowserSession::launch(&config.browser).await?;
//!     browser.go_to(&config.session.scoped_domain).await?;
//!
//!     let mut session = Session::new(browser, &config);
//!     let state = session.capture().await?;
//!     println!("{}", state.text);
//!
//!     let report = session.act("CLICK 0").await;
//!     println!("{} commands succeeded", report.succeeded());
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium browser installed
//! - For connecting to existing browser: `chrome --remote-debugging-port=9222`
//!
//! # Architecture
//!
//! - [`driver`]: the [`BrowserDriver`] trait every browser action goes through
//! - [`browser`]: the headless_chrome implementation
//! - [`command`]: planner command grammar
//! - [`interpreter`]: command execution against an actuation table
//! - [`session`]: the capture/act cycle

pub mod browser;
pub mod command;
pub mod driver;
pub mod error;
pub mod interpreter;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use browser::{with_scheme, BrowserSession};
pub use command::{parse_reply, Command};
pub use driver::{BrowserDriver, ScrollDirection};
pub use error::{BrowserError, Result};
pub use interpreter::{BatchReport, CommandOutcome, Interpreter};
pub use session::Session;
