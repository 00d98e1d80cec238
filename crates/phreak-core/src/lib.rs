//! # phreak-core
//!
//! Shared foundations for the Phreak browsing agent.
//!
//! Phreak drives a browser on behalf of a planner: each capture cycle compiles the
//! visible page into a compact element listing, the planner answers with short
//! commands, and those commands are turned back into pointer and keyboard actions.
//!
//! This crate holds the pieces every other crate leans on:
//!
//! - [`PhreakError`] - the unified error taxonomy
//! - [`PhreakConfig`] - repository-level configuration loaded from `.phreak/config.toml`

pub mod config;
mod error;

pub use config::{BrowserSettings, PhreakConfig, PlannerSettings, SessionSettings};
pub use error::{PhreakError, Result};
