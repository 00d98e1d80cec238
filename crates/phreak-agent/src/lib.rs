//! # phreak-agent
//!
//! The planning side of the capture cycle.
//!
//! Each cycle renders a fresh [`BrowsePrompt`] from the compiled page and sends it to a
//! [`Planner`]. No conversation history is kept: the previous command and the current
//! page are all the planner sees.

mod auth;
mod client;
mod planner;
mod prompt;
mod types;

pub use auth::get_api_key;
pub use client::CompletionClient;
pub use planner::{Planner, ScriptedPlanner};
pub use prompt::{truncate_chars, BrowsePrompt};
pub use types::*;
