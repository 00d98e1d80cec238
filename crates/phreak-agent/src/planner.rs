//! The planning collaborator seam

use async_trait::async_trait;
use phreak_core::{PhreakError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Anything that can answer a browse prompt with commands
///
/// The reply is raw text; parsing it into commands is the interpreter's job.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn next_command(&self, prompt: &str) -> Result<String>;
}

/// Replays canned replies in order, then answers with an empty string
///
/// Useful for dry runs and tests where no model should be called. Every prompt it is
/// asked is kept for inspection.
#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedPlanner {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> PhreakError {
    PhreakError::Planner("scripted planner poisoned".into())
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn next_command(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .map_err(poisoned)?
            .push(prompt.to_string());
        let mut replies = self.replies.lock().map_err(poisoned)?;
        Ok(replies.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let planner = ScriptedPlanner::new(["CLICK 1", "SCROLL DOWN"]);
        assert_eq!(planner.next_command("p").await.unwrap(), "CLICK 1");
        assert_eq!(planner.next_command("p").await.unwrap(), "SCROLL DOWN");
        assert_eq!(planner.next_command("p").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_scripted_planner_keeps_prompts() {
        let planner = ScriptedPlanner::new(["CLICK 1"]);
        planner.next_command("first").await.unwrap();
        planner.next_command("second").await.unwrap();
        assert_eq!(planner.prompts(), vec!["first", "second"]);
    }
}
