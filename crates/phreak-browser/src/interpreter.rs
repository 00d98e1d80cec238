//! Command execution against one capture's actuation table

use std::time::Duration;
use tracing::{info, warn};

use crate::command::{parse_reply, Command};
use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::{PhreakError, Result};
use phreak_page::ActuationTable;

/// How one command in a batch went
#[derive(Debug)]
pub struct CommandOutcome {
    pub command: Command,
    pub result: Result<()>,
}

/// Per-command results of a batch, in execution order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Turns planner commands into browser actions
///
/// Element ids are resolved against the table passed to each call, which must be the one
/// built by the most recent capture.
pub struct Interpreter<'a, D: BrowserDriver + ?Sized> {
    driver: &'a D,
    scoped_domain: String,
    settle_delay: Duration,
}

impl<'a, D: BrowserDriver + ?Sized> Interpreter<'a, D> {
    pub fn new(driver: &'a D, scoped_domain: impl Into<String>, settle_delay: Duration) -> Self {
        Self {
            driver,
            scoped_domain: scoped_domain.into(),
            settle_delay,
        }
    }

    /// Execute a single command
    ///
    /// An id missing from `table` fails with [`PhreakError::UnknownElement`] before
    /// anything is sent to the browser.
    pub async fn execute(&self, command: &Command, table: &ActuationTable) -> Result<()> {
        match command {
            Command::ScrollUp => self.driver.scroll_by(ScrollDirection::Up).await,
            Command::ScrollDown => self.driver.scroll_by(ScrollDirection::Down).await,
            Command::Click(id) => self.click(*id, table).await,
            Command::Type { id, text } => {
                self.click(*id, table).await?;
                self.driver.keyboard_type(text).await
            }
            Command::TypeSubmit { id, text } => {
                self.click(*id, table).await?;
                self.driver.keyboard_type(text).await?;
                self.driver.keyboard_submit().await
            }
            Command::ReturnToDomain => self.driver.navigate(&self.scoped_domain).await,
        }
    }

    async fn click(&self, id: usize, table: &ActuationTable) -> Result<()> {
        let target = table.get(id).ok_or(PhreakError::UnknownElement(id))?;
        self.driver.strip_link_targets().await?;
        self.driver.pointer_click(target.click_point).await
    }

    /// Parse a planner reply and execute each command in order
    ///
    /// A failing command is logged and the batch moves on to the next line. After each
    /// command that reached the browser the interpreter waits for the page to settle.
    pub async fn run_batch(&self, reply: &str, table: &ActuationTable) -> BatchReport {
        let mut report = BatchReport::default();

        for command in parse_reply(reply) {
            info!("Executing {}", command);
            let result = self.execute(&command, table).await;

            let dispatched = !matches!(result, Err(PhreakError::UnknownElement(_)));
            if let Err(e) = &result {
                warn!("{} failed: {}", command, e);
            }
            if dispatched && !self.settle_delay.is_zero() {
                tokio::time::sleep(self.settle_delay).await;
            }

            report.outcomes.push(CommandOutcome { command, result });
        }

        report
    }
}
