//! Interactive capture/plan/act loop

use anyhow::Result;
use phreak_agent::{BrowsePrompt, Planner};
use phreak_browser::{BrowserDriver, Command, Session};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Pause after a manual action before recapturing
pub const MANUAL_SETTLE: Duration = Duration::from_secs(1);

const HELP: &str = "(g) to visit url\n(u) scroll up\n(d) scroll down\n(c) to click\n(t) to type\n\
                    (h) to view commands again\n(r/enter) to run suggested command";

/// One keypress at the shell prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKey {
    Run,
    GoTo,
    ScrollUp,
    ScrollDown,
    Click,
    Type,
    Help,
}

impl ShellKey {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | "r" => ShellKey::Run,
            "g" => ShellKey::GoTo,
            "u" => ShellKey::ScrollUp,
            "d" => ShellKey::ScrollDown,
            "c" => ShellKey::Click,
            "t" => ShellKey::Type,
            _ => ShellKey::Help,
        }
    }
}

/// Latched Ctrl+C, shared by everything in the loop
///
/// Once raised it stays raised, so an interrupt that lands during a capture or a
/// planner call is still seen at the next check.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Interrupt {
    /// Latch every Ctrl+C for the rest of the process
    pub fn listen() -> Self {
        let interrupt = Self::default();
        let latch = interrupt.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl+C received");
                latch.raise();
            }
        });
        interrupt
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        // Registered before the check so a raise in between still wakes us
        let notified = self.notify.notified();
        if self.is_raised() {
            return;
        }
        notified.await;
    }
}

/// Line reader that gives up on EOF or Ctrl+C
pub struct Prompter<R> {
    lines: Lines<R>,
    interrupt: Interrupt,
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R, interrupt: Interrupt) -> Self {
        Self {
            lines: reader.lines(),
            interrupt,
        }
    }

    /// Print `label` and read one line; `None` means the user wants out
    pub async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        if self.interrupted() {
            return Ok(None);
        }
        print!("{}", label);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            biased;
            _ = self.interrupt.wait() => None,
            line = self.lines.next_line() => line?,
        };
        if self.interrupted() {
            return Ok(None);
        }
        Ok(line)
    }

    /// True once Ctrl+C has been pressed anywhere in the loop
    fn interrupted(&self) -> bool {
        let raised = self.interrupt.is_raised();
        if raised {
            println!("\n[!] Ctrl+C detected, exiting gracefully.");
        }
        raised
    }

    async fn ask_id(&mut self) -> Result<Option<Option<usize>>> {
        Ok(self.ask("id:").await?.map(|line| parse_id(&line)))
    }
}

fn parse_id(line: &str) -> Option<usize> {
    let id = line.trim().parse().ok();
    if id.is_none() {
        println!("Not an element id: {}", line.trim());
    }
    id
}

/// Everything the loop needs besides the session
pub struct Shell<'a, R> {
    pub planner: &'a dyn Planner,
    pub prompt: &'a BrowsePrompt,
    pub prompter: Prompter<R>,
    pub quiet: bool,
    /// Pause after a manual command before recapturing
    pub settle: Duration,
}

impl<'a, R: AsyncBufRead + Unpin> Shell<'a, R> {
    /// Run until EOF or Ctrl+C
    ///
    /// Ctrl+C is honored at the prompt and after every capture, planner call and
    /// batch of commands.
    pub async fn run<D: BrowserDriver>(&mut self, session: &mut Session<D>) -> Result<()> {
        let mut suggestion = String::new();

        loop {
            let previous = std::mem::take(&mut suggestion);

            let captured = session.capture().await;
            if self.prompter.interrupted() {
                return Ok(());
            }

            match captured {
                Ok(state) => {
                    let text = state.text.clone();
                    let url = state.url.clone();
                    let scroll = state.scroll;

                    let reply = self
                        .planner
                        .next_command(&self.prompt.render(&previous, &url, &text))
                        .await;
                    if self.prompter.interrupted() {
                        return Ok(());
                    }
                    match reply {
                        Ok(reply) => suggestion = reply.trim().to_string(),
                        Err(e) if e.is_recoverable() => warn!("Planner failed: {}", e),
                        Err(e) => return Err(e.into()),
                    }

                    if !self.quiet {
                        println!("URL: {}", url);
                        println!("{}", scroll);
                        println!("----------------\n{}\n----------------\n", text);
                    }
                }
                Err(e) => println!("Could not capture the page: {}", e),
            }

            if !suggestion.is_empty() {
                println!("Suggested command: {}", suggestion);
            }

            let Some(input) = self.prompter.ask("").await? else {
                return Ok(());
            };

            let manual = match ShellKey::parse(&input) {
                ShellKey::Run => {
                    let report = session.act(&suggestion).await;
                    for outcome in &report.outcomes {
                        if let Err(e) = &outcome.result {
                            println!("{}: {}", outcome.command, e);
                        }
                    }
                    None
                }
                ShellKey::GoTo => {
                    let Some(url) = self.prompter.ask("URL:").await? else {
                        return Ok(());
                    };
                    if let Err(e) = session.go_to(url.trim()).await {
                        println!("{}", e);
                    }
                    None
                }
                ShellKey::ScrollUp => Some(Command::ScrollUp),
                ShellKey::ScrollDown => Some(Command::ScrollDown),
                ShellKey::Click => match self.prompter.ask_id().await? {
                    None => return Ok(()),
                    Some(id) => id.map(Command::Click),
                },
                ShellKey::Type => {
                    let Some(id) = self.prompter.ask_id().await? else {
                        return Ok(());
                    };
                    let Some(text) = self.prompter.ask("text:").await? else {
                        return Ok(());
                    };
                    id.map(|id| Command::Type { id, text })
                }
                ShellKey::Help => {
                    println!("{}", HELP);
                    None
                }
            };

            if let Some(command) = manual {
                if let Err(e) = session.execute(&command).await {
                    println!("{}: {}", command, e);
                }
                if !self.settle.is_zero() {
                    tokio::time::sleep(self.settle).await;
                }
            }

            if self.prompter.interrupted() {
                return Ok(());
            }
        }
    }
}
