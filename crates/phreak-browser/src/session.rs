//! The capture/act cycle
//!
//! A [`Session`] owns the driver and at most one compiled [`PageState`]. Every capture
//! replaces the state wholesale, and a failed capture clears it so no command can act on
//! ids from an older page.

use std::time::Duration;
use tracing::{debug, warn};

use crate::command::Command;
use crate::driver::BrowserDriver;
use crate::error::Result;
use crate::interpreter::{BatchReport, Interpreter};
use phreak_core::PhreakConfig;
use phreak_page::{compile, ActuationTable, CompileOptions, PageState};

pub struct Session<D: BrowserDriver> {
    driver: D,
    options: CompileOptions,
    scoped_domain: String,
    settle_delay: Duration,
    state: Option<PageState>,
}

impl<D: BrowserDriver> Session<D> {
    pub fn new(driver: D, config: &PhreakConfig) -> Self {
        Self {
            driver,
            options: CompileOptions {
                correct_macos_ratio: config.browser.correct_macos_ratio,
            },
            scoped_domain: config.session.scoped_domain.clone(),
            settle_delay: Duration::from_millis(config.session.settle_delay_ms),
            state: None,
        }
    }

    /// Capture and compile the current page
    pub async fn capture(&mut self) -> Result<&PageState> {
        self.state = None;

        let page = match self.driver.capture().await {
            Ok(page) => page,
            Err(e) => {
                warn!("Capture failed: {}", e);
                return Err(e);
            }
        };
        let state = compile(&page, &self.options)?;
        debug!("Page has {} interactable elements", state.actuation.len());

        Ok(self.state.insert(state))
    }

    /// The most recent successful capture, if it is still current
    pub fn state(&self) -> Option<&PageState> {
        self.state.as_ref()
    }

    /// Navigate away; ids from the previous page stop being valid
    pub async fn go_to(&mut self, url: &str) -> Result<()> {
        self.state = None;
        self.driver.navigate(url).await
    }

    pub async fn return_to_domain(&mut self) -> Result<()> {
        let domain = self.scoped_domain.clone();
        self.go_to(&domain).await
    }

    /// Run a planner reply against the current capture
    pub async fn act(&self, reply: &str) -> BatchReport {
        self.interpreter().run_batch(reply, self.table()).await
    }

    /// Run one command against the current capture
    pub async fn execute(&self, command: &Command) -> Result<()> {
        self.interpreter().execute(command, self.table()).await
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn interpreter(&self) -> Interpreter<'_, D> {
        Interpreter::new(&self.driver, self.scoped_domain.clone(), self.settle_delay)
    }

    fn table(&self) -> &ActuationTable {
        static EMPTY: ActuationTable = ActuationTable::EMPTY;
        self.state.as_ref().map(|s| &s.actuation).unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Action, RecordingDriver};
    use phreak_core::PhreakError;
    use phreak_page::{CapturedPage, Point};
    use serde_json::json;

    fn config() -> PhreakConfig {
        let mut config = PhreakConfig::default();
        config.browser.correct_macos_ratio = false;
        config.session.settle_delay_ms = 0;
        config
    }

    fn privacy_page() -> CapturedPage {
        serde_json::from_value(json!({
            "url": "http://localhost/",
            "geometry": {
                "scrollX": 0, "scrollY": 0,
                "screenWidth": 1280, "screenHeight": 1080,
                "devicePixelRatio": 1, "documentHeight": 1080
            },
            "snapshot": {
                "strings": ["HTML", "BODY", "A", "#text", "Privacy"],
                "documents": [{
                    "nodes": {
                        "parentIndex": [-1, 0, 1, 2],
                        "nodeName": [0, 1, 2, 3],
                        "nodeValue": [-1, -1, -1, 4],
                        "backendNodeId": [1, 2, 3, 4]
                    },
                    "layout": {
                        "nodeIndex": [2, 3],
                        "bounds": [[20, 40, 80, 18], [20, 40, 60, 18]]
                    }
                }]
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_capture_then_click() {
        let mut session = Session::new(RecordingDriver::with_page(privacy_page()), &config());

        let state = session.capture().await.unwrap();
        assert_eq!(state.text, "<link id=0>Privacy</link>");

        let report = session.act("CLICK 0").await;
        assert_eq!(report.succeeded(), 1);
        assert!(session
            .driver()
            .actions()
            .contains(&Action::Click(Point { x: 60.0, y: 49.0 })));
    }

    #[tokio::test]
    async fn test_go_to_clears_state() {
        let mut session = Session::new(RecordingDriver::with_page(privacy_page()), &config());
        session.capture().await.unwrap();

        session.go_to("localhost/login").await.unwrap();
        assert!(session.state().is_none());
    }

    #[tokio::test]
    async fn test_failed_capture_clears_state() {
        let mut session = Session::new(RecordingDriver::with_page(privacy_page()), &config());
        session.capture().await.unwrap();
        assert!(session.state().is_some());

        session.driver().set_page(None);
        let err = session.capture().await.unwrap_err();
        assert!(matches!(err, PhreakError::CaptureUnavailable(_)));
        assert!(session.state().is_none());

        let report = session.act("CLICK 0").await;
        assert!(matches!(
            report.outcomes[0].result,
            Err(PhreakError::UnknownElement(0))
        ));
    }

    #[tokio::test]
    async fn test_return_to_domain() {
        let mut session = Session::new(RecordingDriver::default(), &config());
        session.return_to_domain().await.unwrap();
        assert_eq!(
            session.driver().actions(),
            vec![Action::Navigate("http://localhost".to_string())]
        );
    }
}
