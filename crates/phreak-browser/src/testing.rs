//! Recording driver for tests

use std::sync::Mutex;

use async_trait::async_trait;
use phreak_page::{ActuationTable, ActuationTarget, CapturedPage, Point};

use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::{PhreakError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Capture,
    Click(Point),
    Type(String),
    Submit,
    Scroll(ScrollDirection),
    Navigate(String),
    StripTargets,
}

/// Records every call; captures return `page` or fail when it is unset
#[derive(Default)]
pub struct RecordingDriver {
    actions: Mutex<Vec<Action>>,
    page: Mutex<Option<CapturedPage>>,
    fail_clicks: bool,
}

impl RecordingDriver {
    pub fn with_page(page: CapturedPage) -> Self {
        let driver = Self::default();
        driver.set_page(Some(page));
        driver
    }

    pub fn failing_clicks() -> Self {
        Self {
            fail_clicks: true,
            ..Self::default()
        }
    }

    pub fn set_page(&self, page: Option<CapturedPage>) {
        *self.page.lock().unwrap() = page;
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl BrowserDriver for RecordingDriver {
    async fn capture(&self) -> Result<CapturedPage> {
        self.record(Action::Capture);
        self.page
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PhreakError::CaptureUnavailable("no page loaded".to_string()))
    }

    async fn pointer_click(&self, point: Point) -> Result<()> {
        if self.fail_clicks {
            return Err(PhreakError::Browser("click failed".to_string()));
        }
        self.record(Action::Click(point));
        Ok(())
    }

    async fn keyboard_type(&self, text: &str) -> Result<()> {
        self.record(Action::Type(text.to_string()));
        Ok(())
    }

    async fn keyboard_submit(&self) -> Result<()> {
        self.record(Action::Submit);
        Ok(())
    }

    async fn scroll_by(&self, direction: ScrollDirection) -> Result<()> {
        self.record(Action::Scroll(direction));
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .page
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.url.clone())
            .unwrap_or_default())
    }

    async fn strip_link_targets(&self) -> Result<()> {
        self.record(Action::StripTargets);
        Ok(())
    }
}

/// An actuation table with one target per point, ids in order
pub fn table(points: &[(f64, f64)]) -> ActuationTable {
    points
        .iter()
        .map(|&(x, y)| ActuationTarget {
            click_point: Point { x, y },
            backend_node_id: None,
        })
        .collect()
}
