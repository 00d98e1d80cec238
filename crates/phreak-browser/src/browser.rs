//! Browser lifecycle management using Chrome DevTools Protocol

use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use headless_chrome::browser::tab::point::Point as TabPoint;
use headless_chrome::protocol::cdp::types::Method;
use headless_chrome::{Browser, LaunchOptions, Tab};
use phreak_core::BrowserSettings;
use phreak_page::{CapturedPage, PageGeometry, Point, SnapshotPayload};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The interactive shell can sit idle for a long time between commands
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(60 * 60);

const GEOMETRY_SCRIPT: &str = r#"JSON.stringify({
    scrollX: window.pageXOffset,
    scrollY: window.pageYOffset,
    screenWidth: window.screen.width,
    screenHeight: window.screen.height,
    devicePixelRatio: window.devicePixelRatio,
    documentHeight: document.body ? document.body.scrollHeight : 0
})"#;

const SCROLL_UP_SCRIPT: &str = "(document.scrollingElement || document.body).scrollTop = \
    (document.scrollingElement || document.body).scrollTop - window.innerHeight;";

const SCROLL_DOWN_SCRIPT: &str = "(document.scrollingElement || document.body).scrollTop = \
    (document.scrollingElement || document.body).scrollTop + window.innerHeight;";

const STRIP_TARGETS_SCRIPT: &str = r#"(() => {
    const links = document.getElementsByTagName("a");
    for (let i = 0; i < links.length; i++) {
        links[i].removeAttribute("target");
    }
})()"#;

/// `DOMSnapshot.captureSnapshot`, decoded straight into [`SnapshotPayload`]
///
/// The root node's parent index is `-1`, so the response is read with signed indices.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptureSnapshot {
    computed_styles: Vec<String>,
    include_paint_order: bool,
    #[serde(rename = "includeDOMRects")]
    include_dom_rects: bool,
}

impl Method for CaptureSnapshot {
    const NAME: &'static str = "DOMSnapshot.captureSnapshot";
    type ReturnObject = SnapshotPayload;
}

/// Prefix `http://` when `url` has no scheme
pub fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch browser with the configured window, proxy and user agent
    ///
    /// # Example
    /// ```no_run
    /// use phreak_browser::BrowserSession;
    /// use phreak_core::BrowserSettings;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let session = BrowserSession::launch(&BrowserSettings::default()).await.unwrap();
    ///     session.go_to("example.com").await.unwrap();
    /// }
    /// ```
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            settings.headless, settings.window_width, settings.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((settings.window_width, settings.window_height)))
            .proxy_server(settings.proxy_server.as_deref())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| BrowserError::Browser(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> = settings
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(settings.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance
    ///
    /// # Arguments
    /// * `port` - Chrome DevTools Protocol port (typically 9222)
    pub async fn connect(port: u16) -> Result<Self> {
        info!("Connecting to existing browser on port {}", port);

        let browser = Browser::connect(format!("http://127.0.0.1:{}", port))
            .map_err(|e| BrowserError::Browser(format!("Failed to connect to browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Connected to browser successfully");

        Ok(Self { browser, tab })
    }

    /// Navigate to a URL, adding a scheme if it has none
    pub async fn go_to(&self, url: &str) -> Result<()> {
        let url = with_scheme(url);
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(&url)
            .map_err(|e| BrowserError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Navigated to {}", url);
        Ok(())
    }

    /// Execute JavaScript in the page context
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Browser(format!("JavaScript evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    async fn geometry(&self) -> Result<PageGeometry> {
        let value = self
            .evaluate_script(GEOMETRY_SCRIPT)
            .await
            .map_err(|e| BrowserError::CaptureUnavailable(e.to_string()))?;
        let json = value.as_str().ok_or_else(|| {
            BrowserError::CaptureUnavailable(format!("Unexpected geometry result: {}", value))
        })?;

        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl BrowserDriver for BrowserSession {
    async fn capture(&self) -> Result<CapturedPage> {
        let geometry = self.geometry().await?;

        let snapshot = self
            .tab
            .call_method(CaptureSnapshot {
                computed_styles: Vec::new(),
                include_paint_order: true,
                include_dom_rects: true,
            })
            .map_err(|e| BrowserError::CaptureUnavailable(format!("Snapshot failed: {}", e)))?;

        debug!(
            "Captured {} documents, {} strings",
            snapshot.documents.len(),
            snapshot.strings.len()
        );

        Ok(CapturedPage {
            url: self.tab.get_url(),
            geometry,
            snapshot,
        })
    }

    async fn pointer_click(&self, point: Point) -> Result<()> {
        debug!("Clicking at ({}, {})", point.x, point.y);
        self.tab
            .click_point(TabPoint {
                x: point.x,
                y: point.y,
            })
            .map_err(|e| BrowserError::Browser(format!("Click failed: {}", e)))?;
        Ok(())
    }

    async fn keyboard_type(&self, text: &str) -> Result<()> {
        self.tab
            .type_str(text)
            .map_err(|e| BrowserError::Browser(format!("Typing failed: {}", e)))?;
        Ok(())
    }

    async fn keyboard_submit(&self) -> Result<()> {
        self.tab
            .press_key("Enter")
            .map_err(|e| BrowserError::Browser(format!("Enter failed: {}", e)))?;
        Ok(())
    }

    async fn scroll_by(&self, direction: ScrollDirection) -> Result<()> {
        let script = match direction {
            ScrollDirection::Up => SCROLL_UP_SCRIPT,
            ScrollDirection::Down => SCROLL_DOWN_SCRIPT,
        };
        self.evaluate_script(script).await?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.go_to(url).await
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn strip_link_targets(&self) -> Result<()> {
        self.evaluate_script(STRIP_TARGETS_SCRIPT).await?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}
