//! Headless browser management using `chromiumoxide`.
//!
//! The scanner only talks to the [`BrowserLauncher`] / [`BrowserSession`]
//! traits. [`ChromeLauncher`] is the production implementation: it finds a
//! Chromium-family executable, launches it headless with a fixed viewport and
//! hands out one exclusive tab per scan. Nothing is pooled; every session is
//! torn down by [`BrowserSession::quit`] before the scan returns.

use crate::core::config::BrowserSettings;
use crate::core::ScanError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// ── Browser capability seam ──────────────────────────────────────────────────

/// Creates browser sessions. Failing here is the one error that aborts a scan.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, settings: &BrowserSettings)
        -> Result<Box<dyn BrowserSession>, ScanError>;
}

/// One live page, exclusive to a single scan.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), ScanError>;

    /// Whether the rendered DOM currently holds an element matching `css`.
    async fn element_present(&mut self, css: &str) -> Result<bool, ScanError>;

    /// Evaluate a JS expression; `undefined` results come back as `null`.
    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, ScanError>;

    async fn page_source(&mut self) -> Result<String, ScanError>;

    /// Tear the session down. Calling it twice is a no-op.
    async fn quit(&mut self) -> Result<(), ScanError>;
}

// ── Realistic User-Agent pool ────────────────────────────────────────────────

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var
/// 2. PATH scan
/// 3. OS-specific well-known install paths
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = crate::core::config::chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

/// Returns `true` when a usable browser binary is present on this machine.
pub fn native_browser_available() -> bool {
    find_chrome_executable().is_some()
}

// ── Headless browser config builder ──────────────────────────────────────────

/// Headless config: sandbox off (containers / CI), GPU off, no `/dev/shm`
/// reliance, fixed window and viewport.
pub fn build_headless_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig> {
    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", random_user_agent()))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

// ── Chromium implementation ──────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(
        &self,
        settings: &BrowserSettings,
    ) -> Result<Box<dyn BrowserSession>, ScanError> {
        let exe = settings
            .executable
            .clone()
            .or_else(find_chrome_executable)
            .ok_or_else(|| {
                ScanError::Session(
                    "no browser found; install Chrome or Chromium, or set CHROME_EXECUTABLE"
                        .into(),
                )
            })?;

        let (width, height) = settings.viewport;
        let config = build_headless_config(&exe, width, height)
            .map_err(|e| ScanError::Session(e.to_string()))?;

        info!("🚀 Launching headless browser ({})", exe);
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Session(format!("failed to launch ({}): {}", exe, e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                browser.close().await.ok();
                handler_task.abort();
                return Err(ScanError::Session(format!("failed to open tab: {}", e)));
            }
        };

        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            page,
            handler_task,
        }))
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScanError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScanError::Browser(format!("failed to navigate to {}: {}", url, e)))?;
        Ok(())
    }

    async fn element_present(&mut self, css: &str) -> Result<bool, ScanError> {
        let literal = serde_json::to_string(css)
            .map_err(|e| ScanError::Browser(format!("bad selector {}: {}", css, e)))?;
        let value = self
            .execute_script(&format!("document.querySelector({}) !== null", literal))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, ScanError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScanError::Browser(format!("script failed: {}", e)))?;
        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn page_source(&mut self) -> Result<String, ScanError> {
        self.page
            .content()
            .await
            .map_err(|e| ScanError::Browser(format!("failed to read page content: {}", e)))
    }

    async fn quit(&mut self) -> Result<(), ScanError> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = browser.close().await;
        self.handler_task.abort();
        closed.map_err(|e| ScanError::Browser(format!("browser close failed: {}", e)))?;
        info!("🛑 Browser session closed");
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // Only reached with a live browser if the scan future was dropped or
        // panicked before `quit`. Drop cannot await, so close on the runtime.
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        warn!("Browser session dropped without quit; closing in background");
        handle.spawn(async move {
            let _ = browser.close().await;
        });
    }
}
