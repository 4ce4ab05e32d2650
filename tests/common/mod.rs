//! Scripted stand-in for a headless browser.
#![allow(dead_code)]

use async_trait::async_trait;
use resale_scout::browser_manager::{BrowserLauncher, BrowserSession};
use resale_scout::core::config::{BrowserSettings, ScannerSettings};
use resale_scout::core::ScanError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake page does once navigated.
#[derive(Clone, Debug)]
pub struct PageScript {
    pub html: String,
    /// Number of readiness probes answered `false` before cards appear.
    /// `None` means cards never appear.
    pub ready_after_polls: Option<usize>,
    /// Successive page heights; the last one repeats.
    pub heights: Vec<u64>,
    pub fail_navigation: bool,
    pub fail_source: bool,
}

impl PageScript {
    pub fn with_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ready_after_polls: Some(0),
            heights: vec![1000],
            fail_navigation: false,
            fail_source: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct Calls {
    pub launches: Arc<AtomicUsize>,
    pub quits: Arc<AtomicUsize>,
    pub scrolls: Arc<AtomicUsize>,
    pub probes: Arc<AtomicUsize>,
    pub navigations: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

pub struct FakeLauncher {
    pub script: PageScript,
    pub calls: Calls,
    pub fail_launch: bool,
}

impl FakeLauncher {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            calls: Calls::default(),
            fail_launch: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(PageScript::with_html(""))
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(
        &self,
        _settings: &BrowserSettings,
    ) -> Result<Box<dyn BrowserSession>, ScanError> {
        self.calls.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(ScanError::Session("chromium not installed".into()));
        }
        Ok(Box::new(FakeSession {
            script: self.script.clone(),
            calls: self.calls.clone(),
            height_reads: 0,
            quit: false,
        }))
    }
}

struct FakeSession {
    script: PageScript,
    calls: Calls,
    height_reads: usize,
    quit: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScanError> {
        self.calls.navigations.lock().unwrap().push(url.to_string());
        if self.script.fail_navigation {
            return Err(ScanError::Browser("net::ERR_NAME_NOT_RESOLVED".into()));
        }
        Ok(())
    }

    async fn element_present(&mut self, _css: &str) -> Result<bool, ScanError> {
        let seen = self.calls.probes.fetch_add(1, Ordering::SeqCst);
        Ok(matches!(self.script.ready_after_polls, Some(n) if seen >= n))
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, ScanError> {
        if script.starts_with("window.scrollTo") {
            self.calls.scrolls.fetch_add(1, Ordering::SeqCst);
            return Ok(serde_json::Value::Null);
        }
        if script.contains("scrollHeight") {
            let idx = self.height_reads.min(self.script.heights.len().saturating_sub(1));
            self.height_reads += 1;
            let height = self.script.heights.get(idx).copied().unwrap_or(0);
            return Ok(serde_json::json!(height));
        }
        Err(ScanError::Browser(format!("unexpected script: {}", script)))
    }

    async fn page_source(&mut self) -> Result<String, ScanError> {
        if self.script.fail_source {
            return Err(ScanError::Browser("target closed".into()));
        }
        Ok(self.script.html.clone())
    }

    async fn quit(&mut self) -> Result<(), ScanError> {
        if !self.quit {
            self.quit = true;
            self.calls.quits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Default settings with the waits shrunk to milliseconds.
pub fn fast_settings() -> ScannerSettings {
    ScannerSettings {
        ready_timeout: Duration::from_millis(40),
        ready_poll: Duration::from_millis(1),
        scroll_pause: Duration::from_millis(1),
        ..ScannerSettings::default()
    }
}

pub fn card(title: &str, price: &str, href: &str) -> String {
    format!(
        r#"<div class="ItemCardList__item"><div class="CardItem-module__item___h4sh1">
             <a href="{href}">
               <p class="CardItem-module__title___h4sh2">{title}</p>
               <span class="CardItem-module__price___h4sh3">{price}</span>
             </a>
           </div></div>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Resultados</title></head><body><section>{}</section></body></html>",
        cards.join("\n")
    )
}
