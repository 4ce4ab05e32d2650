use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ScoutConfig — file-based config loader (resale-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "RESALE_SCOUT_CONFIG";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_ORIGIN: &str = "RESALE_SCOUT_ORIGIN";
pub const ENV_READY_TIMEOUT_SECS: &str = "RESALE_SCOUT_READY_TIMEOUT_SECS";
pub const ENV_SCROLL_ROUNDS: &str = "RESALE_SCOUT_SCROLL_ROUNDS";
pub const ENV_SCROLL_PAUSE_MS: &str = "RESALE_SCOUT_SCROLL_PAUSE_MS";
pub const ENV_MAX_ITEMS: &str = "RESALE_SCOUT_MAX_ITEMS";

pub const DEFAULT_ORIGIN: &str = "https://es.wallapop.com";
pub const DEFAULT_SEARCH_PATH: &str = "/app/search";
pub const DEFAULT_KEYWORDS: &str = "electronics";
pub const DEFAULT_LATITUDE: f64 = 37.9838;
pub const DEFAULT_LONGITUDE: f64 = -1.1297;
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_READY_POLL_MS: u64 = 250;
pub const DEFAULT_SCROLL_ROUNDS: usize = 3;
pub const DEFAULT_SCROLL_PAUSE_MS: u64 = 2000;
pub const DEFAULT_MAX_ITEMS: usize = 20;
pub const DEFAULT_VIEWPORT: (u32, u32) = (1920, 1080);

/// Scanner section of `resale-scout.json`. Every field is optional; absent
/// fields fall back to the matching env var, then to the built-in default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScannerFileConfig {
    /// Marketplace origin, e.g. `https://es.wallapop.com`.
    pub origin: Option<String>,
    pub keywords: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ready_timeout_secs: Option<u64>,
    pub scroll_rounds: Option<usize>,
    pub scroll_pause_ms: Option<u64>,
    pub max_items: Option<usize>,
}

/// Top-level config loaded from `resale-scout.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    #[serde(default)]
    pub scanner: ScannerFileConfig,
}

/// Load `resale-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `RESALE_SCOUT_CONFIG` env var path
/// 2. `./resale-scout.json`
/// 3. `../resale-scout.json`
///
/// Missing file → `ScoutConfig::default()`.
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    let mut candidates = vec![
        std::path::PathBuf::from("resale-scout.json"),
        std::path::PathBuf::from("../resale-scout.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, std::path::PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match serde_json::from_str::<ScoutConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("resale-scout.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "resale-scout.json parse error at {}: {}, using defaults",
                    path.display(),
                    e
                );
                ScoutConfig::default()
            }
        };
    }

    ScoutConfig::default()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Launch options for the headless browser.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowserSettings {
    /// Explicit executable; `None` means auto-discovery.
    pub executable: Option<String>,
    pub viewport: (u32, u32),
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: chrome_executable_override(),
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

/// Fixed internal bounds of a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScannerSettings {
    pub origin: String,
    pub search_path: String,
    pub keywords: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ready_timeout: Duration,
    pub ready_poll: Duration,
    pub scroll_rounds: usize,
    pub scroll_pause: Duration,
    pub max_items: usize,
    pub browser: BrowserSettings,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            keywords: DEFAULT_KEYWORDS.to_string(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            ready_poll: Duration::from_millis(DEFAULT_READY_POLL_MS),
            scroll_rounds: DEFAULT_SCROLL_ROUNDS,
            scroll_pause: Duration::from_millis(DEFAULT_SCROLL_PAUSE_MS),
            max_items: DEFAULT_MAX_ITEMS,
            browser: BrowserSettings::default(),
        }
    }
}

impl ScannerSettings {
    /// JSON field → env var → default, field by field.
    pub fn resolve(file: &ScannerFileConfig) -> Self {
        let defaults = Self::default();

        let origin = file
            .origin
            .clone()
            .filter(|o| !o.trim().is_empty())
            .or_else(|| std::env::var(ENV_ORIGIN).ok().filter(|v| !v.trim().is_empty()))
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.origin);

        let ready_timeout_secs = file
            .ready_timeout_secs
            .or_else(|| env_parse(ENV_READY_TIMEOUT_SECS))
            .unwrap_or(DEFAULT_READY_TIMEOUT_SECS);
        let scroll_pause_ms = file
            .scroll_pause_ms
            .or_else(|| env_parse(ENV_SCROLL_PAUSE_MS))
            .unwrap_or(DEFAULT_SCROLL_PAUSE_MS);

        Self {
            origin,
            keywords: file.keywords.clone().unwrap_or(defaults.keywords),
            latitude: file.latitude.unwrap_or(defaults.latitude),
            longitude: file.longitude.unwrap_or(defaults.longitude),
            ready_timeout: Duration::from_secs(ready_timeout_secs),
            scroll_rounds: file
                .scroll_rounds
                .or_else(|| env_parse(ENV_SCROLL_ROUNDS))
                .unwrap_or(DEFAULT_SCROLL_ROUNDS),
            scroll_pause: Duration::from_millis(scroll_pause_ms),
            max_items: file
                .max_items
                .or_else(|| env_parse(ENV_MAX_ITEMS))
                .unwrap_or(DEFAULT_MAX_ITEMS),
            ..defaults
        }
    }
}

/// Optional override for the Chromium-family browser executable.
///
/// Only returns a value when `CHROME_EXECUTABLE` is set to an existing path;
/// otherwise `scraping::browser_manager::find_chrome_executable()` searches.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}
