//! Result accumulator for stages that must never abort on a single bad item.

use super::errors::ScanError;
use tracing::debug;

/// Collects successes and swallows per-item failures.
///
/// Dropped items are counted and logged at debug level so a scan with many
/// malformed fragments is still visible in the logs without failing.
#[derive(Debug)]
pub struct Harvest<T> {
    items: Vec<T>,
    dropped: usize,
}

impl<T> Default for Harvest<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dropped: 0,
        }
    }
}

impl<T> Harvest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, outcome: Result<T, ScanError>) {
        match outcome {
            Ok(item) => self.items.push(item),
            Err(e) => {
                debug!("harvest: {}", e);
                self.dropped += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> FromIterator<Result<T, ScanError>> for Harvest<T> {
    fn from_iter<I: IntoIterator<Item = Result<T, ScanError>>>(iter: I) -> Self {
        let mut harvest = Harvest::new();
        for outcome in iter {
            harvest.accept(outcome);
        }
        harvest
    }
}
