//! Remote tile existence checks.

use crate::provider::HttpClient;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Short-lived memo of probe results.
///
/// The lock is never held across a probe, so concurrent first lookups of
/// the same URL each reach the server. A zero TTL disables the memo.
///
/// Expired entries are dropped whenever a new result is stored. The memo
/// lives as long as the service, so it only saves requests in a long-lived
/// process; a one-shot CLI run starts empty.
#[derive(Debug)]
pub struct ProbeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, bool)>>,
}

impl Default for ProbeCache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ProbeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Whether `url` answered a probe, using a fresh memo entry if one exists.
    pub fn exists(&self, http: &dyn HttpClient, url: &str) -> bool {
        if let Some(found) = self.lookup(url) {
            return found;
        }

        let found = match http.probe(url) {
            Ok(()) => true,
            Err(e) => {
                debug!(url = url, error = %e, "Tile probe failed");
                false
            }
        };

        if self.is_enabled() {
            if let Ok(mut entries) = self.entries.lock() {
                let ttl = self.ttl;
                entries.retain(|_, (at, _)| at.elapsed() < ttl);
                entries.insert(url.to_string(), (Instant::now(), found));
            }
        }
        found
    }

    fn lookup(&self, url: &str) -> Option<bool> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().ok()?;
        match entries.get(url) {
            Some(&(at, found)) if at.elapsed() < self.ttl => Some(found),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockHttpClient, ProviderError};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_disabled_cache_always_probes() {
        let http = MockHttpClient::new(Ok(Vec::new()));
        let cache = ProbeCache::disabled();
        assert!(cache.exists(&http, "http://t/1.png"));
        assert!(cache.exists(&http, "http://t/1.png"));
        assert_eq!(http.call_count(), 2);
    }

    #[test]
    fn test_enabled_cache_reuses_results() {
        let http = MockHttpClient::new(Err(ProviderError::Status {
            status: 404,
            url: "http://t/1.png".to_string(),
        }));
        let cache = ProbeCache::new(Duration::from_secs(60));
        assert!(!cache.exists(&http, "http://t/1.png"));
        assert!(!cache.exists(&http, "http://t/1.png"));
        assert_eq!(http.call_count(), 1);

        assert!(!cache.exists(&http, "http://t/2.png"));
        assert_eq!(http.call_count(), 2);
    }

    #[test]
    fn test_expired_entries_are_probed_again() {
        let http = MockHttpClient::new(Ok(Vec::new()));
        let cache = ProbeCache::new(Duration::from_millis(10));
        assert!(cache.exists(&http, "http://t/1.png"));
        thread::sleep(Duration::from_millis(30));
        assert!(cache.exists(&http, "http://t/1.png"));
        assert_eq!(http.call_count(), 2);
    }

    #[test]
    fn test_storing_a_result_evicts_expired_entries() {
        let http = MockHttpClient::new(Ok(Vec::new()));
        let cache = ProbeCache::new(Duration::from_millis(10));
        for i in 0..50 {
            cache.exists(&http, &format!("http://t/{}.png", i));
        }
        assert_eq!(cache.len(), 50);

        thread::sleep(Duration::from_millis(30));
        cache.exists(&http, "http://t/fresh.png");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_probes_are_not_coalesced() {
        let http = MockHttpClient::new(Ok(Vec::new())).with_delay(Duration::from_millis(200));
        let cache = Arc::new(ProbeCache::new(Duration::from_secs(60)));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let http = http.clone();
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.exists(&http, "http://t/same.png")
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(http.call_count(), 2);
    }
}
