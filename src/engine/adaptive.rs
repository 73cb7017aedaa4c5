//! Adaptive fetch policy: sticky engine escalation on WAF-like responses
//! (spec §4.4).

use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use super::{EngineKind, EngineMode, Engines, FetchOutcome};

pub struct AdaptiveFetcher {
    engines: Engines,
    mode: EngineMode,
    current: Mutex<EngineKind>,
}

impl AdaptiveFetcher {
    pub fn new(engines: Engines, mode: EngineMode) -> Self {
        Self {
            engines,
            mode,
            current: Mutex::new(EngineKind::Plain),
        }
    }

    fn fixed_engine(mode: EngineMode) -> Option<EngineKind> {
        match mode {
            EngineMode::Auto => None,
            EngineMode::Plain => Some(EngineKind::Plain),
            EngineMode::Challenge => Some(EngineKind::Challenge),
            EngineMode::Browser => Some(EngineKind::Browser),
        }
    }

    /// Fetch `url`, escalating engines on WAF-like responses when in auto
    /// mode. The engine switch is sticky: once escalated, later calls on
    /// this fetcher start from the escalated engine without re-testing.
    pub fn fetch(&self, url: &Url, timeout: Duration, proxy: Option<&str>) -> FetchOutcome {
        if let Some(fixed) = Self::fixed_engine(self.mode) {
            if !self.engines.is_available(fixed) {
                tracing::warn!(engine = ?fixed, "requested engine unavailable; falling back to plain for this request");
                return self.engines.fetch(EngineKind::Plain, url, timeout, proxy);
            }
            return self.engines.fetch(fixed, url, timeout, proxy);
        }

        let starting = *self.current.lock().expect("adaptive fetcher mutex poisoned");
        let outcome = self.engines.fetch(starting, url, timeout, proxy);

        if !outcome.is_waf_like() {
            return outcome;
        }

        if starting != EngineKind::Challenge && self.engines.is_available(EngineKind::Challenge) {
            self.escalate_to(EngineKind::Challenge);
            let retried = self.engines.fetch(EngineKind::Challenge, url, timeout, proxy);
            let retried_failed = matches!(retried, FetchOutcome::NetworkFailure);
            if !retried.is_waf_like() && !retried_failed {
                return retried;
            }
            if self.engines.is_available(EngineKind::Browser) {
                self.escalate_to(EngineKind::Browser);
                return self.engines.fetch(EngineKind::Browser, url, timeout, proxy);
            }
            return retried;
        }

        if starting != EngineKind::Browser && self.engines.is_available(EngineKind::Browser) {
            self.escalate_to(EngineKind::Browser);
            return self.engines.fetch(EngineKind::Browser, url, timeout, proxy);
        }

        outcome
    }

    fn escalate_to(&self, kind: EngineKind) {
        let mut current = self.current.lock().expect("adaptive fetcher mutex poisoned");
        if *current != kind {
            tracing::info!(from = ?*current, to = ?kind, "escalating fetch engine on WAF-like response");
            *current = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::normalise;

    #[test]
    fn fixed_mode_maps_to_engine_kind() {
        assert_eq!(AdaptiveFetcher::fixed_engine(EngineMode::Plain), Some(EngineKind::Plain));
        assert_eq!(AdaptiveFetcher::fixed_engine(EngineMode::Challenge), Some(EngineKind::Challenge));
        assert_eq!(AdaptiveFetcher::fixed_engine(EngineMode::Browser), Some(EngineKind::Browser));
        assert_eq!(AdaptiveFetcher::fixed_engine(EngineMode::Auto), None);
    }

    #[test]
    fn plain_mode_never_escalates_even_on_waf_status() {
        let fetcher = AdaptiveFetcher::new(Engines::detect(), EngineMode::Plain);
        // Construction alone should not panic; actual network fetch is
        // exercised in crawler-level integration tests against a mock
        // origin (see tests/crawl.rs).
        let _ = normalise("http://x.test/");
        assert_eq!(*fetcher.current.lock().unwrap(), EngineKind::Plain);
    }
}
