//! The three interchangeable fetch engines plus the adaptive policy that
//! escalates between them.

mod adaptive;
mod browser;
mod challenge;
mod plain;
mod waf;

pub use adaptive::AdaptiveFetcher;
pub use waf::looks_waf_like;

use url::Url;

/// Outcome of a single fetch attempt. A `None` status (spec: "none")
/// collapses transport failures of every kind (DNS, connect, read, TLS,
/// protocol) into one disposition: the worker drops the URL silently.
pub enum FetchOutcome {
    Response {
        status: u16,
        body: String,
        final_url: Url,
        headers: Vec<(String, String)>,
    },
    NetworkFailure,
}

impl FetchOutcome {
    pub fn is_waf_like(&self) -> bool {
        match self {
            FetchOutcome::Response {
                status,
                body,
                headers,
                ..
            } => waf::looks_waf_like(*status, headers, body),
            FetchOutcome::NetworkFailure => false,
        }
    }
}

/// Engine selection, as exposed on the CLI (`--mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineMode {
    Auto,
    Plain,
    Challenge,
    Browser,
}

/// Which concrete engine is currently active. Distinct from [`EngineMode`]:
/// `auto` resolves to one of these at runtime and may change over the
/// course of a crawl (sticky escalation, spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Plain,
    Challenge,
    Browser,
}

pub(crate) trait FetchEngine: Send + Sync {
    fn fetch(&self, url: &Url, timeout: std::time::Duration, proxy: Option<&str>) -> FetchOutcome;
}

/// The set of engines available for this crawl, with capability predicates
/// decided once at construction (spec §4.3, §9).
pub struct Engines {
    plain: plain::PlainEngine,
    challenge: challenge::ChallengeEngine,
    browser: Option<browser::BrowserEngine>,
}

impl Engines {
    /// Probe for optional-engine availability once. The browser engine is
    /// marked available only if a throwaway headless launch succeeds.
    pub fn detect() -> Self {
        let browser = browser::BrowserEngine::probe();
        if browser.is_none() {
            tracing::warn!("browser engine unavailable: no working chromium could be launched");
        }
        Self {
            plain: plain::PlainEngine::new(),
            challenge: challenge::ChallengeEngine::new(),
            browser,
        }
    }

    pub fn is_available(&self, kind: EngineKind) -> bool {
        match kind {
            EngineKind::Plain => true,
            EngineKind::Challenge => true,
            EngineKind::Browser => self.browser.is_some(),
        }
    }

    pub(crate) fn fetch(
        &self,
        kind: EngineKind,
        url: &Url,
        timeout: std::time::Duration,
        proxy: Option<&str>,
    ) -> FetchOutcome {
        match kind {
            EngineKind::Plain => self.plain.fetch(url, timeout, proxy),
            EngineKind::Challenge => self.challenge.fetch(url, timeout, proxy),
            EngineKind::Browser => match &self.browser {
                Some(b) => b.fetch(url, timeout, proxy),
                None => {
                    tracing::warn!("browser engine requested but unavailable; falling back to plain");
                    self.plain.fetch(url, timeout, proxy)
                }
            },
        }
    }
}
