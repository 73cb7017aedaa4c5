//! The headless-browser engine. Drives a real Chromium process over the
//! Chrome DevTools Protocol via `chromiumoxide`. Each fetch launches, uses,
//! and closes a browser cleanly (spec §5 "resource lifecycle"): there is no
//! long-lived browser session to reuse, so an abort mid-fetch leaks
//! nothing beyond the child process chromiumoxide itself cleans up.
//!
//! Only Chromium is implemented: no maintained Rust crate drives Firefox or
//! WebKit over CDP/WebDriver, so the "chromium, firefox, webkit in order"
//! fallback chain in spec §4.3 collapses to a single candidate (recorded
//! in DESIGN.md).

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use url::Url;

use super::{FetchEngine, FetchOutcome};

pub struct BrowserEngine {
    _availability_checked: (),
}

impl BrowserEngine {
    /// Attempt a throwaway launch; only construct the engine if it works.
    pub fn probe() -> Option<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .ok()?;

        let launched: Option<bool> = runtime.block_on(async {
            let config = BrowserConfig::builder().build().ok()?;
            let (browser, mut handler) = Browser::launch(config).await.ok()?;
            let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });
            let ok = browser.new_page("about:blank").await.is_ok();
            drop(browser);
            handle.abort();
            Some(ok)
        });

        match launched {
            Some(true) => Some(Self {
                _availability_checked: (),
            }),
            _ => None,
        }
    }

    async fn fetch_async(url: &Url, timeout: Duration) -> Option<(String, String)> {
        let config = BrowserConfig::builder().request_timeout(timeout).build().ok()?;
        let (browser, mut handler) = Browser::launch(config).await.ok()?;
        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page(url.as_str()).await.ok()?;
        page.wait_for_navigation().await.ok()?;
        let body = page.content().await.ok()?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        drop(page);
        drop(browser);
        handle.abort();

        Some((body, final_url))
    }
}

impl FetchEngine for BrowserEngine {
    fn fetch(&self, url: &Url, timeout: Duration, _proxy: Option<&str>) -> FetchOutcome {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(_) => return FetchOutcome::NetworkFailure,
        };

        let url = url.clone();
        let resolved = runtime.block_on(Self::fetch_async(&url, timeout));

        match resolved {
            Some((body, final_url_str)) => match Url::parse(&final_url_str) {
                // The underlying CDP API does not surface the main-document
                // status reliably; per spec §4.3 we synthesise 200 on
                // success regardless of the real final response code.
                Ok(final_url) => FetchOutcome::Response {
                    status: 200,
                    body,
                    final_url,
                    headers: Vec::new(),
                },
                Err(_) => FetchOutcome::NetworkFailure,
            },
            None => FetchOutcome::NetworkFailure,
        }
    }
}
