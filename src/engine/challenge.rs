//! The challenge-tolerant HTTP engine.
//!
//! Same public contract as [`super::plain::PlainEngine`], but the session
//! keeps a cookie jar across requests and retries once after the first
//! response, so a site that issues a challenge cookie on its first
//! response and expects it echoed back on the next request is handled
//! without a full headless render. There is no maintained Rust crate
//! equivalent to Python's `cloudscraper`; this is the from-scratch
//! approximation, and its capability predicate is unconditionally `true`
//! (see SPEC_FULL.md §4.3).

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use url::Url;

use super::plain::random_user_agent;
use super::{FetchEngine, FetchOutcome};

pub struct ChallengeEngine {
    client: Mutex<Option<(Client, Duration, Option<String>)>>,
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    fn client_for(&self, timeout: Duration, proxy: Option<&str>) -> Option<Client> {
        let mut slot = self.client.lock().expect("challenge engine mutex poisoned");
        if let Some((client, t, p)) = slot.as_ref() {
            if *t == timeout && p.as_deref() == proxy {
                return Some(client.clone());
            }
        }

        let client = build_client(timeout, proxy).ok()?;
        *slot = Some((client.clone(), timeout, proxy.map(str::to_string)));
        Some(client)
    }
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_client(timeout: Duration, proxy: Option<&str>) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(10));

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder.build()
}

impl FetchEngine for ChallengeEngine {
    fn fetch(&self, url: &Url, timeout: Duration, proxy: Option<&str>) -> FetchOutcome {
        let Some(client) = self.client_for(timeout, proxy) else {
            return FetchOutcome::NetworkFailure;
        };

        let first = client
            .get(url.as_str())
            .header(USER_AGENT, random_user_agent())
            .send();

        let outcome = super::plain::outcome_from_response(first);
        if !outcome.is_waf_like() {
            return outcome;
        }

        // The cookie jar now holds whatever the challenge response set;
        // a single echo-back retry resolves cookie-only challenges.
        let retry = client
            .get(url.as_str())
            .header(USER_AGENT, random_user_agent())
            .send();

        super::plain::outcome_from_response(retry)
    }
}
