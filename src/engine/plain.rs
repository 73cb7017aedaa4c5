//! The plain HTTP engine: a reusable `reqwest::blocking::Client` with
//! connection reuse, redirects followed, and per-request User-Agent
//! rotation from a fixed pool of desktop UA strings.

use std::sync::Mutex;
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use url::Url;

use super::{FetchEngine, FetchOutcome};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Holds one lazily-built client per (timeout, proxy) shape actually used;
/// in practice a crawl only ever uses one shape, but rebuilding on proxy
/// change keeps the session lifecycle explicit rather than implicit.
pub struct PlainEngine {
    client: Mutex<Option<(Client, Duration, Option<String>)>>,
}

impl PlainEngine {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    fn client_for(&self, timeout: Duration, proxy: Option<&str>) -> Option<Client> {
        let mut slot = self.client.lock().expect("plain engine mutex poisoned");
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

impl Default for PlainEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn build_client(timeout: Duration, proxy: Option<&str>) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let mut builder = Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers);

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder.build()
}

pub(crate) fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

pub(crate) fn outcome_from_response(
    response: std::result::Result<reqwest::blocking::Response, reqwest::Error>,
) -> FetchOutcome {
    let response = match response {
        Ok(r) => r,
        Err(_) => return FetchOutcome::NetworkFailure,
    };

    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    let body = match response.text() {
        Ok(body) => body,
        Err(_) => return FetchOutcome::NetworkFailure,
    };

    let final_url = match Url::parse(final_url.as_str()) {
        Ok(u) => u,
        Err(_) => return FetchOutcome::NetworkFailure,
    };

    FetchOutcome::Response {
        status,
        body,
        final_url,
        headers,
    }
}

impl FetchEngine for PlainEngine {
    fn fetch(&self, url: &Url, timeout: Duration, proxy: Option<&str>) -> FetchOutcome {
        let Some(client) = self.client_for(timeout, proxy) else {
            return FetchOutcome::NetworkFailure;
        };

        let response = client
            .get(url.as_str())
            .header(USER_AGENT, random_user_agent())
            .send();

        outcome_from_response(response)
    }
}
