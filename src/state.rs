//! Visited/queued discipline and the finding collections workers populate.
//!
//! All of it lives behind one coarse mutex (see spec §5): the dedup sets and
//! findings are mutated together often enough, and check-then-insert on the
//! dedup sets must be atomic, so splitting the lock buys nothing here.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use url::Url;

/// Which extractor a work item's body gets fed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Html,
    Js,
}

/// A unit of crawl work: a canonical URL, its depth from the seed, and
/// which extractor should run on its response body.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub url: Url,
    pub depth: u32,
    pub kind: Kind,
}

#[derive(Default)]
struct Findings {
    alive: BTreeMap<String, u16>,
    params: HashSet<String>,
    endpoints: HashSet<String>,
    api_endpoints: HashSet<String>,
    js_files: HashSet<String>,
    osint_strings: HashSet<String>,
}

#[derive(Default)]
struct Sets {
    visited_html: HashSet<String>,
    visited_js: HashSet<String>,
    queued_html: HashSet<String>,
    queued_js: HashSet<String>,
}

impl Sets {
    fn visited_mut(&mut self, kind: Kind) -> &mut HashSet<String> {
        match kind {
            Kind::Html => &mut self.visited_html,
            Kind::Js => &mut self.visited_js,
        }
    }

    fn queued_mut(&mut self, kind: Kind) -> &mut HashSet<String> {
        match kind {
            Kind::Html => &mut self.queued_html,
            Kind::Js => &mut self.queued_js,
        }
    }
}

/// The crawl's shared mutable state: dedup sets plus every finding
/// collection described in spec §3.
pub struct CrawlerState {
    sets: Mutex<Sets>,
    findings: Mutex<Findings>,
}

impl CrawlerState {
    pub fn new() -> Self {
        Self {
            sets: Mutex::new(Sets::default()),
            findings: Mutex::new(Findings::default()),
        }
    }

    /// Mark `url` queued under `kind` if it is neither queued nor visited
    /// under that kind yet. Returns `true` if it was newly queued.
    pub fn try_enqueue(&self, url: &Url, kind: Kind) -> bool {
        let key = url.as_str().to_string();
        let mut sets = self.sets.lock().expect("crawler state mutex poisoned");
        if sets.visited_mut(kind).contains(&key) || sets.queued_mut(kind).contains(&key) {
            return false;
        }
        sets.queued_mut(kind).insert(key);
        true
    }

    /// Atomically check-and-insert `url` into `visited[kind]`. Returns
    /// `true` if this call newly visited it (the caller should proceed);
    /// `false` means another worker already claimed it.
    pub fn mark_visited(&self, url: &Url, kind: Kind) -> bool {
        let key = url.as_str().to_string();
        let mut sets = self.sets.lock().expect("crawler state mutex poisoned");
        sets.visited_mut(kind).insert(key)
    }

    pub fn record_alive(&self, url: &Url, status: u16) {
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.alive.insert(url.as_str().to_string(), status);
    }

    pub fn record_param(&self, url: &Url) {
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.params.insert(url.as_str().to_string());
    }

    pub fn record_endpoint(&self, url: &Url) {
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.endpoints.insert(url.as_str().to_string());
    }

    pub fn record_api_endpoint(&self, url: &Url) {
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.api_endpoints.insert(url.as_str().to_string());
    }

    pub fn record_js_file(&self, url: &Url) {
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.js_files.insert(url.as_str().to_string());
    }

    pub fn record_osint(&self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let mut findings = self.findings.lock().expect("crawler state mutex poisoned");
        findings.osint_strings.insert(raw.to_string());
    }

    /// Apply the param/endpoint/api classifications for `url` against its
    /// path+query. Does not touch `alive` or `js_files`.
    pub fn classify(&self, url: &Url) {
        let pq = crate::canon::path_and_query(url);
        if url.query().is_some() {
            self.record_param(url);
        }
        if crate::canon::looks_endpoint(&pq) {
            self.record_endpoint(url);
            let folded = pq.to_ascii_lowercase();
            if folded.contains("/api/") || folded.contains("/rest/") || folded.contains("graphql") {
                self.record_api_endpoint(url);
            }
        }
    }

    pub fn snapshot(&self) -> FindingsSnapshot {
        let findings = self.findings.lock().expect("crawler state mutex poisoned");
        FindingsSnapshot {
            alive: findings.alive.clone().into_iter().collect(),
            params: sorted(&findings.params),
            endpoints: sorted(&findings.endpoints),
            api_endpoints: sorted(&findings.api_endpoints),
            js_files: sorted(&findings.js_files),
            osint_strings: sorted(&findings.osint_strings),
        }
    }
}

impl Default for CrawlerState {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut v: Vec<String> = set.iter().cloned().collect();
    v.sort();
    v
}

/// An immutable, sorted copy of every finding collection, frozen at crawl
/// completion and handed to the result sink.
pub struct FindingsSnapshot {
    pub alive: Vec<(String, u16)>,
    pub params: Vec<String>,
    pub endpoints: Vec<String>,
    pub api_endpoints: Vec<String>,
    pub js_files: Vec<String>,
    pub osint_strings: Vec<String>,
}
