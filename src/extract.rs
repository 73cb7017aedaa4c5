//! HTML and JS extractors: link/script discovery, OSINT literal scanning,
//! and classification-driven enqueueing (spec §4.2).

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::canon;
use crate::queue::WorkQueue;
use crate::state::{CrawlerState, Kind, WorkItem};

/// `https?://` followed by a maximal run of non-whitespace,
/// non-quote, non-angle-bracket, non-parenthesis characters.
static URL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>()]+"#).expect("static url literal regex"));

/// `"…"` or `'…'` whose contents start with `http(s)://` or `/`.
static QUOTED_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']((?:https?://|/)[^"']*)["']"#).expect("static quoted url regex"));

/// `fetch("…")` / `fetch('…')`, first string argument.
static FETCH_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"fetch\(\s*["']([^"']+)["']"#).expect("static fetch call regex"));

/// `.open("METHOD", "…")`, second string argument.
static XHR_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.open\(\s*["'][A-Z]+["']\s*,\s*["']([^"']+)["']"#)
        .expect("static xhr open regex")
});

/// The ambient parameters every extractor call needs: where we are, how
/// deep, and where "home" is.
pub struct ExtractContext<'a> {
    pub current_url: &'a Url,
    pub depth: u32,
    pub max_depth: u32,
    pub root: &'a str,
}

fn url_literal_scan(body: &str) -> Vec<String> {
    URL_LITERAL.find_iter(body).map(|m| m.as_str().to_string()).collect()
}

/// Resolve `href` against `base`, clean, and normalise it into a canonical
/// URL. Returns `None` if resolution or parsing fails.
fn resolve_clean_normalise(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href).ok()?;
    let cleaned = canon::clean(resolved.as_str());
    canon::normalise(&cleaned)
}

fn enqueue_if_in_scope(
    state: &CrawlerState,
    queue: &WorkQueue,
    url: Url,
    depth: u32,
    max_depth: u32,
    kind: Kind,
) {
    if depth > max_depth {
        return;
    }
    if !state.try_enqueue(&url, kind) {
        return;
    }
    queue.push(WorkItem { url, depth, kind });
}

/// Parse `body` as lenient HTML. Anchors are resolved/cleaned/normalised
/// then routed by origin and depth; script `src`s get the same treatment
/// enqueued as `Kind::Js`; script bodies without a `src` are scanned for
/// URL literals that go to `osint_strings` verbatim (no clean/normalise —
/// spec §4.2, scenario 5).
pub fn extract_html(body: &str, ctx: &ExtractContext, state: &CrawlerState, queue: &WorkQueue) {
    let document = Html::parse_document(body);

    let script_sel = Selector::parse("script").expect("static selector");
    let anchor_sel = Selector::parse("a[href]").expect("static selector");

    for script in document.select(&script_sel) {
        if script.value().attr("src").is_some() {
            continue;
        }
        let text: String = script.text().collect();
        for literal in url_literal_scan(&text) {
            state.record_osint(&literal);
        }
    }

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_clean_normalise(ctx.current_url, href) else {
            continue;
        };

        if !canon::same_origin(&url, ctx.root) {
            state.record_osint(url.as_str());
            continue;
        }

        enqueue_if_in_scope(state, queue, url, ctx.depth + 1, ctx.max_depth, Kind::Html);
    }

    for script in document.select(&script_sel) {
        let Some(src) = script.value().attr("src") else {
            continue;
        };
        let Some(url) = resolve_clean_normalise(ctx.current_url, src) else {
            continue;
        };

        if !canon::same_origin(&url, ctx.root) {
            state.record_osint(url.as_str());
            continue;
        }

        enqueue_if_in_scope(state, queue, url, ctx.depth + 1, ctx.max_depth, Kind::Js);
    }
}

/// Scan a JS body for URL literals (unconditionally OSINT, after cleaning)
/// and three call-shaped candidate patterns. Every candidate is resolved
/// against the JS file's own URL, cleaned, then routed by origin; in-origin
/// candidates are normalised, classified by [`canon::looks_js`], and
/// enqueued under the matching kind (spec §4.2).
pub fn extract_js(body: &str, ctx: &ExtractContext, state: &CrawlerState, queue: &WorkQueue) {
    for literal in url_literal_scan(body) {
        state.record_osint(&canon::clean(&literal));
    }

    let mut candidates: Vec<String> = Vec::new();
    for cap in QUOTED_URL.captures_iter(body) {
        candidates.push(cap[1].to_string());
    }
    for cap in FETCH_CALL.captures_iter(body) {
        candidates.push(cap[1].to_string());
    }
    for cap in XHR_OPEN.captures_iter(body) {
        candidates.push(cap[1].to_string());
    }

    for candidate in candidates {
        let Some(resolved) = ctx.current_url.join(&candidate).ok() else {
            continue;
        };
        let cleaned = canon::clean(resolved.as_str());

        let Ok(routed) = Url::parse(&cleaned) else {
            continue;
        };

        if !canon::same_origin(&routed, ctx.root) {
            state.record_osint(&cleaned);
            continue;
        }

        let Some(parsed) = canon::normalise(&cleaned) else {
            continue;
        };

        let kind = if canon::looks_js(&parsed) { Kind::Js } else { Kind::Html };
        enqueue_if_in_scope(state, queue, parsed, ctx.depth + 1, ctx.max_depth, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::normalise;

    fn ctx<'a>(url: &'a Url) -> ExtractContext<'a> {
        ExtractContext {
            current_url: url,
            depth: 0,
            max_depth: 2,
            root: "http://x.test",
        }
    }

    #[test]
    fn html_extractor_enqueues_in_origin_anchor_and_records_osint_for_offsite() {
        let state = CrawlerState::new();
        let queue = WorkQueue::new();
        let base = normalise("http://x.test/").unwrap();
        let html = r#"<a href="/a/">a</a><a href="http://y.test/z">y</a>"#;

        extract_html(html, &ctx(&base), &state, &queue);

        let popped = queue.pop_timeout(std::time::Duration::from_millis(10)).unwrap();
        assert_eq!(popped.url.as_str(), "http://x.test/a");

        let snap = state.snapshot();
        assert!(snap.osint_strings.contains(&"http://y.test/z".to_string()));
    }

    #[test]
    fn html_extractor_respects_max_depth() {
        let state = CrawlerState::new();
        let queue = WorkQueue::new();
        let base = normalise("http://x.test/").unwrap();
        let mut deep_ctx = ctx(&base);
        deep_ctx.depth = 2;
        deep_ctx.max_depth = 2;

        extract_html(r#"<a href="/a">a</a>"#, &deep_ctx, &state, &queue);
        assert!(queue.pop_timeout(std::time::Duration::from_millis(10)).is_none());
    }

    #[test]
    fn html_extractor_inline_script_literal_is_verbatim_and_not_fetched() {
        let state = CrawlerState::new();
        let queue = WorkQueue::new();
        let base = normalise("http://x.test/").unwrap();
        let html = r#"<script>var u = "https://cdn.example/lib.js";</script>"#;

        extract_html(html, &ctx(&base), &state, &queue);

        let snap = state.snapshot();
        assert!(snap.osint_strings.contains(&"https://cdn.example/lib.js".to_string()));
        assert!(queue.pop_timeout(std::time::Duration::from_millis(10)).is_none());
    }

    #[test]
    fn js_extractor_classifies_fetch_and_open_targets() {
        let state = CrawlerState::new();
        let queue = WorkQueue::new();
        let js_url = normalise("http://x.test/s.js").unwrap();
        let body = r#"var u="/api/v1/users?id=1"; fetch("/api/v1/logout"); x.open("POST", "/api/v1/save");"#;

        extract_js(body, &ctx(&js_url), &state, &queue);

        let mut seen = Vec::new();
        while let Some(item) = queue.pop_timeout(std::time::Duration::from_millis(10)) {
            seen.push(item.url.as_str().to_string());
        }
        assert!(seen.contains(&"http://x.test/api/v1/users?id=1".to_string()));
        assert!(seen.contains(&"http://x.test/api/v1/logout".to_string()));
        assert!(seen.contains(&"http://x.test/api/v1/save".to_string()));
    }

    #[test]
    fn js_extractor_routes_offsite_literal_to_osint() {
        let state = CrawlerState::new();
        let queue = WorkQueue::new();
        let js_url = normalise("http://x.test/s.js").unwrap();
        let body = r#"const a = "https://evil.test/collect";"#;

        extract_js(body, &ctx(&js_url), &state, &queue);

        let snap = state.snapshot();
        assert!(snap.osint_strings.contains(&"https://evil.test/collect".to_string()));
    }
}
