//! A single crawl worker's loop (spec §4.5).

use std::time::Duration;

use crate::canon;
use crate::crawler::CrawlerHandle;
use crate::extract::{extract_html, extract_js, ExtractContext};
use crate::state::Kind;

const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

/// RAII guard that marks the dequeued item done on every exit path,
/// including early returns — the queue's join semantics depend on this
/// being unconditional (spec §4.5: "MUST always mark the item done").
struct TaskDoneGuard<'a>(&'a CrawlerHandle);

impl Drop for TaskDoneGuard<'_> {
    fn drop(&mut self) {
        self.0.queue.task_done();
    }
}

/// Run one worker to completion: drain the queue until a 2-second dequeue
/// times out.
pub fn run(handle: &CrawlerHandle) {
    loop {
        let Some(item) = handle.queue.pop_timeout(DEQUEUE_TIMEOUT) else {
            tracing::debug!("worker idle for 2s, exiting");
            return;
        };
        let _done = TaskDoneGuard(handle);

        if !handle.state.mark_visited(&item.url, item.kind) {
            tracing::debug!(url = %item.url, ?item.kind, "already visited, discarding");
            continue;
        }

        let outcome =
            handle
                .fetcher
                .fetch(&item.url, handle.config.timeout, handle.config.proxy.as_deref());

        let (status, body, final_url, _headers) = match outcome {
            crate::engine::FetchOutcome::Response {
                status,
                body,
                final_url,
                headers,
            } => (status, body, final_url, headers),
            crate::engine::FetchOutcome::NetworkFailure => {
                tracing::debug!(url = %item.url, "transport failure, dropping");
                continue;
            }
        };

        if body.is_empty() {
            tracing::debug!(url = %item.url, "empty body, dropping");
            continue;
        }

        tracing::info!(url = %final_url, status, ?item.kind, "fetched");

        handle.state.record_alive(&final_url, status);
        handle.state.classify(&final_url);
        if canon::looks_js(&final_url) {
            handle.state.record_js_file(&final_url);
        }

        if (200..300).contains(&status) {
            let ctx = ExtractContext {
                current_url: &final_url,
                depth: item.depth,
                max_depth: handle.config.max_depth,
                root: &handle.config.root,
            };

            match item.kind {
                Kind::Html => extract_html(&body, &ctx, &handle.state, &handle.queue),
                Kind::Js => extract_js(&body, &ctx, &handle.state, &handle.queue),
            }
        }
    }
}
