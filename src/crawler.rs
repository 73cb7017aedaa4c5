//! Crawler construction and run-to-completion (spec §4.6).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::canon;
use crate::engine::{AdaptiveFetcher, EngineMode, Engines};
use crate::queue::WorkQueue;
use crate::state::{CrawlerState, FindingsSnapshot, Kind, WorkItem};

/// Immutable crawl configuration, assembled once from CLI arguments.
pub struct SeedConfig {
    pub seed: Url,
    pub root: String,
    pub threads: usize,
    pub timeout: Duration,
    pub max_depth: u32,
    pub proxy: Option<String>,
    pub mode: EngineMode,
}

impl SeedConfig {
    pub fn new(
        seed_raw: &str,
        threads: usize,
        max_depth: u32,
        timeout: Duration,
        proxy: Option<String>,
        mode: EngineMode,
    ) -> anyhow::Result<Self> {
        let cleaned = canon::clean(seed_raw);
        let seed = canon::normalise(&cleaned)
            .with_context(|| format!("parse seed url: {seed_raw}"))?;
        let root = canon::root_authority(&seed);

        Ok(Self {
            seed,
            root,
            threads: threads.max(1),
            timeout,
            max_depth,
            proxy,
            mode,
        })
    }
}

/// Everything a worker needs to run: shared by every thread via `Arc`.
pub struct CrawlerHandle {
    pub config: SeedConfig,
    pub state: CrawlerState,
    pub queue: WorkQueue,
    pub fetcher: AdaptiveFetcher,
}

/// Build a crawler, detecting optional-engine availability once, then run
/// every worker to completion and hand back frozen findings.
pub struct Crawler {
    handle: Arc<CrawlerHandle>,
}

impl Crawler {
    pub fn new(config: SeedConfig) -> Self {
        let engines = Engines::detect();
        let fetcher = AdaptiveFetcher::new(engines, config.mode);
        let handle = Arc::new(CrawlerHandle {
            config,
            state: CrawlerState::new(),
            queue: WorkQueue::new(),
            fetcher,
        });
        Self { handle }
    }

    pub fn run(self) -> FindingsSnapshot {
        let seed_item = WorkItem {
            url: self.handle.config.seed.clone(),
            depth: 0,
            kind: Kind::Html,
        };
        self.handle.state.try_enqueue(&seed_item.url, Kind::Html);
        self.handle.queue.push(seed_item);

        let threads = self.handle.config.threads;
        tracing::info!(
            seed = %self.handle.config.seed,
            root = %self.handle.config.root,
            threads,
            max_depth = self.handle.config.max_depth,
            "starting crawl"
        );

        let workers: Vec<_> = (0..threads)
            .map(|id| {
                let handle = Arc::clone(&self.handle);
                std::thread::Builder::new()
                    .name(format!("originscout-worker-{id}"))
                    .spawn(move || crate::worker::run(&handle))
                    .expect("spawn worker thread")
            })
            .collect();

        self.handle.queue.wait_until_drained();

        for worker in workers {
            let _ = worker.join();
        }

        tracing::info!("crawl complete");
        self.handle.state.snapshot()
    }
}
