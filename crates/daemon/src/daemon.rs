use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tvarr_db::Catalog;
use tvarr_providers::exceptions::{SceneExceptionList, XemNameMap};
use tvarr_providers::{ExceptionFeed, HttpClient, IndexerRegistry, ProviderRegistry};

use crate::config::{DaemonConfig, DispatchMode, FeedFormat};
use crate::poller::{Dispatch, ExceptionJob, Poller, ReleaseJob, consume_results};
use crate::reconcile::{Blackholes, Reconciler};
use crate::show_updater::ShowUpdater;
use crate::storage::{FsStorage, Storage};

/// Everything the background workers share. Registries are injected by the
/// caller; none are global.
pub struct Daemon {
    config: DaemonConfig,
    catalog: Arc<dyn Catalog>,
    providers: ProviderRegistry,
    indexers: IndexerRegistry,
    feeds: Vec<Arc<dyn ExceptionFeed>>,
    storage: Arc<dyn Storage>,
}

impl Daemon {
    pub fn new(config: DaemonConfig, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            config,
            catalog,
            providers: ProviderRegistry::new(),
            indexers: IndexerRegistry::new(),
            feeds: Vec::new(),
            storage: Arc::new(FsStorage),
        }
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_indexers(mut self, indexers: IndexerRegistry) -> Self {
        self.indexers = indexers;
        self
    }

    pub fn with_feeds(mut self, feeds: Vec<Arc<dyn ExceptionFeed>>) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn reconciler(&self) -> Reconciler {
        let blackholes = Blackholes {
            nzb: self.config.nzb_blackhole.clone(),
            torrent: self.config.torrent_blackhole.clone(),
        };
        Reconciler::new(
            self.catalog.clone(),
            self.providers.clone(),
            self.storage.clone(),
            blackholes,
        )
        .with_payload_timeout(self.config.payload_timeout)
    }

    /// Spawn every worker and wait until all of them stop after `cancel`.
    pub async fn run(self, cancel: CancellationToken) {
        let cfg = &self.config;
        let reconciler = Arc::new(self.reconciler());
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        if self.providers.is_empty() {
            warn!("no release providers registered");
        }

        let dispatch = match cfg.dispatch {
            DispatchMode::Queue => {
                let (tx, rx) = mpsc::channel(cfg.result_queue.max(1));
                workers.push(tokio::spawn(consume_results(
                    rx,
                    reconciler.clone(),
                    cfg.max_reconciles,
                    cancel.clone(),
                )));
                Dispatch::Queue(tx)
            }
            DispatchMode::Direct => Dispatch::Direct(reconciler.clone()),
        };

        for provider in self.providers.values() {
            let job = ReleaseJob::new(provider.clone(), dispatch.clone());
            let poller = Poller::new(job, self.catalog.clone(), cfg.poll_interval, cancel.clone())
                .with_jitter(cfg.poll_jitter)
                .with_fetch_timeout(cfg.fetch_timeout);
            workers.push(tokio::spawn(poller.run()));
        }
        // Only pollers hold senders now; the queue closes when they stop.
        drop(dispatch);

        for feed in &self.feeds {
            let job = ExceptionJob::new(feed.clone(), self.catalog.clone());
            let poller = Poller::new(
                job,
                self.catalog.clone(),
                cfg.exception_poll_interval,
                cancel.clone(),
            )
            .with_jitter(cfg.exception_jitter)
            .with_fetch_timeout(cfg.fetch_timeout);
            workers.push(tokio::spawn(poller.run()));
        }

        let updater = ShowUpdater::new(
            self.catalog.clone(),
            self.indexers.clone(),
            cfg.show_refresh_interval,
            cfg.show_max_age,
            cancel.clone(),
        );
        workers.push(tokio::spawn(updater.run()));

        info!(
            providers = self.providers.len(),
            feeds = self.feeds.len(),
            indexers = self.indexers.len(),
            "daemon started"
        );

        for joined in futures::future::join_all(workers).await {
            if let Err(e) = joined {
                error!(error = %e, "worker panicked");
            }
        }
        info!("daemon stopped");
    }
}

/// Build the alias feeds the configuration names.
pub fn feeds_from_config(config: &DaemonConfig, http: &HttpClient) -> Vec<Arc<dyn ExceptionFeed>> {
    config
        .exception_feeds
        .iter()
        .map(|feed| -> Arc<dyn ExceptionFeed> {
            match feed.format {
                FeedFormat::SceneList => Arc::new(SceneExceptionList::new(
                    feed.name(),
                    &feed.url,
                    &feed.indexer,
                    http.clone(),
                )),
                FeedFormat::Xem => Arc::new(XemNameMap::new(
                    feed.name(),
                    &feed.url,
                    &feed.indexer,
                    http.clone(),
                )),
            }
        })
        .collect()
}
