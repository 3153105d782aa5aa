use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tvarr_core::ProviderResult;
use tvarr_db::Catalog;
use tvarr_providers::{ExceptionBatch, ExceptionFeed, Provider, ProviderError};

use crate::reconcile::Reconciler;

/// Work a [`Poller`] runs on a timer: fetch something, then deliver it.
#[async_trait]
pub trait PollJob: Send + Sync {
    type Batch: Send;

    /// Key under which the last successful poll is recorded.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Self::Batch, ProviderError>;

    async fn deliver(&self, batch: Self::Batch);
}

/// Time left before the first fetch: the interval minus the time since the
/// last successful poll, never negative.
pub fn initial_delay(
    last_poll: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> Duration {
    let Some(last) = last_poll else {
        return Duration::ZERO;
    };
    // A last poll in the future counts as just now.
    let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
    interval.saturating_sub(elapsed)
}

fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::thread_rng().gen_range(0..=max.as_secs()))
}

/// Runs one [`PollJob`] until cancelled.
pub struct Poller<J> {
    job: J,
    catalog: Arc<dyn Catalog>,
    interval: Duration,
    jitter: Duration,
    fetch_timeout: Duration,
    cancel: CancellationToken,
}

impl<J: PollJob> Poller<J> {
    pub fn new(
        job: J,
        catalog: Arc<dyn Catalog>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            job,
            catalog,
            interval,
            jitter: Duration::ZERO,
            fetch_timeout: Duration::from_secs(60),
            cancel,
        }
    }

    /// Extra random delay of up to `max` on every sleep.
    pub fn with_jitter(mut self, max: Duration) -> Self {
        self.jitter = max;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub async fn run(self) {
        let name = self.job.name().to_string();
        let last_poll = match self.catalog.get_last_poll_time(&name).await {
            Ok(t) => t,
            Err(e) => {
                warn!(poller = %name, error = %e, "cannot read last poll time, polling now");
                None
            }
        };

        let mut delay = initial_delay(last_poll, Utc::now(), self.interval);
        if !delay.is_zero() {
            info!(poller = %name, sleep_secs = delay.as_secs(), "last poll too recent, waiting");
        }

        loop {
            let sleep_for = delay + jitter(self.jitter);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(poller = %name, "poller stopping");
                    return;
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }
            delay = self.interval;
            self.cycle(&name).await;
            debug!(poller = %name, sleep_secs = delay.as_secs(), "poll cycle done");
        }
    }

    /// Fetch once; on success record the poll time, then deliver.
    async fn cycle(&self, name: &str) {
        let batch = match tokio::time::timeout(self.fetch_timeout, self.job.fetch()).await {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                warn!(poller = %name, error = %e, "fetch failed");
                return;
            }
            Err(_) => {
                warn!(poller = %name, timeout_secs = self.fetch_timeout.as_secs(), "fetch timed out");
                return;
            }
        };
        if let Err(e) = self.catalog.set_last_poll_time(name).await {
            error!(poller = %name, error = %e, "cannot record poll time");
        }
        self.job.deliver(batch).await;
    }
}

/// Where a release poller sends what it fetched.
#[derive(Clone)]
pub enum Dispatch {
    /// Onto the shared result queue. A full queue blocks the poller.
    Queue(mpsc::Sender<ProviderResult>),
    /// Straight into reconciliation, one result at a time.
    Direct(Arc<Reconciler>),
}

pub struct ReleaseJob {
    provider: Arc<dyn Provider>,
    dispatch: Dispatch,
}

impl ReleaseJob {
    pub fn new(provider: Arc<dyn Provider>, dispatch: Dispatch) -> Self {
        Self { provider, dispatch }
    }
}

#[async_trait]
impl PollJob for ReleaseJob {
    type Batch = Vec<ProviderResult>;

    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn fetch(&self) -> Result<Self::Batch, ProviderError> {
        self.provider.fetch_new_items().await
    }

    async fn deliver(&self, batch: Self::Batch) {
        info!(provider = %self.provider.name(), results = batch.len(), "poll complete");
        for result in batch {
            match &self.dispatch {
                Dispatch::Queue(tx) => {
                    if tx.send(result).await.is_err() {
                        warn!(provider = %self.provider.name(), "result queue closed");
                        return;
                    }
                }
                Dispatch::Direct(reconciler) => reconciler.handle(&result).await,
            }
        }
    }
}

/// Replaces the catalog's aliases with whatever a feed currently lists.
pub struct ExceptionJob {
    feed: Arc<dyn ExceptionFeed>,
    catalog: Arc<dyn Catalog>,
}

impl ExceptionJob {
    pub fn new(feed: Arc<dyn ExceptionFeed>, catalog: Arc<dyn Catalog>) -> Self {
        Self { feed, catalog }
    }
}

#[async_trait]
impl PollJob for ExceptionJob {
    type Batch = ExceptionBatch;

    fn name(&self) -> &str {
        self.feed.name()
    }

    async fn fetch(&self) -> Result<Self::Batch, ProviderError> {
        self.feed.fetch().await
    }

    async fn deliver(&self, batch: Self::Batch) {
        let count = batch.len();
        let saved = match &batch {
            ExceptionBatch::Names { source, exceptions } => {
                self.catalog.save_name_exceptions(source, exceptions).await
            }
            ExceptionBatch::Seasons {
                indexer,
                exceptions,
            } => self.catalog.save_season_exceptions(indexer, exceptions).await,
        };
        match saved {
            Ok(()) => info!(feed = %self.feed.name(), exceptions = count, "aliases replaced"),
            Err(e) => error!(feed = %self.feed.name(), error = %e, "cannot save aliases"),
        }
    }
}

/// Drain the result queue, reconciling at most `max_concurrent` results at
/// a time. Returns once the queue closes or `cancel` fires, after in-flight
/// reconciliations finish.
pub async fn consume_results(
    mut rx: mpsc::Receiver<ProviderResult>,
    reconciler: Arc<Reconciler>,
    max_concurrent: usize,
    cancel: CancellationToken,
) {
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(result) => result,
                None => break,
            },
        };
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let reconciler = reconciler.clone();
        tasks.spawn(async move {
            let _permit = permit;
            reconciler.handle(&result).await;
        });
        while tasks.try_join_next().is_some() {}
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "reconcile task panicked");
        }
    }
    info!("result consumer stopped");
}

// ─── Tests ───
