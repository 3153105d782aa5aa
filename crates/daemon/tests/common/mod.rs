#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tvarr_core::{
    Episode, EpisodeStatus, NameException, ProviderKind, ProviderResult, QualityGroup,
    SeasonException, Show,
};
use tvarr_daemon::reconcile::Blackholes;
use tvarr_daemon::{Reconciler, Storage, StorageError};
use tvarr_db::{Catalog, DbError};
use tvarr_naming::full_sanitize_scene_name;
use tvarr_providers::{
    ExceptionBatch, ExceptionFeed, Payload, Provider, ProviderError, provider_registry,
};

// ─── Catalog ───

#[derive(Default)]
struct State {
    shows: Vec<Show>,
    episodes: Vec<Episode>,
    name_exceptions: Vec<NameException>,
    season_exceptions: Vec<SeasonException>,
    polls: HashMap<String, DateTime<Utc>>,
}

/// In-memory catalog that counts every write call.
#[derive(Default)]
pub struct MockCatalog {
    state: Mutex<State>,
    writes: AtomicUsize,
}

impl MockCatalog {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn add_show(&self, mut show: Show) -> Show {
        let mut state = self.state.lock().unwrap();
        show.id = state.shows.len() as i64 + 1;
        state.shows.push(show.clone());
        show
    }

    pub fn add_episode(&self, mut episode: Episode) -> Episode {
        let mut state = self.state.lock().unwrap();
        episode.id = state.episodes.len() as i64 + 1;
        state.episodes.push(episode.clone());
        episode
    }

    pub fn add_name_exception(&self, show: &Show, name: &str) {
        self.state.lock().unwrap().name_exceptions.push(NameException {
            source: "test".into(),
            indexer: show.indexer.clone(),
            indexer_id: show.indexer_id,
            name: name.into(),
        });
    }

    pub fn set_poll(&self, name: &str, at: DateTime<Utc>) {
        self.state.lock().unwrap().polls.insert(name.into(), at);
    }

    pub fn poll(&self, name: &str) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap().polls.get(name).copied()
    }

    pub fn episode(&self, id: i64) -> Episode {
        let state = self.state.lock().unwrap();
        state.episodes.iter().find(|e| e.id == id).cloned().unwrap()
    }

    pub fn name_exceptions(&self) -> Vec<NameException> {
        self.state.lock().unwrap().name_exceptions.clone()
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn show_by_indexer(state: &State, indexer: &str, indexer_id: i64) -> Option<Show> {
        state
            .shows
            .iter()
            .find(|s| s.indexer == indexer && s.indexer_id == indexer_id)
            .cloned()
    }

    fn upsert_episode(state: &mut State, episode: &Episode) -> i64 {
        if episode.id == 0 {
            let mut episode = episode.clone();
            episode.id = state.episodes.len() as i64 + 1;
            state.episodes.push(episode.clone());
            return episode.id;
        }
        if let Some(slot) = state.episodes.iter_mut().find(|e| e.id == episode.id) {
            *slot = episode.clone();
        }
        episode.id
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn get_show_by_name(&self, name: &str) -> Result<Option<Show>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state.shows.iter().find(|s| s.name == name).cloned())
    }

    async fn get_show_by_scene_name(&self, name: &str) -> Result<Option<Show>, DbError> {
        let wanted = full_sanitize_scene_name(name);
        let state = self.state.lock().unwrap();
        Ok(state
            .shows
            .iter()
            .find(|s| full_sanitize_scene_name(&s.name) == wanted)
            .cloned())
    }

    async fn get_show_by_indexer_and_id(
        &self,
        indexer: &str,
        indexer_id: i64,
    ) -> Result<Option<Show>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(Self::show_by_indexer(&state, indexer, indexer_id))
    }

    async fn get_show_and_season_from_exception(
        &self,
        name: &str,
    ) -> Result<Option<(Show, Option<i64>)>, DbError> {
        let state = self.state.lock().unwrap();
        let Some(se) = state
            .season_exceptions
            .iter()
            .find(|se| se.name.eq_ignore_ascii_case(name))
        else {
            return Ok(None);
        };
        Ok(Self::show_by_indexer(&state, &se.indexer, se.indexer_id)
            .map(|show| (show, se.season_override())))
    }

    async fn get_show_from_name_exception(&self, name: &str) -> Result<Option<Show>, DbError> {
        let wanted = full_sanitize_scene_name(name);
        let state = self.state.lock().unwrap();
        let Some(ne) = state
            .name_exceptions
            .iter()
            .find(|ne| full_sanitize_scene_name(&ne.name) == wanted)
        else {
            return Ok(None);
        };
        Ok(Self::show_by_indexer(&state, &ne.indexer, ne.indexer_id))
    }

    async fn get_all_shows(&self) -> Result<Vec<Show>, DbError> {
        Ok(self.state.lock().unwrap().shows.clone())
    }

    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state.episodes.iter().find(|e| e.id == id).cloned())
    }

    async fn get_episode_by_show_season_number(
        &self,
        show_id: i64,
        season: i64,
        episode: i64,
    ) -> Result<Option<Episode>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .episodes
            .iter()
            .find(|e| e.show_id == show_id && e.season == season && e.episode == episode)
            .cloned())
    }

    async fn get_episode_by_absolute_number(
        &self,
        show_id: i64,
        absolute_number: i64,
    ) -> Result<Option<Episode>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .episodes
            .iter()
            .find(|e| e.show_id == show_id && e.absolute_number == Some(absolute_number))
            .cloned())
    }

    async fn get_show_episodes(&self, show_id: i64) -> Result<Vec<Episode>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .episodes
            .iter()
            .filter(|e| e.show_id == show_id)
            .cloned()
            .collect())
    }

    async fn save_show(&self, show: &Show) -> Result<i64, DbError> {
        self.wrote();
        show.validate()?;
        let mut state = self.state.lock().unwrap();
        if show.id == 0 {
            let mut show = show.clone();
            show.id = state.shows.len() as i64 + 1;
            state.shows.push(show.clone());
            return Ok(show.id);
        }
        let slot = state
            .shows
            .iter_mut()
            .find(|s| s.id == show.id)
            .ok_or(DbError::Missing("show", show.id))?;
        *slot = show.clone();
        Ok(show.id)
    }

    async fn save_episode(&self, episode: &Episode) -> Result<i64, DbError> {
        self.wrote();
        episode.validate()?;
        Ok(Self::upsert_episode(&mut self.state.lock().unwrap(), episode))
    }

    async fn save_episodes(&self, episodes: &[Episode]) -> Result<Vec<i64>, DbError> {
        self.wrote();
        for episode in episodes {
            episode.validate()?;
        }
        let mut state = self.state.lock().unwrap();
        Ok(episodes
            .iter()
            .map(|e| Self::upsert_episode(&mut state, e))
            .collect())
    }

    async fn save_episode_if_status(
        &self,
        expected: EpisodeStatus,
        episode: &Episode,
    ) -> Result<bool, DbError> {
        self.wrote();
        let mut state = self.state.lock().unwrap();
        match state.episodes.iter_mut().find(|e| e.id == episode.id) {
            Some(slot) if slot.status == expected => {
                *slot = episode.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_name_exceptions(
        &self,
        source: &str,
        exceptions: &[NameException],
    ) -> Result<(), DbError> {
        self.wrote();
        let mut state = self.state.lock().unwrap();
        state.name_exceptions.retain(|ne| ne.source != source);
        state.name_exceptions.extend_from_slice(exceptions);
        Ok(())
    }

    async fn save_season_exceptions(
        &self,
        indexer: &str,
        exceptions: &[SeasonException],
    ) -> Result<(), DbError> {
        self.wrote();
        let mut state = self.state.lock().unwrap();
        state.season_exceptions.retain(|se| se.indexer != indexer);
        state.season_exceptions.extend_from_slice(exceptions);
        Ok(())
    }

    async fn get_last_poll_time(&self, name: &str) -> Result<Option<DateTime<Utc>>, DbError> {
        Ok(self.poll(name))
    }

    async fn set_last_poll_time(&self, name: &str) -> Result<(), DbError> {
        self.wrote();
        self.set_poll(name, Utc::now());
        Ok(())
    }

    async fn get_quality_groups(&self) -> Result<Vec<QualityGroup>, DbError> {
        Ok(QualityGroup::defaults())
    }

    async fn get_quality_group(&self, id: i64) -> Result<Option<QualityGroup>, DbError> {
        Ok(QualityGroup::defaults().into_iter().find(|g| g.id == id))
    }
}

// ─── Provider ───

pub struct MockProvider {
    name: String,
    kind: ProviderKind,
    items: Mutex<Vec<ProviderResult>>,
    fail_fetch: AtomicBool,
    fail_payload: AtomicBool,
    payload_delay: Duration,
    fetches: AtomicUsize,
    payloads: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &str, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            items: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_payload: AtomicBool::new(false),
            payload_delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            payloads: AtomicUsize::new(0),
        }
    }

    /// Sleep this long inside every payload download.
    pub fn with_payload_delay(mut self, delay: Duration) -> Self {
        self.payload_delay = delay;
        self
    }

    pub fn set_items(&self, names: &[&str]) {
        *self.items.lock().unwrap() = names.iter().map(|n| self.result(n)).collect();
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_payload(&self, fail: bool) {
        self.fail_payload.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> usize {
        self.payloads.load(Ordering::SeqCst)
    }

    pub fn result(&self, release: &str) -> ProviderResult {
        ProviderResult {
            name: release.into(),
            url: format!("https://example.invalid/get/{release}"),
            size: 1024,
            published: None,
            provider_name: self.name.clone(),
            kind: self.kind,
            anime: false,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch_new_items(&self) -> Result<Vec<ProviderResult>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ProviderError::Status(503));
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn fetch_payload(&self, url: &str) -> Result<Payload, ProviderError> {
        self.payloads.fetch_add(1, Ordering::SeqCst);
        if !self.payload_delay.is_zero() {
            tokio::time::sleep(self.payload_delay).await;
        }
        if self.fail_payload.load(Ordering::SeqCst) {
            return Err(ProviderError::Network("connection reset".into()));
        }
        Ok(Payload {
            filename: None,
            bytes: url.as_bytes().to_vec(),
        })
    }
}

// ─── Storage ───

#[derive(Default)]
pub struct MockStorage {
    saved: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    fail: AtomicBool,
}

impl MockStorage {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn save_to_destination(
        &self,
        dir: &Path,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        let path = dir.join(filename);
        self.saved.lock().unwrap().push((path.clone(), bytes.to_vec()));
        Ok(path)
    }
}

// ─── Alias feed ───

pub struct MockFeed {
    name: String,
    batch: ExceptionBatch,
    fetches: AtomicUsize,
}

impl MockFeed {
    pub fn new(name: &str, batch: ExceptionBatch) -> Self {
        Self {
            name: name.into(),
            batch,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExceptionFeed for MockFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<ExceptionBatch, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.batch.clone())
    }
}

// ─── Fixtures ───

pub struct Fixture {
    pub catalog: Arc<MockCatalog>,
    pub provider: Arc<MockProvider>,
    pub storage: Arc<MockStorage>,
    pub show: Show,
}

impl Fixture {
    /// A catalog holding "Show Name" (tvdb 1234) and a provider named "nzbs".
    pub fn new(provider: MockProvider) -> Self {
        let catalog = Arc::new(MockCatalog::default());
        let show = catalog.add_show(Show::new("Show Name", "tvdb", 1234));
        Self {
            catalog,
            provider: Arc::new(provider),
            storage: Arc::new(MockStorage::default()),
            show,
        }
    }

    pub fn episode(&self, season: i64, number: i64, status: EpisodeStatus) -> Episode {
        let mut ep = Episode::new(self.show.id, season, number);
        ep.status = status;
        self.catalog.add_episode(ep)
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            self.catalog.clone(),
            provider_registry([self.provider.clone() as Arc<dyn Provider>]),
            self.storage.clone(),
            Blackholes {
                nzb: "/blackhole/nzb".into(),
                torrent: "/blackhole/torrent".into(),
            },
        )
    }
}
