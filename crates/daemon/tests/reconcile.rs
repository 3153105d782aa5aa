mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{Fixture, MockProvider};
use tvarr_core::{EpisodeStatus, ProviderKind, Quality, SeasonException};
use tvarr_daemon::{Outcome, ReconcileError};
use tvarr_db::Catalog;

const RELEASE: &str = "Show.Name.S01E02.720p.HDTV.x264-GRP";

fn nzbs() -> Fixture {
    Fixture::new(MockProvider::new("nzbs", ProviderKind::Nzb))
}

#[tokio::test]
async fn wanted_episode_is_snatched() {
    let fx = nzbs();
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);

    let outcome = fx
        .reconciler()
        .process(&fx.provider.result(RELEASE))
        .await
        .unwrap();
    let path = PathBuf::from("/blackhole/nzb/Show.Name.S01E02.720p.HDTV.x264-GRP.nzb");
    assert_eq!(
        outcome,
        Outcome::Snatched {
            episode_id: ep.id,
            path: path.clone()
        }
    );
    assert_eq!(fx.storage.saved(), vec![path]);

    let stored = fx.catalog.episode(ep.id);
    assert_eq!(stored.status, EpisodeStatus::Snatched);
    assert_eq!(stored.release_name.as_deref(), Some(RELEASE));
    assert_eq!(stored.release_group.as_deref(), Some("GRP"));
    assert_eq!(stored.quality, Quality::HdTv);
}

#[tokio::test]
async fn torrents_go_to_the_torrent_blackhole() {
    let fx = Fixture::new(MockProvider::new("nyaa", ProviderKind::Torrent));
    fx.episode(1, 2, EpisodeStatus::Wanted);

    fx.reconciler()
        .process(&fx.provider.result(RELEASE))
        .await
        .unwrap();
    assert_eq!(
        fx.storage.saved(),
        vec![PathBuf::from(
            "/blackhole/torrent/Show.Name.S01E02.720p.HDTV.x264-GRP.torrent"
        )]
    );
}

#[tokio::test]
async fn reprocessing_a_snatched_episode_does_nothing() {
    let fx = nzbs();
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    let reconciler = fx.reconciler();
    let result = fx.provider.result(RELEASE);

    reconciler.process(&result).await.unwrap();
    let writes = fx.catalog.writes();

    let again = reconciler.process(&result).await.unwrap();
    assert_eq!(
        again,
        Outcome::Skipped {
            episode_id: ep.id,
            status: EpisodeStatus::Snatched
        }
    );
    assert_eq!(fx.provider.payloads(), 1);
    assert_eq!(fx.storage.saved().len(), 1);
    assert_eq!(fx.catalog.writes(), writes);
}

#[tokio::test]
async fn release_without_episode_numbers_is_rejected() {
    let fx = nzbs();
    fx.episode(1, 2, EpisodeStatus::Wanted);
    let reconciler = fx.reconciler();

    for name in [
        "Show.Name.Complete.DVDRip-GRP",
        "Show.Name.2010.11.23.Source.Quality.Etc-Group",
    ] {
        let err = reconciler.process(&fx.provider.result(name)).await.unwrap_err();
        assert!(matches!(err, ReconcileError::NoEpisodes(ref n) if n == name), "{name}");
    }
    assert_eq!(fx.catalog.writes(), 0);
    assert_eq!(fx.provider.payloads(), 0);
}

#[tokio::test]
async fn unknown_show_and_episode_are_dropped() {
    let fx = nzbs();
    fx.episode(1, 2, EpisodeStatus::Wanted);
    let reconciler = fx.reconciler();

    let err = reconciler
        .process(&fx.provider.result("Other.Show.S01E02.HDTV.x264-GRP"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::NoMatchingShow(_)));

    let err = reconciler
        .process(&fx.provider.result("Show.Name.S05E01.HDTV.x264-GRP"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::UnknownEpisode(ref d) if d == "Show Name S05E01"));

    assert_eq!(fx.catalog.writes(), 0);
}

#[tokio::test]
async fn episodes_that_are_not_wanted_are_skipped() {
    let fx = nzbs();
    let reconciler = fx.reconciler();

    for (number, status) in [
        (2, EpisodeStatus::Skipped),
        (3, EpisodeStatus::Downloaded),
        (4, EpisodeStatus::Unaired),
    ] {
        let ep = fx.episode(1, number, status);
        let name = format!("Show.Name.S01E{number:02}.HDTV.x264-GRP");
        let outcome = reconciler.process(&fx.provider.result(&name)).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Skipped {
                episode_id: ep.id,
                status
            }
        );
    }
    assert_eq!(fx.provider.payloads(), 0);
    assert_eq!(fx.catalog.writes(), 0);
}

#[tokio::test]
async fn failed_download_keeps_episode_wanted() {
    let fx = nzbs();
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    fx.provider.fail_payload(true);

    let err = fx
        .reconciler()
        .process(&fx.provider.result(RELEASE))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Fetch(_)));
    assert_eq!(fx.catalog.episode(ep.id).status, EpisodeStatus::Wanted);
    assert!(fx.storage.saved().is_empty());
    assert_eq!(fx.catalog.writes(), 0);
}

#[tokio::test]
async fn failed_save_keeps_episode_wanted() {
    let fx = nzbs();
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    fx.storage.fail(true);

    let err = fx
        .reconciler()
        .process(&fx.provider.result(RELEASE))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Save(_)));
    assert_eq!(fx.catalog.episode(ep.id).status, EpisodeStatus::Wanted);
    assert_eq!(fx.catalog.writes(), 0);
}

#[tokio::test]
async fn slow_download_times_out() {
    let fx = Fixture::new(
        MockProvider::new("nzbs", ProviderKind::Nzb).with_payload_delay(Duration::from_secs(5)),
    );
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    let reconciler = fx.reconciler().with_payload_timeout(Duration::from_millis(20));

    let err = reconciler
        .process(&fx.provider.result(RELEASE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Fetch(tvarr_providers::ProviderError::Timeout)
    ));
    assert_eq!(fx.catalog.episode(ep.id).status, EpisodeStatus::Wanted);
}

#[tokio::test]
async fn result_from_unregistered_provider_is_dropped() {
    let fx = nzbs();
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    let mut result = fx.provider.result(RELEASE);
    result.provider_name = "gone".into();

    let err = fx.reconciler().process(&result).await.unwrap_err();
    assert!(matches!(err, ReconcileError::UnknownProvider(ref p) if p == "gone"));
    assert_eq!(fx.catalog.episode(ep.id).status, EpisodeStatus::Wanted);
}

#[tokio::test]
async fn season_exception_overrides_parsed_season() {
    let fx = nzbs();
    fx.episode(1, 3, EpisodeStatus::Wanted);
    let second = fx.episode(2, 3, EpisodeStatus::Wanted);
    fx.catalog
        .save_season_exceptions(
            "tvdb",
            &[SeasonException {
                indexer: "tvdb".into(),
                indexer_id: 1234,
                name: "Show Name Second".into(),
                season: 2,
            }],
        )
        .await
        .unwrap();

    let outcome = fx
        .reconciler()
        .process(&fx.provider.result("Show Name Second - S01E03 - Title"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Snatched { episode_id, .. } if episode_id == second.id));
}

#[tokio::test]
async fn anime_release_matches_absolute_number() {
    let fx = nzbs();
    let mut ep = tvarr_core::Episode::new(fx.show.id, 1, 13);
    ep.absolute_number = Some(13);
    ep.status = EpisodeStatus::Wanted;
    let ep = fx.catalog.add_episode(ep);

    let mut result = fx.provider.result("[Group Name] Show Name - 13");
    result.anime = true;
    let outcome = fx.reconciler().process(&result).await.unwrap();
    assert!(matches!(outcome, Outcome::Snatched { episode_id, .. } if episode_id == ep.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_results_snatch_once() {
    let fx = Fixture::new(
        MockProvider::new("nzbs", ProviderKind::Nzb).with_payload_delay(Duration::from_millis(20)),
    );
    let ep = fx.episode(1, 2, EpisodeStatus::Wanted);
    let reconciler = Arc::new(fx.reconciler());

    let names = [
        RELEASE,
        "Show.Name.S01E02.1080p.WEB-DL.DD5.1.H.264-OTHER",
        "Show Name - S01E02 - Title",
        "show.name.s01e02.hdtv-lol",
    ];
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let reconciler = reconciler.clone();
        let result = fx.provider.result(names[i % names.len()]);
        tasks.spawn(async move { reconciler.process(&result).await });
    }

    let mut snatched = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            Outcome::Snatched { episode_id, .. } => {
                assert_eq!(episode_id, ep.id);
                snatched += 1;
            }
            Outcome::Skipped { status, .. } => assert_eq!(status, EpisodeStatus::Snatched),
        }
    }

    assert_eq!(snatched, 1);
    assert_eq!(fx.provider.payloads(), 1);
    assert_eq!(fx.storage.saved().len(), 1);
    assert_eq!(fx.catalog.episode(ep.id).status, EpisodeStatus::Snatched);
}
