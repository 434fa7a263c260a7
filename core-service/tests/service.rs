//! Service loop end to end: desktop bridges, a stream player over scripted
//! decoders and the event bus as the observation point.

use async_trait::async_trait;
use bridge_desktop::{
    DesktopForegroundService, LogNotificationPoster, ServiceStatus, TracingSessionHost,
};
use bridge_traits::media::MediaItem;
use bridge_traits::playback::{ErrorKind, PlaybackStatus, RepeatMode};
use bridge_traits::session::MediaSessionHost;
use bridge_traits::time::{Clock, SystemClock};
use core_catalog::{StaticSource, BROWSE_ROOT_ID};
use core_playback::{
    AudioCodec, AudioDecoder, AudioFormat, AudioFrameChunk, AudioSink, DecoderFactory, NullSink,
    PlayerConfig, PlayerEventSender, ProbeResult, Result as PlaybackResult, StreamPlayer,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, PlaybackEvent, Receiver, SessionEvent};
use core_service::{CoreError, MusicService};
use core_session::{SessionError, PREPARE_TIMEOUT_MESSAGE};
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

// ============================================================================
// Fixtures
// ============================================================================

const SAMPLE_RATE: u32 = 1000;

struct ToneDecoder {
    total_frames: usize,
    position: usize,
}

#[async_trait]
impl AudioDecoder for ToneDecoder {
    async fn probe(&mut self) -> PlaybackResult<ProbeResult> {
        Ok(
            ProbeResult::new(AudioFormat::new(AudioCodec::Wav, SAMPLE_RATE, 1, Some(16), None))
                .with_duration(Some(Duration::from_millis(self.total_frames as u64))),
        )
    }

    async fn decode_frames(&mut self, max_frames: usize) -> PlaybackResult<Option<AudioFrameChunk>> {
        if self.position >= self.total_frames {
            return Ok(None);
        }
        let frames = max_frames.min(self.total_frames - self.position);
        let timestamp = Duration::from_millis(self.position as u64);
        self.position += frames;
        Ok(Some(AudioFrameChunk::new(vec![0.1; frames], frames, timestamp)))
    }

    async fn seek(&mut self, position: Duration) -> PlaybackResult<()> {
        self.position = (position.as_millis() as usize).min(self.total_frames);
        Ok(())
    }
}

/// Tones of a fixed length; `stall` never finishes opening.
struct ToneFactory {
    total_frames: usize,
    stall: bool,
}

#[async_trait]
impl DecoderFactory for ToneFactory {
    async fn open(&self, _item: &MediaItem) -> PlaybackResult<Box<dyn AudioDecoder>> {
        if self.stall {
            future::pending::<()>().await;
        }
        Ok(Box::new(ToneDecoder {
            total_frames: self.total_frames,
            position: 0,
        }))
    }
}

struct Host {
    session: Arc<TracingSessionHost>,
    service: Arc<DesktopForegroundService>,
}

fn host() -> Host {
    Host {
        session: Arc::new(TracingSessionHost::new()),
        service: Arc::new(DesktopForegroundService::new()),
    }
}

fn config(host: &Host, repeat_mode: RepeatMode, prepare_timeout: Option<Duration>) -> CoreConfig {
    let mut builder = CoreConfig::builder()
        .session_host(host.session.clone())
        .foreground_service(host.service.clone())
        .notification_poster(Arc::new(LogNotificationPoster::new()))
        .repeat_mode(repeat_mode);
    if let Some(limit) = prepare_timeout {
        builder = builder.prepare_timeout(limit);
    }
    builder.build().unwrap()
}

fn catalog(ids: &[&str]) -> Arc<StaticSource> {
    Arc::new(StaticSource::new(
        ids.iter()
            .map(|id| {
                MediaItem::builder(*id)
                    .title(id.to_uppercase())
                    .media_uri(format!("file:///music/{id}.wav"))
                    .build()
            })
            .collect(),
    ))
}

fn start<S: AudioSink>(
    config: CoreConfig,
    factory: ToneFactory,
    sink: Arc<S>,
    source: Arc<StaticSource>,
) -> MusicService {
    let (sender, receiver) = PlayerEventSender::channel();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let player = StreamPlayer::new(
        Arc::new(factory),
        sink,
        clock,
        PlayerConfig::default().with_decode_chunk_frames(100),
        sender,
    )
    .unwrap();

    MusicService::builder(config)
        .source(source)
        .player(Box::new(player), receiver)
        .start()
        .unwrap()
}

async fn wait_for<F>(rx: &mut Receiver<CoreEvent>, mut predicate: F) -> CoreEvent
where
    F: FnMut(&CoreEvent) -> bool,
{
    timeout(Duration::from_secs(30), async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

async fn wait_loaded(rx: &mut Receiver<CoreEvent>) -> usize {
    match wait_for(rx, |e| matches!(e, CoreEvent::Catalog(_))).await {
        CoreEvent::Catalog(CatalogEvent::Loaded { item_count }) => item_count,
        other => panic!("catalog did not load: {other:?}"),
    }
}

fn is_started(event: &CoreEvent, id: &str) -> bool {
    matches!(
        event,
        CoreEvent::Playback(PlaybackEvent::Started { media_id: Some(m), .. }) if m == id
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn plays_through_the_queue_and_leaves_foreground() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::None, None),
        ToneFactory {
            total_frames: 300,
            stall: false,
        },
        Arc::new(NullSink::new()),
        catalog(&["a", "b"]),
    );
    let mut events = service.subscribe();
    assert_eq!(wait_loaded(&mut events).await, 2);

    service.handle().on_play().unwrap();

    wait_for(&mut events, |e| is_started(e, "a")).await;
    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Playback(PlaybackEvent::Completed { media_id: Some(m) }) if m == "a")
    })
    .await;
    wait_for(&mut events, |e| is_started(e, "b")).await;
    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Session(SessionEvent::ForegroundStopped))
    })
    .await;

    assert_eq!(host.session.metadata().unwrap().id(), "b");
    assert_eq!(
        host.session.playback_state().unwrap().status,
        PlaybackStatus::Stopped
    );
    assert_eq!(host.service.start_count(), 1);
    assert_eq!(host.service.status(), ServiceStatus::Stopped);

    service.shutdown().await.unwrap();
    assert!(host.session.is_released());
}

#[tokio::test(start_paused = true)]
async fn stop_command_deactivates_and_stops_the_service() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::All, None),
        ToneFactory {
            total_frames: 10_000_000,
            stall: false,
        },
        Arc::new(NullSink::realtime()),
        catalog(&["a"]),
    );
    let mut events = service.subscribe();
    wait_loaded(&mut events).await;
    let controls = service.handle();

    controls.on_play().unwrap();
    wait_for(&mut events, |e| is_started(e, "a")).await;
    assert!(host.session.is_active());
    assert_eq!(host.service.status(), ServiceStatus::Foreground);

    controls.on_pause().unwrap();
    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Session(SessionEvent::ForegroundDetached))
    })
    .await;
    assert_eq!(host.service.status(), ServiceStatus::Started);

    controls.on_play().unwrap();
    wait_for(&mut events, |e| is_started(e, "a")).await;
    assert_eq!(host.service.start_count(), 1);

    controls.on_stop().unwrap();
    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Session(SessionEvent::ForegroundStopped))
    })
    .await;
    assert!(!host.session.is_active());
    assert_eq!(host.service.status(), ServiceStatus::Stopped);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stuck_preparation_times_out() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::All, Some(Duration::from_secs(2))),
        ToneFactory {
            total_frames: 300,
            stall: true,
        },
        Arc::new(NullSink::new()),
        catalog(&["a"]),
    );
    let mut events = service.subscribe();
    wait_loaded(&mut events).await;

    service.handle().on_play().unwrap();
    let event = wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Playback(PlaybackEvent::Error { .. }))
    })
    .await;

    match event {
        CoreEvent::Playback(PlaybackEvent::Error { kind, message, .. }) => {
            assert_eq!(kind, ErrorKind::SourceUnavailable);
            assert_eq!(message, PREPARE_TIMEOUT_MESSAGE);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(host.session.playback_state().unwrap().status.is_error());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_catalog_file_is_reported() {
    let host = host();
    let config = CoreConfig::builder()
        .session_host(host.session.clone())
        .foreground_service(host.service.clone())
        .notification_poster(Arc::new(LogNotificationPoster::new()))
        .catalog_path("/nonexistent/msc/catalog.json")
        .build()
        .unwrap();

    let (sender, receiver) = PlayerEventSender::channel();
    let player = StreamPlayer::new(
        Arc::new(ToneFactory {
            total_frames: 10,
            stall: false,
        }),
        Arc::new(NullSink::new()),
        Arc::new(SystemClock),
        PlayerConfig::default(),
        sender,
    )
    .unwrap();
    let service = MusicService::builder(config)
        .player(Box::new(player), receiver)
        .start()
        .unwrap();
    let mut events = service.subscribe();

    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }))
    })
    .await;

    let err = service.browser().load_children(BROWSE_ROOT_ID).await.unwrap_err();
    assert!(matches!(err, SessionError::CatalogUnavailable(_)));

    // Nothing to play: the command is accepted and ignored.
    service.handle().on_play().unwrap();
    service.shutdown().await.unwrap();
    assert_eq!(host.service.start_count(), 0);
}

#[tokio::test]
async fn browser_lists_the_loaded_catalog() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::All, None),
        ToneFactory {
            total_frames: 10,
            stall: false,
        },
        Arc::new(NullSink::new()),
        catalog(&["a", "b", "c"]),
    );

    let root = service
        .browser()
        .get_root("com.example.car", 10_042, &Default::default());
    let children = service.browser().load_children(&root.root_id).await.unwrap();
    assert_eq!(children.len(), 3);

    service.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn task_removal_stops_the_host_service() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::All, None),
        ToneFactory {
            total_frames: 10_000_000,
            stall: false,
        },
        Arc::new(NullSink::realtime()),
        catalog(&["a"]),
    );
    let mut events = service.subscribe();
    wait_loaded(&mut events).await;

    service.handle().on_play().unwrap();
    wait_for(&mut events, |e| is_started(e, "a")).await;

    service.handle().on_task_removed().unwrap();
    wait_for(&mut events, |e| {
        matches!(e, CoreEvent::Session(SessionEvent::ForegroundStopped))
    })
    .await;
    assert_eq!(host.service.status(), ServiceStatus::Stopped);
    assert!(!host.session.is_active());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn handle_rejects_commands_after_shutdown() {
    let host = host();
    let service = start(
        config(&host, RepeatMode::All, None),
        ToneFactory {
            total_frames: 10,
            stall: false,
        },
        Arc::new(NullSink::new()),
        catalog(&["a"]),
    );
    let controls = service.handle();

    service.shutdown().await.unwrap();
    assert!(!controls.is_running());
    assert!(matches!(controls.on_play(), Err(CoreError::ServiceStopped)));
    assert!(host.session.is_released());
}
