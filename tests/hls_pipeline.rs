//! End-to-end tests of the video pipeline against a mock CDN.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use privacy_downloader::api::PrivacyApi;
use privacy_downloader::download::{download_media_item, ItemOutcome};
use privacy_downloader::error::{Error, Result};
use privacy_downloader::hls::{
    ContentToken, Diagnostics, PlaylistLocalizer, ResourceFetcher, Severity, TranscodeMode,
    Transcoder, VideoJob, VideoPipeline,
};
use privacy_downloader::media::{MediaItem, MediaKind};

const REFERER: &str = "https://privacy.com.br/";
const TOKEN: &str = "signed-content-token";

/// Keeps every diagnostic line for later assertions.
#[derive(Default)]
struct RecordingDiagnostics {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl RecordingDiagnostics {
    fn count(&self, severity: Severity) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, severity: Severity, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// Captures the playlist it is handed and writes a stub output file.
#[derive(Default)]
struct FakeTranscoder {
    fail: bool,
    calls: Mutex<Vec<(PathBuf, TranscodeMode, String)>>,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Result<()> {
        let playlist = std::fs::read_to_string(input).unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), mode, playlist));

        if self.fail {
            return Err(Error::FFmpeg(format!("{} refused", mode)));
        }
        std::fs::write(output, b"mp4 data")?;
        Ok(())
    }
}

fn fetcher(diagnostics: Arc<RecordingDiagnostics>) -> ResourceFetcher {
    ResourceFetcher::new(reqwest::Client::new(), REFERER, diagnostics)
}

async fn mount(server: &MockServer, route: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn variant_playlist() -> &'static str {
    "#EXTM3U\n\
     #EXT-X-VERSION:3\n\
     #EXT-X-TARGETDURATION:4\n\
     #EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\",IV=0x1234\n\
     #EXTINF:4.0,\n\
     seg1.ts\n\
     #EXTINF:4.0,\n\
     seg2.ts\n\
     #EXT-X-ENDLIST\n"
}

async fn mount_variant(server: &MockServer) {
    mount(server, "/v/abc/hls/720p/index.m3u8", 200, variant_playlist().as_bytes()).await;
}

#[tokio::test]
async fn test_fetch_sends_authorization_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v/abc/hls/720p/seg1.ts"))
        .and(header("Referer", REFERER))
        .and(header("Content", TOKEN))
        .and(header("X-Content-Uri", "720p/seg1.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"segment".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("nested/seg1.ts");
    let token = ContentToken::new(TOKEN);
    let diagnostics = Arc::new(RecordingDiagnostics::default());

    let ok = fetcher(diagnostics)
        .fetch(
            &format!("{}/v/abc/hls/720p/seg1.ts", server.uri()),
            &dest,
            Some(&token),
        )
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap(), b"segment");
}

#[tokio::test]
async fn test_fetch_key_uses_basename_as_content_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v/abc/hls/720p/key.bin"))
        .and(header("X-Content-Uri", "key.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 16]))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("key.bin.key");
    let token = ContentToken::new(TOKEN);

    let ok = fetcher(Arc::new(RecordingDiagnostics::default()))
        .fetch_key(
            &format!("{}/v/abc/hls/720p/key.bin", server.uri()),
            &dest,
            Some(&token),
        )
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap().len(), 16);
}

#[tokio::test]
async fn test_fetch_non_200_writes_nothing() {
    let server = MockServer::start().await;
    mount(&server, "/missing.ts", 404, b"not here").await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("missing.ts");
    let diagnostics = Arc::new(RecordingDiagnostics::default());

    let ok = fetcher(diagnostics.clone())
        .fetch(&format!("{}/missing.ts", server.uri()), &dest, None)
        .await;

    assert!(!ok);
    assert!(!dest.exists());
    assert_eq!(diagnostics.count(Severity::Warning), 1);
    assert_eq!(diagnostics.count(Severity::Error), 0);
}

#[tokio::test]
async fn test_fetch_streams_large_body() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    mount(&server, "/v/abc/hls/720p/big.ts", 200, &body).await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("big.ts");

    let ok = fetcher(Arc::new(RecordingDiagnostics::default()))
        .fetch(&format!("{}/v/abc/hls/720p/big.ts", server.uri()), &dest, None)
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_localize_rewrites_every_reference() {
    let server = MockServer::start().await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 200, &[1u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 200, b"two").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics.clone());
    let token = ContentToken::new(TOKEN);

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            Some(&token),
        )
        .await
        .expect("playlist localized");

    let content = std::fs::read_to_string(&local).unwrap();
    assert!(!content.contains("http://"));
    assert!(content.contains("URI=\"key.bin.key\",IV=0x1234"));
    assert_eq!(
        content.lines().filter(|l| !l.starts_with('#')).collect::<Vec<_>>(),
        vec!["seg1.ts", "seg2.ts"]
    );
    assert_eq!(
        content.split('\n').count(),
        variant_playlist().split('\n').count()
    );

    assert!(tmp.path().join("key.bin.key").exists());
    assert_eq!(std::fs::read(tmp.path().join("seg2.ts")).unwrap(), b"two");
    assert_eq!(diagnostics.count(Severity::Warning), 0);
}

#[tokio::test]
async fn test_localize_keeps_failed_segment_remote() {
    let server = MockServer::start().await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 200, &[1u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 404, b"").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics.clone());

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            None,
        )
        .await
        .expect("playlist still written");

    let content = std::fs::read_to_string(&local).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    assert_eq!(lines.len(), variant_playlist().split('\n').count());
    assert!(lines.contains(&"seg1.ts"));
    assert!(lines.contains(&"seg2.ts"));
    assert!(!tmp.path().join("seg2.ts").exists());
    assert!(diagnostics.count(Severity::Warning) >= 1);
}

#[tokio::test]
async fn test_localize_keeps_key_line_when_key_fails() {
    let server = MockServer::start().await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 403, b"").await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 200, b"two").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics);

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            None,
        )
        .await
        .unwrap();

    let content = std::fs::read_to_string(&local).unwrap();
    assert!(content.contains("#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\",IV=0x1234"));
    assert!(!tmp.path().join("key.bin.key").exists());
}

#[tokio::test]
async fn test_localize_is_repeatable() {
    let server = MockServer::start().await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 200, &[1u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 200, b"two").await;

    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics);
    let url = format!("{}/v/abc/hls/720p/index.m3u8", server.uri());

    let mut runs = Vec::new();
    for _ in 0..2 {
        let tmp = tempfile::tempdir().unwrap();
        let local = localizer.localize(&url, tmp.path(), None).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        runs.push((names, std::fs::read_to_string(&local).unwrap()));
    }

    assert_eq!(
        runs[0].0,
        vec!["key.bin.key", "playlist.m3u8", "seg1.ts", "seg2.ts"]
    );
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_localize_rewrites_session_key() {
    let server = MockServer::start().await;
    let variant = "#EXTM3U\n\
                   #EXT-X-SESSION-KEY:METHOD=AES-128,URI=\"skey.bin\"\n\
                   #EXT-X-TARGETDURATION:4\n\
                   #EXTINF:4.0,\n\
                   seg1.ts\n\
                   #EXT-X-ENDLIST\n";
    mount(&server, "/v/abc/hls/720p/index.m3u8", 200, variant.as_bytes()).await;
    mount(&server, "/v/abc/hls/720p/skey.bin", 200, &[9u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics.clone());

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            None,
        )
        .await
        .unwrap();

    let content = std::fs::read_to_string(&local).unwrap();
    assert!(content.contains("#EXT-X-SESSION-KEY:METHOD=AES-128,URI=\"skey.bin.key\""));
    assert!(!content.contains("http://"));
    assert_eq!(std::fs::read(tmp.path().join("skey.bin.key")).unwrap(), vec![9u8; 16]);
    assert_eq!(diagnostics.count(Severity::Warning), 0);
}

#[tokio::test]
async fn test_localize_decodes_latin1_playlist() {
    let server = MockServer::start().await;
    let variant: &[u8] = b"#EXTM3U\n\
                           #EXT-X-SESSION-DATA:DATA-ID=\"title\",VALUE=\"v\xEDdeo\"\n\
                           #EXT-X-TARGETDURATION:4\n\
                           #EXTINF:4.0,\n\
                           seg1.ts\n\
                           #EXT-X-ENDLIST\n";
    mount(&server, "/v/abc/hls/720p/index.m3u8", 200, variant).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics);

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            None,
        )
        .await
        .unwrap();

    let content = std::fs::read_to_string(&local).unwrap();
    assert!(content.contains("VALUE=\"v\u{ed}deo\""));
    assert!(content.split('\n').any(|line| line == "seg1.ts"));
    assert!(tmp.path().join("seg1.ts").exists());
}

#[tokio::test]
async fn test_localize_missing_playlist() {
    let server = MockServer::start().await;
    mount(&server, "/v/abc/hls/720p/index.m3u8", 500, b"").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let localizer = PlaylistLocalizer::new(fetcher(diagnostics.clone()), diagnostics);

    let local = localizer
        .localize(
            &format!("{}/v/abc/hls/720p/index.m3u8", server.uri()),
            tmp.path(),
            None,
        )
        .await;

    assert!(local.is_none());
}

fn job(server: &MockServer, root: &Path, url_path: &str) -> VideoJob {
    VideoJob {
        media_id: "abc".to_string(),
        url: format!("{}{}", server.uri(), url_path),
        token: ContentToken::new(TOKEN),
        output: root.join("Videos/2024-03-09_14-05-00_abc.mp4"),
        staging: root.join("Videos/abc_temp"),
    }
}

async fn mount_master(server: &MockServer) {
    let master = "#EXTM3U\n\
                  #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
                  360p/index.m3u8\n\
                  #EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720\n\
                  720p/index.m3u8\n";
    mount(server, "/v/abc/hls/master.m3u8", 200, master.as_bytes()).await;
}

#[tokio::test]
async fn test_pipeline_produces_video_and_cleans_staging() {
    let server = MockServer::start().await;
    mount_master(&server).await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 200, &[1u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 200, b"two").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let transcoder = Arc::new(FakeTranscoder::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        transcoder.clone(),
        diagnostics,
    );

    let job = job(&server, tmp.path(), "/v/abc/hls/master.m3u8");
    assert!(pipeline.process(&job).await);

    assert!(job.output.exists());
    assert!(!job.staging.exists());

    let calls = transcoder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (input, mode, playlist) = &calls[0];
    assert_eq!(*mode, TranscodeMode::StreamCopy);
    assert_eq!(input, &job.staging.join("playlist.m3u8"));
    assert!(playlist.contains("key.bin.key"));
    assert!(!playlist.contains("http://"));
}

#[tokio::test]
async fn test_pipeline_localizes_media_playlist_master() {
    let server = MockServer::start().await;
    let media = "#EXTM3U\n\
                 #EXT-X-TARGETDURATION:4\n\
                 #EXTINF:4.0,\n\
                 seg1.ts\n\
                 #EXT-X-ENDLIST\n";
    mount(&server, "/v/abc/hls/master.m3u8", 200, media.as_bytes()).await;
    mount(&server, "/v/abc/hls/seg1.ts", 200, b"one").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let transcoder = Arc::new(FakeTranscoder::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        transcoder.clone(),
        diagnostics,
    );

    let job = job(&server, tmp.path(), "/v/abc/hls/master.m3u8");
    assert!(pipeline.process(&job).await);

    assert!(job.output.exists());
    assert!(!job.staging.exists());

    let calls = transcoder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (input, mode, playlist) = &calls[0];
    assert_eq!(*mode, TranscodeMode::StreamCopy);
    assert_eq!(input, &job.staging.join("playlist.m3u8"));
    assert!(playlist.split('\n').any(|line| line == "seg1.ts"));
    assert!(!playlist.contains("http://"));
}

#[tokio::test]
async fn test_pipeline_failure_still_cleans_staging() {
    let server = MockServer::start().await;
    mount_master(&server).await;
    mount_variant(&server).await;
    mount(&server, "/v/abc/hls/720p/key.bin", 200, &[1u8; 16]).await;
    mount(&server, "/v/abc/hls/720p/seg1.ts", 200, b"one").await;
    mount(&server, "/v/abc/hls/720p/seg2.ts", 200, b"two").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let transcoder = Arc::new(FakeTranscoder {
        fail: true,
        ..Default::default()
    });
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        transcoder.clone(),
        diagnostics,
    );

    let job = job(&server, tmp.path(), "/v/abc/hls/master.m3u8");
    assert!(!pipeline.process(&job).await);

    assert!(!job.output.exists());
    assert!(!job.staging.exists());

    let modes: Vec<TranscodeMode> = transcoder
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(_, mode, _)| *mode)
        .collect();
    assert_eq!(modes, vec![TranscodeMode::StreamCopy, TranscodeMode::Reencode]);
}

#[tokio::test]
async fn test_pipeline_without_variant_fails_before_transcode() {
    let server = MockServer::start().await;
    mount(&server, "/v/abc/hls/master.m3u8", 200, b"<html>expired</html>").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let transcoder = Arc::new(FakeTranscoder::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        transcoder.clone(),
        diagnostics,
    );

    let job = job(&server, tmp.path(), "/v/abc/hls/master.m3u8");
    assert!(!pipeline.process(&job).await);
    assert!(transcoder.calls.lock().unwrap().is_empty());
    assert!(!job.staging.exists());
}

#[tokio::test]
async fn test_pipeline_direct_video_skips_transcoder() {
    let server = MockServer::start().await;
    mount(&server, "/v/abc/clip.mp4", 200, b"direct mp4").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let transcoder = Arc::new(FakeTranscoder::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        transcoder.clone(),
        diagnostics,
    );

    let job = job(&server, tmp.path(), "/v/abc/clip.mp4");
    assert!(pipeline.process(&job).await);

    assert_eq!(std::fs::read(&job.output).unwrap(), b"direct mp4");
    assert!(transcoder.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_image_then_skip_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/img1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        Arc::new(FakeTranscoder::default()),
        diagnostics,
    );
    let api = PrivacyApi::with_token(reqwest::Client::new(), "bearer");

    let item = MediaItem {
        media_id: "img1".to_string(),
        kind: MediaKind::Image,
        url: format!("{}/p/img1.png", server.uri()),
        posted_at: None,
        file_extension: "png".to_string(),
    };
    let expected = tmp.path().join("Pictures/unknown-date_img1.png");

    let first = download_media_item(&api, &pipeline, tmp.path(), &item).await;
    assert_eq!(first, ItemOutcome::Downloaded(expected.clone()));
    assert_eq!(std::fs::read(&expected).unwrap(), b"png");

    let second = download_media_item(&api, &pipeline, tmp.path(), &item).await;
    assert_eq!(second, ItemOutcome::Skipped(expected));
}

#[tokio::test]
async fn test_download_image_failure_reported() {
    let server = MockServer::start().await;
    mount(&server, "/p/gone.jpg", 404, b"").await;

    let tmp = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let pipeline = VideoPipeline::new(
        fetcher(diagnostics.clone()),
        Arc::new(FakeTranscoder::default()),
        diagnostics,
    );
    let api = PrivacyApi::with_token(reqwest::Client::new(), "bearer");

    let item = MediaItem {
        media_id: "gone".to_string(),
        kind: MediaKind::Image,
        url: format!("{}/p/gone.jpg", server.uri()),
        posted_at: None,
        file_extension: "jpg".to_string(),
    };

    let outcome = download_media_item(&api, &pipeline, tmp.path(), &item).await;
    assert!(matches!(outcome, ItemOutcome::Failed(_)));
    assert!(!tmp.path().join("Pictures/unknown-date_gone.jpg").exists());
}
