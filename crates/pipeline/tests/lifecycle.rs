//! End-to-end lifecycle tests against an in-memory provider and fetcher.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use clipgen_core::metadata::{self, OperationMetadata};
use clipgen_core::output::{CommandOutput, Completed};
use clipgen_core::params::{AspectRatio, ClipDuration, Resolution, Speed};
use clipgen_core::preset::PresetCatalog;
use clipgen_core::request::GenerationRequest;
use clipgen_pipeline::{Controller, JobOptions, PipelineError};
use clipgen_provider::download::{ArtifactFetcher, DownloadError};
use clipgen_provider::poller::PollError;
use clipgen_provider::provider::{
    OperationHandle, PollStatus, ProviderError, ProviderRequest, VideoProvider, VideoResult,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeProvider {
    submits: AtomicUsize,
    polls: AtomicUsize,
    reject_submit: bool,
    accept_cancel: bool,
    /// Number of pending answers before the final status.
    pending_polls: usize,
    final_status: PollStatus,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl FakeProvider {
    fn succeeding(pending_polls: usize) -> Self {
        Self::new(pending_polls, PollStatus::succeeded(video("generated")))
    }

    fn never_done() -> Self {
        Self::new(usize::MAX, PollStatus::pending())
    }

    fn new(pending_polls: usize, final_status: PollStatus) -> Self {
        Self {
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            reject_submit: false,
            accept_cancel: false,
            pending_polls,
            final_status,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn rejecting() -> Self {
        Self {
            reject_submit: true,
            ..Self::succeeding(0)
        }
    }

    fn cancellable() -> Self {
        Self {
            accept_cancel: true,
            ..Self::succeeding(0)
        }
    }

    fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    async fn submit(&self, request: &ProviderRequest) -> Result<OperationHandle, ProviderError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.reject_submit {
            return Err(ProviderError::Api {
                status: 400,
                body: "invalid argument".into(),
            });
        }
        Ok(OperationHandle::new(format!("operations/{n}")))
    }

    async fn poll(&self, _: &OperationHandle) -> Result<PollStatus, ProviderError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if n < self.pending_polls {
            Ok(PollStatus::pending())
        } else {
            Ok(self.final_status.clone())
        }
    }

    async fn cancel(&self, _: &OperationHandle) -> Result<(), ProviderError> {
        if self.accept_cancel {
            Ok(())
        } else {
            Err(ProviderError::CancelNotSupported)
        }
    }
}

#[derive(Default)]
struct FakeFetcher {
    fetches: AtomicUsize,
    fail: bool,
}

impl FakeFetcher {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactFetcher for FakeFetcher {
    async fn fetch(&self, uri: &str, dest: &Path) -> Result<u64, DownloadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DownloadError::Status {
                status: 403,
                body: "forbidden".into(),
            });
        }
        tokio::fs::write(dest, uri.as_bytes()).await.unwrap();
        Ok(uri.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn video(name: &str) -> VideoResult {
    let uri = format!("https://files.test/{name}:download");
    VideoResult {
        reference_token: json!({"uri": uri, "mimeType": "video/mp4"}),
        uri,
    }
}

fn controller(provider: &Arc<FakeProvider>, fetcher: &Arc<FakeFetcher>) -> Controller {
    Controller::new(provider.clone(), fetcher.clone())
}

fn cat_request() -> GenerationRequest {
    GenerationRequest::new("A cat on a beach")
        .with_duration(ClipDuration::Eight)
        .with_aspect_ratio(AspectRatio::Landscape)
}

fn options(dir: &Path, name: &str) -> JobOptions {
    JobOptions::new(dir.join(name))
}

async fn write_prior(dir: &Path, name: &str, duration: u32) -> PathBuf {
    let clip = dir.join(name);
    tokio::fs::write(&clip, b"prior").await.unwrap();
    let record = OperationMetadata::new(
        "operations/prior",
        json!({"uri": "https://files.test/prior:download"}),
        duration,
        AspectRatio::Portrait,
        Resolution::P1080,
    );
    metadata::save(&clip, &record).await.unwrap();
    clip
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn generation_downloads_clip_and_writes_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(2));
    let fetcher = Arc::new(FakeFetcher::default());

    let report = controller(&provider, &fetcher)
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "cat.mp4"))
        .await
        .unwrap();

    assert_eq!(provider.submits(), 1);
    assert_eq!(provider.polls(), 3);
    assert_eq!(fetcher.fetches(), 1);
    assert_eq!(report.output_path, dir.path().join("cat.mp4"));
    assert_eq!(report.metadata_path, dir.path().join("cat.meta.json"));
    assert_eq!(report.operation_id, "operations/0");
    assert_eq!(report.duration, 8);
    assert_eq!(report.cost.amount(), "$1.20");
    assert_eq!(report.model, Speed::Fast.model());
    assert!(report.extendable);

    let record = metadata::load(&report.output_path).await.unwrap();
    assert_eq!(record.operation_id, "operations/0");
    assert_eq!(record.duration, 8);
    assert_eq!(record.aspect_ratio, AspectRatio::Landscape);
    assert_eq!(record.video_reference, video("generated").reference_token);
}

#[tokio::test]
async fn unconfirmed_standard_tier_never_submits() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .generate(
            &cat_request().with_speed(Speed::Standard),
            &PresetCatalog::default(),
            &options(dir.path(), "cat.mp4"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COST_CONFIRMATION_REQUIRED");
    assert!(err.to_string().contains("$3.20"));
    assert_eq!(provider.submits(), 0);
    assert_eq!(provider.polls(), 0);
    assert!(!dir.path().join("cat.mp4").exists());
}

#[tokio::test(start_paused = true)]
async fn confirmed_standard_tier_is_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let report = controller(&provider, &fetcher)
        .generate(
            &cat_request().with_speed(Speed::Standard),
            &PresetCatalog::default(),
            &options(dir.path(), "cat.mp4").confirmed(true),
        )
        .await
        .unwrap();

    assert_eq!(report.cost.amount(), "$3.20");
    assert_eq!(provider.last_request().model(), Speed::Standard.model());
}

#[tokio::test]
async fn elevated_resolution_below_max_duration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let request = GenerationRequest::new("A cat")
        .with_duration(ClipDuration::Four)
        .with_aspect_ratio(AspectRatio::Landscape)
        .with_resolution(Resolution::P1080);
    let err = controller(&provider, &fetcher)
        .generate(&request, &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_RESOLUTION");
    assert_eq!(provider.submits(), 0);
}

#[tokio::test]
async fn too_many_reference_images_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let mut request = cat_request();
    request.reference_images = (0..4).map(|i| PathBuf::from(format!("r{i}.png"))).collect();
    let err = controller(&provider, &fetcher)
        .generate(&request, &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "TOO_MANY_REFERENCE_IMAGES");
    assert_eq!(provider.submits(), 0);
}

#[tokio::test]
async fn unknown_preset_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .generate(
            &cat_request().with_preset("nope"),
            &PresetCatalog::bundled().unwrap(),
            &options(dir.path(), "a.mp4"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "UNKNOWN_PRESET");
    assert_eq!(provider.submits(), 0);
}

#[tokio::test]
async fn missing_aspect_ratio_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let request = GenerationRequest::new("A cat").with_duration(ClipDuration::Six);
    let err = controller(&provider, &fetcher)
        .generate(&request, &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "MISSING_ASPECT_RATIO");
    assert_eq!(provider.submits(), 0);
}

#[tokio::test]
async fn rejected_submission_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::rejecting());
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::SubmissionFailed(ProviderError::Api { status: 400, .. }));
    assert_eq!(provider.submits(), 1);
    assert_eq!(provider.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn timeout_reports_operation_and_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::never_done());
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .generate(
            &cat_request(),
            &PresetCatalog::default(),
            &options(dir.path(), "cat.mp4").with_timeout(Duration::from_secs(20)),
        )
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Poll(PollError::Timeout { .. }));
    assert_eq!(err.code(), "TIMEOUT");
    assert_eq!(err.operation_id(), Some("operations/0"));
    assert_eq!(fetcher.fetches(), 0);
    assert!(!dir.path().join("cat.meta.json").exists());
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::new(1, PollStatus::failed("blocked by safety filter")));
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PROVIDER_ERROR");
    assert!(err.to_string().contains("blocked by safety filter"));
    assert_eq!(fetcher.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn download_failure_leaves_no_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::failing());

    let err = controller(&provider, &fetcher)
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "cat.mp4"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "DOWNLOAD_FAILED");
    assert_eq!(err.operation_id(), Some("operations/0"));
    assert!(err.to_string().contains("403"));
    assert!(!dir.path().join("cat.meta.json").exists());
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_the_poll_loop() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::never_done());
    let fetcher = Arc::new(FakeFetcher::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = controller(&provider, &fetcher)
        .with_cancellation(cancel)
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap_err();

    assert_eq!(provider.submits(), 1);
    let output = err.to_output();
    assert_matches!(output, CommandOutput::Cancelled(ref r) if r.operation_id == "operations/0");
    assert!(output.is_failure());
}

// ---------------------------------------------------------------------------
// Extension
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extension_without_sidecar_makes_no_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let clip = dir.path().join("foreign.mp4");
    tokio::fs::write(&clip, b"not ours").await.unwrap();

    let err = controller(&provider, &fetcher)
        .extend(
            &clip,
            &GenerationRequest::new("Continue"),
            &PresetCatalog::default(),
            &options(dir.path(), "out.mp4"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "EXTENSION_METADATA_MISSING");
    assert_eq!(provider.submits(), 0);
    assert_eq!(provider.polls(), 0);
    assert_eq!(fetcher.fetches(), 0);
}

#[tokio::test]
async fn extension_with_out_of_range_duration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());
    let clip = write_prior(dir.path(), "corrupt.mp4", u32::MAX - 1).await;

    let err = controller(&provider, &fetcher)
        .extend(
            &clip,
            &GenerationRequest::new("Continue"),
            &PresetCatalog::default(),
            &options(dir.path(), "out.mp4"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "EXTENSION_METADATA_INVALID");
    assert_eq!(provider.submits(), 0);
    assert_eq!(fetcher.fetches(), 0);
}

#[tokio::test]
async fn unconfirmed_standard_extension_never_submits() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());
    let clip = write_prior(dir.path(), "base.mp4", 8).await;

    let err = controller(&provider, &fetcher)
        .extend(
            &clip,
            &GenerationRequest::new("Continue").with_speed(Speed::Standard),
            &PresetCatalog::default(),
            &options(dir.path(), "out.mp4"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COST_CONFIRMATION_REQUIRED");
    assert!(err.to_string().contains("$2.80 for 7s extension"));
    assert_eq!(provider.submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn extension_adds_seven_seconds_at_720p_and_keeps_aspect_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(1));
    let fetcher = Arc::new(FakeFetcher::default());
    let clip = write_prior(dir.path(), "base.mp4", 8).await;

    let report = controller(&provider, &fetcher)
        .extend(
            &clip,
            &GenerationRequest::new("The cat walks away"),
            &PresetCatalog::default(),
            &options(dir.path(), "extended.mp4"),
        )
        .await
        .unwrap();

    assert_eq!(report.extended_from, clip);
    assert_eq!(report.extension_duration, 7);
    assert_eq!(report.total_duration, 15);
    assert_eq!(report.resolution, Resolution::P720);
    assert_eq!(report.cost.amount(), "$1.05");
    assert!(report.extendable);

    assert_matches!(provider.last_request(), ProviderRequest::Extend { ref video, ref prompt, .. }
        if video["uri"] == "https://files.test/prior:download" && prompt == "The cat walks away");

    let record = metadata::load(&report.output_path).await.unwrap();
    assert_eq!(record.duration, 15);
    assert_eq!(record.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(record.resolution, Resolution::P720);

    // The source sidecar is untouched.
    assert_eq!(metadata::load(&clip).await.unwrap().duration, 8);
}

#[tokio::test(start_paused = true)]
async fn extension_reaching_ceiling_is_reported_not_extendable() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());
    let clip = write_prior(dir.path(), "long.mp4", 141).await;

    let report = controller(&provider, &fetcher)
        .extend(
            &clip,
            &GenerationRequest::new("One more"),
            &PresetCatalog::default(),
            &options(dir.path(), "longer.mp4"),
        )
        .await
        .unwrap();

    assert_eq!(report.total_duration, 148);
    assert!(!report.extendable);
}

#[tokio::test(start_paused = true)]
async fn extension_chains_from_a_generated_clip() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());
    let controller = controller(&provider, &fetcher);

    let generated = controller
        .generate(&cat_request(), &PresetCatalog::default(), &options(dir.path(), "a.mp4"))
        .await
        .unwrap();
    let extended = controller
        .extend(
            &generated.output_path,
            &GenerationRequest::new("Continue"),
            &PresetCatalog::default(),
            &options(dir.path(), "b.mp4"),
        )
        .await
        .unwrap();
    let again = controller
        .extend(
            &extended.output_path,
            &GenerationRequest::new("Continue again"),
            &PresetCatalog::default(),
            &options(dir.path(), "c.mp4"),
        )
        .await
        .unwrap();

    assert_eq!(extended.total_duration, 15);
    assert_eq!(again.total_duration, 22);
    assert_eq!(provider.submits(), 3);
}

// ---------------------------------------------------------------------------
// Status / cancel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_in_progress_then_complete() {
    let provider = Arc::new(FakeProvider::succeeding(1));
    let fetcher = Arc::new(FakeFetcher::default());
    let controller = controller(&provider, &fetcher);

    let first = controller.status("operations/42").await.unwrap();
    assert_matches!(first, CommandOutput::InProgress(ref r) if r.operation_id == "operations/42" && !r.done);

    let second = controller.status("operations/42").await.unwrap();
    assert_matches!(second, CommandOutput::Complete(Completed::Operation(ref r))
        if r.done && r.video_uri.as_deref() == Some("https://files.test/generated:download"));
    assert_eq!(provider.submits(), 0);
}

#[tokio::test]
async fn cancel_is_not_supported() {
    let provider = Arc::new(FakeProvider::succeeding(0));
    let fetcher = Arc::new(FakeFetcher::default());

    let err = controller(&provider, &fetcher)
        .cancel("operations/1")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "CANCEL_NOT_SUPPORTED");
}

#[tokio::test]
async fn accepted_cancel_is_not_a_failure() {
    let provider = Arc::new(FakeProvider::cancellable());
    let fetcher = Arc::new(FakeFetcher::default());

    let output = controller(&provider, &fetcher)
        .cancel("operations/1")
        .await
        .unwrap();

    assert_matches!(output, CommandOutput::Cancelled(ref r) if r.operation_id == "operations/1");
    assert!(!output.is_failure());
}
