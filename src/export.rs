use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::capture::{EncoderConfig, EncoderFactory, Recorder};
use crate::codec::{CodecSupport, NegotiatedCodec, negotiate};
use crate::countries::CountryStore;
use crate::error::FlyoverResult;
use crate::offscreen::OffscreenRenderer;
use crate::player;
use crate::renderer::{RendererFactory, RendererInit};
use crate::script::{AnimationScript, CameraPose};

/// Capture parameters for one export. Output is always square.
#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    /// Edge length of the square output, in pixels.
    pub size: u32,
    pub fps: u32,
    pub bits_per_second: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size: 1080,
            fps: 30,
            bits_per_second: 10_000_000,
        }
    }
}

/// The finished export. Ownership of the payload passes fully to the caller.
#[derive(Clone, Debug)]
pub struct ExportVideo {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub extension: String,
    pub filename: String,
    pub byte_size: u64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Recording,
    Finalizing,
}

impl ExportStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Preparing => "Preparing high-resolution map...",
            Self::Recording => "Recording animation frames...",
            Self::Finalizing => "Finalizing video file...",
        }
    }
}

/// One progress observation. Percent is monotone within a single export and
/// ends at exactly 100 on success.
#[derive(Clone, Copy, Debug)]
pub struct ExportProgress {
    pub stage: ExportStage,
    pub percent: f64,
    pub message: &'static str,
}

/// Clamps reported percents to the running maximum so observers never see
/// progress move backwards, regardless of estimator timing.
struct ProgressReporter {
    observer: Box<dyn Fn(ExportProgress) + Send + Sync>,
    last_percent: Mutex<f64>,
}

impl ProgressReporter {
    fn new(observer: Box<dyn Fn(ExportProgress) + Send + Sync>) -> Self {
        Self {
            observer,
            last_percent: Mutex::new(0.0),
        }
    }

    fn report(&self, stage: ExportStage, percent: f64) {
        let percent = {
            let mut last = self.last_percent.lock().unwrap_or_else(|e| e.into_inner());
            *last = last.max(percent.clamp(0.0, 100.0));
            *last
        };
        (self.observer)(ExportProgress {
            stage,
            percent,
            message: stage.message(),
        });
    }
}

/// Composes codec negotiation, the offscreen renderer, frame capture, and
/// script playback into one export call.
pub struct VideoExporter {
    renderer_factory: Arc<dyn RendererFactory>,
    codecs: Arc<dyn CodecSupport>,
    encoders: Arc<dyn EncoderFactory>,
    countries: Arc<CountryStore>,
}

impl VideoExporter {
    pub fn new(
        renderer_factory: Arc<dyn RendererFactory>,
        codecs: Arc<dyn CodecSupport>,
        encoders: Arc<dyn EncoderFactory>,
        countries: Arc<CountryStore>,
    ) -> Self {
        Self {
            renderer_factory,
            codecs,
            encoders,
            countries,
        }
    }

    /// Export `script` as an encoded video, seeding the offscreen camera from
    /// `source_pose`.
    ///
    /// `expected_duration_ms` drives the recording-stage progress estimate
    /// (elapsed wall clock vs. expectation, polled every 100ms). It is an
    /// estimate only: playback completion is driven by the renderer's
    /// transition events, not a timer. [`AnimationScript::total_duration_ms`]
    /// is the natural value to pass.
    ///
    /// The offscreen renderer and its staging surface are torn down on every
    /// path, success or failure, before this returns.
    pub async fn export_animation<F>(
        &self,
        source_pose: CameraPose,
        script: &AnimationScript,
        expected_duration_ms: u64,
        options: ExportOptions,
        on_progress: F,
    ) -> FlyoverResult<ExportVideo>
    where
        F: Fn(ExportProgress) + Send + Sync + 'static,
    {
        let reporter = Arc::new(ProgressReporter::new(Box::new(on_progress)));
        reporter.report(ExportStage::Preparing, 0.0);

        // Capability is static per runtime, so a missing codec fails the
        // export before any renderer resources are allocated.
        let codec = negotiate(self.codecs.as_ref())?;
        tracing::debug!(mime = %codec.mime_type, "negotiated export codec");

        let countries = self.countries.get().await?;
        let mut offscreen = OffscreenRenderer::create(
            self.renderer_factory.as_ref(),
            RendererInit::offscreen(options.size, source_pose),
            &countries,
            &script.highlight,
        )
        .await?;
        reporter.report(ExportStage::Preparing, 5.0);

        let outcome = self
            .record(&mut offscreen, script, expected_duration_ms, options, &codec, &reporter)
            .await;
        offscreen.teardown();
        let data = outcome?;

        let now = chrono::Utc::now();
        let video = ExportVideo {
            byte_size: data.len() as u64,
            filename: format!("flyover-{}.{}", now.timestamp_millis(), codec.extension),
            mime_type: codec.container_mime.clone(),
            extension: codec.extension.clone(),
            created_at: now.to_rfc3339(),
            data,
        };
        reporter.report(ExportStage::Finalizing, 100.0);
        tracing::debug!(bytes = video.byte_size, filename = %video.filename, "export finished");
        Ok(video)
    }

    /// Capture + playback + finalize. Renderer teardown stays with the
    /// caller so it runs whether or not this errors.
    async fn record(
        &self,
        offscreen: &mut OffscreenRenderer,
        script: &AnimationScript,
        expected_duration_ms: u64,
        options: ExportOptions,
        codec: &NegotiatedCodec,
        reporter: &Arc<ProgressReporter>,
    ) -> FlyoverResult<Vec<u8>> {
        let stream = offscreen.renderer_mut()?.capture_stream(options.fps)?;
        let session = self.encoders.open(
            stream,
            &EncoderConfig {
                mime_type: codec.mime_type.clone(),
                fps: options.fps,
                bits_per_second: options.bits_per_second,
            },
        )?;
        let recorder = Recorder::start(session)?;
        reporter.report(ExportStage::Recording, 5.0);

        let cancel = CancelToken::new();
        let estimator = spawn_progress_estimator(
            Arc::clone(reporter),
            expected_duration_ms,
            cancel.clone(),
        );

        let played = player::play(offscreen.renderer_mut()?, script, &cancel).await;

        // The estimator must be gone before the finalize stage so no stray
        // recording-stage update lands after completion.
        cancel.cancel();
        let _ = estimator.await;
        if let Err(error) = played {
            recorder.abort();
            return Err(error);
        }

        reporter.report(ExportStage::Finalizing, 95.0);
        recorder.finish().await
    }
}

/// Periodically publish `min(100, elapsed / expected * 100)` until cancelled.
/// Reads elapsed time and the observer callback only; it never touches
/// renderer or encoder state.
fn spawn_progress_estimator(
    reporter: Arc<ProgressReporter>,
    expected_duration_ms: u64,
    cancel: CancelToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        let mut tick = tokio::time::interval(Duration::from_millis(100));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tick.tick() => {
                    let elapsed = started.elapsed().as_millis() as f64;
                    let percent = (elapsed / expected_duration_ms as f64 * 100.0).min(100.0);
                    reporter.report(ExportStage::Recording, percent);
                }
            }
        }
    })
}
