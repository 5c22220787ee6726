use tokio::sync::mpsc;

use crate::error::{FlyoverError, FlyoverResult};
use crate::renderer::CaptureStream;

/// Streaming encoder configuration: the negotiated mime type plus the
/// caller's frame rate and target bitrate.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    pub mime_type: String,
    pub fps: u32,
    pub bits_per_second: u64,
}

/// Events emitted by a running encoder session.
#[derive(Clone, Debug)]
pub enum EncoderEvent {
    /// A periodic data-available chunk. May be empty.
    Data(Vec<u8>),
    /// A mid-capture error. Capture continues if the session stays usable.
    Error(String),
    /// Stop acknowledgement: the final chunk has been delivered.
    Stopped,
}

/// Platform streaming-encoder session over a renderer's capture stream.
pub trait EncoderSession: Send {
    /// Begin capturing. Returns the session's event channel.
    fn start(&mut self) -> FlyoverResult<mpsc::UnboundedReceiver<EncoderEvent>>;
    /// Request a stop; the session acknowledges with [`EncoderEvent::Stopped`]
    /// after flushing its final chunk.
    fn request_stop(&mut self) -> FlyoverResult<()>;
}

/// Opens encoder sessions for a given capture stream and configuration.
pub trait EncoderFactory: Send + Sync {
    fn open(
        &self,
        stream: Box<dyn CaptureStream>,
        config: &EncoderConfig,
    ) -> FlyoverResult<Box<dyn EncoderSession>>;
}

/// Accumulates a session's emitted chunks into one encoded payload.
///
/// `start` must be called before playback begins and `finish` only after the
/// final frame has been drawn; finalization waits for the session's stop
/// acknowledgement before concatenating.
pub struct Recorder {
    session: Box<dyn EncoderSession>,
    events: mpsc::UnboundedReceiver<EncoderEvent>,
}

impl Recorder {
    pub fn start(mut session: Box<dyn EncoderSession>) -> FlyoverResult<Self> {
        let events = session.start()?;
        Ok(Self { session, events })
    }

    /// Best-effort stop for a capture whose payload will never be collected.
    /// The session still receives its stop request so platform encoder
    /// resources are released promptly; a failing stop is only logged.
    pub fn abort(mut self) {
        if let Err(error) = self.session.request_stop() {
            tracing::warn!(%error, "encoder stop request failed while aborting capture");
        }
    }

    /// Stop the session, drain its events through the stop acknowledgement,
    /// and concatenate the chunks. Zero-size chunks are dropped rather than
    /// treated as errors; a zero-byte total payload is fatal.
    pub async fn finish(mut self) -> FlyoverResult<Vec<u8>> {
        self.session.request_stop()?;

        let mut payload = Vec::new();
        loop {
            match self.events.recv().await {
                Some(EncoderEvent::Data(chunk)) => {
                    if !chunk.is_empty() {
                        payload.extend_from_slice(&chunk);
                    }
                }
                Some(EncoderEvent::Error(message)) => {
                    tracing::warn!(%message, "encoder reported an error mid-capture");
                }
                Some(EncoderEvent::Stopped) | None => break,
            }
        }

        if payload.is_empty() {
            return Err(FlyoverError::EmptyOutput);
        }
        Ok(payload)
    }
}
