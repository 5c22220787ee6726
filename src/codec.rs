use crate::error::{FlyoverError, FlyoverResult};

/// Runtime codec capability probes. Capability is static per runtime, so both
/// checks are synchronous and a failed negotiation is never retried.
pub trait CodecSupport: Send + Sync {
    /// Can the runtime's streaming encoder produce this mime type?
    fn can_encode(&self, mime_type: &str) -> bool;
    /// Can the runtime play back this mime type?
    fn can_decode(&self, mime_type: &str) -> bool;
}

/// Candidate container+codec pairs, highest quality first. Support differs
/// per browser engine, which is why each candidate is probed for encode and
/// decode independently.
pub const CODEC_CANDIDATES: &[&str] = &[
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
    "video/mp4;codecs=avc1.42E01E",
    "video/mp4",
];

/// The outcome of codec negotiation: the full encoder mime type, the bare
/// container mime for the final payload, and the canonical file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiatedCodec {
    pub mime_type: String,
    pub container_mime: String,
    pub extension: String,
}

/// Pick the first candidate the runtime can both encode and decode.
pub fn negotiate(support: &dyn CodecSupport) -> FlyoverResult<NegotiatedCodec> {
    for candidate in CODEC_CANDIDATES {
        if support.can_encode(candidate) && support.can_decode(candidate) {
            return Ok(NegotiatedCodec {
                mime_type: (*candidate).to_string(),
                container_mime: container_mime(candidate).to_string(),
                extension: file_extension(candidate).to_string(),
            });
        }
    }
    Err(FlyoverError::NoCodecAvailable)
}

/// Strip any `;codecs=` suffix, leaving the container mime type.
pub fn container_mime(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or(mime_type)
}

/// Canonical file extension for a mime type, with a generic fallback for
/// unrecognized containers.
pub fn file_extension(mime_type: &str) -> &'static str {
    if mime_type.contains("mp4") {
        "mp4"
    } else if mime_type.contains("webm") {
        "webm"
    } else {
        "video"
    }
}
