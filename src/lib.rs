//! Flyover turns an ordered list of geographic waypoints into a camera
//! fly-through video, rendered and encoded entirely on the client.
//!
//! The pipeline: build an [`AnimationScript`] from a [`Route`] and an
//! [`AnimationTemplate`], then hand it to a [`VideoExporter`], which
//! negotiates a codec, drives a hidden export-resolution map renderer through
//! the script while capturing its surface into a streaming encoder, and
//! returns the encoded payload as an [`ExportVideo`]. The map renderer and
//! the platform encoder are external collaborators, consumed through the
//! traits in [`renderer`], [`capture`], and [`codec`].
#![forbid(unsafe_code)]

pub mod cancel;
pub mod capture;
pub mod codec;
pub mod countries;
pub mod error;
pub mod export;
pub mod offscreen;
pub mod player;
pub mod renderer;
pub mod route;
pub mod script;
pub mod template;

pub use cancel::CancelToken;
pub use capture::{EncoderConfig, EncoderEvent, EncoderFactory, EncoderSession, Recorder};
pub use codec::{CODEC_CANDIDATES, CodecSupport, NegotiatedCodec, negotiate};
pub use countries::{CountryCollection, CountrySource, CountryStore};
pub use error::{FlyoverError, FlyoverResult};
pub use export::{ExportOptions, ExportProgress, ExportStage, ExportVideo, VideoExporter};
pub use offscreen::OffscreenRenderer;
pub use player::play;
pub use renderer::{
    CaptureStream, MapRenderer, RendererFactory, RendererHandle, RendererInit, StagingSurface,
};
pub use route::{Route, Waypoint};
pub use script::{AnimationScript, CameraLeg, CameraPose, HighlightStyle, LngLat, build_script};
pub use template::{ANIMATION_TEMPLATES, AnimationTemplate, template_by_id};
