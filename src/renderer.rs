use async_trait::async_trait;
use serde_json::json;
use tokio::sync::oneshot;

use crate::error::FlyoverResult;
use crate::script::{CameraLeg, CameraPose};

/// GeoJSON source id for country boundaries on the offscreen map.
pub const COUNTRIES_SOURCE: &str = "countries";
/// Fill layer id used for the destination-country highlight.
pub const HIGHLIGHT_LAYER: &str = "country-highlight";

/// Construction parameters for a renderer instance. Export instances are
/// square, hidden, and non-interactive, with a capturable drawing buffer.
#[derive(Clone, Debug)]
pub struct RendererInit {
    pub width: u32,
    pub height: u32,
    pub pose: CameraPose,
    pub interactive: bool,
    pub preserve_drawing_buffer: bool,
}

impl RendererInit {
    /// Offscreen export surface: `size`x`size`, input disabled, buffer
    /// preserved for capture, camera seeded from the visible map's pose.
    pub fn offscreen(size: u32, pose: CameraPose) -> Self {
        Self {
            width: size,
            height: size,
            pose,
            interactive: false,
            preserve_drawing_buffer: true,
        }
    }
}

/// Opaque handle to a renderer's continuous frame stream, consumed by an
/// [`crate::capture::EncoderFactory`].
pub trait CaptureStream: Send {}

/// The staging container a renderer instance is mounted into. Must be
/// releasable even when renderer construction only partially succeeded.
pub trait StagingSurface: Send {
    fn release(&mut self);
}

/// Contract consumed from the map renderer collaborator.
///
/// `fly_to` issues a camera transition and returns the one-shot completion
/// signal for that transition: the receiver resolves when the renderer fires
/// its move-end event, and dropping it detaches the listener. Duration is a
/// hint to the renderer; completion is authoritative.
#[async_trait]
pub trait MapRenderer: Send {
    /// Snapshot of the current camera pose.
    fn pose(&self) -> CameraPose;

    /// Resolves once the renderer's style and resources are fully loaded.
    /// No camera or layer operation may be issued before this.
    async fn wait_ready(&mut self) -> FlyoverResult<()>;

    /// Issue a camera transition toward `leg.pose` over `leg.duration_ms`.
    fn fly_to(&mut self, leg: &CameraLeg) -> FlyoverResult<oneshot::Receiver<()>>;

    fn add_geojson_source(&mut self, id: &str, data: serde_json::Value) -> FlyoverResult<()>;

    fn add_fill_layer(
        &mut self,
        id: &str,
        source: &str,
        color: &str,
        opacity: serde_json::Value,
    ) -> FlyoverResult<()>;

    fn set_fill_opacity(&mut self, layer: &str, opacity: serde_json::Value) -> FlyoverResult<()>;

    /// Wrap the drawing surface in a continuous frame stream at `fps`.
    fn capture_stream(&mut self, fps: u32) -> FlyoverResult<Box<dyn CaptureStream>>;

    /// Release the renderer's GPU and DOM resources.
    fn dispose(&mut self);
}

/// Factory for renderer instances plus the staging container they live in.
pub trait RendererFactory: Send + Sync {
    fn create(&self, init: RendererInit) -> FlyoverResult<RendererHandle>;
}

/// A freshly constructed renderer and its staging surface. Ownership of both
/// passes to the offscreen controller.
pub struct RendererHandle {
    pub renderer: Box<dyn MapRenderer>,
    pub stage: Box<dyn StagingSurface>,
}

/// Fill-opacity expression showing `opacity` for the feature whose ISO A2
/// code matches `country_code` and 0 elsewhere.
pub fn highlight_opacity_expr(country_code: &str, opacity: f64) -> serde_json::Value {
    json!([
        "case",
        ["==", ["get", "ISO_A2"], country_code],
        opacity,
        0
    ])
}

/// Expression clearing the highlight everywhere.
pub fn clear_opacity_expr() -> serde_json::Value {
    json!(0)
}
