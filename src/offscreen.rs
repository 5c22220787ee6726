use crate::countries::CountryCollection;
use crate::error::{FlyoverError, FlyoverResult};
use crate::renderer::{
    COUNTRIES_SOURCE, HIGHLIGHT_LAYER, MapRenderer, RendererFactory, RendererHandle, RendererInit,
    StagingSurface, clear_opacity_expr,
};
use crate::script::HighlightStyle;

/// Exclusive owner of the hidden export renderer and the staging surface it
/// is mounted in.
///
/// Construction awaits the renderer's ready signal and installs the country
/// boundary source plus a fully transparent highlight fill layer. If any of
/// that fails, the partially constructed instance is torn down before the
/// error propagates.
pub struct OffscreenRenderer {
    renderer: Option<Box<dyn MapRenderer>>,
    stage: Option<Box<dyn StagingSurface>>,
}

impl OffscreenRenderer {
    pub async fn create(
        factory: &dyn RendererFactory,
        init: RendererInit,
        countries: &CountryCollection,
        highlight: &HighlightStyle,
    ) -> FlyoverResult<Self> {
        let RendererHandle { renderer, stage } = factory.create(init)?;
        let mut offscreen = Self {
            renderer: Some(renderer),
            stage: Some(stage),
        };

        if let Err(err) = offscreen.finish_init(countries, highlight).await {
            offscreen.teardown();
            return Err(err);
        }
        Ok(offscreen)
    }

    async fn finish_init(
        &mut self,
        countries: &CountryCollection,
        highlight: &HighlightStyle,
    ) -> FlyoverResult<()> {
        let renderer = self.renderer_mut()?;
        renderer
            .wait_ready()
            .await
            .map_err(|e| FlyoverError::renderer_init(e.to_string()))?;

        let data = serde_json::to_value(countries)
            .map_err(|e| FlyoverError::renderer_init(format!("country geojson: {e}")))?;
        renderer.add_geojson_source(COUNTRIES_SOURCE, data)?;
        renderer.add_fill_layer(
            HIGHLIGHT_LAYER,
            COUNTRIES_SOURCE,
            &highlight.color,
            clear_opacity_expr(),
        )?;
        Ok(())
    }

    pub fn renderer_mut(&mut self) -> FlyoverResult<&mut dyn MapRenderer> {
        match self.renderer.as_deref_mut() {
            Some(renderer) => Ok(renderer),
            None => Err(FlyoverError::renderer("offscreen renderer already torn down")),
        }
    }

    /// Release the renderer and remove the staging surface. Idempotent; also
    /// invoked from `Drop` so no path can leak the hidden instance.
    pub fn teardown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        if let Some(mut stage) = self.stage.take() {
            stage.release();
        }
    }
}

impl Drop for OffscreenRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}
