use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::{FlyoverError, FlyoverResult};
use crate::renderer::{HIGHLIGHT_LAYER, MapRenderer, clear_opacity_expr, highlight_opacity_expr};
use crate::script::AnimationScript;

/// Drive `renderer` through `script` sequentially.
///
/// The establishing leg is the starting camera state, not animated to. For
/// each subsequent leg: update the country highlight if the leg carries a
/// country code, issue the transition and await its one-shot completion, then
/// settle for the script's pause if the destination was highlighted. The
/// highlight is cleared unconditionally after the last leg.
///
/// Legs are strictly sequential: leg N+1's transition is never issued before
/// leg N's completion (and pause) has resolved. A fired `cancel` returns
/// immediately from the pending wait without touching the renderer again, so
/// a disposed instance is never mutated.
pub async fn play(
    renderer: &mut dyn MapRenderer,
    script: &AnimationScript,
    cancel: &CancelToken,
) -> FlyoverResult<()> {
    for leg in script.legs.iter().skip(1) {
        if cancel.is_cancelled() {
            return Ok(());
        }

        if let Some(code) = &leg.country_code {
            renderer.set_fill_opacity(
                HIGHLIGHT_LAYER,
                highlight_opacity_expr(code, script.highlight.opacity),
            )?;
        }

        let completed = renderer.fly_to(leg)?;
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            result = completed => {
                result.map_err(|_| {
                    FlyoverError::renderer("camera transition dropped without completing")
                })?;
            }
        }

        if leg.country_code.is_some() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(script.pause_after_leg_ms)) => {}
            }
        }
    }

    if !script.legs.is_empty() {
        renderer.set_fill_opacity(HIGHLIGHT_LAYER, clear_opacity_expr())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CaptureStream;
    use crate::script::{CameraLeg, CameraPose, HighlightStyle, LngLat};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Highlight(serde_json::Value),
        FlyTo(LngLat),
    }

    /// Renderer double that records calls and completes each transition
    /// immediately unless told to hold it open.
    struct ScriptedRenderer {
        calls: Arc<Mutex<Vec<Call>>>,
        // Keeps the held transition's sender alive so its receiver stays
        // pending instead of erroring.
        stalled: Option<oneshot::Sender<()>>,
        stall_next_fly: bool,
    }

    impl ScriptedRenderer {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                stalled: None,
                stall_next_fly: false,
            }
        }
    }

    #[async_trait]
    impl MapRenderer for ScriptedRenderer {
        fn pose(&self) -> CameraPose {
            CameraPose {
                center: LngLat::new(0.0, 0.0),
                zoom: 0.0,
                bearing: 0.0,
                pitch: 0.0,
            }
        }

        async fn wait_ready(&mut self) -> FlyoverResult<()> {
            Ok(())
        }

        fn fly_to(&mut self, leg: &CameraLeg) -> FlyoverResult<oneshot::Receiver<()>> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::FlyTo(leg.pose.center));
            let (tx, rx) = oneshot::channel();
            if self.stall_next_fly {
                self.stalled = Some(tx);
            } else {
                let _ = tx.send(());
            }
            Ok(rx)
        }

        fn add_geojson_source(&mut self, _: &str, _: serde_json::Value) -> FlyoverResult<()> {
            Ok(())
        }

        fn add_fill_layer(
            &mut self,
            _: &str,
            _: &str,
            _: &str,
            _: serde_json::Value,
        ) -> FlyoverResult<()> {
            Ok(())
        }

        fn set_fill_opacity(&mut self, _: &str, opacity: serde_json::Value) -> FlyoverResult<()> {
            self.calls.lock().unwrap().push(Call::Highlight(opacity));
            Ok(())
        }

        fn capture_stream(&mut self, _: u32) -> FlyoverResult<Box<dyn CaptureStream>> {
            struct Stream;
            impl CaptureStream for Stream {}
            Ok(Box::new(Stream))
        }

        fn dispose(&mut self) {
            drop(self.stalled.take());
        }
    }

    fn leg(lng: f64, lat: f64, country: Option<&str>) -> CameraLeg {
        CameraLeg {
            pose: CameraPose {
                center: LngLat::new(lng, lat),
                zoom: 5.0,
                bearing: 0.0,
                pitch: 30.0,
            },
            duration_ms: 10,
            country_code: country.map(str::to_string),
        }
    }

    fn script(legs: Vec<CameraLeg>) -> AnimationScript {
        AnimationScript {
            template_id: "coastal-glide".to_string(),
            legs,
            highlight: HighlightStyle {
                color: "#0ea5e9".to_string(),
                opacity: 0.42,
            },
            pause_after_leg_ms: 5,
        }
    }

    #[tokio::test]
    async fn plays_legs_in_order_and_clears_highlight() {
        let mut renderer = ScriptedRenderer::new();
        let calls = Arc::clone(&renderer.calls);
        let script = script(vec![
            leg(0.0, 0.0, None),
            leg(10.0, 20.0, None),
            leg(30.0, 40.0, Some("FR")),
        ]);

        play(&mut renderer, &script, &CancelToken::new())
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                Call::FlyTo(LngLat::new(10.0, 20.0)),
                Call::Highlight(highlight_opacity_expr("FR", 0.42)),
                Call::FlyTo(LngLat::new(30.0, 40.0)),
                Call::Highlight(clear_opacity_expr()),
            ]
        );
    }

    #[tokio::test]
    async fn establishing_leg_is_not_animated() {
        let mut renderer = ScriptedRenderer::new();
        let calls = Arc::clone(&renderer.calls);
        let script = script(vec![leg(-170.0, -20.0, None)]);

        play(&mut renderer, &script, &CancelToken::new())
            .await
            .unwrap();

        // Only the final highlight clear; no transition was issued.
        assert_eq!(*calls.lock().unwrap(), vec![Call::Highlight(clear_opacity_expr())]);
    }

    #[tokio::test]
    async fn empty_script_issues_no_renderer_calls() {
        let mut renderer = ScriptedRenderer::new();
        let calls = Arc::clone(&renderer.calls);
        play(&mut renderer, &script(Vec::new()), &CancelToken::new())
            .await
            .unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn settle_pause_fires_only_after_country_legs() {
        let mut renderer = ScriptedRenderer::new();
        let script = script(vec![
            leg(0.0, 0.0, None),
            leg(10.0, 20.0, None),
            leg(30.0, 40.0, Some("FR")),
            leg(50.0, 60.0, None),
        ]);

        let start = tokio::time::Instant::now();
        play(&mut renderer, &script, &CancelToken::new())
            .await
            .unwrap();

        // Transitions complete without sleeping, so paused time only advances
        // through the settle sleep: exactly one pause, for the country leg.
        assert_eq!(start.elapsed(), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn cancellation_during_transition_stops_further_mutation() {
        let mut renderer = ScriptedRenderer::new();
        renderer.stall_next_fly = true;
        let calls = Arc::clone(&renderer.calls);
        let script = script(vec![leg(0.0, 0.0, None), leg(10.0, 20.0, None), leg(30.0, 40.0, Some("FR"))]);

        let cancel = CancelToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        // The first fly_to is held open, so the fired token wins the select;
        // the remaining legs and the final highlight clear must never run.
        play(&mut renderer, &script, &cancel).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![Call::FlyTo(LngLat::new(10.0, 20.0))],
            "no mutations after cancellation"
        );
    }

    #[tokio::test]
    async fn pre_fired_token_plays_nothing() {
        let mut renderer = ScriptedRenderer::new();
        let calls = Arc::clone(&renderer.calls);
        let script = script(vec![leg(0.0, 0.0, None), leg(10.0, 20.0, None)]);

        let cancel = CancelToken::new();
        cancel.cancel();
        play(&mut renderer, &script, &cancel).await.unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropped_completion_channel_is_a_renderer_error() {
        struct DroppingRenderer(ScriptedRenderer);

        #[async_trait]
        impl MapRenderer for DroppingRenderer {
            fn pose(&self) -> CameraPose {
                self.0.pose()
            }
            async fn wait_ready(&mut self) -> FlyoverResult<()> {
                Ok(())
            }
            fn fly_to(&mut self, _: &CameraLeg) -> FlyoverResult<oneshot::Receiver<()>> {
                let (tx, rx) = oneshot::channel();
                drop(tx);
                Ok(rx)
            }
            fn add_geojson_source(&mut self, _: &str, _: serde_json::Value) -> FlyoverResult<()> {
                Ok(())
            }
            fn add_fill_layer(
                &mut self,
                _: &str,
                _: &str,
                _: &str,
                _: serde_json::Value,
            ) -> FlyoverResult<()> {
                Ok(())
            }
            fn set_fill_opacity(&mut self, _: &str, _: serde_json::Value) -> FlyoverResult<()> {
                Ok(())
            }
            fn capture_stream(&mut self, fps: u32) -> FlyoverResult<Box<dyn CaptureStream>> {
                self.0.capture_stream(fps)
            }
            fn dispose(&mut self) {}
        }

        let mut renderer = DroppingRenderer(ScriptedRenderer::new());
        let script = script(vec![leg(0.0, 0.0, None), leg(10.0, 20.0, None)]);
        let err = play(&mut renderer, &script, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("renderer error"));
    }
}
