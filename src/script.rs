use crate::route::Route;
use crate::template::AnimationTemplate;

/// Geographic position in floating-point degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A full camera pose as understood by the map renderer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    pub center: LngLat,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

/// One scripted camera transition: target pose, transition duration, and the
/// destination country (if resolved) that drives highlighting and pausing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CameraLeg {
    pub pose: CameraPose,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Highlight fill styling applied to the destination country of a leg.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HighlightStyle {
    pub color: String,
    pub opacity: f64,
}

/// A complete camera script: for a non-empty route, one establishing leg
/// (antipodal start, duration 0), one leg per stop in route order, and one
/// overview leg framing all stops, so `legs.len() == route.len() + 2`.
/// Immutable once generated; regenerated wholesale on any route or template
/// change.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationScript {
    pub template_id: String,
    pub legs: Vec<CameraLeg>,
    pub highlight: HighlightStyle,
    pub pause_after_leg_ms: u64,
}

impl AnimationScript {
    /// Wall-clock duration hint for the whole playback: leg transition
    /// durations plus one settle pause per country-carrying leg. Suitable as
    /// the orchestrator's `expected_duration_ms`.
    pub fn total_duration_ms(&self) -> u64 {
        self.legs
            .iter()
            .map(|leg| {
                leg.duration_ms
                    + if leg.country_code.is_some() {
                        self.pause_after_leg_ms
                    } else {
                        0
                    }
            })
            .sum()
    }
}

const LAT_LIMIT: f64 = 85.0;
const ESTABLISHING_ZOOM: f64 = 2.0;
const OVERVIEW_ZOOM_MIN: f64 = 1.0;
const OVERVIEW_ZOOM_MAX: f64 = 10.0;

/// Antipodal starting point for the establishing leg: longitude mirrored
/// across the date line and wrapped into [-180, 180), latitude negated and
/// clamped away from the polar projection singularities.
pub fn antipode(position: LngLat) -> LngLat {
    let mirrored = if position.lng > 0.0 {
        position.lng - 180.0
    } else {
        position.lng + 180.0
    };
    LngLat {
        lng: (mirrored + 180.0).rem_euclid(360.0) - 180.0,
        lat: (-position.lat).clamp(-LAT_LIMIT, LAT_LIMIT),
    }
}

/// Center and zoom framing the bounding box of `positions`: midpoint center,
/// zoom inversely related to the larger box dimension. A single point clamps
/// to the zoom ceiling; an empty slice yields the world view.
pub fn framing(positions: &[LngLat]) -> (LngLat, f64) {
    if positions.is_empty() {
        return (LngLat::new(0.0, 0.0), ESTABLISHING_ZOOM);
    }

    let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in positions {
        min_lng = min_lng.min(p.lng);
        max_lng = max_lng.max(p.lng);
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
    }

    let center = LngLat::new((min_lng + max_lng) / 2.0, (min_lat + max_lat) / 2.0);
    let max_span = (max_lng - min_lng).max(max_lat - min_lat);
    // log2(0) is -inf, so a single point resolves to the clamp ceiling.
    let zoom = (8.0 - max_span.log2()).clamp(OVERVIEW_ZOOM_MIN, OVERVIEW_ZOOM_MAX);
    (center, zoom)
}

/// Generate the camera script for `route` under `template`. Total over any
/// finite route; an empty route yields an empty script with the template's
/// highlight defaults preserved.
pub fn build_script(route: &Route, template: &AnimationTemplate) -> AnimationScript {
    let highlight = HighlightStyle {
        color: template.highlight_color.to_string(),
        opacity: template.highlight_opacity,
    };

    if route.is_empty() {
        return AnimationScript {
            template_id: template.id.to_string(),
            legs: Vec::new(),
            highlight,
            pause_after_leg_ms: template.pause_after_waypoint_ms,
        };
    }

    let waypoints = route.waypoints();
    let mut legs = Vec::with_capacity(waypoints.len() + 2);

    legs.push(CameraLeg {
        pose: CameraPose {
            center: antipode(waypoints[0].position),
            zoom: ESTABLISHING_ZOOM,
            bearing: 0.0,
            pitch: 0.0,
        },
        duration_ms: 0,
        country_code: None,
    });

    for waypoint in waypoints {
        legs.push(CameraLeg {
            pose: CameraPose {
                center: waypoint.position,
                zoom: template.waypoint_zoom,
                bearing: 0.0,
                pitch: template.waypoint_pitch,
            },
            duration_ms: template.waypoint_duration_ms,
            country_code: waypoint.country_code.clone(),
        });
    }

    let (center, zoom) = framing(&route.positions());
    legs.push(CameraLeg {
        pose: CameraPose {
            center,
            zoom,
            bearing: 0.0,
            pitch: 0.0,
        },
        duration_ms: template.final_duration_ms,
        country_code: None,
    });

    AnimationScript {
        template_id: template.id.to_string(),
        legs,
        highlight,
        pause_after_leg_ms: template.pause_after_waypoint_ms,
    }
}
