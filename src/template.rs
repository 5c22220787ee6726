/// A named motion preset: per-waypoint camera parameters, pause timing,
/// overview-leg duration, and highlight styling, plus the display metadata
/// the selection UI renders. Exactly one template is active at a time.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AnimationTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub duration_label: &'static str,
    pub viewpoint_label: &'static str,
    pub waypoint_zoom: f64,
    pub waypoint_pitch: f64,
    pub waypoint_duration_ms: u64,
    pub pause_after_waypoint_ms: u64,
    pub final_duration_ms: u64,
    pub highlight_color: &'static str,
    pub highlight_opacity: f64,
}

pub const ANIMATION_TEMPLATES: &[AnimationTemplate] = &[
    AnimationTemplate {
        id: "coastal-glide",
        name: "Coastal Glide",
        subtitle: "Balanced",
        description: "Smooth flyovers with a cinematic pause on each selected country.",
        duration_label: "Medium",
        viewpoint_label: "Cinematic",
        waypoint_zoom: 5.25,
        waypoint_pitch: 34.0,
        waypoint_duration_ms: 2200,
        pause_after_waypoint_ms: 1400,
        final_duration_ms: 3000,
        highlight_color: "#0ea5e9",
        highlight_opacity: 0.42,
    },
    AnimationTemplate {
        id: "atlas-sprint",
        name: "Atlas Sprint",
        subtitle: "Fast",
        description: "Quick transitions optimized for short clips and social sharing.",
        duration_label: "Short",
        viewpoint_label: "Dynamic",
        waypoint_zoom: 4.8,
        waypoint_pitch: 24.0,
        waypoint_duration_ms: 1500,
        pause_after_waypoint_ms: 900,
        final_duration_ms: 2200,
        highlight_color: "#2563eb",
        highlight_opacity: 0.36,
    },
    AnimationTemplate {
        id: "horizon-showcase",
        name: "Horizon Showcase",
        subtitle: "Detailed",
        description: "Longer pauses and deeper camera angle for richer destination storytelling.",
        duration_label: "Long",
        viewpoint_label: "Showcase",
        waypoint_zoom: 5.6,
        waypoint_pitch: 42.0,
        waypoint_duration_ms: 2900,
        pause_after_waypoint_ms: 1800,
        final_duration_ms: 3400,
        highlight_color: "#0891b2",
        highlight_opacity: 0.44,
    },
];

pub const DEFAULT_TEMPLATE_ID: &str = "coastal-glide";

/// Look up a template by id, falling back to the first preset for unknown
/// ids so a stale persisted selection never breaks script generation.
pub fn template_by_id(id: &str) -> &'static AnimationTemplate {
    ANIMATION_TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .unwrap_or(&ANIMATION_TEMPLATES[0])
}
