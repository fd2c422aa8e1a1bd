#[derive(Clone, Copy, Debug)]
pub struct GestureTolerances {
    pub move_tolerance_px: u32,
    pub scroll_boundary_px: u32,
    pub wide_scroll_boundary_px: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct ClassificationRules {
    pub native_tags: &'static [&'static str],
    pub native_marker_class: &'static str,
    pub focus_tags: &'static [&'static str],
    pub focus_exempt_input_types: &'static [&'static str],
    pub focus_marker_class: &'static str,
    pub focus_native_passthrough_tags: &'static [&'static str],
}

#[derive(Clone, Copy, Debug)]
pub struct TapConfig {
    pub gesture: GestureTolerances,
    pub classify: ClassificationRules,
}

include!(concat!(env!("OUT_DIR"), "/tap_config.rs"));

pub fn active_config() -> &'static TapConfig {
    &TAP_CONFIG
}
