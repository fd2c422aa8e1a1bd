use crate::config::GestureTolerances;

/// Raw facts the host reports about the running platform.
#[derive(Clone, Copy, Debug)]
pub struct PlatformProbe<'a> {
    pub user_agent: &'a str,
    pub touch_start_supported: bool,
    pub device_pixel_ratio: f64,
    pub stop_immediate_propagation: bool,
}

/// Capability flags computed once at startup and handed to the resolver and
/// the gesture engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capabilities {
    pub touch: bool,
    pub android: bool,
    pub scaled_hit_testing: bool,
    pub wide_scroll_boundary: bool,
    pub device_pixel_ratio: f64,
    pub stop_immediate_propagation: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            touch: true,
            android: false,
            scaled_hit_testing: false,
            wide_scroll_boundary: false,
            device_pixel_ratio: 1.0,
            stop_immediate_propagation: true,
        }
    }
}

impl Capabilities {
    pub fn detect(probe: &PlatformProbe<'_>) -> Self {
        let ua = probe.user_agent;
        let android = ua.contains("Android");
        let device_pixel_ratio = if probe.device_pixel_ratio.is_finite()
            && probe.device_pixel_ratio > 0.0
        {
            probe.device_pixel_ratio
        } else {
            1.0
        };
        let caps = Self {
            touch: probe.touch_start_supported,
            android,
            // The Android 2.x stock browser hit-tests in device pixels.
            scaled_hit_testing: android && ua.contains("Android 2."),
            wide_scroll_boundary: ua.contains("PlayBook"),
            device_pixel_ratio,
            stop_immediate_propagation: probe.stop_immediate_propagation,
        };
        log::debug!("platform capabilities: {caps:?}");
        caps
    }

    pub fn scroll_boundary_px(&self, tolerances: &GestureTolerances) -> f64 {
        if self.wide_scroll_boundary {
            f64::from(tolerances.wide_scroll_boundary_px)
        } else {
            f64::from(tolerances.scroll_boundary_px)
        }
    }
}
