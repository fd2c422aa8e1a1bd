// @generated by tap_config_compiler; do not edit.

pub static TAP_CONFIG: TapConfig = TapConfig {
    gesture: GestureTolerances {
        move_tolerance_px: 37,
        scroll_boundary_px: 5,
        wide_scroll_boundary_px: 20,
    },
    classify: ClassificationRules {
        native_tags: &["label", "video"],
        native_marker_class: "needsclick",
        focus_tags: &["textarea", "select"],
        focus_exempt_input_types: &["button", "checkbox", "file", "image", "radio", "submit"],
        focus_marker_class: "needsfocus",
        focus_native_passthrough_tags: &["select"],
    },
};
