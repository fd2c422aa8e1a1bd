use std::{collections::BTreeSet, fmt::Write as _, fs, path::Path};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigCompilerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid tap config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TapConfigFile {
    pub gesture: GestureSection,
    pub classify: ClassifySection,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GestureSection {
    pub move_tolerance_px: u32,
    pub scroll_boundary_px: u32,
    pub wide_scroll_boundary_px: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClassifySection {
    pub native: NativeSection,
    pub focus: FocusSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NativeSection {
    pub tags: Vec<String>,
    pub marker_class: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FocusSection {
    pub tags: Vec<String>,
    pub exempt_input_types: Vec<String>,
    pub marker_class: String,
    #[serde(default)]
    pub native_passthrough_tags: Vec<String>,
}

pub fn parse_config_str(text: &str, origin: &str) -> Result<TapConfigFile, ConfigCompilerError> {
    toml::from_str(text).map_err(|source| ConfigCompilerError::Parse {
        origin: origin.to_string(),
        source,
    })
}

pub fn parse_config_file(path: &Path) -> Result<TapConfigFile, ConfigCompilerError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigCompilerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config_str(&text, &path.display().to_string())
}

pub fn validate_config(config: &TapConfigFile) -> Result<(), ConfigCompilerError> {
    let gesture = &config.gesture;
    if gesture.move_tolerance_px == 0 {
        return invalid("gesture.move_tolerance_px must be > 0");
    }
    if gesture.scroll_boundary_px == 0 {
        return invalid("gesture.scroll_boundary_px must be > 0");
    }
    if gesture.wide_scroll_boundary_px < gesture.scroll_boundary_px {
        return invalid("gesture.wide_scroll_boundary_px must be >= gesture.scroll_boundary_px");
    }

    let native = &config.classify.native;
    let focus = &config.classify.focus;
    let native_tags = validate_names("classify.native.tags", &native.tags)?;
    let focus_tags = validate_names("classify.focus.tags", &focus.tags)?;
    validate_names("classify.focus.exempt_input_types", &focus.exempt_input_types)?;
    let passthrough = validate_names(
        "classify.focus.native_passthrough_tags",
        &focus.native_passthrough_tags,
    )?;
    validate_marker_class("classify.native.marker_class", &native.marker_class)?;
    validate_marker_class("classify.focus.marker_class", &focus.marker_class)?;

    if let Some(tag) = focus_tags.intersection(&native_tags).next() {
        return invalid(&format!(
            "classify.focus.tags entry `{tag}` is also listed in classify.native.tags"
        ));
    }
    if let Some(tag) = passthrough.difference(&focus_tags).next() {
        return invalid(&format!(
            "classify.focus.native_passthrough_tags entry `{tag}` is not listed in classify.focus.tags"
        ));
    }

    Ok(())
}

pub fn render_generated_config(config: &TapConfigFile) -> String {
    let gesture = &config.gesture;
    let native = &config.classify.native;
    let focus = &config.classify.focus;

    let mut out = String::new();
    out.push_str("// @generated by tap_config_compiler; do not edit.\n\n");
    out.push_str("pub static TAP_CONFIG: TapConfig = TapConfig {\n");
    out.push_str("    gesture: GestureTolerances {\n");
    let _ = writeln!(out, "        move_tolerance_px: {},", gesture.move_tolerance_px);
    let _ = writeln!(out, "        scroll_boundary_px: {},", gesture.scroll_boundary_px);
    let _ = writeln!(
        out,
        "        wide_scroll_boundary_px: {},",
        gesture.wide_scroll_boundary_px
    );
    out.push_str("    },\n");
    out.push_str("    classify: ClassificationRules {\n");
    let _ = writeln!(out, "        native_tags: {},", render_str_slice(&native.tags));
    let _ = writeln!(out, "        native_marker_class: {:?},", native.marker_class);
    let _ = writeln!(out, "        focus_tags: {},", render_str_slice(&focus.tags));
    let _ = writeln!(
        out,
        "        focus_exempt_input_types: {},",
        render_str_slice(&focus.exempt_input_types)
    );
    let _ = writeln!(out, "        focus_marker_class: {:?},", focus.marker_class);
    let _ = writeln!(
        out,
        "        focus_native_passthrough_tags: {},",
        render_str_slice(&focus.native_passthrough_tags)
    );
    out.push_str("    },\n");
    out.push_str("};\n");
    out
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_config_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}

fn invalid<T>(message: &str) -> Result<T, ConfigCompilerError> {
    Err(ConfigCompilerError::Invalid(message.to_string()))
}

fn validate_names<'a>(
    field: &str,
    names: &'a [String],
) -> Result<BTreeSet<&'a str>, ConfigCompilerError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !is_lower_identifier(name) {
            return invalid(&format!(
                "{field} entry `{name}` must be a lower-case name"
            ));
        }
        if !seen.insert(name.as_str()) {
            return invalid(&format!("{field} lists `{name}` twice"));
        }
    }
    Ok(seen)
}

fn validate_marker_class(field: &str, class: &str) -> Result<(), ConfigCompilerError> {
    if class.is_empty() || class.chars().any(char::is_whitespace) {
        return invalid(&format!(
            "{field} must be a non-empty class name without whitespace"
        ));
    }
    Ok(())
}

fn is_lower_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn render_str_slice(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
    format!("&[{}]", quoted.join(", "))
}
