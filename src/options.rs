use serde::Deserialize;

use crate::binding::BindError;

/// Construction options as hosts pass them in (`{"startCSSClass": ...}`).
/// Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    #[serde(rename = "startCSSClass")]
    pub start_css_class: Option<String>,
    #[serde(rename = "endCSSClass")]
    pub end_css_class: Option<String>,
    #[serde(rename = "cssDelay")]
    pub css_delay: u64,
}

/// Validated marker configuration for the feedback controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackOptions {
    pub start_marker_class: String,
    pub end_marker_class: Option<String>,
    pub delay_ms: u64,
}

impl Options {
    /// Feedback is off unless a start marker is configured. An end marker
    /// without a start marker has nothing to promote and is dropped.
    pub fn feedback(&self) -> Result<Option<FeedbackOptions>, BindError> {
        let Some(start) = self.start_css_class.as_deref() else {
            return Ok(None);
        };
        let start_marker_class = validated_marker(start)?;
        let end_marker_class = self
            .end_css_class
            .as_deref()
            .map(validated_marker)
            .transpose()?;

        Ok(Some(FeedbackOptions {
            start_marker_class,
            end_marker_class,
            delay_ms: self.css_delay,
        }))
    }
}

fn validated_marker(class: &str) -> Result<String, BindError> {
    if class.is_empty() || class.chars().any(char::is_whitespace) {
        return Err(BindError::InvalidMarkerClass(class.to_string()));
    }
    Ok(class.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Options {
        serde_json::from_str(json).expect("options json")
    }

    #[test]
    fn host_field_names_are_recognised() {
        let options = parse(r#"{"startCSSClass":"pressed","endCSSClass":"released","cssDelay":80}"#);

        assert_eq!(
            options.feedback().expect("valid markers"),
            Some(FeedbackOptions {
                start_marker_class: "pressed".to_string(),
                end_marker_class: Some("released".to_string()),
                delay_ms: 80,
            })
        );
    }

    #[test]
    fn empty_and_unknown_options_disable_feedback() {
        assert_eq!(parse("{}").feedback().expect("no markers"), None);
        assert_eq!(
            parse(r#"{"endCSSClass":"released","hoverClass":"x"}"#)
                .feedback()
                .expect("no start marker"),
            None
        );
    }

    #[test]
    fn delay_defaults_to_immediate() {
        let feedback = parse(r#"{"startCSSClass":"pressed"}"#)
            .feedback()
            .expect("valid marker")
            .expect("feedback enabled");

        assert_eq!(feedback.delay_ms, 0);
        assert_eq!(feedback.end_marker_class, None);
    }

    #[test]
    fn marker_classes_must_be_single_tokens() {
        let err = parse(r#"{"startCSSClass":"is pressed"}"#)
            .feedback()
            .expect_err("whitespace is rejected");
        assert_eq!(err, BindError::InvalidMarkerClass("is pressed".to_string()));

        let err = parse(r#"{"startCSSClass":"pressed","endCSSClass":""}"#)
            .feedback()
            .expect_err("empty end marker is rejected");
        assert_eq!(err, BindError::InvalidMarkerClass(String::new()));
    }
}
