//! Formatting configuration.
//!
//! One immutable [`FormatConfig`] value is passed by reference into the
//! pipeline; the core never branches on specific values, it only applies
//! them. Defaults follow the GOST layout rules.

use serde::{Deserialize, Serialize};

/// Page margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Left margin
    pub left_cm: f32,

    /// Right margin
    pub right_cm: f32,

    /// Top margin
    pub top_cm: f32,

    /// Bottom margin
    pub bottom_cm: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left_cm: 3.0,
            right_cm: 1.5,
            top_cm: 2.0,
            bottom_cm: 2.0,
        }
    }
}

/// Formatting parameters applied by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Base font name applied to every run
    pub font_name: String,

    /// Base font size in points
    pub font_size_pt: f32,

    /// Font size for section and level-1 headings in points
    pub heading_size_pt: f32,

    /// Line spacing multiplier (1.5 = one-and-a-half)
    pub line_spacing: f32,

    /// First-line indent for body paragraphs in centimeters
    pub first_line_indent_cm: f32,

    /// Page margins
    pub margins: Margins,
}

impl FormatConfig {
    /// Create a configuration with the GOST defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base font name.
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Set the base font size in points.
    pub fn with_font_size(mut self, size_pt: f32) -> Self {
        self.font_size_pt = size_pt;
        self
    }

    /// Set the heading font size in points.
    pub fn with_heading_size(mut self, size_pt: f32) -> Self {
        self.heading_size_pt = size_pt;
        self
    }

    /// Set the line spacing multiplier.
    pub fn with_line_spacing(mut self, multiplier: f32) -> Self {
        self.line_spacing = multiplier;
        self
    }

    /// Set the first-line indent in centimeters.
    pub fn with_first_line_indent(mut self, cm: f32) -> Self {
        self.first_line_indent_cm = cm;
        self
    }

    /// Set the page margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Load a configuration from a JSON string.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            font_name: "Times New Roman".to_string(),
            font_size_pt: 14.0,
            heading_size_pt: 16.0,
            line_spacing: 1.5,
            first_line_indent_cm: 1.25,
            margins: Margins::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FormatConfig::default();
        assert_eq!(config.font_name, "Times New Roman");
        assert_eq!(config.font_size_pt, 14.0);
        assert_eq!(config.line_spacing, 1.5);
        assert_eq!(config.margins.left_cm, 3.0);
        assert_eq!(config.margins.right_cm, 1.5);
    }

    #[test]
    fn test_config_builder() {
        let config = FormatConfig::new()
            .with_font_name("Liberation Serif")
            .with_font_size(12.0)
            .with_line_spacing(1.0);

        assert_eq!(config.font_name, "Liberation Serif");
        assert_eq!(config.font_size_pt, 12.0);
        assert_eq!(config.line_spacing, 1.0);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "font_name": "Times New Roman",
            "font_size_pt": 14.0,
            "heading_size_pt": 16.0,
            "line_spacing": 1.5,
            "first_line_indent_cm": 1.25,
            "margins": { "left_cm": 3.0, "right_cm": 1.5, "top_cm": 2.0, "bottom_cm": 2.0 }
        }"#;
        let config = FormatConfig::from_json(json).unwrap();
        assert_eq!(config, FormatConfig::default());
    }
}
