//! Theme parameters carried by `theme_changed`.

use serde::{Deserialize, Serialize};

/// Client theme colors in `#RRGGBB` format.
///
/// Every field is optional: older clients send a subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeParams {
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    /// Secondary background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_bg_color: Option<String>,
    /// Main text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Hint text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_color: Option<String>,
    /// Link color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_color: Option<String>,
    /// Button color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    /// Button text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text_color: Option<String>,
    /// Header background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_bg_color: Option<String>,
    /// Accent text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_text_color: Option<String>,
    /// Section background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_bg_color: Option<String>,
    /// Section header text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_header_text_color: Option<String>,
    /// Subtitle text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_text_color: Option<String>,
    /// Destructive action text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_text_color: Option<String>,
}

impl ThemeParams {
    /// Returns `true` if no color is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
