use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

pub const FONT_SCALE_MIN: i32 = 80;
pub const FONT_SCALE_MAX: i32 = 200;
pub const FONT_SCALE_DEFAULT: i32 = 100;
pub const FONT_SCALE_STEP: i32 = 20;

/// AccessibilitySettings
///
/// Per-user state of the accessibility toolbar: root font scale in percent plus the
/// high contrast, text reader and sign language (Libras) switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct AccessibilitySettings {
    pub font_scale: i32,
    pub high_contrast: bool,
    pub text_reader: bool,
    pub libras: bool,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            font_scale: FONT_SCALE_DEFAULT,
            high_contrast: false,
            text_reader: false,
            libras: false,
        }
    }
}

/// A single toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    IncreaseFont,
    DecreaseFont,
    ResetFont,
    ToggleContrast,
    ToggleReader,
    ToggleLibras,
}

impl FromStr for ToolbarAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase-font" => Ok(ToolbarAction::IncreaseFont),
            "decrease-font" => Ok(ToolbarAction::DecreaseFont),
            "reset-font" => Ok(ToolbarAction::ResetFont),
            "toggle-contrast" => Ok(ToolbarAction::ToggleContrast),
            "toggle-reader" => Ok(ToolbarAction::ToggleReader),
            "toggle-libras" => Ok(ToolbarAction::ToggleLibras),
            other => Err(format!("unknown accessibility action '{}'", other)),
        }
    }
}

impl AccessibilitySettings {
    /// Returns the state after `action`. Font changes saturate at the range bounds.
    pub fn apply(self, action: ToolbarAction) -> Self {
        match action {
            ToolbarAction::IncreaseFont => Self {
                font_scale: (self.font_scale + FONT_SCALE_STEP).min(FONT_SCALE_MAX),
                ..self
            },
            ToolbarAction::DecreaseFont => Self {
                font_scale: (self.font_scale - FONT_SCALE_STEP).max(FONT_SCALE_MIN),
                ..self
            },
            ToolbarAction::ResetFont => Self {
                font_scale: FONT_SCALE_DEFAULT,
                ..self
            },
            ToolbarAction::ToggleContrast => Self {
                high_contrast: !self.high_contrast,
                ..self
            },
            ToolbarAction::ToggleReader => Self {
                text_reader: !self.text_reader,
                ..self
            },
            ToolbarAction::ToggleLibras => Self {
                libras: !self.libras,
                ..self
            },
        }
    }

    /// Repairs values read from storage that fall outside the supported range.
    pub fn normalized(self) -> Self {
        Self {
            font_scale: self.font_scale.clamp(FONT_SCALE_MIN, FONT_SCALE_MAX),
            ..self
        }
    }
}
