//! User-facing notices as a typed table.
//!
//! Each message is an enum variant carrying its parameters; each language
//! maps variants to text directly. No string keys, no runtime template
//! substitution.

use serde::{Deserialize, Serialize};

use crate::capture::CaptureMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::ZhCn => "zh-CN",
            Language::EnUs => "en-US",
        }
    }
}

/// Display name of a capture strategy.
pub fn mode_name(mode: CaptureMode, lang: Language) -> &'static str {
    match (lang, mode) {
        (Language::ZhCn, CaptureMode::Screen) => "屏幕截取模式",
        (Language::ZhCn, CaptureMode::Vector) => "矢量渲染模式",
        (Language::ZhCn, CaptureMode::Raster) => "位图渲染模式",
        (Language::EnUs, CaptureMode::Screen) => "screen capture",
        (Language::EnUs, CaptureMode::Vector) => "vector renderer",
        (Language::EnUs, CaptureMode::Raster) => "raster renderer",
    }
}

/// Every transient message the tool can show.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Persistent instructions shown when a selection session starts.
    SelectionHint,
    SelectionCancelled,
    Capturing { mode: CaptureMode },
    Saved { filename: String },
    CaptureFailed { reason: String },
    SaveFailed { reason: String },
    /// Shown when the pipeline switches to another strategy.
    FallingBack { to: CaptureMode },
    ElementTooLarge,
}

impl Notice {
    pub fn localize(&self, lang: Language) -> String {
        match lang {
            Language::ZhCn => self.zh_cn(),
            Language::EnUs => self.en_us(),
        }
    }

    fn zh_cn(&self) -> String {
        match self {
            Notice::SelectionHint => {
                "悬停选择元素，滚轮切换层级，点击截图，ESC 取消".to_string()
            }
            Notice::SelectionCancelled => "已取消元素选择".to_string(),
            Notice::Capturing { mode } => {
                format!("正在截图元素（{}）", mode_name(*mode, Language::ZhCn))
            }
            Notice::Saved { filename } => format!("截图已保存：{filename}"),
            Notice::CaptureFailed { reason } => format!("截图失败：{reason}"),
            Notice::SaveFailed { reason } => format!("保存失败：{reason}"),
            Notice::FallingBack { to } => {
                format!("当前模式失败，自动切换到{}", mode_name(*to, Language::ZhCn))
            }
            Notice::ElementTooLarge => "元素超出视口，截图可能不完整".to_string(),
        }
    }

    fn en_us(&self) -> String {
        match self {
            Notice::SelectionHint => {
                "Hover to pick an element, scroll to change level, click to capture, Esc to cancel"
                    .to_string()
            }
            Notice::SelectionCancelled => "Element selection cancelled".to_string(),
            Notice::Capturing { mode } => {
                format!("Capturing element ({})", mode_name(*mode, Language::EnUs))
            }
            Notice::Saved { filename } => format!("Saved: {filename}"),
            Notice::CaptureFailed { reason } => format!("Capture failed: {reason}"),
            Notice::SaveFailed { reason } => format!("Save failed: {reason}"),
            Notice::FallingBack { to } => {
                format!("Falling back to the {}", mode_name(*to, Language::EnUs))
            }
            Notice::ElementTooLarge => {
                "Element exceeds the viewport, capture may be clipped".to_string()
            }
        }
    }
}
