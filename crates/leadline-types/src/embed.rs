//! Cross-frame widget signals and the host-page container geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EmbedConfig;

/// Token posted by the widget when it expands.
pub const OPENED_TOKEN: &str = "widget-opened";
/// Token posted by the widget when it collapses.
pub const CLOSED_TOKEN: &str = "widget-closed";
/// Target origin for widget posts. The widget cannot know its embedder.
pub const BROADCAST_TARGET: &str = "*";

pub const CONTAINER_OFFSET_PX: u32 = 20;
pub const CONTAINER_Z_INDEX: u32 = 2_147_483_647;

/// Open/closed state signalled across the frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSignal {
    Opened,
    Closed,
}

impl WidgetSignal {
    pub fn token(self) -> &'static str {
        match self {
            WidgetSignal::Opened => OPENED_TOKEN,
            WidgetSignal::Closed => CLOSED_TOKEN,
        }
    }

    /// Parse a posted token. Anything else is not a widget signal.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            OPENED_TOKEN => Some(WidgetSignal::Opened),
            CLOSED_TOKEN => Some(WidgetSignal::Closed),
            _ => None,
        }
    }

    pub fn from_open(open: bool) -> Self {
        if open {
            WidgetSignal::Opened
        } else {
            WidgetSignal::Closed
        }
    }
}

impl fmt::Display for WidgetSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for WidgetSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown widget signal: '{s}'"))
    }
}

/// Geometry of the fixed-position container the loader manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStyle {
    pub width_px: u32,
    pub height_px: u32,
    /// Whether the container receives pointer events.
    pub pointer_events: bool,
}

impl ContainerStyle {
    pub fn expanded(config: &EmbedConfig) -> Self {
        Self {
            width_px: config.expanded_width,
            height_px: config.expanded_height,
            pointer_events: true,
        }
    }

    pub fn collapsed(config: &EmbedConfig) -> Self {
        Self {
            width_px: config.collapsed_size,
            height_px: config.collapsed_size,
            pointer_events: false,
        }
    }

    /// The style for a signal. A pure function of the signal alone.
    pub fn for_signal(signal: WidgetSignal, config: &EmbedConfig) -> Self {
        match signal {
            WidgetSignal::Opened => Self::expanded(config),
            WidgetSignal::Closed => Self::collapsed(config),
        }
    }
}
