//! Cross-frame embed bridge.
//!
//! The widget runs in a frame inside an arbitrary host page and reports
//! its open/closed state to the loader with two opaque tokens. The loader
//! resizes a fixed container and accepts tokens only from the widget origin.

pub mod boot;
pub mod loader;
pub mod script;
pub mod widget;

pub use boot::BootGuard;
pub use loader::{EmbedLoader, HostPage, SignalOutcome};
pub use script::{embed_snippet, render_loader_script};
pub use widget::{FrameChannel, WidgetBridge};
