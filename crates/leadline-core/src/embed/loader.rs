//! Host-page side of the bridge: origin check and container sizing.

use leadline_types::config::EmbedConfig;
use leadline_types::embed::{ContainerStyle, WidgetSignal};
use leadline_types::error::EmbedError;
use tracing::{debug, info};
use url::Url;

use super::boot::BootGuard;

/// What the loader did with an incoming frame message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Applied(WidgetSignal),
    /// Sender origin differs from the widget origin.
    RejectedOrigin,
    /// Right origin, but not a widget token.
    Ignored,
}

/// Loader state for one installed widget.
#[derive(Debug, Clone)]
pub struct EmbedLoader {
    base_url: String,
    widget_url: String,
    origin: String,
    config: EmbedConfig,
    container: ContainerStyle,
}

impl EmbedLoader {
    /// Derive widget URL and trusted origin from the loader script's own URL.
    ///
    /// The base URL is everything before the script URL's last `/`.
    pub fn from_script_url(script_url: &str, config: EmbedConfig) -> Result<Self, EmbedError> {
        let invalid = |reason: &str| EmbedError::InvalidScriptUrl {
            url: script_url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(script_url).map_err(|e| invalid(&e.to_string()))?;
        let origin = parsed.origin();
        if !origin.is_tuple() {
            return Err(invalid("url has no network origin"));
        }

        let mut stripped = parsed.clone();
        stripped.set_query(None);
        stripped.set_fragment(None);
        let serialized = stripped.as_str();
        let base_url = serialized
            .rfind('/')
            .map_or(serialized, |idx| &serialized[..idx])
            .to_string();

        Ok(Self {
            widget_url: format!("{base_url}/?mode=widget"),
            base_url,
            origin: origin.ascii_serialization(),
            container: ContainerStyle::collapsed(&config),
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn widget_url(&self) -> &str {
        &self.widget_url
    }

    /// The only origin accepted for widget signals.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn container(&self) -> ContainerStyle {
        self.container
    }

    /// Handle a frame message posted to the host window.
    ///
    /// The container is set from the latest accepted token alone, so repeated
    /// tokens converge to the same geometry.
    pub fn handle_message(&mut self, sender_origin: &str, data: &str) -> SignalOutcome {
        if sender_origin != self.origin {
            debug!(sender_origin, expected = %self.origin, "rejected frame message from foreign origin");
            return SignalOutcome::RejectedOrigin;
        }
        let Some(signal) = WidgetSignal::from_token(data) else {
            return SignalOutcome::Ignored;
        };
        self.container = ContainerStyle::for_signal(signal, &self.config);
        debug!(%signal, width = self.container.width_px, height = self.container.height_px, "container resized");
        SignalOutcome::Applied(signal)
    }
}

/// A host page that may have the loader script included more than once.
#[derive(Debug, Default)]
pub struct HostPage {
    guard: BootGuard,
    loader: Option<EmbedLoader>,
}

impl HostPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the loader bootstrap. A second run is a no-op that leaves the
    /// existing container untouched and returns `AlreadyInstalled`.
    ///
    /// The script URL is validated before the guard is claimed, so a failed
    /// install leaves the page free for a later one.
    pub fn install(&mut self, script_url: &str, config: EmbedConfig) -> Result<&mut EmbedLoader, EmbedError> {
        if self.guard.is_claimed() {
            return Err(EmbedError::AlreadyInstalled);
        }
        let loader = EmbedLoader::from_script_url(script_url, config)?;
        self.guard.claim()?;
        info!(widget_url = loader.widget_url(), "widget loader installed");
        Ok(self.loader.insert(loader))
    }

    pub fn loader(&self) -> Option<&EmbedLoader> {
        self.loader.as_ref()
    }

    pub fn loader_mut(&mut self) -> Option<&mut EmbedLoader> {
        self.loader.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_types::embed::{CLOSED_TOKEN, OPENED_TOKEN};

    const SCRIPT: &str = "https://chat.example.com/static/widget-loader.js";
    const ORIGIN: &str = "https://chat.example.com";

    fn loader() -> EmbedLoader {
        EmbedLoader::from_script_url(SCRIPT, EmbedConfig::default()).unwrap()
    }

    #[test]
    fn derives_urls_from_script_src() {
        let loader = loader();
        assert_eq!(loader.base_url(), "https://chat.example.com/static");
        assert_eq!(loader.widget_url(), "https://chat.example.com/static/?mode=widget");
        assert_eq!(loader.origin(), ORIGIN);
    }

    #[test]
    fn script_at_root_keeps_origin_as_base() {
        let loader =
            EmbedLoader::from_script_url("http://localhost:8600/widget-loader.js", EmbedConfig::default())
                .unwrap();
        assert_eq!(loader.base_url(), "http://localhost:8600");
        assert_eq!(loader.origin(), "http://localhost:8600");
    }

    #[test]
    fn rejects_relative_and_opaque_urls() {
        assert!(matches!(
            EmbedLoader::from_script_url("widget-loader.js", EmbedConfig::default()),
            Err(EmbedError::InvalidScriptUrl { .. })
        ));
        assert!(matches!(
            EmbedLoader::from_script_url("data:text/javascript,alert(1)", EmbedConfig::default()),
            Err(EmbedError::InvalidScriptUrl { .. })
        ));
    }

    #[test]
    fn starts_collapsed() {
        let loader = loader();
        assert_eq!(loader.container(), ContainerStyle::collapsed(&EmbedConfig::default()));
    }

    #[test]
    fn opened_from_widget_origin_expands() {
        let mut loader = loader();
        assert_eq!(
            loader.handle_message(ORIGIN, OPENED_TOKEN),
            SignalOutcome::Applied(WidgetSignal::Opened)
        );
        let c = loader.container();
        assert_eq!((c.width_px, c.height_px, c.pointer_events), (400, 650, true));
    }

    #[test]
    fn opened_from_foreign_origin_is_rejected() {
        let mut loader = loader();
        let before = loader.container();
        for origin in [
            "https://evil.example.org",
            "https://chat.example.com.evil.org",
            "http://chat.example.com",
            "https://chat.example.com:444",
            "https://example.com",
        ] {
            assert_eq!(loader.handle_message(origin, OPENED_TOKEN), SignalOutcome::RejectedOrigin);
        }
        assert_eq!(loader.container(), before);
    }

    #[test]
    fn repeated_closed_signals_are_idempotent() {
        let mut loader = loader();
        loader.handle_message(ORIGIN, OPENED_TOKEN);

        let mut once = loader.clone();
        once.handle_message(ORIGIN, CLOSED_TOKEN);

        loader.handle_message(ORIGIN, CLOSED_TOKEN);
        loader.handle_message(ORIGIN, CLOSED_TOKEN);
        assert_eq!(loader.container(), once.container());
        assert!(!loader.container().pointer_events);
    }

    #[test]
    fn unknown_token_is_ignored() {
        let mut loader = loader();
        loader.handle_message(ORIGIN, OPENED_TOKEN);
        let before = loader.container();
        assert_eq!(loader.handle_message(ORIGIN, "widget-resized"), SignalOutcome::Ignored);
        assert_eq!(loader.container(), before);
    }

    #[test]
    fn failed_install_does_not_block_a_later_one() {
        let mut page = HostPage::new();
        assert!(matches!(
            page.install("widget-loader.js", EmbedConfig::default()),
            Err(EmbedError::InvalidScriptUrl { .. })
        ));
        assert!(page.loader().is_none());

        let loader = page.install(SCRIPT, EmbedConfig::default()).unwrap();
        assert_eq!(loader.origin(), ORIGIN);
        assert_eq!(
            page.install("not a url", EmbedConfig::default()).unwrap_err(),
            EmbedError::AlreadyInstalled
        );
    }

    #[test]
    fn second_install_is_a_noop() {
        let mut page = HostPage::new();
        page.install(SCRIPT, EmbedConfig::default())
            .unwrap()
            .handle_message(ORIGIN, OPENED_TOKEN);

        let err = page
            .install("https://other.example.net/widget-loader.js", EmbedConfig::default())
            .unwrap_err();
        assert_eq!(err, EmbedError::AlreadyInstalled);

        let loader = page.loader().unwrap();
        assert_eq!(loader.origin(), ORIGIN);
        assert!(loader.container().pointer_events);
    }
}
