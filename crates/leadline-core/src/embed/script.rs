//! Host-page loader script and embed snippet.
//!
//! The script is rendered from the same constants the Rust model uses, so
//! tokens, footprints and the boot guard cannot drift from it.

use leadline_types::config::EmbedConfig;
use leadline_types::embed::{CLOSED_TOKEN, CONTAINER_OFFSET_PX, CONTAINER_Z_INDEX, OPENED_TOKEN};

/// Path the loader script is served at.
pub const LOADER_PATH: &str = "/widget-loader.js";

/// Window property used as the boot guard.
pub const BOOT_GUARD_PROPERTY: &str = "__LEADLINE_WIDGET_LOADED__";

const CONTAINER_ID: &str = "leadline-chat-container";
const IFRAME_ID: &str = "leadline-chat-iframe";

const TEMPLATE: &str = r#"(function () {
  if (window.@GUARD@) {
    console.warn('leadline: widget already loaded on this page');
    return;
  }

  var script = document.currentScript || (function () {
    var scripts = document.getElementsByTagName('script');
    return scripts[scripts.length - 1];
  })();
  var src = new URL(script.src, window.location.href);
  src.search = '';
  src.hash = '';
  var href = src.href;
  var BASE_URL = href.substring(0, href.lastIndexOf('/'));
  var WIDGET_ORIGIN = src.origin;
  var WIDGET_URL = BASE_URL + '/?mode=widget';
  window.@GUARD@ = true;

  var container = document.createElement('div');
  container.id = '@CONTAINER_ID@';
  Object.assign(container.style, {
    position: 'fixed',
    bottom: '@OFFSET@px',
    right: '@OFFSET@px',
    width: '@COLLAPSED@px',
    height: '@COLLAPSED@px',
    zIndex: '@Z_INDEX@',
    pointerEvents: 'none',
    border: 'none',
    overflow: 'hidden',
    transition: 'width 0.3s ease, height 0.3s ease'
  });

  var iframe = document.createElement('iframe');
  iframe.src = WIDGET_URL;
  iframe.id = '@IFRAME_ID@';
  iframe.setAttribute('allowtransparency', 'true');
  iframe.setAttribute('frameborder', '0');
  Object.assign(iframe.style, {
    width: '100%',
    height: '100%',
    border: 'none',
    background: 'transparent',
    pointerEvents: 'auto'
  });

  container.appendChild(iframe);
  document.body.appendChild(container);

  window.addEventListener('message', function (event) {
    if (event.origin !== WIDGET_ORIGIN) return;
    if (event.data === '@OPENED@') {
      container.style.width = '@EXPANDED_W@px';
      container.style.height = '@EXPANDED_H@px';
      container.style.pointerEvents = 'auto';
    } else if (event.data === '@CLOSED@') {
      container.style.width = '@COLLAPSED@px';
      container.style.height = '@COLLAPSED@px';
      container.style.pointerEvents = 'none';
    }
  });
})();
"#;

/// Render the loader script for the configured footprints.
pub fn render_loader_script(config: &EmbedConfig) -> String {
    TEMPLATE
        .replace("@GUARD@", BOOT_GUARD_PROPERTY)
        .replace("@CONTAINER_ID@", CONTAINER_ID)
        .replace("@IFRAME_ID@", IFRAME_ID)
        .replace("@OFFSET@", &CONTAINER_OFFSET_PX.to_string())
        .replace("@Z_INDEX@", &CONTAINER_Z_INDEX.to_string())
        .replace("@COLLAPSED@", &config.collapsed_size.to_string())
        .replace("@EXPANDED_W@", &config.expanded_width.to_string())
        .replace("@EXPANDED_H@", &config.expanded_height.to_string())
        .replace("@OPENED@", OPENED_TOKEN)
        .replace("@CLOSED@", CLOSED_TOKEN)
}

/// The `<script>` tag a site owner pastes into their page.
pub fn embed_snippet(public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!(r#"<script src="{base}{LOADER_PATH}" async></script>"#)
}
