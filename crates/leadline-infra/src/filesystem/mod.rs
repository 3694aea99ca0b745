//! Filesystem adapters for Leadline.
//!
//! Data directory resolution and the on-disk visitor store.

pub mod visitor;

use std::path::PathBuf;

pub use visitor::FileVisitorStore;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `LEADLINE_DATA_DIR` environment variable
/// 2. `~/.leadline` under the user's home directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEADLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".leadline");
    }

    // Last resort: current directory
    PathBuf::from(".leadline")
}
