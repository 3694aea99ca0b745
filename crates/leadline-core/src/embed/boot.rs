//! One-shot installation guard for the host-page loader.

use std::sync::OnceLock;

use leadline_types::error::EmbedError;

/// Set once when the loader installs and never touched again.
#[derive(Debug, Default)]
pub struct BootGuard {
    installed: OnceLock<()>,
}

impl BootGuard {
    pub const fn new() -> Self {
        Self {
            installed: OnceLock::new(),
        }
    }

    /// Claim the guard. Only the first caller succeeds.
    pub fn claim(&self) -> Result<(), EmbedError> {
        self.installed
            .set(())
            .map_err(|_| EmbedError::AlreadyInstalled)
    }

    pub fn is_claimed(&self) -> bool {
        self.installed.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GUARD: BootGuard = BootGuard::new();

    #[test]
    fn only_first_claim_succeeds() {
        let guard = BootGuard::new();
        assert!(!guard.is_claimed());
        assert!(guard.claim().is_ok());
        assert_eq!(guard.claim(), Err(EmbedError::AlreadyInstalled));
        assert!(guard.is_claimed());
    }

    #[test]
    fn usable_as_static() {
        let first = GUARD.claim();
        let second = GUARD.claim();
        assert!(first.is_ok());
        assert_eq!(second, Err(EmbedError::AlreadyInstalled));
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let guard = std::sync::Arc::new(BootGuard::new());
        let winners: usize = (0..8)
            .map(|_| {
                let guard = std::sync::Arc::clone(&guard);
                std::thread::spawn(move || guard.claim().is_ok())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}
