//! Follows a session view and keeps suggestions in step with it.
//!
//! On every change of the newest message the watcher publishes `Pending` or
//! `Cleared` straight away, then the resolved set. A result for a message
//! that is no longer the newest is discarded.

use std::sync::Arc;

use leadline_types::message::{Message, MessageId};
use leadline_types::suggestion::{SuggestionSet, SuggestionState};
use leadline_types::sync::SyncSnapshot;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::generator::TextGenerator;
use super::service::SuggestionService;

/// Handle to a running suggestion watcher. Dropping it stops the watcher.
#[derive(Debug)]
pub struct SuggestionWatcher {
    state: watch::Receiver<SuggestionState>,
    token: CancellationToken,
}

enum Resolved {
    Ready(SuggestionSet),
    Stale,
    Stop,
}

impl SuggestionWatcher {
    /// Start watching `view`. Must be called inside a tokio runtime.
    pub fn spawn<G>(service: Arc<SuggestionService<G>>, view: watch::Receiver<SyncSnapshot>) -> Self
    where
        G: TextGenerator + 'static,
    {
        let (tx, rx) = watch::channel(SuggestionState::Cleared);
        let token = CancellationToken::new();
        tokio::spawn(run(service, view, tx, token.clone()));
        Self { state: rx, token }
    }

    pub fn current(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SuggestionState> {
        self.state.clone()
    }

    /// Wait for the next published state.
    pub async fn changed(&mut self) -> Option<SuggestionState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&SuggestionState) -> bool,
    ) -> Option<SuggestionState> {
        self.state
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for SuggestionWatcher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn newest_id(view: &watch::Receiver<SyncSnapshot>) -> Option<MessageId> {
    view.borrow().last_message().map(|m| m.id)
}

async fn run<G: TextGenerator>(
    service: Arc<SuggestionService<G>>,
    mut view: watch::Receiver<SyncSnapshot>,
    tx: watch::Sender<SuggestionState>,
    token: CancellationToken,
) {
    let mut handled: Option<MessageId> = None;
    loop {
        let messages: Vec<Message> = view.borrow_and_update().messages().to_vec();
        let newest = messages.last().map(|m| m.id);

        if newest != handled {
            handled = newest;
            match SuggestionService::<G>::trigger(&messages) {
                None => {
                    tx.send_replace(SuggestionState::Cleared);
                }
                Some(for_message) => {
                    tx.send_replace(SuggestionState::Pending { for_message });
                    match resolve(&service, &messages, for_message, &mut view, &token).await {
                        Resolved::Ready(set) => {
                            tx.send_replace(SuggestionState::Ready(set));
                        }
                        Resolved::Stale => {
                            debug!(%for_message, "timeline moved on, discarding suggestions");
                            continue;
                        }
                        Resolved::Stop => return,
                    }
                }
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            changed = view.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

/// Run one request while watching for the timeline to move past `for_message`.
async fn resolve<G: TextGenerator>(
    service: &SuggestionService<G>,
    messages: &[Message],
    for_message: MessageId,
    view: &mut watch::Receiver<SyncSnapshot>,
    token: &CancellationToken,
) -> Resolved {
    let request = service.suggest(messages);
    tokio::pin!(request);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return Resolved::Stop,
            set = &mut request => {
                return match set {
                    Some(set) if newest_id(view) == Some(for_message) => Resolved::Ready(set),
                    _ => Resolved::Stale,
                };
            }
            changed = view.changed() => {
                if changed.is_err() {
                    return Resolved::Stop;
                }
                if newest_id(view) != Some(for_message) {
                    return Resolved::Stale;
                }
            }
        }
    }
}
