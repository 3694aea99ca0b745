//! Widget side of the bridge.

use leadline_types::embed::{BROADCAST_TARGET, WidgetSignal};

/// Posts a string to the embedding context.
pub trait FrameChannel {
    fn post(&self, data: &str, target_origin: &str);
}

/// Tracks the widget's open state and reports transitions to the parent.
///
/// Posts are untargeted because the widget cannot know who embedded it.
pub struct WidgetBridge<C: FrameChannel> {
    channel: C,
    open: bool,
}

impl<C: FrameChannel> WidgetBridge<C> {
    /// Mount the widget closed and announce that state once.
    pub fn mount(channel: C) -> Self {
        let bridge = Self {
            channel,
            open: false,
        };
        bridge.emit();
        bridge
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Change state. Posts a token only on an actual transition.
    pub fn set_open(&mut self, open: bool) {
        if self.open == open {
            return;
        }
        self.open = open;
        self.emit();
    }

    pub fn toggle(&mut self) {
        self.set_open(!self.open);
    }

    fn emit(&self) {
        self.channel
            .post(WidgetSignal::from_open(self.open).token(), BROADCAST_TARGET);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use leadline_types::embed::{CLOSED_TOKEN, OPENED_TOKEN};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<(String, String)>>>);

    impl FrameChannel for Recorder {
        fn post(&self, data: &str, target_origin: &str) {
            self.0
                .borrow_mut()
                .push((data.to_string(), target_origin.to_string()));
        }
    }

    impl Recorder {
        fn tokens(&self) -> Vec<String> {
            self.0.borrow().iter().map(|(d, _)| d.clone()).collect()
        }
    }

    #[test]
    fn mount_announces_closed_state() {
        let recorder = Recorder::default();
        let bridge = WidgetBridge::mount(recorder.clone());
        assert!(!bridge.is_open());
        assert_eq!(recorder.tokens(), vec![CLOSED_TOKEN]);
        assert_eq!(recorder.0.borrow()[0].1, "*");
    }

    #[test]
    fn only_transitions_are_posted() {
        let recorder = Recorder::default();
        let mut bridge = WidgetBridge::mount(recorder.clone());
        bridge.set_open(true);
        bridge.set_open(true);
        bridge.toggle();
        bridge.set_open(false);
        assert_eq!(recorder.tokens(), vec![CLOSED_TOKEN, OPENED_TOKEN, CLOSED_TOKEN]);
    }
}
