//! Timeline and status rendering for the consoles.
//!
//! Snapshots carry the whole view each time; [`ViewPrinter`] remembers what
//! was already shown so each message prints exactly once, even when an
//! older message arrives after a newer one.

use std::collections::BTreeSet;

use console::style;

use leadline_types::message::{Message, MessageId, SenderType};
use leadline_types::suggestion::SuggestionSet;
use leadline_types::sync::{FeedStatus, SyncSnapshot};

#[derive(Debug)]
pub struct ViewPrinter {
    /// The side this console speaks for; its messages render as "you".
    viewer: SenderType,
    printed: BTreeSet<MessageId>,
    last_status: Option<FeedStatus>,
}

impl ViewPrinter {
    pub fn new(viewer: SenderType) -> Self {
        Self {
            viewer,
            printed: BTreeSet::new(),
            last_status: None,
        }
    }

    /// Messages not shown yet, in timeline order. Marks them as shown.
    pub fn unseen<'a>(&mut self, messages: &'a [Message]) -> Vec<&'a Message> {
        messages
            .iter()
            .filter(|m| self.printed.insert(m.id))
            .collect()
    }

    /// The status, if it differs from the last one seen.
    pub fn status_change(&mut self, status: FeedStatus) -> Option<FeedStatus> {
        if self.last_status == Some(status) {
            return None;
        }
        self.last_status = Some(status);
        Some(status)
    }

    /// Print whatever is new in `snapshot`.
    pub fn render(&mut self, snapshot: &SyncSnapshot) {
        if let Some(status) = self.status_change(snapshot.status) {
            print_status(&status);
        }
        for message in self.unseen(snapshot.messages()) {
            print_message(message, self.viewer);
        }
    }
}

pub fn print_message(message: &Message, viewer: SenderType) {
    let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
    let who = if message.sender_type == viewer {
        style("you".to_string()).cyan().bold()
    } else {
        match message.sender_type {
            SenderType::Client => style("visitor".to_string()).green().bold(),
            SenderType::Operator => style(message.sender_id.clone()).green().bold(),
        }
    };
    println!("  {} {}  {}", style(time).dim(), who, message.text);
}

pub fn print_status(status: &FeedStatus) {
    match status {
        FeedStatus::Connecting => {}
        FeedStatus::Live => println!("  {}", style("connected").dim()),
        FeedStatus::Reconnecting { attempt } => println!(
            "  {} connection lost, reconnecting (attempt {attempt})",
            style("!").yellow().bold()
        ),
        FeedStatus::Unbound => println!(
            "  {} this conversation has no lead behind it",
            style("✗").red().bold()
        ),
        FeedStatus::Lost { attempts } => println!(
            "  {} gave up reconnecting after {attempts} attempts",
            style("✗").red().bold()
        ),
        FeedStatus::Cancelled => println!("  {}", style("disconnected").dim()),
    }
}

pub fn print_suggestions(set: &SuggestionSet) {
    let label = if set.is_fallback() {
        "Suggested replies (offline)"
    } else {
        "Suggested replies"
    };
    println!("  {}", style(label).dim());
    for (i, text) in set.suggestions.iter().enumerate() {
        println!("    {} {}", style(format!("/pick {}", i + 1)).cyan(), text);
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("  {} {message}", style("✗").red().bold());
}
