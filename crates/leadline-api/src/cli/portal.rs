//! Operator console: roster, one open conversation, and reply suggestions.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use console::style;

use leadline_core::repository::LeadRepository;
use leadline_core::suggest::{SuggestionWatcher, send_suggestion};
use leadline_core::sync::SubscriptionHandle;
use leadline_types::lead::{Lead, LeadUid};
use leadline_types::message::SenderType;
use leadline_types::operator::{Operator, OperatorStatus};
use leadline_types::suggestion::{SuggestionSet, SuggestionState};
use leadline_types::sync::{FeedStatus, SubscriptionTarget, SyncSnapshot};

use crate::state::AppState;

use super::console::commands::{self, ConsoleCommand};
use super::console::input::stdin_lines;
use super::console::render::{ViewPrinter, print_error, print_status, print_suggestions};
use super::leads::{print_lead_table, print_search_results};

/// The conversation currently open in the portal.
struct OpenSession {
    uid: LeadUid,
    handle: SubscriptionHandle,
    watcher: SuggestionWatcher,
    printer: ViewPrinter,
    /// Latest ready suggestions, for `/pick`.
    suggestions: Option<SuggestionSet>,
}

enum SessionEvent {
    View(SyncSnapshot),
    Suggestions(SuggestionState),
    Ended,
}

impl OpenSession {
    fn open(state: &AppState, uid: LeadUid) -> Self {
        let handle = state.engine.subscribe(SubscriptionTarget::session(uid.clone()));
        let watcher = SuggestionWatcher::spawn(Arc::clone(&state.suggestions), handle.watch());
        Self {
            uid,
            handle,
            watcher,
            printer: ViewPrinter::new(SenderType::Operator),
            suggestions: None,
        }
    }

    async fn next_event(&mut self) -> SessionEvent {
        tokio::select! {
            snapshot = self.handle.changed() => snapshot.map_or(SessionEvent::Ended, SessionEvent::View),
            suggestion = self.watcher.changed() => suggestion.map_or(SessionEvent::Ended, SessionEvent::Suggestions),
        }
    }
}

/// Roster bookkeeping: which leads have been announced already.
struct Roster {
    handle: Option<SubscriptionHandle>,
    known: BTreeSet<LeadUid>,
    leads: Vec<Lead>,
    seeded: bool,
}

impl Roster {
    /// Leads not seen before. Leads present in the first live snapshot are
    /// recorded without being announced.
    fn apply(&mut self, snapshot: &SyncSnapshot) -> Vec<Lead> {
        self.leads = snapshot.leads().to_vec();
        if snapshot.status != FeedStatus::Live {
            return Vec::new();
        }
        let fresh: Vec<Lead> = self
            .leads
            .iter()
            .filter(|l| self.known.insert(l.uid.clone()))
            .cloned()
            .collect();
        if !self.seeded {
            self.seeded = true;
            return Vec::new();
        }
        fresh
    }
}

async fn next_roster(handle: &mut Option<SubscriptionHandle>) -> Option<SyncSnapshot> {
    match handle {
        Some(handle) => handle.changed().await,
        None => std::future::pending().await,
    }
}

async fn next_session(open: &mut Option<OpenSession>) -> SessionEvent {
    match open {
        Some(session) => session.next_event().await,
        None => std::future::pending().await,
    }
}

fn prompt_line(operator: &Operator, open: Option<&OpenSession>) {
    let presence = match operator.status {
        OperatorStatus::Online => style(operator.status.to_string()).green(),
        OperatorStatus::Away => style(operator.status.to_string()).yellow(),
        OperatorStatus::Busy => style(operator.status.to_string()).red(),
    };
    let target = open.map_or_else(|| "no conversation open".to_string(), |s| s.uid.to_string());
    println!(
        "  {} {} [{}] {}",
        style("◆").cyan(),
        style(&operator.username).bold(),
        presence,
        style(target).dim()
    );
}

/// Run the operator portal until `/quit` or EOF.
pub async fn run_portal(state: &AppState, operator_name: &str, status: OperatorStatus) -> Result<()> {
    state.start_change_tail().await?;

    let mut operator = if operator_name.contains('@') {
        Operator::from_email(operator_name)
    } else {
        Operator::named(operator_name)
    };
    operator.set_status(status);

    println!();
    println!(
        "  {} Leadline portal. Type /help for commands.",
        style("⚡").bold()
    );
    prompt_line(&operator, None);
    println!();

    let mut roster = Roster {
        handle: Some(state.engine.subscribe(SubscriptionTarget::Roster)),
        known: BTreeSet::new(),
        leads: Vec::new(),
        seeded: false,
    };
    let mut open: Option<OpenSession> = None;
    let mut lines = stdin_lines();

    loop {
        tokio::select! {
            snapshot = next_roster(&mut roster.handle) => {
                let Some(snapshot) = snapshot else {
                    roster.handle = None;
                    continue;
                };
                if snapshot.status.is_terminal() {
                    print_status(&snapshot.status);
                }
                for lead in roster.apply(&snapshot) {
                    println!(
                        "  {} new lead {} <{}>  {}",
                        style("+").green().bold(),
                        style(&lead.name).bold(),
                        lead.email,
                        style(format!("/open {}", lead.uid)).dim()
                    );
                }
            }

            event = next_session(&mut open) => {
                match event {
                    SessionEvent::View(snapshot) => {
                        if let Some(session) = open.as_mut() {
                            session.printer.render(&snapshot);
                        }
                    }
                    SessionEvent::Suggestions(SuggestionState::Ready(set)) => {
                        print_suggestions(&set);
                        if let Some(session) = open.as_mut() {
                            session.suggestions = Some(set);
                        }
                    }
                    SessionEvent::Suggestions(_) => {
                        if let Some(session) = open.as_mut() {
                            session.suggestions = None;
                        }
                    }
                    SessionEvent::Ended => {
                        open = None;
                        println!("  {}", style("conversation closed").dim());
                    }
                }
            }

            line = lines.recv() => {
                let Some(line) = line else { break };
                match commands::parse(&line) {
                    Some(ConsoleCommand::Quit) => break,
                    Some(ConsoleCommand::Help) => commands::print_portal_help(),
                    Some(ConsoleCommand::Leads) => print_lead_table(&roster.leads),
                    Some(ConsoleCommand::Find(query)) => print_search_results(&roster.leads, &query),
                    Some(ConsoleCommand::Open(uid)) => {
                        let uid = LeadUid::from(uid);
                        match state.store().get_lead(&uid).await {
                            Ok(Some(lead)) => {
                                println!(
                                    "  {} {} <{}>",
                                    style("▸").cyan(),
                                    style(&lead.name).bold(),
                                    lead.email
                                );
                                open = Some(OpenSession::open(state, uid));
                                prompt_line(&operator, open.as_ref());
                            }
                            Ok(None) => print_error(format!("no lead '{uid}'")),
                            Err(e) => print_error(e),
                        }
                    }
                    Some(ConsoleCommand::Close) => {
                        open = None;
                        prompt_line(&operator, None);
                    }
                    Some(ConsoleCommand::Status(status)) => {
                        operator.set_status(status);
                        prompt_line(&operator, open.as_ref());
                    }
                    Some(ConsoleCommand::Invalid(msg)) => print_error(msg),
                    Some(ConsoleCommand::Forget) => print_error("/forget is only available in chat"),
                    Some(command) => {
                        let Some(session) = open.as_ref() else {
                            print_error("open a conversation first: /open <uid>");
                            continue;
                        };
                        if let Err(e) = run_session_command(state, &operator, session, command).await {
                            print_error(e);
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => match open.as_ref() {
                        Some(session) => {
                            if let Err(e) = state
                                .engine
                                .append_as(&session.uid, SenderType::Operator, Some(&operator.username), &line)
                                .await
                            {
                                print_error(format!("message not sent: {e}"));
                            }
                        }
                        None => print_error("open a conversation first: /open <uid>"),
                    },
                }
            }
        }
    }

    drop(open);
    drop(roster);
    state.shutdown();
    Ok(())
}

/// Commands that act on the open conversation.
async fn run_session_command(
    state: &AppState,
    operator: &Operator,
    session: &OpenSession,
    command: ConsoleCommand,
) -> Result<()> {
    match command {
        ConsoleCommand::Pick(n) => {
            let Some(set) = session.suggestions.as_ref() else {
                anyhow::bail!("no suggestions for the latest message");
            };
            send_suggestion(&state.engine, &session.uid, set, n, Some(&operator.username)).await?;
        }
        ConsoleCommand::Tag(tag) => {
            let lead = state.engine.add_tag(&session.uid, &tag).await?;
            print_tags(&lead);
        }
        ConsoleCommand::Untag(tag) => {
            let lead = state.engine.remove_tag(&session.uid, &tag).await?;
            print_tags(&lead);
        }
        ConsoleCommand::Notes(notes) => {
            state.engine.set_notes(&session.uid, &notes).await?;
            println!("  {}", style("notes saved").dim());
        }
        _ => {}
    }
    Ok(())
}

fn print_tags(lead: &Lead) {
    let tags: Vec<&str> = lead.tags.iter().map(String::as_str).collect();
    println!("  {} {}", style("tags:").dim(), tags.join(", "));
}
