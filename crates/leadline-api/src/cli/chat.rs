//! Visitor console: the chat widget in a terminal.
//!
//! Resumes the stored visitor (or registers a new one), subscribes to the
//! visitor's session, prints incoming messages and sends typed lines as
//! client messages.

use anyhow::Result;
use console::style;
use dialoguer::Input;

use leadline_types::error::SyncError;
use leadline_types::message::SenderType;
use leadline_types::sync::SubscriptionTarget;

use crate::state::AppState;

use super::console::commands::{self, ConsoleCommand};
use super::console::input::stdin_lines;
use super::console::render::{ViewPrinter, print_error};

/// Run the visitor chat loop until `/quit`, EOF, or a terminal feed status.
pub async fn run_chat(state: &AppState, email: Option<String>) -> Result<()> {
    state.start_change_tail().await?;

    let identity = state.local_identity();
    let lead = identity
        .resume_or_register(|| prompt_email(email))
        .await?;

    println!();
    println!(
        "  {} Hi {}! You're chatting with the team.",
        style("💬").bold(),
        style(&lead.name).cyan().bold()
    );
    println!("  {}", style("Type /help for commands, /quit to leave.").dim());
    println!();

    let mut handle = state
        .engine
        .subscribe(SubscriptionTarget::session(lead.uid.clone()));
    let mut printer = ViewPrinter::new(SenderType::Client);
    let mut lines = stdin_lines();

    loop {
        tokio::select! {
            snapshot = handle.changed() => {
                let Some(snapshot) = snapshot else { break };
                printer.render(&snapshot);
                if snapshot.status.is_terminal() {
                    break;
                }
            }

            line = lines.recv() => {
                let Some(line) = line else { break };
                match commands::parse(&line) {
                    Some(ConsoleCommand::Quit) => break,
                    Some(ConsoleCommand::Help) => commands::print_chat_help(),
                    Some(ConsoleCommand::Forget) => {
                        identity.forget().await?;
                        println!("  {}", style("Visitor forgotten. Bye!").dim());
                        break;
                    }
                    Some(ConsoleCommand::Invalid(msg)) => print_error(msg),
                    Some(_) => print_error("that command is only available in the portal"),
                    None if line.trim().is_empty() => {}
                    None => {
                        if let Err(e) = state.engine.append(&lead.uid, SenderType::Client, &line).await {
                            print_error(format!("message not sent: {e}"));
                        }
                    }
                }
            }
        }
    }

    handle.cancel();
    state.shutdown();
    Ok(())
}

/// The email to register with: the flag if given, otherwise ask.
fn prompt_email(email: Option<String>) -> Result<String, SyncError> {
    if let Some(email) = email {
        return Ok(email);
    }
    Input::<String>::new()
        .with_prompt("Your email")
        .interact_text()
        .map_err(|e| SyncError::InvalidInput(e.to_string()))
}
