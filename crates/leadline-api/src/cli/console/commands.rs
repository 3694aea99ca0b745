//! Slash command parsing for the visitor and operator consoles.
//!
//! Commands start with `/`; anything else is sent as a chat message.

use console::style;

use leadline_types::operator::OperatorStatus;

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    Help,
    Quit,
    /// Visitor only: forget the stored identity.
    Forget,
    /// Operator: print the roster.
    Leads,
    /// Operator: print leads whose name or email contains the query.
    Find(String),
    /// Operator: open a lead's session.
    Open(String),
    /// Operator: close the open session.
    Close,
    /// Operator: send suggestion N (1-based).
    Pick(usize),
    Status(OperatorStatus),
    Tag(String),
    Untag(String),
    Notes(String),
    /// Unknown command or bad argument, with a message for the user.
    Invalid(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ConsoleCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };
    let required = |name: &str, what: &str| -> Result<String, ConsoleCommand> {
        if arg.is_empty() {
            Err(ConsoleCommand::Invalid(format!("{name} requires {what}")))
        } else {
            Ok(arg.to_string())
        }
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ConsoleCommand::Help,
        "/quit" | "/exit" | "/q" => ConsoleCommand::Quit,
        "/forget" => ConsoleCommand::Forget,
        "/leads" | "/roster" => ConsoleCommand::Leads,
        "/find" | "/search" => required("/find", "a name or email").map_or_else(|e| e, ConsoleCommand::Find),
        "/close" => ConsoleCommand::Close,
        "/open" => required("/open", "a lead uid").map_or_else(|e| e, ConsoleCommand::Open),
        "/tag" => required("/tag", "a tag").map_or_else(|e| e, ConsoleCommand::Tag),
        "/untag" => required("/untag", "a tag").map_or_else(|e| e, ConsoleCommand::Untag),
        // Empty notes clear them.
        "/notes" => ConsoleCommand::Notes(arg.to_string()),
        "/pick" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => ConsoleCommand::Pick(n),
            _ => ConsoleCommand::Invalid("/pick requires a suggestion number (1, 2, 3)".to_string()),
        },
        "/status" => match arg.parse::<OperatorStatus>() {
            Ok(status) => ConsoleCommand::Status(status),
            Err(e) => ConsoleCommand::Invalid(e),
        },
        other => ConsoleCommand::Invalid(format!("unknown command {other}, try /help")),
    };
    Some(command)
}

fn help_line(cmd: &str, text: &str) {
    println!("  {:<16} {}", style(cmd).cyan(), text);
}

pub fn print_chat_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    help_line("/help", "Show this help message");
    help_line("/forget", "Forget this visitor and exit");
    help_line("/quit", "Leave the chat");
    println!();
    println!("  {}", style("Anything else you type is sent to the team.").dim());
    println!();
}

pub fn print_portal_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    help_line("/leads", "Show the lead roster");
    help_line("/find <q>", "Search leads by name or email");
    help_line("/open <uid>", "Open a lead's conversation");
    help_line("/close", "Close the open conversation");
    help_line("/pick <n>", "Send suggested reply n");
    help_line("/tag <tag>", "Tag the open lead");
    help_line("/untag <tag>", "Remove a tag from the open lead");
    help_line("/notes <text>", "Replace the open lead's notes");
    help_line("/status <s>", "Set presence: online, away, busy");
    help_line("/quit", "Leave the portal");
    println!();
    println!("  {}", style("Anything else you type is sent to the open conversation.").dim());
    println!();
}
