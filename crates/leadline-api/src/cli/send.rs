//! `leadline send`: append one message to a session from the command line.

use anyhow::{Result, anyhow};
use console::style;

use leadline_types::lead::LeadUid;
use leadline_types::message::SenderType;

use crate::state::AppState;

pub async fn send_message(
    state: &AppState,
    uid: &str,
    text: &str,
    sender: &str,
    sender_id: Option<&str>,
    json: bool,
) -> Result<()> {
    let sender_type: SenderType = sender.parse().map_err(|e: String| anyhow!(e))?;
    let message = state
        .engine
        .append_as(&LeadUid::from(uid), sender_type, sender_id, text)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else {
        println!(
            "  {} Sent message #{} to {}",
            style("✓").green().bold(),
            message.id,
            style(uid).cyan()
        );
    }
    Ok(())
}
