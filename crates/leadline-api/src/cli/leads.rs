//! `leadline leads ...`: list, inspect and annotate leads.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use leadline_core::repository::{LeadRepository, MessageRepository};
use leadline_types::lead::{Lead, LeadUid, filter_leads};
use leadline_types::message::SenderType;

use crate::state::AppState;

use super::console::render::print_message;

/// Print leads as a table, newest first.
pub fn print_lead_table(leads: &[Lead]) {
    let rows: Vec<&Lead> = leads.iter().collect();
    print_lead_rows(&rows);
}

/// Print the leads matching `query` with a match count.
pub fn print_search_results(leads: &[Lead], query: &str) {
    let hits = filter_leads(leads, query);
    println!();
    println!(
        "  {} {} of {} leads match '{}'",
        style("🔍").bold(),
        style(hits.len()).cyan().bold(),
        leads.len(),
        query.trim()
    );
    if hits.is_empty() {
        println!();
        return;
    }
    print_lead_rows(&hits);
}

fn print_lead_rows(leads: &[&Lead]) {
    if leads.is_empty() {
        println!();
        println!(
            "  {} No leads yet. Share the widget with: {}",
            style("i").blue().bold(),
            style("leadline embed snippet").yellow()
        );
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Session").fg(Color::White),
        Cell::new("Tags").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for lead in leads {
        let tags = lead.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        table.add_row(vec![
            Cell::new(&lead.name).fg(Color::Cyan),
            Cell::new(&lead.email),
            Cell::new(lead.uid.as_str()).fg(Color::White),
            Cell::new(tags).fg(Color::Yellow),
            Cell::new(format_relative_time(&lead.created_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
}

pub async fn list_leads(state: &AppState, search: Option<&str>, json: bool) -> Result<()> {
    let leads = state.store().list_leads().await?;
    if json {
        let hits = filter_leads(&leads, search.unwrap_or_default());
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    match search {
        Some(query) => print_search_results(&leads, query),
        None => print_lead_table(&leads),
    }
    Ok(())
}

/// Show one lead with its conversation.
pub async fn show_lead(state: &AppState, uid: &str, json: bool) -> Result<()> {
    let uid = LeadUid::from(uid);
    let Some(lead) = state.store().get_lead(&uid).await? else {
        bail!("no lead '{uid}'");
    };
    let messages = state.store().list_messages(&uid).await?;

    if json {
        let out = serde_json::json!({ "lead": lead, "messages": messages });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} <{}>",
        style("▸").cyan(),
        style(&lead.name).bold(),
        lead.email
    );
    println!("  {} {}", style("session:").dim(), lead.uid);
    println!(
        "  {} {}",
        style("created:").dim(),
        lead.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
    );
    if !lead.tags.is_empty() {
        let tags: Vec<&str> = lead.tags.iter().map(String::as_str).collect();
        println!("  {} {}", style("tags:").dim(), tags.join(", "));
    }
    if !lead.notes.is_empty() {
        println!("  {} {}", style("notes:").dim(), lead.notes);
    }
    println!();

    if messages.is_empty() {
        println!("  {}", style("No messages.").dim());
    }
    for message in &messages {
        print_message(message, SenderType::Operator);
    }
    println!();
    Ok(())
}

pub async fn tag_lead(state: &AppState, uid: &str, tag: &str, json: bool) -> Result<()> {
    let lead = state.engine.add_tag(&LeadUid::from(uid), tag).await?;
    print_lead_update(&lead, json)
}

pub async fn untag_lead(state: &AppState, uid: &str, tag: &str, json: bool) -> Result<()> {
    let lead = state.engine.remove_tag(&LeadUid::from(uid), tag).await?;
    print_lead_update(&lead, json)
}

pub async fn set_notes(state: &AppState, uid: &str, notes: &str, json: bool) -> Result<()> {
    let lead = state.engine.set_notes(&LeadUid::from(uid), notes).await?;
    print_lead_update(&lead, json)
}

fn print_lead_update(lead: &Lead, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lead)?);
        return Ok(());
    }
    let tags: Vec<&str> = lead.tags.iter().map(String::as_str).collect();
    println!(
        "  {} Updated {} (tags: {})",
        style("✓").green().bold(),
        style(&lead.name).cyan(),
        if tags.is_empty() { "none".to_string() } else { tags.join(", ") }
    );
    Ok(())
}

fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let diff = chrono::Utc::now() - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
