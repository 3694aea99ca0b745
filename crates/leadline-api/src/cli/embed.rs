//! `leadline embed ...`: print the host-page snippet or the loader script.

use anyhow::Result;
use console::style;

use leadline_core::embed::{embed_snippet, render_loader_script};

use crate::state::AppState;

pub fn print_snippet(state: &AppState) -> Result<()> {
    let snippet = embed_snippet(&state.config.embed.public_base_url);
    println!();
    println!(
        "  {} Paste this before {} on your site:",
        style("📋").bold(),
        style("</body>").yellow()
    );
    println!();
    println!("{snippet}");
    println!();
    Ok(())
}

pub fn print_loader(state: &AppState) -> Result<()> {
    print!("{}", render_loader_script(&state.config.embed));
    Ok(())
}
