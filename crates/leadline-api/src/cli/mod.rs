//! CLI command definitions and dispatch for the `leadline` binary.
//!
//! Uses clap derive macros for argument parsing. Interactive consoles
//! (`chat`, `portal`) sit next to one-shot lead commands and the API server.

pub mod chat;
pub mod console;
pub mod embed;
pub mod leads;
pub mod portal;
pub mod send;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use leadline_types::operator::OperatorStatus;

/// Live chat between site visitors and your team.
#[derive(Parser)]
#[command(name = "leadline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat as a site visitor.
    Chat {
        /// Email to register with if no visitor is stored yet.
        #[arg(long)]
        email: Option<String>,
    },

    /// Open the operator portal.
    Portal {
        /// Operator username or email.
        #[arg(long, default_value = "operator")]
        operator: String,

        /// Initial presence status (online, away, busy).
        #[arg(long, default_value = "online")]
        status: OperatorStatus,
    },

    /// Inspect and annotate leads.
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },

    /// Append a message to a lead's session.
    Send {
        /// Lead session id.
        uid: String,

        /// Message text.
        text: String,

        /// Who is speaking: client or operator.
        #[arg(long = "as", default_value = "operator")]
        sender: String,

        /// Sender id to record (defaults to the session id or "operator").
        #[arg(long)]
        sender_id: Option<String>,
    },

    /// Print embed code for your website.
    Embed {
        #[command(subcommand)]
        command: EmbedCommand,
    },

    /// Start the HTTP/WebSocket API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "8600")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum LeadsCommand {
    /// List leads, newest first.
    #[command(alias = "ls")]
    List {
        /// Only leads whose name or email contains this (case-insensitive).
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a lead and its conversation.
    Show { uid: String },

    /// Add a tag to a lead.
    Tag { uid: String, tag: String },

    /// Remove a tag from a lead.
    Untag { uid: String, tag: String },

    /// Replace a lead's notes.
    Notes { uid: String, notes: String },
}

#[derive(Subcommand)]
pub enum EmbedCommand {
    /// The `<script>` tag to paste into a host page.
    Snippet,

    /// The loader script served at `/widget-loader.js`.
    Loader,
}
