//! Leadline CLI and HTTP/WebSocket API entry point.
//!
//! Binary name: `leadline`
//!
//! Parses CLI arguments, opens the event store and wires the sync engine,
//! then dispatches to a console, a one-shot lead command, or the API server.

mod cli;
mod http;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, EmbedCommand, LeadsCommand};
use leadline_observe::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(TracingOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        enable_otel: cli.otel,
    })
    .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "leadline", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(cli, &state).await;

    state.shutdown();
    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat { email } => cli::chat::run_chat(state, email).await?,

        Commands::Portal { operator, status } => {
            cli::portal::run_portal(state, &operator, status).await?;
        }

        Commands::Leads { command } => match command {
            LeadsCommand::List { search } => {
                cli::leads::list_leads(state, search.as_deref(), cli.json).await?;
            }
            LeadsCommand::Show { uid } => cli::leads::show_lead(state, &uid, cli.json).await?,
            LeadsCommand::Tag { uid, tag } => {
                cli::leads::tag_lead(state, &uid, &tag, cli.json).await?;
            }
            LeadsCommand::Untag { uid, tag } => {
                cli::leads::untag_lead(state, &uid, &tag, cli.json).await?;
            }
            LeadsCommand::Notes { uid, notes } => {
                cli::leads::set_notes(state, &uid, &notes, cli.json).await?;
            }
        },

        Commands::Send {
            uid,
            text,
            sender,
            sender_id,
        } => {
            cli::send::send_message(state, &uid, &text, &sender, sender_id.as_deref(), cli.json)
                .await?;
        }

        Commands::Embed { command } => match command {
            EmbedCommand::Snippet => cli::embed::print_snippet(state)?,
            EmbedCommand::Loader => cli::embed::print_loader(state)?,
        },

        Commands::Serve { port, host } => {
            state.start_change_tail().await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Leadline API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} {}",
                console::style("Widget loader:").dim(),
                console::style(format!(
                    "http://{addr}{}",
                    leadline_core::embed::script::LOADER_PATH
                ))
                .dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A signal handler that fails to install never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
