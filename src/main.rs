//! Cadastro - registration form with CPF/phone/CEP masking
//!
//! A line-oriented driver around the form session: each input line is a
//! command, and CEP lookups complete in the background.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use cadastro::app::{App, Command};
use cadastro::config::CadastroConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadastro=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = CadastroConfig::load()?;
    let lookup = Arc::new(config.lookup_client()?);
    let (mut app, mut completions) = App::new(config.variant(), lookup);

    tracing::info!(
        variant = %app.session.variant(),
        lookup_url = config.lookup_base_url(),
        "Form session started"
    );
    println!("{}", app.handle_command(Command::Help));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };

                if let Command::Variant(variant) = command {
                    config.form_variant = Some(variant);
                    if let Err(err) = config.save() {
                        tracing::warn!("Failed to save config: {err:#}");
                    }
                }

                let output = app.handle_command(command);
                if !output.is_empty() {
                    println!("{output}");
                }
                if app.should_quit() {
                    break;
                }
            }
            Some(completion) = completions.recv() => {
                let output = app.apply_completion(completion);
                if !output.is_empty() {
                    println!("{output}");
                }
            }
        }
    }

    if app.pending_lookups() > 0 {
        tracing::debug!(
            pending = app.pending_lookups(),
            "Exiting with lookups in flight"
        );
    }

    Ok(())
}
