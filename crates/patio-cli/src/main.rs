//! Terminal chat front end for the Patio Funes virtual receptionist.
//!
//! A rustyline REPL over the chat controller: typed text is sent as an
//! utterance, a bare number activates the matching option button from the
//! last assistant turn.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use patio_application::{ChatController, OptionOutcome, SendOutcome};
use patio_core::config::{ModelConfig, RestaurantProfile};
use patio_interaction::prompt::{system_instruction, welcome_envelope};
use patio_interaction::{ChatRelay, GeminiClient};

mod render;

const PROFILE_PATH: &str = "patio.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model_config =
        ModelConfig::from_env().context("set GEMINI_API_KEY to talk to the receptionist")?;
    let profile = RestaurantProfile::load_or_default(PROFILE_PATH)
        .with_context(|| format!("invalid restaurant profile at {PROFILE_PATH}"))?;

    let client = GeminiClient::new(&model_config, system_instruction(&profile));
    let relay = ChatRelay::new(client, model_config.deadline);
    relay.initialize().await;

    let controller = ChatController::new(Arc::new(relay));

    let welcome = welcome_envelope(&profile);
    controller.seed_welcome(&welcome).await;
    render::assistant_turn(&welcome);

    // Confirmation notice watcher; prints when the toast turns visible.
    let mut toast_visible = controller.toast().subscribe();
    tokio::spawn(async move {
        while toast_visible.changed().await.is_ok() {
            if *toast_visible.borrow() {
                render::confirmation_toast();
            }
        }
    });

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input.as_str())?;

        if input == "/salir" {
            break;
        }

        // A bare number selects an option button from the last turn.
        if let Ok(index) = input.parse::<usize>() {
            let selected = controller
                .last_envelope()
                .await
                .and_then(|envelope| envelope.options.get(index.wrapping_sub(1)).cloned());

            if let Some(option) = selected {
                match controller.activate_option(&option).await {
                    OptionOutcome::OpenExternal(url) => render::external_target(&url),
                    OptionOutcome::Replied(envelope) => render::assistant_turn(&envelope),
                    OptionOutcome::Ignored => {}
                }
                continue;
            }
            println!("{}", "Esa opción no está disponible.".dimmed());
            continue;
        }

        render::thinking_notice();
        match controller.send(&input).await {
            SendOutcome::Replied(envelope) => render::assistant_turn(&envelope),
            SendOutcome::Ignored => {}
        }
    }

    println!("{}", "¡Hasta pronto! 🍷".dimmed());
    Ok(())
}
