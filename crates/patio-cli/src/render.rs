//! Terminal rendering for assistant turns.

use colored::Colorize;
use patio_core::envelope::{OptionKind, ResponseEnvelope};

/// Prints one assistant envelope: message text, reservation summary when
/// present, and the numbered option buttons.
pub fn assistant_turn(envelope: &ResponseEnvelope) {
    println!();
    println!("{}", envelope.message.bright_white());

    if let Some(details) = &envelope.reservation_details {
        println!();
        for (field, value) in details {
            println!("  {} {}", format!("{field}:").dimmed(), value);
        }
    }

    if !envelope.options.is_empty() {
        println!();
        for (index, option) in envelope.options.iter().enumerate() {
            let action = match option.kind {
                OptionKind::Message => "enviar",
                OptionKind::Link => "abrir",
                OptionKind::Call => "contactar",
            };
            println!(
                "  {} {} {}",
                format!("[{}]", index + 1).bright_cyan(),
                option.label,
                format!("({action})").dimmed()
            );
        }
    }
    println!();
}

/// Prints the external target of a link/call option. The terminal front end
/// surfaces the URL instead of spawning a browser.
pub fn external_target(url: &str) {
    println!(
        "{} {}",
        "Abrir en el navegador:".bright_yellow(),
        url.underline()
    );
}

pub fn thinking_notice() {
    println!("{}", "Consultando agenda...".italic().dimmed());
}

pub fn confirmation_toast() {
    println!(
        "{}",
        "📧 Reserva Confirmada - Enviando comprobante al email...".bright_green()
    );
}
