use anyhow::Result;
use colored::*;
use musa_core::{AssistantBackend, ChatLanguage, Config, ContextField};

use crate::app::App;
use crate::ui;

/// What a line typed at the prompt asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Message(String),
    Quit,
    Help,
    Retry,
    ShowContext,
    Clear(Option<ContextField>),
    ShowLanguage,
    SetLanguage(String),
    Unknown(String),
    Empty,
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match (name.as_str(), arg) {
        ("quit" | "exit" | "q", _) => Input::Quit,
        ("help" | "?", _) => Input::Help,
        ("retry" | "reconnect", _) => Input::Retry,
        ("context", _) => Input::ShowContext,
        ("clear", Some("all")) | ("clear", None) => Input::Clear(None),
        ("clear", Some(field)) => match ContextField::from_str(field) {
            Some(field) => Input::Clear(Some(field)),
            None => Input::Unknown(line.to_string()),
        },
        ("lang" | "language", None) => Input::ShowLanguage,
        ("lang" | "language", Some(lang)) => Input::SetLanguage(lang.to_string()),
        _ => Input::Unknown(line.to_string()),
    }
}

pub async fn handle_input<B: AssistantBackend>(app: &mut App<B>, line: &str) -> Result<()> {
    match parse_input(line) {
        Input::Empty => {}
        Input::Message(text) => {
            println!("{}", "Thinking...".dimmed());
            app.session.submit_user_message(&text).await;
        }
        Input::Quit => app.should_quit = true,
        Input::Help => ui::print_help(),
        Input::Retry => {
            println!("{}", "Reconnecting...".dimmed());
            app.session.retry_connection().await;
        }
        Input::ShowContext => ui::print_context(app.session.context()),
        Input::Clear(Some(field)) => {
            app.session.clear_context(field);
            ui::print_context(app.session.context());
        }
        Input::Clear(None) => {
            app.session.clear_all_context();
            ui::print_context(app.session.context());
        }
        Input::ShowLanguage => {
            let options: Vec<&str> = app
                .session
                .supported_languages()
                .iter()
                .map(|l| l.display_name())
                .collect();
            println!(
                "{} {} ({})",
                "Language:".dimmed(),
                app.session.language().display_name().bold(),
                options.join(", ")
            );
        }
        Input::SetLanguage(name) => match ChatLanguage::from_str(&name) {
            Some(language) if app.session.set_language(language) => {
                // Remember the choice for next time
                if let Err(err) = Config::save_language(language) {
                    tracing::warn!("could not save language preference: {err}");
                }
                ui::print_header(language.as_str(), app.session.status());
            }
            _ => println!("{} {}", "Unsupported language:".red(), name),
        },
        Input::Unknown(text) if text.to_lowercase().starts_with("/clear") => {
            println!("{} {}", "Unknown field:".red(), text);
            println!("Try /clear [{}]", ui::clear_choices());
        }
        Input::Unknown(text) => {
            println!("{} {}", "Unknown command:".red(), text);
            ui::print_help();
        }
    }

    Ok(())
}
