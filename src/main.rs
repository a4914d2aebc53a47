use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use musa_core::{
    extract, format_message, AssistantBackend, AssistantClient, CalendarStamp, ChatLanguage,
    ChatSession, Config, ConversationContext,
};

mod app;
mod handler;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "musa")]
#[command(about = "Chat with the Smat Musa banana farming assistant")]
struct Cli {
    /// Assistant API base URL (overrides MUSA_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation (default)
    Chat {
        /// Answer language: english or sinhala
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Check whether the assistant API is reachable
    Ping,
    /// List languages the assistant API supports
    Languages,
    /// Show what would be sent for a message, without contacting the API
    Format {
        /// The message as typed
        message: String,
        /// Previously known location
        #[arg(long)]
        location: Option<String>,
        /// Previously known banana type
        #[arg(long = "type")]
        banana_type: Option<String>,
        /// Previously known quantity in kg
        #[arg(long)]
        quantity: Option<u32>,
        /// Date to use for price questions (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("could not read config, using defaults: {err}");
        Config::new()
    });
    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.resolved_api_url());

    match cli.command.unwrap_or(Commands::Chat { language: None }) {
        Commands::Chat { language } => {
            let language = match language {
                Some(name) => ChatLanguage::from_str(&name)
                    .ok_or_else(|| anyhow::anyhow!("Unsupported language: {}", name))?,
                None => config.chat_language(),
            };
            let client = build_client(&api_url, &config)?;
            let mut app = App::new(ChatSession::new(client, language));
            app.run().await?
        }
        Commands::Ping => ping(&api_url, &config).await?,
        Commands::Languages => list_languages(&api_url, &config).await?,
        Commands::Format {
            message,
            location,
            banana_type,
            quantity,
            date,
        } => {
            let context = ConversationContext {
                location,
                crop_variety: banana_type,
                quantity,
            };
            preview_message(&message, context, date)
        }
    }

    Ok(())
}

fn build_client(api_url: &str, config: &Config) -> Result<AssistantClient> {
    Ok(AssistantClient::with_timeout(api_url, config.request_timeout())?)
}

async fn ping(api_url: &str, config: &Config) -> Result<()> {
    let client = build_client(api_url, config)?;

    match client.ping().await {
        Ok(()) => println!("{} {}", "Connected:".bold().green(), client.base_url()),
        Err(e) => {
            println!("{}: {}", "Offline".red(), e);
            println!("Set the API address with {} or {}", "--api-url".bold(), "MUSA_API_URL".bold());
        }
    }

    Ok(())
}

async fn list_languages(api_url: &str, config: &Config) -> Result<()> {
    let client = build_client(api_url, config)?;

    println!("\n{}", "Supported Languages".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match client.supported_languages().await {
        Ok(languages) if languages.is_empty() => {
            println!("{}", "The server did not list any languages".yellow());
        }
        Ok(languages) => {
            for language in languages {
                let known = ChatLanguage::from_str(&language).is_some();
                if known {
                    println!("  • {}", language.green());
                } else {
                    println!("  • {} {}", language, "(not supported by this client)".dimmed());
                }
            }
        }
        Err(e) => println!("{}: {}", "Error contacting the assistant".red(), e),
    }

    Ok(())
}

fn preview_message(message: &str, mut context: ConversationContext, date: Option<NaiveDate>) {
    let stamp = date
        .map(CalendarStamp::from_date)
        .unwrap_or_else(CalendarStamp::today);

    let extraction = extract(message);
    context.merge(extraction);
    let outbound = format_message(message, &context, stamp);

    if let Some(line) = ui::context_line(&context) {
        println!("{}", line.cyan());
    }
    println!("{} {}", "Enrichment:".bold(), outbound.enrichment.as_str());
    println!("{}", outbound.text);
}
