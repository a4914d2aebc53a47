use colored::*;
use musa_core::api::{BestMarket, ResponseData};
use musa_core::{ChatRole, ChatTurn, ConnectionStatus, ContextField, ConversationContext};

/// "Current Context: Location: Galle | Quantity: 20 kg", or nothing when empty
pub fn context_line(context: &ConversationContext) -> Option<String> {
    if context.is_empty() {
        return None;
    }

    let chips: Vec<String> = context
        .chips()
        .into_iter()
        .map(|(field, value)| format!("{}: {}", field.display_name(), value))
        .collect();

    Some(format!("Current Context: {}", chips.join(" | ")))
}

pub fn market_card(market: &BestMarket) -> Vec<String> {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    vec![
        "Market Recommendation".to_string(),
        format!("  Best Market:      {}", or_dash(market.name.clone())),
        format!(
            "  Price:            {} LKR/kg",
            or_dash(market.predicted_price.map(|p| p.to_string()))
        ),
        format!(
            "  Distance:         {} km",
            or_dash(market.distance.map(|d| d.to_string()))
        ),
        format!(
            "  Potential Profit: {} LKR",
            or_dash(market.potential_profit.map(|p| format!("{:.2}", p)))
        ),
    ]
}

/// Only shown when the reply carries a price
pub fn price_card(data: &ResponseData) -> Option<Vec<String>> {
    let price = data.price?;
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    Some(vec![
        "Price Prediction".to_string(),
        format!(
            "  Price:       {} {}/kg",
            price,
            data.currency.as_deref().unwrap_or("LKR")
        ),
        format!("  Banana Type: {}", or_dash(&data.banana_type)),
        format!("  Location:    {}", or_dash(&data.location)),
        format!("  Date:        {}", or_dash(&data.date)),
    ])
}

/// "location|type|quantity|all", the arguments `/clear` accepts
pub fn clear_choices() -> String {
    let mut names: Vec<&str> = ContextField::all().iter().map(|f| f.as_str()).collect();
    names.push("all");
    names.join("|")
}

pub fn status_badge(status: ConnectionStatus) -> Option<&'static str> {
    match status {
        ConnectionStatus::Disconnected => Some("Offline"),
        ConnectionStatus::Unknown | ConnectionStatus::Connected => None,
    }
}

pub fn print_turn(turn: &ChatTurn) {
    match turn.role {
        ChatRole::User => println!("{} {}", "You:".bold().cyan(), turn.text),
        ChatRole::Assistant => {
            println!("{} {}", "Musa:".bold().green(), turn.text);
            if let Some(data) = &turn.data {
                print_data(data);
            }
        }
    }
}

fn print_data(data: &ResponseData) {
    if let Some(market) = &data.best_market {
        print_card(&market_card(market));
    }
    if let Some(card) = price_card(data) {
        print_card(&card);
    }
}

fn print_card(lines: &[String]) {
    if let Some((title, rows)) = lines.split_first() {
        println!("  {}", title.bold().blue());
        for row in rows {
            println!("  {}", row);
        }
    }
}

pub fn print_header(language: &str, status: ConnectionStatus) {
    let mut header = format!("{} {}", "Language:".dimmed(), language.bold());
    if let Some(badge) = status_badge(status) {
        header.push_str(&format!("  {}", badge.on_red().white()));
    }
    println!("{}", header);
}

pub fn print_context(context: &ConversationContext) {
    match context_line(context) {
        Some(line) => println!("{}", line.cyan()),
        None => println!("{}", "No context yet".dimmed()),
    }
}

pub fn print_help() {
    println!("{}", "Commands".bold().blue());
    println!("  /context              show the remembered context");
    println!("  /clear [{}]", clear_choices());
    println!("                        forget one remembered field, or everything");
    println!("  /lang [name]          show or switch the answer language");
    println!("  /retry                reconnect to the assistant");
    println!("  /help                 show this help");
    println!("  /quit                 leave the chat");
}
