//! Outbound message enrichment
//!
//! Before a message goes to the assistant we append whatever context we know,
//! so the server side does not have to ask for it again. Price questions get
//! the full set of fields the prediction model needs, with defaults filled in.

use chrono::{Datelike, Local, NaiveDate};

use crate::context::ConversationContext;

pub const DEFAULT_LOCATION: &str = "Colombo";
pub const DEFAULT_BANANA_TYPE: &str = "ambul";
pub const DEFAULT_QUANTITY: u32 = 5;

/// Words that mean the user already spelled the context out
const EXPLICIT_KEYWORDS: [&str; 3] = ["location", "type", "quantity"];
const PRICE_KEYWORDS: [&str; 2] = ["price", "cost"];

/// Calendar fields the price model expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarStamp {
    /// 1-12
    pub month: u32,
    pub week_of_month: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    pub day_of_month: u32,
}

impl CalendarStamp {
    pub fn from_date(date: NaiveDate) -> Self {
        let day = date.day();
        Self {
            month: date.month(),
            week_of_month: day.div_ceil(7),
            day_of_week: date.weekday().num_days_from_sunday(),
            day_of_month: day,
        }
    }

    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// Sent as typed because it already names its context
    Explicit,
    PricePrediction,
    Context,
    None,
}

impl Enrichment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enrichment::Explicit => "explicit",
            Enrichment::PricePrediction => "price_prediction",
            Enrichment::Context => "context",
            Enrichment::None => "none",
        }
    }
}

/// The text actually sent to the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub enrichment: Enrichment,
}

/// Build the outbound text for `raw` given the merged context.
///
/// Rules are checked in order: explicit context passes through untouched,
/// price or cost questions get the prediction suffix, anything else gets a
/// short "Context:" clause when at least one field is known.
pub fn format_message(
    raw: &str,
    context: &ConversationContext,
    stamp: CalendarStamp,
) -> OutboundMessage {
    let lowered = raw.to_lowercase();

    if EXPLICIT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return OutboundMessage {
            text: raw.to_string(),
            enrichment: Enrichment::Explicit,
        };
    }

    if PRICE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return OutboundMessage {
            text: price_prediction_message(raw, context, stamp),
            enrichment: Enrichment::PricePrediction,
        };
    }

    let mut details = Vec::new();
    if let Some(location) = &context.location {
        details.push(format!("My location is {}", location));
    }
    if let Some(variety) = &context.crop_variety {
        details.push(format!("I'm growing {} bananas", variety));
    }
    if let Some(quantity) = context.quantity {
        details.push(format!("I have {} kg", quantity));
    }

    if details.is_empty() {
        OutboundMessage {
            text: raw.to_string(),
            enrichment: Enrichment::None,
        }
    } else {
        OutboundMessage {
            text: format!("{}. Context: {}", raw, details.join(". ")),
            enrichment: Enrichment::Context,
        }
    }
}

fn price_prediction_message(
    raw: &str,
    context: &ConversationContext,
    stamp: CalendarStamp,
) -> String {
    let location = context.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let banana_type = context
        .crop_variety
        .as_deref()
        .unwrap_or(DEFAULT_BANANA_TYPE);
    let quantity = context.quantity.unwrap_or(DEFAULT_QUANTITY);

    format!(
        "{}. I need a price prediction with the following details: \
         location={}, banana_type={}, quantity={}, month={}, week_of_month={}, \
         day_of_week={}, day_of_month={}, include_all_features=true",
        raw,
        location,
        banana_type,
        quantity,
        stamp.month,
        stamp.week_of_month,
        stamp.day_of_week,
        stamp.day_of_month,
    )
}
