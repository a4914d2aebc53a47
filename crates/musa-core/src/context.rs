//! Conversation context carried across chat turns
//!
//! The assistant works best when it knows where the farmer is, which banana
//! variety they grow and how much they harvested. Those three facts are
//! pulled out of free text with simple pattern rules and remembered until
//! the user clears them or a newer value arrives.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::api::ResponseData;

/// "location", optionally "is", then letters and spaces
static LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)location(?:\s+is)?\s+([a-zA-Z\s]+)").expect("Invalid location regex")
});

/// "type", optionally "is", then letters and spaces
static VARIETY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)type(?:\s+is)?\s+([a-zA-Z\s]+)").expect("Invalid variety regex")
});

/// Digits followed by a kilogram unit
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)(?:\s*kg|\s*kilos|\s*kilograms)").expect("Invalid quantity regex")
});

/// One of the three remembered context facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextField {
    Location,
    CropVariety,
    Quantity,
}

impl ContextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextField::Location => "location",
            ContextField::CropVariety => "type",
            ContextField::Quantity => "quantity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "location" => Some(ContextField::Location),
            "type" | "variety" | "banana_type" => Some(ContextField::CropVariety),
            "quantity" => Some(ContextField::Quantity),
            _ => None,
        }
    }

    pub fn all() -> Vec<ContextField> {
        vec![
            ContextField::Location,
            ContextField::CropVariety,
            ContextField::Quantity,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ContextField::Location => "Location",
            ContextField::CropVariety => "Type",
            ContextField::Quantity => "Quantity",
        }
    }
}

/// Fields found in a single message. Absent fields mean "no match", not "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub location: Option<String>,
    pub crop_variety: Option<String>,
    pub quantity: Option<u32>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.crop_variety.is_none() && self.quantity.is_none()
    }
}

/// Session-scoped farming context shown as chips next to the chat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub location: Option<String>,
    pub crop_variety: Option<String>,
    pub quantity: Option<u32>,
}

/// Pull location, variety and quantity out of a raw user message.
///
/// Each rule runs independently and only its first match counts. A capture
/// that is blank after trimming, or a number too large for `u32`, is
/// treated the same as no match.
pub fn extract(raw: &str) -> ExtractionResult {
    ExtractionResult {
        location: capture_text(&LOCATION_PATTERN, raw),
        crop_variety: capture_text(&VARIETY_PATTERN, raw),
        quantity: QUANTITY_PATTERN
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok()),
    }
}

fn capture_text(pattern: &Regex, raw: &str) -> Option<String> {
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.crop_variety.is_none() && self.quantity.is_none()
    }

    /// Merged view: new values where the extraction found one, old ones elsewhere
    pub fn resolve(&self, extraction: &ExtractionResult) -> ConversationContext {
        ConversationContext {
            location: extraction
                .location
                .clone()
                .or_else(|| self.location.clone()),
            crop_variety: extraction
                .crop_variety
                .clone()
                .or_else(|| self.crop_variety.clone()),
            quantity: extraction.quantity.or(self.quantity),
        }
    }

    pub fn merge(&mut self, extraction: ExtractionResult) {
        if let Some(location) = extraction.location {
            self.location = Some(location);
        }
        if let Some(variety) = extraction.crop_variety {
            self.crop_variety = Some(variety);
        }
        if let Some(quantity) = extraction.quantity {
            self.quantity = Some(quantity);
        }
    }

    /// Extract from `raw`, write the result back and return the merged view
    pub fn extract_and_merge(&mut self, raw: &str) -> ConversationContext {
        let extraction = extract(raw);
        let resolved = self.resolve(&extraction);
        self.merge(extraction);
        resolved
    }

    /// Values the assistant echoed back override what we had
    pub fn apply_response(&mut self, data: &ResponseData) {
        if let Some(location) = non_blank(data.location.as_deref()) {
            self.location = Some(location);
        }
        if let Some(variety) = non_blank(data.banana_type.as_deref()) {
            self.crop_variety = Some(variety);
        }
        if let Some(quantity) = data.quantity {
            self.quantity = Some(quantity);
        }
    }

    pub fn clear(&mut self, field: ContextField) {
        match field {
            ContextField::Location => self.location = None,
            ContextField::CropVariety => self.crop_variety = None,
            ContextField::Quantity => self.quantity = None,
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Known fields in display order, values formatted for a chip
    pub fn chips(&self) -> Vec<(ContextField, String)> {
        let mut chips = Vec::new();
        if let Some(location) = &self.location {
            chips.push((ContextField::Location, location.clone()));
        }
        if let Some(variety) = &self.crop_variety {
            chips.push((ContextField::CropVariety, variety.clone()));
        }
        if let Some(quantity) = self.quantity {
            chips.push((ContextField::Quantity, format!("{} kg", quantity)));
        }
        chips
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
