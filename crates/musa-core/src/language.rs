use serde::{Deserialize, Serialize};

/// Language the assistant should answer in, independent of the UI locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatLanguage {
    #[default]
    English,
    Sinhala,
}

impl ChatLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatLanguage::English => "english",
            ChatLanguage::Sinhala => "sinhala",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Some(ChatLanguage::English),
            "sinhala" | "si" => Some(ChatLanguage::Sinhala),
            _ => None,
        }
    }

    pub fn all() -> Vec<ChatLanguage> {
        vec![ChatLanguage::English, ChatLanguage::Sinhala]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatLanguage::English => "English",
            ChatLanguage::Sinhala => "Sinhala",
        }
    }
}
