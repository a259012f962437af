//! Built-in provider catalog
//!
//! The set of LLM providers the backend can summarize with, loaded from the
//! providers.toml table at build time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An LLM provider understood by the summarizer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Ollama,
    Anthropic,
    Google,
    Groq,
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::OpenAi,
        Provider::Ollama,
        Provider::Anthropic,
        Provider::Google,
        Provider::Groq,
        Provider::DeepSeek,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Groq => "groq",
            Provider::DeepSeek => "deepseek",
        }
    }

    pub fn info(&self) -> ProviderInfo {
        find_provider(self.id()).expect("providers.toml lists every provider variant")
    }

    pub fn display_name(&self) -> String {
        self.info().display_name
    }

    pub fn default_model(&self) -> String {
        self.info().default_model
    }

    pub fn default_base_url(&self) -> Option<String> {
        self.info().base_url
    }

    /// Whether the backend serves this provider over the streaming endpoint.
    pub fn streams(&self) -> bool {
        self.info().streaming
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Provider::ALL
            .iter()
            .copied()
            .find(|provider| provider.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| {
                format!(
                    "unknown provider '{id}' (expected one of: openai, ollama, anthropic, google, groq, deepseek)"
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub display_name: String,
    pub default_model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub streaming: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderTable {
    providers: Vec<ProviderInfo>,
}

/// Load the built-in providers from the embedded table.
pub fn load_providers() -> Vec<ProviderInfo> {
    const TABLE_CONTENT: &str = include_str!("../providers.toml");

    let table: ProviderTable =
        toml::from_str(TABLE_CONTENT).expect("Failed to parse providers.toml");

    table.providers
}

/// Find a built-in provider by ID (case-insensitive).
pub fn find_provider(id: &str) -> Option<ProviderInfo> {
    load_providers()
        .into_iter()
        .find(|provider| provider.id.eq_ignore_ascii_case(id))
}
