//! LLM provider integration
//!
//! Two interchangeable text-generation backends: the HuggingFace Inference
//! API (single free-text prompt, list-shaped response) and OpenRouter
//! (chat completions). Which one handles a request is a configuration
//! choice; everything above this module only sees prompt in, text out.

pub mod client;
pub mod models;
pub mod parse;
pub mod prompts;

pub use client::{ApiError, ProviderClient};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "hf")]
    HuggingFace,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// Display name for user-facing output
    pub fn label(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "HuggingFace",
            Provider::OpenRouter => "OpenRouter",
        }
    }

    /// Short token used in commands and the config file
    pub fn token(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "hf",
            Provider::OpenRouter => "or",
        }
    }

    /// Parse a user-supplied provider name. Accepts the short tokens used in
    /// commands (`hf`, `or`) as well as full names.
    pub fn parse(s: &str) -> Option<Provider> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => Some(Provider::HuggingFace),
            "or" | "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!(Provider::parse("hf"), Some(Provider::HuggingFace));
        assert_eq!(Provider::parse("HuggingFace"), Some(Provider::HuggingFace));
        assert_eq!(Provider::parse("or"), Some(Provider::OpenRouter));
        assert_eq!(Provider::parse("OPENROUTER"), Some(Provider::OpenRouter));
        assert_eq!(Provider::parse("ollama"), None);
        assert_eq!(Provider::parse(""), None);
    }

    #[test]
    fn test_serde_tokens() {
        let json = serde_json::to_string(&Provider::HuggingFace).unwrap();
        assert_eq!(json, "\"hf\"");
        let back: Provider = serde_json::from_str("\"openrouter\"").unwrap();
        assert_eq!(back, Provider::OpenRouter);
    }
}
