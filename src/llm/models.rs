//! Provider endpoints and generation defaults.

/// HuggingFace Inference API base; the model id is appended.
pub const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

/// OpenRouter chat completions endpoint
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const DEFAULT_HF_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-thinking-exp:free";

/// Wall-clock bound on a single generation request. A hung remote call fails
/// with `ApiError::Timeout` instead of stalling the session.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.max_tokens, 2048);
        assert!(params.temperature > 0.0 && params.temperature < 1.0);
        assert!(params.top_p > 0.0 && params.top_p <= 1.0);
    }

    #[test]
    fn test_endpoints_are_https() {
        assert!(HF_INFERENCE_BASE.starts_with("https://"));
        assert!(OPENROUTER_URL.starts_with("https://"));
    }
}
