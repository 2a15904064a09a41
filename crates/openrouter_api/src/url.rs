/// Default base URL for OpenRouter requests.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

fn trimmed_base(input: &str) -> &str {
    let base = if input.trim().is_empty() {
        DEFAULT_OPENROUTER_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/')
}

/// Normalize a base URL to the Responses endpoint.
///
/// Normalization rules:
/// 1) keep `/responses` unchanged
/// 2) replace a trailing `/models` with `/responses`
/// 3) append `/responses` otherwise
pub fn normalize_responses_url(input: &str) -> String {
    let trimmed = trimmed_base(input);
    if trimmed.ends_with("/responses") {
        return trimmed.to_string();
    }
    if let Some(base) = trimmed.strip_suffix("/models") {
        return format!("{base}/responses");
    }
    format!("{trimmed}/responses")
}

/// Normalize a base URL to the model catalog endpoint, with the same rules as
/// [`normalize_responses_url`] mirrored.
pub fn normalize_models_url(input: &str) -> String {
    let trimmed = trimmed_base(input);
    if trimmed.ends_with("/models") {
        return trimmed.to_string();
    }
    if let Some(base) = trimmed.strip_suffix("/responses") {
        return format!("{base}/models");
    }
    format!("{trimmed}/models")
}
