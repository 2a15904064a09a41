use openrouter_api::{normalize_models_url, normalize_responses_url};

#[test]
fn url_normalization_keeps_existing_responses_endpoint() {
    assert_eq!(
        normalize_responses_url("https://openrouter.ai/api/v1/responses"),
        "https://openrouter.ai/api/v1/responses"
    );
}

#[test]
fn url_normalization_appends_responses_to_generic_base() {
    assert_eq!(
        normalize_responses_url("https://openrouter.ai/api/v1/"),
        "https://openrouter.ai/api/v1/responses"
    );
}

#[test]
fn url_normalization_defaults_blank_base() {
    assert_eq!(
        normalize_responses_url("   "),
        "https://openrouter.ai/api/v1/responses"
    );
    assert_eq!(normalize_models_url(""), "https://openrouter.ai/api/v1/models");
}

#[test]
fn url_normalization_swaps_between_endpoints() {
    assert_eq!(
        normalize_models_url("https://openrouter.ai/api/v1/responses"),
        "https://openrouter.ai/api/v1/models"
    );
    assert_eq!(
        normalize_responses_url("http://127.0.0.1:9/v1/models"),
        "http://127.0.0.1:9/v1/responses"
    );
}
