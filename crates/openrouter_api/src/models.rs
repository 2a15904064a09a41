use serde::Deserialize;
use serde_json::Value;

/// Body of the model catalog endpoint.
///
/// Entries stay raw JSON; pricing fields arrive as strings or numbers
/// depending on the upstream provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<Value>,
}
