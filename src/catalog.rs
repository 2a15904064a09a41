//! Zero-cost filtering of the model catalog.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogModel {
    pub id: String,
    pub display_name: String,
}

/// Keeps catalog entries whose prompt and completion prices are both zero.
///
/// Prices may be strings or numbers; a missing price counts as zero. Entries
/// with a null price or one that does not parse are skipped.
pub fn free_models(entries: &[Value]) -> Vec<CatalogModel> {
    entries
        .iter()
        .filter(|entry| is_free(entry))
        .map(|entry| {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            CatalogModel {
                display_name: display_name(entry, &id),
                id,
            }
        })
        .collect()
}

fn is_free(entry: &Value) -> bool {
    let pricing = entry.get("pricing");
    let prompt = price(pricing.and_then(|pricing| pricing.get("prompt")));
    let completion = price(pricing.and_then(|pricing| pricing.get("completion")));

    matches!(
        (prompt, completion),
        (Some(prompt), Some(completion)) if prompt == 0.0 && completion == 0.0
    )
}

fn price(value: Option<&Value>) -> Option<f64> {
    match value {
        None => Some(0.0),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
}

fn display_name(entry: &Value, id: &str) -> String {
    ["name", "display_name"]
        .iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .find(|name| !name.is_empty())
        .unwrap_or(id)
        .to_string()
}
