use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of a paged search for one keyword
///
/// Serialises flat: `search_keyword`, `total_results`, then one entry per
/// stored page keyed by page number in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPageResult {
    pub search_keyword: String,

    /// `total` reported by page 1, if page 1 was stored and carried it
    pub total_results: Option<Value>,

    #[serde(flatten)]
    pub pages: BTreeMap<u32, Value>,
}

impl SearchPageResult {
    /// Converts to the JSON shape a keyword result set entry takes
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Builds a keyword result set keyed by position (`"0"`, `"1"`, ...)
pub fn result_set(results: &[SearchPageResult]) -> serde_json::Result<Value> {
    let mut set = serde_json::Map::new();
    for (position, result) in results.iter().enumerate() {
        set.insert(position.to_string(), result.to_json()?);
    }
    Ok(Value::Object(set))
}
