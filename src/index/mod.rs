//! Keyword-to-topic-id indexing
//!
//! Search output arrives as loosely shaped JSON: an object of keyword
//! entries, each holding a `search_keyword`, a `total_results` and one
//! record per page whose `data` list carries topic summaries. This module
//! parses that shape once at the boundary into [`KeywordResultSet`],
//! dropping every branch that does not match, and flattens it into a
//! [`KeywordIdIndex`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a forum topic
///
/// The site emits ids both as strings and as integers; both are kept in
/// their textual form, which is what the comment endpoint takes. An integer
/// `1` and a string `"1"` are the same id, and ids order as text, so `"10"`
/// sorts before `"9"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id from a JSON scalar
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for TopicId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Mapping from search keyword to the topic ids found for it, in page then
/// item order. Duplicates are preserved.
pub type KeywordIdIndex = BTreeMap<String, Vec<TopicId>>;

/// One keyword's search output, reduced to what the indexer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordEntry {
    /// The keyword the search ran with; empty when missing or not a string
    pub search_keyword: String,

    /// Topic ids per page record, in document order
    pub pages: Vec<Vec<TopicId>>,
}

impl KeywordEntry {
    /// All ids of this entry, pages concatenated
    pub fn ids(&self) -> Vec<TopicId> {
        self.pages.iter().flatten().cloned().collect()
    }
}

/// Parsed form of a keyword result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordResultSet {
    pub entries: Vec<KeywordEntry>,
}

impl KeywordResultSet {
    /// Parses raw search output
    ///
    /// Never fails: a non-object root yields an empty set, a non-object
    /// entry is skipped, and inside an entry only object values holding a
    /// `data` array count as pages. Within `data`, only objects carrying an
    /// `id` contribute.
    pub fn from_json(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            return Self::default();
        };

        let entries = root.values().filter_map(parse_entry).collect();
        Self { entries }
    }

    /// Flattens the set into a keyword index
    ///
    /// Entries without a `search_keyword` are dropped. If two entries share
    /// a keyword, the later one wins.
    pub fn into_index(self) -> KeywordIdIndex {
        let mut index = KeywordIdIndex::new();
        for entry in self.entries {
            if entry.search_keyword.is_empty() {
                continue;
            }
            let ids = entry.ids();
            index.insert(entry.search_keyword, ids);
        }
        index
    }
}

fn parse_entry(value: &Value) -> Option<KeywordEntry> {
    let entry = value.as_object()?;

    let search_keyword = entry
        .get("search_keyword")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let pages = entry.values().filter_map(parse_page).collect();

    Some(KeywordEntry {
        search_keyword,
        pages,
    })
}

fn parse_page(value: &Value) -> Option<Vec<TopicId>> {
    let data = value.as_object()?.get("data")?.as_array()?;

    Some(
        data.iter()
            .filter_map(|item| item.as_object()?.get("id"))
            .filter_map(TopicId::from_json)
            .collect(),
    )
}

/// Extracts `keyword -> [ids]` from raw search output
///
/// # Example
///
/// ```
/// use pantip_harvest::index::extract_keyword_ids;
/// use serde_json::json;
///
/// let raw = json!({
///     "0": {
///         "search_keyword": "cat",
///         "total_results": 2,
///         "1": {"data": [{"id": 101}, {"id": "102"}]}
///     }
/// });
/// let index = extract_keyword_ids(&raw);
/// assert_eq!(index["cat"].len(), 2);
/// ```
pub fn extract_keyword_ids(value: &Value) -> KeywordIdIndex {
    KeywordResultSet::from_json(value).into_index()
}
