//! Catalog item records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog entry: a display title plus the full set of source columns as
/// opaque scalar values (string, number, or null).
///
/// Records are immutable once loaded. The `fields` map retains every source
/// column, including the title column under its original header, so the
/// payload returned with a search hit matches the source row verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Display title, taken from the configured title column.
    pub title: String,

    /// All source columns in header order.
    pub fields: Map<String, Value>,
}

impl CatalogRecord {
    /// Create a record from a title and its source columns.
    pub fn new(title: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    /// Look up a field by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The full record as a JSON object, suitable for use as an opaque
    /// search-hit payload.
    pub fn to_payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Render the text representation that gets embedded for this record:
    /// the title first, then each nonempty auxiliary field as
    /// `"label: value"`, joined by `". "`. Null and blank values are
    /// omitted, as is the title column itself (it already leads the text).
    pub fn embedding_text(&self, title_field: &str) -> String {
        let mut parts = vec![self.title.clone()];
        for (label, value) in &self.fields {
            if label == title_field {
                continue;
            }
            if let Some(text) = scalar_text(value) {
                parts.push(format!("{label}: {text}"));
            }
        }
        parts.join(". ")
    }
}

/// Render a scalar field value for embedding, or `None` if it carries no
/// content. Integral numbers render without a decimal point.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| format!("{f}"))
            }
        }
        // Catalog scalars are strings, numbers, or nulls; anything else is
        // passed through as payload but never embedded.
        _ => None,
    }
}
