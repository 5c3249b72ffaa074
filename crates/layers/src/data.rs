use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

static NULL: FieldValue = FieldValue::Null;

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric reading of the value; `NaN` when it has none.
    ///
    /// Text is parsed so CSV-sourced columns still map to positions.
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            FieldValue::Bool(_) | FieldValue::Null => f64::NAN,
        }
    }

    /// String form used for icon ids and ordinal domains.
    pub fn as_key(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// Immutable, cheaply clonable record addressed by field index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Vec<FieldValue>")]
pub struct Row(Arc<[FieldValue]>);

impl Row {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self(values.into())
    }

    /// Value at `idx`; out-of-range reads as `Null`.
    pub fn get(&self, idx: usize) -> &FieldValue {
        self.0.get(idx).unwrap_or(&NULL)
    }
}

impl From<Vec<FieldValue>> for Row {
    fn from(values: Vec<FieldValue>) -> Self {
        Row::new(values)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Real,
    Integer,
    #[default]
    String,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered, index-addressable table handed over by the data subsystem.
///
/// `version` is bumped by the owner whenever rows change in place; together
/// with `id` and the row count it identifies the contents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(id: impl Into<String>, fields: Vec<Field>, rows: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            fields,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row index, in order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dataset, FieldType, FieldValue, Row};

    #[test]
    fn numeric_reading_parses_text_and_rejects_others() {
        assert_eq!(FieldValue::Number(2.5).as_f64(), 2.5);
        assert_eq!(FieldValue::Text(" -3 ".into()).as_f64(), -3.0);
        assert!(FieldValue::Text("pin".into()).as_f64().is_nan());
        assert!(FieldValue::Null.as_f64().is_nan());
        assert!(FieldValue::Bool(true).as_f64().is_nan());
    }

    #[test]
    fn keys_use_display_form() {
        assert_eq!(FieldValue::Number(3.0).as_key().as_deref(), Some("3"));
        assert_eq!(FieldValue::Bool(false).as_key().as_deref(), Some("false"));
        assert_eq!(FieldValue::Null.as_key(), None);
    }

    #[test]
    fn out_of_range_reads_null() {
        let row = Row::new(vec![1.0.into()]);
        assert!(row.get(5).is_null());
        assert_eq!(row.clone().get(0), &FieldValue::Number(1.0));
    }

    #[test]
    fn dataset_deserializes_from_json() {
        let json = r#"{
            "id": "places",
            "fields": [{"name": "lat", "type": "real"}, {"name": "icon"}],
            "rows": [[37.7, "pin"], [null, true]]
        }"#;
        let ds: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.version, 0);
        assert_eq!(ds.fields[1].field_type, FieldType::String);
        assert_eq!(ds.fields[1].name, "icon");
        assert_eq!(ds.rows[0].get(1), &FieldValue::Text("pin".into()));
        assert!(ds.rows[1].get(0).is_null());
        assert_eq!(ds.rows[1].get(1), &FieldValue::Bool(true));
        assert_eq!(ds.all_indices(), vec![0, 1]);
    }
}
