use crate::utils::error::{ReporterError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use mongodb::bson::Bson;

/// A scalar cell value taken from an upstream document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    String(String),
}

impl FieldValue {
    /// Renders the value as a CSV cell.
    ///
    /// Floats use six fixed decimals (`10.5` becomes `10.500000`), timestamps
    /// are RFC 3339 in UTC at second precision, and null is the empty string.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) if f.is_finite() => format!("{:.6}", f),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
            FieldValue::String(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                // u64 超出 i64 範圍時保留原始文字
                None if n.is_u64() => FieldValue::String(n.to_string()),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            serde_json::Value::String(s) => FieldValue::String(s),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                FieldValue::String(nested.to_string())
            }
        }
    }
}

impl From<Bson> for FieldValue {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Null | Bson::Undefined => FieldValue::Null,
            Bson::Boolean(b) => FieldValue::Boolean(b),
            Bson::Int32(i) => FieldValue::Integer(i as i64),
            Bson::Int64(i) => FieldValue::Integer(i),
            Bson::Double(f) => FieldValue::Float(f),
            Bson::String(s) => FieldValue::String(s),
            Bson::ObjectId(oid) => FieldValue::String(oid.to_hex()),
            Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
                .map(FieldValue::Timestamp)
                .unwrap_or_else(|| FieldValue::String(dt.to_string())),
            nested @ (Bson::Document(_) | Bson::Array(_)) => {
                FieldValue::String(nested.into_relaxed_extjson().to_string())
            }
            other => FieldValue::String(other.to_string()),
        }
    }
}

/// One upstream item (a cluster, a database, an aggregation output document).
///
/// Field order is the order in which fields were inserted, which for decoded
/// documents is their natural order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub data: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.data.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<mongodb::bson::Document> for Record {
    fn from(doc: mongodb::bson::Document) -> Self {
        Self {
            data: doc.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

/// How a report decides its header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Declared columns, in declared order.
    Fixed(Vec<String>),
    /// The first record's field names become the header for the whole run.
    DeriveFromFirst,
}

impl ColumnPolicy {
    pub fn fixed<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ReporterError::ValidationError {
                message: "a fixed column policy needs at least one column".to_string(),
            });
        }
        Ok(ColumnPolicy::Fixed(columns))
    }
}

/// Header plus string rows, every row as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ClusterInfo,
    DatabaseInfo,
    UserInfo,
    GridFsInfo,
    QueryResults,
}

impl ReportKind {
    /// The middle segment of the output file name.
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::ClusterInfo => "clusterinfo",
            ReportKind::DatabaseInfo => "dbinfo",
            ReportKind::UserInfo => "users",
            ReportKind::GridFsInfo => "FSINFO",
            ReportKind::QueryResults => "Results",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub output_path: String,
    pub row_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::doc;

    #[test]
    fn test_cell_formatting() {
        assert_eq!(FieldValue::Integer(42).to_cell(), "42");
        assert_eq!(FieldValue::Float(10.5).to_cell(), "10.500000");
        assert_eq!(FieldValue::Boolean(false).to_cell(), "false");
        assert_eq!(FieldValue::Null.to_cell(), "");
        assert_eq!(FieldValue::from("a,b").to_cell(), "a,b");

        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(FieldValue::Timestamp(ts).to_cell(), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(FieldValue::from(serde_json::json!(7)), FieldValue::Integer(7));
        assert_eq!(FieldValue::from(serde_json::json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from(serde_json::json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from(serde_json::json!({"k": 1})),
            FieldValue::String("{\"k\":1}".to_string())
        );
    }

    #[test]
    fn test_record_from_document_keeps_order() {
        let record = Record::from(doc! { "_id": "image/png", "totalSize": 2048_i64, "fileCount": 3 });
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["_id", "totalSize", "fileCount"]);
        assert_eq!(record.get("fileCount"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_bson_datetime_becomes_timestamp() {
        let dt = mongodb::bson::DateTime::from_millis(1_705_314_600_000);
        assert_eq!(
            FieldValue::from(Bson::DateTime(dt)).to_cell(),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn test_fixed_policy_rejects_empty() {
        assert!(ColumnPolicy::fixed(Vec::<String>::new()).is_err());
        assert_eq!(
            ColumnPolicy::fixed(["Name"]).unwrap(),
            ColumnPolicy::Fixed(vec!["Name".to_string()])
        );
    }
}
