use serde::{Deserialize, Serialize};
use serde_json::Value;

use phenotag_core::GenomicSpan;

///
/// One result document: an identifier plus its source body.
///
/// Accessors are total — a missing or mistyped field yields `None` (or an
/// empty list), never a panic, because per-record skips are the rules'
/// business, not the store's.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source: Value,
}

impl Document {
    pub fn new(id: &str, source: Value) -> Self {
        Document {
            id: id.to_string(),
            source,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.source.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// A field that may be stored as either a number or a numeric string
    /// (assembly builds come both ways).
    pub fn string_or_number(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn u32_field(&self, name: &str) -> Option<u32> {
        match self.field(name)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        match self.field(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Floats are parsed from strings too: the source datasets store
    /// p-values as decimal strings.
    pub fn f64_field(&self, name: &str) -> Option<f64> {
        match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// String-array field; absent or mistyped yields an empty list.
    pub fn str_list(&self, name: &str) -> Vec<String> {
        self.field(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nested sub-object as a borrowed value.
    pub fn sub(&self, name: &str) -> Option<&Value> {
        self.field(name).filter(|v| v.is_object())
    }

    /// Read a genomic span out of a nested sub-record holding
    /// build/seqid/start/end (the `build_info` shape).
    pub fn nested_span(&self, path: &str) -> Option<GenomicSpan> {
        let nested = self.sub(path)?;
        let wrapped = Document::new(&self.id, nested.clone());
        let build = wrapped.string_or_number("build")?;
        let seqid = wrapped.string_or_number("seqid")?;
        let start = wrapped.u32_field("start")?;
        let end = wrapped.u32_field("end")?;
        Some(GenomicSpan::new(&build, &seqid, start, end))
    }
}
