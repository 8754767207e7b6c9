use std::fmt;

use serde::Deserialize;
use serde_json::{Number, Value};

/// Body of `GET /domain-relations`.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

/// Identifiers arrive either as JSON strings or as JSON numbers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(Number),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => match number.as_f64() {
                // Integral floats print without a fraction, so `1.0` and `1` name the same node.
                Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e21 => {
                    write!(f, "{}", value as i128)
                }
                _ => write!(f, "{number}"),
            },
        }
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<u64> for RawId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawNode {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<RawColumn>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawEdge {
    pub source: RawId,
    pub target: RawId,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub dataset: RawDataset,
    pub examples: Vec<RawExample>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawDataset {
    #[serde(default)]
    pub name: Option<String>,
    pub package: RawPackage,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawPackage {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawExample {
    pub value: Value,
}

impl RawExample {
    /// Text shown in the detail table.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
