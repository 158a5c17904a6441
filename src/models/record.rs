//! Formula record interface
//!
//! The duplicate detector only needs an id and a formula from each record.
//! Richer domain objects implement [`FormulaRecord`] to take part.

use std::fmt;

use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// Anything that carries a mixing formula and an identity
pub trait FormulaRecord {
    type Id: Eq;

    fn id(&self) -> &Self::Id;

    fn formula(&self) -> &str;
}

/// Opaque record key supplied by callers: a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum RecordKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Number(n) => write!(f, "{}", n),
            RecordKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        RecordKey::Number(n)
    }
}

impl From<i32> for RecordKey {
    fn from(n: i32) -> Self {
        RecordKey::Number(i64::from(n))
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        RecordKey::Text(s.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(s: String) -> Self {
        RecordKey::Text(s)
    }
}

/// A bare `{id, formula}` record, as supplied by external callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FormulaEntry {
    pub id: RecordKey,
    #[serde(default)]
    pub formula: String,
}

impl FormulaEntry {
    pub fn new(id: impl Into<RecordKey>, formula: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            formula: formula.into(),
        }
    }
}

impl FormulaRecord for FormulaEntry {
    type Id = RecordKey;

    fn id(&self) -> &RecordKey {
        &self.id
    }

    fn formula(&self) -> &str {
        &self.formula
    }
}
