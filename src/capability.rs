//! Capability records: plugin payloads read through a fixed accessor contract.
//!
//! A compiler plugin hands its findings over as values whose concrete type is
//! defined outside this crate. The bridge never names that type. It only asks
//! the record for nine named observations and checks what comes back.
//!
//! Two kinds of record are supported:
//! - JSON objects (`serde_json::Value`), produced by out-of-process plugins
//! - any Rust type implementing [`PluginIssue`], wrapped in [`Typed`]

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The accessor names every plugin issue must answer, in report order.
pub const ACCESSORS: [&str; 9] = [
    "startLine",
    "startLineOffset",
    "endLine",
    "endLineOffset",
    "ruleID",
    "message",
    "issueType",
    "fileName",
    "reportedFilePath",
];

/// A value returned by an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Observation {
    /// Short name of the observation's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Observation::Integer(_) => "integer",
            Observation::Float(_) => "float",
            Observation::Text(_) => "string",
            Observation::Bool(_) => "boolean",
            Observation::Null => "null",
        }
    }
}

/// Why an accessor could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("accessor is missing")]
    Missing,
    #[error("accessor is not accessible: {0}")]
    Inaccessible(String),
    #[error("accessor failed: {0}")]
    Failed(String),
    #[error("integer out of range: {0}")]
    OutOfRange(String),
}

/// An opaque plugin payload that can be queried by accessor name.
pub trait CapabilityRecord: fmt::Debug + Send + Sync {
    /// Identifies the payload's type in error messages.
    fn type_name(&self) -> &str;

    /// Invoke the zero-argument accessor called `accessor`.
    fn observe(&self, accessor: &str) -> Result<Observation, AccessError>;
}

/// JSON records answer accessors with the object member of the same name.
impl CapabilityRecord for Value {
    fn type_name(&self) -> &str {
        match self {
            Value::Object(_) => "json object",
            Value::Array(_) => "json array",
            Value::String(_) => "json string",
            Value::Number(_) => "json number",
            Value::Bool(_) => "json boolean",
            Value::Null => "json null",
        }
    }

    fn observe(&self, accessor: &str) -> Result<Observation, AccessError> {
        let member = self
            .as_object()
            .and_then(|obj| obj.get(accessor))
            .ok_or(AccessError::Missing)?;

        Ok(match member {
            Value::Null => Observation::Null,
            Value::Bool(b) => Observation::Bool(*b),
            Value::Number(n) if n.is_u64() || n.is_i64() => match n.as_i64() {
                Some(i) => Observation::Integer(i),
                None => return Err(AccessError::OutOfRange(n.to_string())),
            },
            Value::Number(n) => Observation::Float(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Observation::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(AccessError::Inaccessible(format!(
                    "member {:?} is not a scalar",
                    accessor
                )))
            }
        })
    }
}

/// Nominal form of the accessor contract for plugins linked into the bridge.
pub trait PluginIssue: fmt::Debug + Send + Sync {
    fn start_line(&self) -> i64;
    fn start_line_offset(&self) -> i64;
    fn end_line(&self) -> i64;
    fn end_line_offset(&self) -> i64;
    fn rule_id(&self) -> String;
    fn message(&self) -> String;
    fn issue_type(&self) -> String;
    fn file_name(&self) -> String;
    fn reported_file_path(&self) -> String;
}

/// Exposes a [`PluginIssue`] implementation as a capability record.
#[derive(Debug, Clone)]
pub struct Typed<T>(pub T);

impl<T: PluginIssue> CapabilityRecord for Typed<T> {
    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }

    fn observe(&self, accessor: &str) -> Result<Observation, AccessError> {
        let issue = &self.0;
        Ok(match accessor {
            "startLine" => Observation::Integer(issue.start_line()),
            "startLineOffset" => Observation::Integer(issue.start_line_offset()),
            "endLine" => Observation::Integer(issue.end_line()),
            "endLineOffset" => Observation::Integer(issue.end_line_offset()),
            "ruleID" => Observation::Text(issue.rule_id()),
            "message" => Observation::Text(issue.message()),
            "issueType" => Observation::Text(issue.issue_type()),
            "fileName" => Observation::Text(issue.file_name()),
            "reportedFilePath" => Observation::Text(issue.reported_file_path()),
            _ => return Err(AccessError::Missing),
        })
    }
}
