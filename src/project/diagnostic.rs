//! Compiler diagnostics and their wire format.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::CapabilityRecord;

/// Kind tag of a diagnostic property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Numeric,
    Symbolic,
    /// Opaque payload; the only kind the bridge converts into issues.
    Other,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::String => write!(f, "string"),
            PropertyKind::Numeric => write!(f, "numeric"),
            PropertyKind::Symbolic => write!(f, "symbolic"),
            PropertyKind::Other => write!(f, "other"),
        }
    }
}

/// A typed property attached to a diagnostic.
#[derive(Debug, Clone)]
pub enum DiagnosticProperty {
    String(String),
    Numeric(f64),
    Symbolic(String),
    Other(Arc<dyn CapabilityRecord>),
}

impl DiagnosticProperty {
    pub fn kind(&self) -> PropertyKind {
        match self {
            DiagnosticProperty::String(_) => PropertyKind::String,
            DiagnosticProperty::Numeric(_) => PropertyKind::Numeric,
            DiagnosticProperty::Symbolic(_) => PropertyKind::Symbolic,
            DiagnosticProperty::Other(_) => PropertyKind::Other,
        }
    }

    /// The opaque payload, for properties of kind [`PropertyKind::Other`].
    pub fn opaque(&self) -> Option<&dyn CapabilityRecord> {
        match self {
            DiagnosticProperty::Other(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    /// Wrap any capability record as an opaque property.
    pub fn other<R: CapabilityRecord + 'static>(record: R) -> Self {
        DiagnosticProperty::Other(Arc::new(record))
    }
}

/// A finding produced while compiling a module.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: String,
    message: String,
    properties: Vec<DiagnosticProperty>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: DiagnosticProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn properties(&self) -> &[DiagnosticProperty] {
        &self.properties
    }
}

/// Diagnostics of one compiled module.
#[derive(Debug, Clone)]
pub struct CompilationResult {
    diagnostics: Vec<Diagnostic>,
}

impl CompilationResult {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Diagnostic as written by out-of-process plugins.
#[derive(Debug, Deserialize)]
pub(crate) struct WireDiagnostic {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub properties: Vec<WireProperty>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireProperty {
    pub kind: PropertyKind,
    pub value: Value,
}

/// Typed properties whose value does not match their kind are dropped with a
/// warning; the rest of the diagnostic is kept.
impl From<WireDiagnostic> for Diagnostic {
    fn from(wire: WireDiagnostic) -> Self {
        let mut diagnostic = Diagnostic::new(wire.code, wire.message);
        for property in wire.properties {
            let kind = property.kind;
            let converted = match (kind, property.value) {
                (PropertyKind::Other, value) => Some(DiagnosticProperty::other(value)),
                (PropertyKind::String, Value::String(s)) => Some(DiagnosticProperty::String(s)),
                (PropertyKind::Symbolic, Value::String(s)) => {
                    Some(DiagnosticProperty::Symbolic(s))
                }
                (PropertyKind::Numeric, Value::Number(n)) => {
                    n.as_f64().map(DiagnosticProperty::Numeric)
                }
                _ => None,
            };
            match converted {
                Some(p) => diagnostic.properties.push(p),
                None => tracing::warn!(
                    code = diagnostic.code.as_str(),
                    kind = %kind,
                    "dropping property with a mismatched value"
                ),
            }
        }
        diagnostic
    }
}
