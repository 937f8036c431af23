//! Conversion of capability records into issues.

use thiserror::Error;

use crate::capability::{AccessError, CapabilityRecord, Observation, ACCESSORS};
use crate::issue::{InvalidIssueError, Issue, IssueParts};

/// Why a plugin payload did not become an issue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("incompatible issue shape: accessor {accessor:?} on {type_name}: {reason}")]
    IncompatibleShape {
        accessor: &'static str,
        type_name: String,
        reason: String,
    },
    #[error("invalid issue from {type_name}: {source}")]
    InvalidIssue {
        type_name: String,
        #[source]
        source: InvalidIssueError,
    },
}

impl ConversionError {
    /// The accessor that failed, if the failure was a shape mismatch.
    pub fn accessor(&self) -> Option<&'static str> {
        match self {
            ConversionError::IncompatibleShape { accessor, .. } => Some(*accessor),
            ConversionError::InvalidIssue { .. } => None,
        }
    }
}

/// Convert a plugin payload into an [`Issue`].
///
/// All nine accessors are read before anything is built; the first missing,
/// failing, or wrongly typed accessor aborts the whole conversion.
pub fn convert(record: &dyn CapabilityRecord) -> Result<Issue, ConversionError> {
    let reader = Reader { record };
    let [
        start_line,
        start_column,
        end_line,
        end_column,
        rule_id,
        message,
        issue_type,
        file_name,
        file_path,
    ] = ACCESSORS;

    let parts = IssueParts {
        start_line: reader.integer(start_line)?,
        start_column: reader.integer(start_column)?,
        end_line: reader.integer(end_line)?,
        end_column: reader.integer(end_column)?,
        rule_id: reader.text(rule_id)?,
        message: reader.text(message)?,
        issue_type: reader.text(issue_type)?,
        file_name: reader.text(file_name)?,
        file_path: reader.text(file_path)?,
    };

    Issue::new(parts).map_err(|source| ConversionError::InvalidIssue {
        type_name: record.type_name().to_string(),
        source,
    })
}

struct Reader<'a> {
    record: &'a dyn CapabilityRecord,
}

impl Reader<'_> {
    fn observe(&self, accessor: &'static str) -> Result<Observation, ConversionError> {
        self.record
            .observe(accessor)
            .map_err(|e: AccessError| self.incompatible(accessor, e.to_string()))
    }

    fn integer(&self, accessor: &'static str) -> Result<i64, ConversionError> {
        match self.observe(accessor)? {
            Observation::Integer(value) => Ok(value),
            other => Err(self.incompatible(
                accessor,
                format!("expected integer, got {}", other.kind()),
            )),
        }
    }

    fn text(&self, accessor: &'static str) -> Result<String, ConversionError> {
        match self.observe(accessor)? {
            Observation::Text(value) => Ok(value),
            other => Err(self.incompatible(
                accessor,
                format!("expected string, got {}", other.kind()),
            )),
        }
    }

    fn incompatible(&self, accessor: &'static str, reason: String) -> ConversionError {
        ConversionError::IncompatibleShape {
            accessor,
            type_name: self.record.type_name().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payload() -> Value {
        json!({
            "startLine": 12,
            "startLineOffset": 4,
            "endLine": 14,
            "endLineOffset": 1,
            "ruleID": "S1192",
            "message": "Define a constant instead of duplicating this literal",
            "issueType": "CODE_SMELL",
            "fileName": "service.bal",
            "reportedFilePath": "modules/api/service.bal"
        })
    }

    #[test]
    fn test_convert_is_lossless() {
        let issue = convert(&payload()).unwrap();
        assert_eq!(issue.start_line(), 12);
        assert_eq!(issue.start_column(), 4);
        assert_eq!(issue.end_line(), 14);
        assert_eq!(issue.end_column(), 1);
        assert_eq!(issue.rule_id(), "S1192");
        assert_eq!(
            issue.message(),
            "Define a constant instead of duplicating this literal"
        );
        assert_eq!(issue.issue_type(), "CODE_SMELL");
        assert_eq!(issue.file_name(), "service.bal");
        assert_eq!(issue.file_path(), "modules/api/service.bal");
    }

    #[test]
    fn test_missing_accessor_names_it() {
        let mut record = payload();
        record.as_object_mut().unwrap().remove("issueType");
        let err = convert(&record).unwrap_err();
        assert_eq!(err.accessor(), Some("issueType"));
        assert!(err.to_string().contains("json object"));
    }

    #[test]
    fn test_float_coordinate_rejected() {
        let mut record = payload();
        record["endLine"] = json!(14.0);
        let err = convert(&record).unwrap_err();
        assert_eq!(err.accessor(), Some("endLine"));
        assert!(err.to_string().contains("expected integer, got float"));
    }

    #[test]
    fn test_huge_coordinate_reported_as_out_of_range() {
        let mut record = payload();
        record["endLine"] = json!(u64::MAX);
        let err = convert(&record).unwrap_err();
        assert_eq!(err.accessor(), Some("endLine"));
        assert!(err.to_string().contains("integer out of range"));
    }

    #[test]
    fn test_string_coordinate_rejected() {
        let mut record = payload();
        record["startLine"] = json!("12");
        assert_eq!(convert(&record).unwrap_err().accessor(), Some("startLine"));
    }

    #[test]
    fn test_number_for_string_rejected() {
        let mut record = payload();
        record["ruleID"] = json!(1192);
        assert_eq!(convert(&record).unwrap_err().accessor(), Some("ruleID"));
    }

    #[test]
    fn test_negative_coordinate_is_invalid_issue() {
        let mut record = payload();
        record["startLine"] = json!(-3);
        let err = convert(&record).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidIssue {
                source: InvalidIssueError::Coordinate { .. },
                ..
            }
        ));
        assert_eq!(err.accessor(), None);
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = convert(&json!("S1192")).unwrap_err();
        assert_eq!(err.accessor(), Some("startLine"));
        assert!(err.to_string().contains("json string"));
    }
}
