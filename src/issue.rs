//! Canonical issue record shared by local checks and compiler plugins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when an issue cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIssueError {
    #[error("coordinate {field} is out of range: {value}")]
    Coordinate { field: &'static str, value: i64 },
    #[error("issue range ends before it starts ({start_line}:{start_column} > {end_line}:{end_column})")]
    Reversed {
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// A single finding, independent of where it came from.
///
/// The serialized key names are the report format consumers read. Reading
/// an issue back goes through the same validation as [`Issue::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IssueParts")]
pub struct Issue {
    #[serde(rename = "startLine")]
    start_line: u32,
    #[serde(rename = "startLineOffset")]
    start_column: u32,
    #[serde(rename = "endLine")]
    end_line: u32,
    #[serde(rename = "endLineOffset")]
    end_column: u32,
    #[serde(rename = "ruleID")]
    rule_id: String,
    message: String,
    #[serde(rename = "issueType")]
    issue_type: String,
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "reportedFilePath")]
    file_path: String,
}

/// Everything needed to build an [`Issue`], before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueParts {
    #[serde(rename = "startLine")]
    pub start_line: i64,
    #[serde(rename = "startLineOffset")]
    pub start_column: i64,
    #[serde(rename = "endLine")]
    pub end_line: i64,
    #[serde(rename = "endLineOffset")]
    pub end_column: i64,
    #[serde(rename = "ruleID")]
    pub rule_id: String,
    pub message: String,
    #[serde(rename = "issueType")]
    pub issue_type: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "reportedFilePath")]
    pub file_path: String,
}

impl Issue {
    /// Validate the parts and build an issue.
    ///
    /// Coordinates must be non-negative and fit in `u32`, the start must not
    /// come after the end (line first, then column), and the rule id and
    /// message must be non-empty. `issue_type` is an open tag and is not checked.
    pub fn new(parts: IssueParts) -> Result<Self, InvalidIssueError> {
        let start_line = coordinate("startLine", parts.start_line)?;
        let start_column = coordinate("startLineOffset", parts.start_column)?;
        let end_line = coordinate("endLine", parts.end_line)?;
        let end_column = coordinate("endLineOffset", parts.end_column)?;

        if (start_line, start_column) > (end_line, end_column) {
            return Err(InvalidIssueError::Reversed {
                start_line,
                start_column,
                end_line,
                end_column,
            });
        }
        if parts.rule_id.is_empty() {
            return Err(InvalidIssueError::Empty("ruleID"));
        }
        if parts.message.is_empty() {
            return Err(InvalidIssueError::Empty("message"));
        }

        Ok(Self {
            start_line,
            start_column,
            end_line,
            end_column,
            rule_id: parts.rule_id,
            message: parts.message,
            issue_type: parts.issue_type,
            file_name: parts.file_name,
            file_path: parts.file_path,
        })
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn start_column(&self) -> u32 {
        self.start_column
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn end_column(&self) -> u32 {
        self.end_column
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// True when the issue marks a single position rather than a range.
    pub fn is_point(&self) -> bool {
        self.start_line == self.end_line && self.start_column == self.end_column
    }
}

impl TryFrom<IssueParts> for Issue {
    type Error = InvalidIssueError;

    fn try_from(parts: IssueParts) -> Result<Self, Self::Error> {
        Issue::new(parts)
    }
}

fn coordinate(field: &'static str, value: i64) -> Result<u32, InvalidIssueError> {
    u32::try_from(value).map_err(|_| InvalidIssueError::Coordinate { field, value })
}
