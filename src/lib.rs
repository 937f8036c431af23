//! Ballerina bridge - links compiler plugins to a single issue report.
//!
//! The bridge walks a Ballerina project, lets compiler plugins analyze each
//! module, and normalizes everything they report into one [`Issue`] shape.
//! Plugin payloads are never known by type: they are read through a fixed
//! set of nine named accessors (see [`capability`]).
//!
//! # Architecture
//!
//! - `issue`: the canonical issue record
//! - `capability`: the accessor contract for opaque plugin payloads
//! - `extract`: payload to issue conversion
//! - `reporter`: issue collection and the local reporting funnel
//! - `project`: filesystem project host, compiler plugins, and the walker
//! - `pipeline`: orchestration of a full run
//! - `config`, `paths`, `report`, `cli`: the command-line surface

pub mod capability;
pub mod cli;
pub mod config;
pub mod extract;
pub mod issue;
pub mod paths;
pub mod pipeline;
pub mod project;
pub mod report;
pub mod reporter;

pub use capability::{CapabilityRecord, Observation, PluginIssue, Typed};
pub use config::BridgeConfig;
pub use extract::{convert, ConversionError};
pub use issue::{InvalidIssueError, Issue, IssueParts};
pub use paths::PathValidationError;
pub use pipeline::{Pipeline, Report};
pub use project::{CompilerPlugin, Diagnostic, Project, ProjectLoadError, Walker};
pub use reporter::{AnalysisContext, IssueCollection, Reporter};
