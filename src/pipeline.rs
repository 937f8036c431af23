//! Aggregation pipeline: walks the project and gathers every issue.
//!
//! For each document the pipeline reports the placeholder local issue, then
//! scans the whole project's diagnostics for plugin-origin ones and converts
//! their opaque properties. A diagnostic is converted at most once per run,
//! at the first document visit that sees it.

use std::collections::HashSet;

use crate::extract::{self, ConversionError};
use crate::project::Walker;
use crate::reporter::{AnalysisContext, IssueCollection, Reporter};

/// Diagnostic code marking plugin-origin diagnostics.
pub const PLUGIN_DIAGNOSTIC_CODE: &str = "SCAN_TOOL_DIAGNOSTICS";

/// The fixed issue reported for every document by the local check.
pub const LOCAL_RULE_ID: &str = "S107";
pub const LOCAL_MESSAGE: &str = "Local issue";
pub const LOCAL_ISSUE_TYPE: &str = "INTERNAL_CHECK_VIOLATION";

/// A plugin payload that could not be converted.
#[derive(Debug, Clone)]
pub struct ExtractionFailure {
    /// Index of the diagnostic in the project's diagnostic list.
    pub diagnostic: usize,
    /// Index of the property within that diagnostic.
    pub property: usize,
    pub error: ConversionError,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct Report {
    pub issues: IssueCollection,
    pub failures: Vec<ExtractionFailure>,
    pub documents: usize,
}

/// Drives a [`Walker`] and collects issues from local checks and plugins.
pub struct Pipeline {
    walker: Walker,
    diagnostic_code: String,
    local_check: bool,
}

impl Pipeline {
    pub fn new(walker: Walker) -> Self {
        Self {
            walker,
            diagnostic_code: PLUGIN_DIAGNOSTIC_CODE.to_string(),
            local_check: true,
        }
    }

    /// Use a different code to recognize plugin diagnostics.
    pub fn diagnostic_code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic_code = code.into();
        self
    }

    /// Enable or disable the placeholder local issue.
    pub fn local_check(mut self, enabled: bool) -> Self {
        self.local_check = enabled;
        self
    }

    /// Walk every document and return the collected issues.
    ///
    /// Payloads that fail conversion are recorded in [`Report::failures`].
    pub fn run(&self) -> Report {
        let mut report = Report::default();
        let mut converted: HashSet<usize> = HashSet::new();
        let project = self.walker.project();

        for (module, document) in self.walker.pairs() {
            report.documents += 1;
            let context = AnalysisContext::new(project, module, document);

            if self.local_check {
                if let Err(e) = Reporter::new(&mut report.issues).report_issue(
                    0,
                    0,
                    0,
                    0,
                    LOCAL_RULE_ID,
                    LOCAL_MESSAGE,
                    LOCAL_ISSUE_TYPE,
                    &context,
                ) {
                    tracing::warn!(document = document.name(), "local issue rejected: {}", e);
                }
            }

            self.walker.compile(module);

            for (index, diagnostic) in self.walker.project_diagnostics().iter().enumerate() {
                if diagnostic.code() != self.diagnostic_code || !converted.insert(index) {
                    continue;
                }

                for (position, property) in diagnostic.properties().iter().enumerate() {
                    let Some(record) = property.opaque() else {
                        continue;
                    };
                    match extract::convert(record) {
                        Ok(issue) => report.issues.push(issue),
                        Err(error) => {
                            tracing::warn!(
                                diagnostic = index,
                                property = position,
                                "skipping plugin issue: {}",
                                error
                            );
                            report.failures.push(ExtractionFailure {
                                diagnostic: index,
                                property: position,
                                error,
                            });
                        }
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{PluginIssue, Typed};
    use crate::project::{CompilerPlugin, Diagnostic, DiagnosticProperty, PluginInput, MANIFEST};
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Unused {
        file: String,
    }

    impl PluginIssue for Unused {
        fn start_line(&self) -> i64 {
            4
        }
        fn start_line_offset(&self) -> i64 {
            0
        }
        fn end_line(&self) -> i64 {
            4
        }
        fn end_line_offset(&self) -> i64 {
            12
        }
        fn rule_id(&self) -> String {
            "B200".to_string()
        }
        fn message(&self) -> String {
            "Unused variable".to_string()
        }
        fn issue_type(&self) -> String {
            "CODE_SMELL".to_string()
        }
        fn file_name(&self) -> String {
            self.file.clone()
        }
        fn reported_file_path(&self) -> String {
            format!("src/{}", self.file)
        }
    }

    /// Emits one plugin diagnostic per document with a typed and a JSON
    /// payload, plus noise the pipeline must ignore.
    struct ScanPlugin;

    impl CompilerPlugin for ScanPlugin {
        fn name(&self) -> &str {
            "scan"
        }

        fn analyze(&self, input: &PluginInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
            let mut out = vec![Diagnostic::new("BCE2000", "unrelated")
                .with_property(DiagnosticProperty::other(json!({"ruleID": "nope"})))];
            for source in input.sources {
                let file = source
                    .path
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .to_string();
                out.push(
                    Diagnostic::new(PLUGIN_DIAGNOSTIC_CODE, "scan result")
                        .with_property(DiagnosticProperty::String("ignored".into()))
                        .with_property(DiagnosticProperty::other(Typed(Unused {
                            file: file.clone(),
                        })))
                        .with_property(DiagnosticProperty::other(json!({"ruleID": "S1"}))),
                );
            }
            Ok(out)
        }
    }

    fn package(root: &Path, docs: &[&str]) {
        std::fs::write(root.join(MANIFEST), "").unwrap();
        for doc in docs {
            std::fs::write(root.join(doc), "").unwrap();
        }
    }

    #[test]
    fn test_local_issue_per_document_without_plugins() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), &["a.bal", "b.bal", "c.bal"]);

        let report = Pipeline::new(Walker::open(temp.path()).unwrap()).run();
        assert_eq!(report.documents, 3);
        assert_eq!(report.issues.len(), 3);
        for issue in &report.issues {
            assert_eq!(issue.rule_id(), LOCAL_RULE_ID);
            assert_eq!(issue.issue_type(), LOCAL_ISSUE_TYPE);
            assert!(issue.is_point());
            assert_eq!(issue.start_line(), 0);
        }
        let files: Vec<&str> = report.issues.iter().map(|i| i.file_name()).collect();
        assert_eq!(files, vec!["a.bal", "b.bal", "c.bal"]);
    }

    #[test]
    fn test_plugin_issues_converted_once() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), &["a.bal", "b.bal"]);

        let walker = Walker::open(temp.path()).unwrap().with_plugin(Box::new(ScanPlugin));
        let report = Pipeline::new(walker).run();

        let rules: Vec<&str> = report.issues.iter().map(|i| i.rule_id()).collect();
        assert_eq!(rules, vec!["S107", "B200", "B200", "S107"]);

        let plugin_files: Vec<&str> = report
            .issues
            .iter()
            .filter(|i| i.rule_id() == "B200")
            .map(|i| i.file_path())
            .collect();
        assert_eq!(plugin_files, vec!["src/a.bal", "src/b.bal"]);

        // the incomplete JSON payload of each plugin diagnostic fails once
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.property == 2 && f.error.accessor() == Some("startLine")));
    }

    #[test]
    fn test_custom_code_and_disabled_local_check() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), &["a.bal"]);

        let walker = Walker::open(temp.path()).unwrap().with_plugin(Box::new(ScanPlugin));
        let report = Pipeline::new(walker)
            .diagnostic_code("BCE2000")
            .local_check(false)
            .run();

        assert!(report.issues.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].diagnostic, 0);
    }

    #[test]
    fn test_empty_package_reports_nothing() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), &[]);

        let walker = Walker::open(temp.path()).unwrap().with_plugin(Box::new(ScanPlugin));
        let report = Pipeline::new(walker).run();
        assert_eq!(report.documents, 0);
        assert!(report.issues.is_empty());
    }
}
