//! Issue collection and the reporting funnel used by in-process checks.

use serde::Serialize;

use crate::issue::{InvalidIssueError, Issue, IssueParts};
use crate::project::{Document, Module, Project};

/// Append-only, insertion-ordered list of issues for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueCollection {
    issues: Vec<Issue>,
}

impl IssueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }
}

impl<'a> IntoIterator for &'a IssueCollection {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

/// The document being analyzed, with the module and project around it.
///
/// Only lives for one document's pass.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    project: &'a Project,
    module: &'a Module,
    document: &'a Document,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(project: &'a Project, module: &'a Module, document: &'a Document) -> Self {
        Self {
            project,
            module,
            document,
        }
    }

    pub fn current_project(&self) -> &'a Project {
        self.project
    }

    pub fn current_module(&self) -> &'a Module {
        self.module
    }

    pub fn current_document(&self) -> &'a Document {
        self.document
    }
}

/// Write path for issues found by local analysis.
pub struct Reporter<'c> {
    issues: &'c mut IssueCollection,
}

impl<'c> Reporter<'c> {
    pub fn new(issues: &'c mut IssueCollection) -> Self {
        Self { issues }
    }

    /// Report an issue in the context's current document.
    ///
    /// The file name and path come from the document. Nothing is appended
    /// when the issue fails validation.
    #[allow(clippy::too_many_arguments)]
    pub fn report_issue(
        &mut self,
        start_line: i64,
        start_column: i64,
        end_line: i64,
        end_column: i64,
        rule_id: &str,
        message: &str,
        issue_type: &str,
        context: &AnalysisContext<'_>,
    ) -> Result<(), InvalidIssueError> {
        let document = context.current_document();
        let issue = Issue::new(IssueParts {
            start_line,
            start_column,
            end_line,
            end_column,
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            issue_type: issue_type.to_string(),
            file_name: document.name().to_string(),
            file_path: document.path().to_string_lossy().to_string(),
        })?;
        self.issues.push(issue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, Project) {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("app.bal"), "").unwrap();
        let project = Project::load(temp.path().join("app.bal")).unwrap();
        (temp, project)
    }

    #[test]
    fn test_report_issue_resolves_document() {
        let (_temp, project) = project();
        let module = &project.modules()[0];
        let document = &module.documents()[0];
        let context = AnalysisContext::new(&project, module, document);

        let mut issues = IssueCollection::new();
        Reporter::new(&mut issues)
            .report_issue(2, 0, 2, 8, "S107", "Local issue", "CODE_SMELL", &context)
            .unwrap();

        assert_eq!(issues.len(), 1);
        let issue = &issues.as_slice()[0];
        assert_eq!(issue.file_name(), "app.bal");
        assert_eq!(issue.file_path(), document.path().to_string_lossy());
        assert_eq!(issue.end_column(), 8);
    }

    #[test]
    fn test_invalid_issue_not_appended() {
        let (_temp, project) = project();
        let module = &project.modules()[0];
        let context = AnalysisContext::new(&project, module, &module.documents()[0]);

        let mut issues = IssueCollection::new();
        let mut reporter = Reporter::new(&mut issues);
        assert!(reporter
            .report_issue(-1, 0, 0, 0, "S107", "Local issue", "X", &context)
            .is_err());
        assert!(reporter
            .report_issue(0, 0, 0, 0, "", "Local issue", "X", &context)
            .is_err());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_collection_keeps_insertion_order() {
        let (_temp, project) = project();
        let module = &project.modules()[0];
        let context = AnalysisContext::new(&project, module, &module.documents()[0]);

        let mut issues = IssueCollection::new();
        let mut reporter = Reporter::new(&mut issues);
        for rule in ["B2", "A1", "C3"] {
            reporter
                .report_issue(0, 0, 0, 0, rule, "m", "X", &context)
                .unwrap();
        }
        let rules: Vec<&str> = issues.iter().map(|i| i.rule_id()).collect();
        assert_eq!(rules, vec!["B2", "A1", "C3"]);
    }
}
