//! Project walker: module/document enumeration and cached compilation.

use std::fs;

use globset::GlobSet;
use once_cell::unsync::OnceCell;

use super::{
    CompilationResult, CompilerPlugin, Diagnostic, Document, Module, PluginInput, Project,
    ProjectLoadError, SourceFile,
};

/// Walks a loaded project and compiles its modules on demand.
///
/// Compilation results are cached, so compiling the same module twice
/// returns the same diagnostics without re-running plugins.
pub struct Walker {
    project: Project,
    plugins: Vec<Box<dyn CompilerPlugin>>,
    excluded: Option<GlobSet>,
    compilations: Vec<OnceCell<CompilationResult>>,
    project_diagnostics: OnceCell<Vec<Diagnostic>>,
}

impl Walker {
    /// Load the project at `path`.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ProjectLoadError> {
        let project = Project::load(path)?;
        tracing::debug!(
            root = %project.root().display(),
            kind = ?project.kind(),
            modules = project.modules().len(),
            "project loaded"
        );
        Ok(Self::new(project))
    }

    /// Walk an already loaded project.
    pub fn new(project: Project) -> Self {
        let compilations = project.modules().iter().map(|_| OnceCell::new()).collect();
        Self {
            project,
            plugins: Vec::new(),
            excluded: None,
            compilations,
            project_diagnostics: OnceCell::new(),
        }
    }

    /// Register a compiler plugin run on every module.
    pub fn with_plugin(mut self, plugin: Box<dyn CompilerPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<Box<dyn CompilerPlugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Skip documents whose root-relative path matches `excluded`.
    pub fn with_exclusions(mut self, excluded: GlobSet) -> Self {
        self.excluded = Some(excluded);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Modules in host enumeration order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.project.modules().iter()
    }

    /// Documents of `module` in host enumeration order, minus excluded ones.
    pub fn documents<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = &'a Document> + 'a {
        module
            .documents()
            .iter()
            .filter(move |d| !self.is_excluded(d))
    }

    /// Every (module, document) pair, lazily, in enumeration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Module, &Document)> + '_ {
        self.modules()
            .flat_map(move |m| self.documents(m).map(move |d| (m, d)))
    }

    /// Compile `module`, or return its cached result.
    pub fn compile(&self, module: &Module) -> &CompilationResult {
        let cell = &self.compilations[module.id().index()];
        cell.get_or_init(|| self.run_compilation(module))
    }

    /// Diagnostics of every module, in module order.
    pub fn project_diagnostics(&self) -> &[Diagnostic] {
        self.project_diagnostics.get_or_init(|| {
            self.modules()
                .flat_map(|module| self.compile(module).diagnostics().iter().cloned())
                .collect()
        })
    }

    fn run_compilation(&self, module: &Module) -> CompilationResult {
        let mut sources = Vec::new();
        for document in self.documents(module) {
            // Undecodable bytes are replaced; unreadable files are left out of
            // the plugin input but still walked.
            let bytes = match fs::read(document.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        document = %document.path().display(),
                        "cannot read document source: {}",
                        e
                    );
                    continue;
                }
            };
            sources.push(SourceFile {
                document: document.id(),
                path: document.path().to_path_buf(),
                text: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let input = PluginInput {
            root: self.project.root(),
            module,
            sources: &sources,
        };

        let mut diagnostics = Vec::new();
        for plugin in &self.plugins {
            match plugin.analyze(&input) {
                Ok(found) => diagnostics.extend(found),
                Err(e) => tracing::warn!(
                    plugin = plugin.name(),
                    module = module.name(),
                    "plugin failed, skipping its diagnostics: {:#}",
                    e
                ),
            }
        }

        tracing::debug!(
            module = module.name(),
            documents = sources.len(),
            diagnostics = diagnostics.len(),
            "module compiled"
        );
        CompilationResult::new(diagnostics)
    }

    fn is_excluded(&self, document: &Document) -> bool {
        match &self.excluded {
            Some(set) => set.is_match(self.project.relative_path(document)),
            None => false,
        }
    }
}
