//! Filesystem-backed Ballerina project host.
//!
//! A project is either a single `.bal` file or a package directory holding a
//! `Ballerina.toml` manifest. Packages contain a default module (the `.bal`
//! files in the package root) followed by the modules under `modules/`.
//!
//! Enumeration order is fixed by the loader: modules and documents are sorted
//! by name, so repeated runs over an unchanged tree visit the same sequence.

mod diagnostic;
mod plugin;
mod walker;

pub use diagnostic::{CompilationResult, Diagnostic, DiagnosticProperty, PropertyKind};
pub use plugin::{CommandPlugin, CompilerPlugin, PluginInput, SourceFile};
pub use walker::Walker;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Extension of Ballerina source files, with the leading dot.
pub const SOURCE_EXT: &str = ".bal";
/// Package manifest file name.
pub const MANIFEST: &str = "Ballerina.toml";
/// Directory holding a package's non-default modules.
pub const MODULES_DIR: &str = "modules";

/// Errors raised while loading a project.
#[derive(Error, Debug)]
pub enum ProjectLoadError {
    #[error("cannot resolve project path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is neither a Ballerina source file nor a package directory")]
    NotAProject(PathBuf),
    #[error("cannot enumerate {path}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Whether the project came from a lone source file or a package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    SingleFile,
    Package,
}

/// Position of a module in the project's enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A document, identified by its module and its position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    module: ModuleId,
    index: usize,
}

/// A single source file.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    name: String,
    path: PathBuf,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// File name of the document, e.g. `main.bal`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A named group of documents.
#[derive(Debug, Clone)]
pub struct Module {
    id: ModuleId,
    name: String,
    documents: Vec<Document>,
}

impl Module {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.iter().map(|d| d.id)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        if id.module != self.id {
            return None;
        }
        self.documents.get(id.index)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

/// A loaded project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    kind: ProjectKind,
    modules: Vec<Module>,
}

impl Project {
    /// Load the project at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProjectLoadError> {
        let path = path.as_ref();
        let abs = path
            .canonicalize()
            .map_err(|source| ProjectLoadError::Resolve {
                path: path.to_path_buf(),
                source,
            })?;

        if abs.is_file() {
            if !is_source_file(&abs) {
                return Err(ProjectLoadError::NotAProject(abs));
            }
            let root = abs.parent().map(Path::to_path_buf).unwrap_or_default();
            let name = abs
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let module_id = ModuleId(0);
            let document = Document {
                id: DocumentId {
                    module: module_id,
                    index: 0,
                },
                name: file_name(&abs),
                path: abs,
            };
            return Ok(Self {
                modules: vec![Module {
                    id: module_id,
                    name,
                    documents: vec![document],
                }],
                root,
                kind: ProjectKind::SingleFile,
            });
        }

        if !abs.join(MANIFEST).is_file() {
            return Err(ProjectLoadError::NotAProject(abs));
        }

        let package = file_name(&abs);
        let mut modules = vec![load_module(ModuleId(0), package.clone(), &abs)?];

        let modules_dir = abs.join(MODULES_DIR);
        if modules_dir.is_dir() {
            for entry in WalkDir::new(&modules_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|source| ProjectLoadError::Enumerate {
                    path: modules_dir.clone(),
                    source,
                })?;
                if !entry.file_type().is_dir() {
                    continue;
                }
                let name = format!("{}.{}", package, entry.file_name().to_string_lossy());
                modules.push(load_module(ModuleId(modules.len()), name, entry.path())?);
            }
        }

        Ok(Self {
            root: abs,
            kind: ProjectKind::Package,
            modules,
        })
    }

    /// Directory the project was loaded from (the file's parent for single files).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.module(id.module).and_then(|m| m.document(id))
    }

    /// Path of a document relative to the project root.
    pub fn relative_path(&self, document: &Document) -> PathBuf {
        document
            .path
            .strip_prefix(&self.root)
            .unwrap_or(&document.path)
            .to_path_buf()
    }
}

fn load_module(id: ModuleId, name: String, dir: &Path) -> Result<Module, ProjectLoadError> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ProjectLoadError::Enumerate {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        documents.push(Document {
            id: DocumentId {
                module: id,
                index: documents.len(),
            },
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_path_buf(),
        });
    }

    Ok(Module {
        id,
        name,
        documents,
    })
}

/// True when the path names a Ballerina source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SOURCE_EXT.trim_start_matches('.'))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
