//! Compiler plugins run while a module compiles.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::diagnostic::WireDiagnostic;
use super::{Diagnostic, DocumentId, Module};

/// Source of one document, read during compilation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub document: DocumentId,
    pub path: PathBuf,
    pub text: String,
}

/// What a plugin sees of the module being compiled.
pub struct PluginInput<'a> {
    pub root: &'a Path,
    pub module: &'a Module,
    pub sources: &'a [SourceFile],
}

/// A compiler plugin contributing diagnostics for a module.
pub trait CompilerPlugin {
    fn name(&self) -> &str;

    fn analyze(&self, input: &PluginInput<'_>) -> anyhow::Result<Vec<Diagnostic>>;
}

/// Out-of-process plugin speaking JSON on stdout.
///
/// The program runs in the project root with the module name in
/// `BRIDGE_MODULE` and the module's document paths appended to `args`.
/// It must print a JSON array of diagnostics and exit successfully.
#[derive(Debug, Clone)]
pub struct CommandPlugin {
    name: String,
    command: String,
    args: Vec<String>,
}

impl CommandPlugin {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
        }
    }
}

impl CompilerPlugin for CommandPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, input: &PluginInput<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .args(input.sources.iter().map(|s| &s.path))
            .current_dir(input.root)
            .env("BRIDGE_MODULE", input.module.name())
            .output()
            .map_err(|e| anyhow::anyhow!("failed to run {:?}: {}", self.command, e))?;

        if !output.status.success() {
            anyhow::bail!(
                "{:?} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let wire: Vec<WireDiagnostic> = serde_json::from_slice(&output.stdout)
            .map_err(|e| anyhow::anyhow!("invalid diagnostics from {:?}: {}", self.command, e))?;
        Ok(wire.into_iter().map(Diagnostic::from).collect())
    }
}
