//! Command-line interface for the bridge.

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{self, BridgeConfig};
use crate::paths;
use crate::pipeline::Pipeline;
use crate::project::Walker;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Fixed usage text printed for `--help`.
pub const HELP_TEXT: &str = include_str!("cli-help/bridge.help");

/// Link Ballerina compiler plugins and report their issues as JSON.
#[derive(Parser, Debug)]
#[command(name = "bal-bridge")]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// Ballerina source file or package directory (default: current directory)
    pub path: Option<PathBuf>,

    /// Path to bridge configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print usage and exit
    #[arg(short = 'h', long = "help")]
    pub help: bool,
}

impl Cli {
    fn wants_help(&self) -> bool {
        self.help || self.path.as_deref() == Some(Path::new("?"))
    }
}

/// Run the bridge, writing user-facing output to `out`.
///
/// Returns the process exit code. Path problems are reported on `out`;
/// configuration and project errors go to stderr.
pub fn run<W: Write + ?Sized>(cli: &Cli, out: &mut W) -> anyhow::Result<i32> {
    if cli.wants_help() {
        write!(out, "{}", HELP_TEXT)?;
        return Ok(EXIT_SUCCESS);
    }

    let path = match paths::check_path(cli.path.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            writeln!(out, "{}", e)?;
            return Ok(EXIT_ERROR);
        }
    };

    let config = match load_config(cli.config.as_deref(), &path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut walker = match Walker::open(&path) {
        Ok(w) => w.with_plugins(config.plugins()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Some(excluded) = config.exclusions()? {
        walker = walker.with_exclusions(excluded);
    }

    let pipeline = Pipeline::new(walker)
        .diagnostic_code(config.diagnostic_code())
        .local_check(config.local_check());

    let result = pipeline.run();

    if !result.failures.is_empty() {
        tracing::info!(
            skipped = result.failures.len(),
            "some plugin issues could not be converted"
        );
    }

    report::write_json(out, &result.issues)?;
    Ok(EXIT_SUCCESS)
}

/// Load the explicit configuration, or one discovered next to the project.
fn load_config(explicit: Option<&Path>, project: &Path) -> anyhow::Result<BridgeConfig> {
    let dir = if project.is_file() {
        project
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    } else {
        project
    };

    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match BridgeConfig::discover(dir) {
            Some(p) => p,
            None => return Ok(BridgeConfig::default()),
        },
    };

    tracing::debug!(config = %path.display(), "loading configuration");
    let config = BridgeConfig::parse_file(&path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    config::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_args(args: &[&str]) -> (i32, String) {
        let mut argv = vec!["bal-bridge"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let code = run(&cli, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_help_flag() {
        for flag in ["--help", "-h", "?"] {
            let (code, out) = run_args(&[flag]);
            assert_eq!(code, EXIT_SUCCESS);
            assert_eq!(out, HELP_TEXT);
        }
        assert!(HELP_TEXT.starts_with("Tool for linking Ballerina compiler plugins\n"));
    }

    #[test]
    fn test_help_skips_path_checks() {
        let (code, out) = run_args(&["/definitely/not/here.bal", "--help"]);
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, HELP_TEXT);
    }

    #[test]
    fn test_bad_path_prints_message_only() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let (code, out) = run_args(&[missing.to_str().unwrap()]);
        assert_eq!(code, EXIT_ERROR);
        assert!(out.starts_with("No such file or directory exists!"));
        assert!(!out.contains('['));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("main.bal"), "").unwrap();
        std::fs::write(temp.path().join("bridge.yaml"), "plugins: 3").unwrap();
        let (code, out) = run_args(&[temp.path().join("main.bal").to_str().unwrap()]);
        assert_eq!(code, EXIT_ERROR);
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_file_report() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.bal");
        std::fs::write(&file, "public function main() {}\n").unwrap();

        let (code, out) = run_args(&[file.to_str().unwrap()]);
        assert_eq!(code, EXIT_SUCCESS);

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let issues = parsed.as_array().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0]["ruleID"], "S107");
        assert_eq!(issues[0]["fileName"], "main.bal");
    }
}
