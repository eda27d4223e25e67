//! External Prisma CLI handling
//!
//! The CLI is a black box reached through the platform package runner
//! (`npx`); this module builds the argv for each subcommand and implements
//! the two synchronous probes (version, validate).

use crate::error::CoreError;
use lazyprisma_commands::{Command, CommandBuilder, Platform};
use std::path::{Path, PathBuf};

/// How a failed migration should be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    Applied,
    RolledBack,
}

impl ResolveKind {
    /// The CLI flag for this resolution
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Applied => "--applied",
            Self::RolledBack => "--rolled-back",
        }
    }

    /// Human-readable label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::RolledBack => "rolled back",
        }
    }
}

/// Prisma version information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    /// True when no local node_modules installation was found
    pub is_global: bool,
}

/// Outcome of a `validate` probe
#[derive(Debug, Clone, Default)]
pub struct ValidateResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub output: String,
}

/// Builds commands for the external CLI, bound to a project directory
#[derive(Debug, Clone)]
pub struct PrismaCli {
    builder: CommandBuilder,
    project_dir: PathBuf,
}

impl PrismaCli {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder: CommandBuilder::new(Platform::current()),
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn npx(&self, args: &[&str]) -> Command {
        let mut argv = vec!["npx", "prisma"];
        argv.extend_from_slice(args);
        self.builder
            .command(&argv)
            .working_dir(&self.project_dir)
    }

    pub fn init(&self) -> Command {
        self.npx(&["init"])
    }

    pub fn generate(&self) -> Command {
        self.npx(&["generate"])
    }

    pub fn validate_command(&self) -> Command {
        self.npx(&["validate"])
    }

    pub fn format(&self) -> Command {
        self.npx(&["format"])
    }

    pub fn version_command(&self) -> Command {
        self.npx(&["--version"])
    }

    pub fn migrate_dev(&self, name: &str, create_only: bool) -> Command {
        let mut args = vec!["migrate", "dev", "--name", name];
        if create_only {
            args.push("--create-only");
        }
        self.npx(&args)
    }

    pub fn migrate_deploy(&self) -> Command {
        self.npx(&["migrate", "deploy"])
    }

    pub fn migrate_resolve(&self, name: &str, kind: ResolveKind) -> Command {
        self.npx(&["migrate", "resolve", kind.flag(), name])
    }

    pub fn migrate_reset(&self) -> Command {
        self.npx(&["migrate", "reset", "--force"])
    }

    pub fn studio(&self) -> Command {
        self.npx(&["studio"])
    }

    /// Probe the CLI version.
    ///
    /// `npx` automatically prefers a local installation; when it fails
    /// entirely, a bare `prisma` binary on PATH is tried as a fallback.
    pub async fn version(&self) -> Result<VersionInfo, CoreError> {
        let is_local = self.is_locally_installed();

        match self.version_command().run_with_output().await {
            Ok(result) if result.success() => Ok(VersionInfo {
                version: parse_version_output(&result.stdout)
                    .unwrap_or_else(|| "unknown".to_string()),
                is_global: !is_local,
            }),
            _ => {
                let fallback = self
                    .builder
                    .command(&["prisma", "--version"])
                    .working_dir(&self.project_dir);
                let result = fallback.run_with_output().await?;
                let version = parse_version_output(&result.stdout).unwrap_or_default();
                Ok(VersionInfo {
                    version,
                    is_global: true,
                })
            }
        }
    }

    /// Check for a local installation in the project directory or up to
    /// three parent directories (monorepo layouts hoist node_modules)
    pub fn is_locally_installed(&self) -> bool {
        let mut current = self.project_dir.clone();
        for _ in 0..4 {
            if current.join("node_modules").join("prisma").is_dir() {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }
        false
    }

    /// Run the validate probe. A failing command is a validation result,
    /// not an error.
    pub async fn validate(&self) -> Result<ValidateResult, CoreError> {
        let result = self.validate_command().run_with_output().await?;

        let mut validate = ValidateResult {
            output: result.combined_output(),
            ..ValidateResult::default()
        };

        if result.success() {
            validate.valid = true;
            return Ok(validate);
        }

        validate.errors = parse_validation_errors(&result.stdout, &result.stderr);
        Ok(validate)
    }
}

/// Extract the version from `prisma : X.Y.Z`-style output lines
pub fn parse_version_output(output: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("prisma") {
            if let Some((_, version)) = line.split_once(':') {
                let version = version.trim();
                if !version.is_empty() {
                    return Some(version.to_string());
                }
            }
        }
    }
    None
}

/// Collect error lines from validate output
pub fn parse_validation_errors(stdout: &str, stderr: &str) -> Vec<String> {
    let output = format!("{stdout}\n{stderr}");
    let mut errors = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("Error:") || line.contains("error:") || line.contains('✘') || line.contains('×')
        {
            errors.push(line.to_string());
        }
    }

    if errors.is_empty() {
        // Fall back to the first meaningful line as a summary
        for line in output.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with("Environment variables") {
                errors.push(line.to_string());
                break;
            }
        }
    }

    errors
}
