//! Helpful error types for the CLI
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::{Path, PathBuf};

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// `--idd-file` / `EPPY_IDD_FILE` points at nothing
    pub fn idd_file_not_found(path: &Path) -> Self {
        Self::new(format!("IDD file not found: {}", path.display()))
            .with_context("The path came from --idd-file or EPPY_IDD_FILE")
            .with_suggestions([
                format!("TRY: Check that the file exists: ls -la {}", path.display()),
                "TRY: Unset EPPY_IDD_FILE to search the EnergyPlus install directories".to_string(),
            ])
    }

    /// No install directory holds an IDD for the version
    pub fn idd_not_found(version: &str, searched: &[PathBuf]) -> Self {
        let searched: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
        Self::new(format!("No Energy+.idd found for EnergyPlus {}", version))
            .with_context(format!("Searched: {}", searched.join(", ")))
            .with_suggestions([
                "TRY: Pass the dictionary explicitly: --idd-file /path/to/Energy+.idd".to_string(),
                "TRY: Set EPPY_IDD_FILE to the dictionary path".to_string(),
                format!("TRY: Check the version string (got '{}', expected e.g. 23.1)", version),
            ])
    }

    /// `--packages` names something other than eppy/archetypal
    pub fn invalid_package(name: &str) -> Self {
        Self::new(format!("Unknown package: '{}'", name))
            .with_context("Stub packages can only be built for eppy and archetypal")
            .with_suggestion("TRY: --packages eppy archetypal")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print a failure as a single JSON object on stdout, for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let causes: Vec<String> = err.chain().skip(1).map(|c| c.to_string()).collect();
    let value = serde_json::json!({
        "error": err.to_string().trim_end(),
        "causes": causes,
    });
    println!("{}", value);
}
