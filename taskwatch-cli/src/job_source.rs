//! Job sources
//!
//! A job description is either given inline or read from a file inside the
//! workspace. Either way `${NAME}` placeholders are expanded before the job
//! is submitted.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Largest job file that will be read
pub const MAX_JOB_FILE_BYTES: u64 = 1024 * 1024;

/// Where the job XML comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// Job XML given directly
    Inline(String),
    /// Path to a job file, relative to the workspace
    File(PathBuf),
}

impl JobSource {
    /// Reads the job description and expands variables in it
    pub fn load(&self, workspace: &Path, vars: &HashMap<String, String>) -> Result<String> {
        let raw = match self {
            Self::Inline(xml) => xml.clone(),
            Self::File(path) => read_job_file(workspace, path)?,
        };

        let job = expand_variables(&raw, vars);
        if job.trim().is_empty() {
            bail!("job description is empty");
        }

        Ok(job)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Inline(_) => "inline job".to_string(),
            Self::File(path) => format!("job file {}", path.display()),
        }
    }
}

/// Reads `path` from inside `workspace`, refusing anything outside it
fn read_job_file(workspace: &Path, path: &Path) -> Result<String> {
    if path.is_absolute() {
        bail!(
            "job file path must be relative to the workspace: {}",
            path.display()
        );
    }

    let root = workspace
        .canonicalize()
        .with_context(|| format!("Failed to resolve workspace {}", workspace.display()))?;
    let full = root
        .join(path)
        .canonicalize()
        .with_context(|| format!("Failed to read job file {}", path.display()))?;

    if !full.starts_with(&root) {
        bail!("job file {} is outside the workspace", path.display());
    }

    let size = fs::metadata(&full)
        .with_context(|| format!("Failed to read job file {}", path.display()))?
        .len();
    if size > MAX_JOB_FILE_BYTES {
        bail!(
            "job file {} is too large ({} bytes, limit {})",
            path.display(),
            size,
            MAX_JOB_FILE_BYTES
        );
    }

    fs::read_to_string(&full).with_context(|| format!("Failed to read job file {}", path.display()))
}

/// Replaces `${NAME}` with the value of `NAME` from `vars`
///
/// Unknown names and malformed placeholders are left untouched.
pub fn expand_variables(text: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find('}') {
            Some(end) if is_variable_name(&after[..end]) => {
                let name = &after[..end];
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
