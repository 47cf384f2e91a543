//! Locating the raw issue body.

use std::path::Path;

use slrkit_shared::{InputConfig, Result, SlrError};
use tracing::debug;

/// Where a submission was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionSource {
    Env(String),
    File(std::path::PathBuf),
}

impl std::fmt::Display for SubmissionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => write!(f, "${var}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the submission text.
///
/// Precedence: `explicit_file`, then the configured env var when set and
/// non-empty, then the configured fallback file. `env` looks a variable up
/// by name.
pub fn load_submission<F>(
    input: &InputConfig,
    explicit_file: Option<&Path>,
    env: F,
) -> Result<(String, SubmissionSource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit_file {
        return read_file(path);
    }

    if let Some(body) = env(&input.body_env).filter(|b| !b.trim().is_empty()) {
        debug!(var = %input.body_env, len = body.len(), "submission read from environment");
        return Ok((body, SubmissionSource::Env(input.body_env.clone())));
    }

    read_file(&input.body_file)
}

fn read_file(path: &Path) -> Result<(String, SubmissionSource)> {
    let body = std::fs::read_to_string(path).map_err(|e| SlrError::io(path, e))?;
    debug!(path = %path.display(), len = body.len(), "submission read from file");
    Ok((body, SubmissionSource::File(path.to_path_buf())))
}
