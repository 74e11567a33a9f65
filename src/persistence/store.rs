//! JSON document store for the session state record.
//!
//! One file per session. Writes go to a temporary file in the same directory
//! which is then renamed over the document, so readers and concurrent
//! writers only ever see a complete document. There is no fsync; a crash can
//! still lose the latest write.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::state::WorkflowState;
use crate::{AppError, Result};

/// Read and decode the state document at `path`.
///
/// `visitCounts` and `modelStatuses` come back as empty maps when the
/// document omits them or stores `null`.
///
/// # Errors
///
/// Returns `AppError::Io` if the file is missing or unreadable, and
/// `AppError::Decode` if its contents are not a valid state document.
pub fn load(path: impl AsRef<Path>) -> Result<WorkflowState> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        AppError::Io(format!("failed to read state {}: {err}", path.display()))
    })?;
    let state: WorkflowState = serde_json::from_slice(&bytes).map_err(|err| {
        AppError::Decode(format!("invalid state document {}: {err}", path.display()))
    })?;
    debug!(
        path = %path.display(),
        status = %state.status,
        total_cost = state.cost.total_cost,
        tokens = state.cost.tokens.total(),
        "state loaded"
    );
    Ok(state)
}

/// Encode `state` as indented JSON and write it to `path`.
///
/// Creates the parent directory if it does not exist. The document is
/// written to a sibling temporary file and renamed into place.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be created or the file
/// cannot be written.
pub fn save(path: impl AsRef<Path>, state: &WorkflowState) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::Io(format!(
                    "failed to create state directory {}: {err}",
                    parent.display()
                ))
            })?;
            parent
        }
        None => Path::new("."),
    };

    let json = serde_json::to_vec_pretty(state)
        .map_err(|err| AppError::Io(format!("failed to serialize state: {err}")))?;
    let write_err = |err: std::io::Error| {
        AppError::Io(format!("failed to write state {}: {err}", path.display()))
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
    staged.write_all(&json).map_err(write_err)?;
    staged.persist(path).map_err(|err| write_err(err.error))?;
    debug!(path = %path.display(), "state saved");
    Ok(())
}
