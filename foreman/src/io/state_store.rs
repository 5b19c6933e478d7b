//! State document storage.
//!
//! The store owns on-disk consistency for `.foreman/state.yaml`: reads
//! distinguish "not initialized" from "corrupted", and writes go through a
//! temp file + rename so a crashed writer never leaves a torn document.
//! Correctness is only guaranteed for serialized callers; the document has a
//! single-writer invariant and no lock.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ForemanError, Result, codes};
use crate::model::StateDocument;

/// Load the state document from disk.
pub fn load_state(path: &Path) -> Result<StateDocument> {
    debug!(path = %path.display(), "loading state document");
    if !path.exists() {
        return Err(ForemanError::new(
            codes::STATE_001,
            format!("state document not found at {}", path.display()),
            "initialize the project with `foreman init`",
        ));
    }
    let contents = fs::read_to_string(path).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("read state document {}: {err}", path.display()),
            "check file permissions under .foreman/",
        )
    })?;
    let doc: StateDocument = serde_yaml::from_str(&contents).map_err(|err| {
        ForemanError::new(
            codes::STATE_002,
            format!("state document {} is corrupted: {err}", path.display()),
            "restore the file from version control or re-run `foreman init --force`",
        )
    })?;
    debug!(
        intents = doc.intents.len(),
        active = doc.active_run.is_some(),
        history = doc.runs.completed.len(),
        "state document loaded"
    );
    Ok(doc)
}

/// Atomically write the state document to disk (temp file + rename).
pub fn write_state(path: &Path, doc: &StateDocument) -> Result<()> {
    debug!(path = %path.display(), active = doc.active_run.is_some(), "writing state document");
    let buf = serde_yaml::to_string(doc).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("serialize state document: {err}"),
            "this is a bug in foreman; please report it",
        )
    })?;
    write_atomic(path, &buf)
}

/// Write `contents` to `path` via a sibling temp file and rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        ForemanError::new(
            codes::STATE_003,
            format!("path {} has no parent directory", path.display()),
            "use a path inside the project root",
        )
    })?;
    fs::create_dir_all(parent).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("create directory {}: {err}", parent.display()),
            "check file permissions under .foreman/",
        )
    })?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("write temp file {}: {err}", tmp_path.display()),
            "check free space and permissions under .foreman/",
        )
    })?;
    fs::rename(&tmp_path, path).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("replace {}: {err}", path.display()),
            "check free space and permissions under .foreman/",
        )
    })?;
    Ok(())
}
