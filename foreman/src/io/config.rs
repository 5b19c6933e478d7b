//! Foreman configuration stored under `.foreman/config.toml`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForemanError, Result, codes};

/// Foreman configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForemanConfig {
    /// Checkpoint name stamped when a state is set without naming a gate.
    pub baseline_checkpoint: String,

    /// Phase name stamped when approval is requested with no phase set.
    pub baseline_phase: String,

    /// Zero-padded width of the numeric suffix in run ids (`run-001` is 3).
    pub run_id_width: usize,
}

impl Default for ForemanConfig {
    fn default() -> Self {
        Self {
            baseline_checkpoint: "plan".to_string(),
            baseline_phase: "planning".to_string(),
            run_id_width: 3,
        }
    }
}

impl ForemanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baseline_checkpoint.trim().is_empty() {
            return Err(invalid_config("baseline_checkpoint must not be blank"));
        }
        if self.baseline_phase.trim().is_empty() {
            return Err(invalid_config("baseline_phase must not be blank"));
        }
        if self.run_id_width == 0 {
            return Err(invalid_config("run_id_width must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ForemanConfig::default()`.
pub fn load_config(path: &Path) -> Result<ForemanConfig> {
    if !path.exists() {
        let cfg = ForemanConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).map_err(|err| {
        ForemanError::new(
            codes::STATE_004,
            format!("read config {}: {err}", path.display()),
            "check file permissions on .foreman/config.toml",
        )
    })?;
    let cfg: ForemanConfig = toml::from_str(&contents).map_err(|err| {
        ForemanError::new(
            codes::STATE_004,
            format!("parse config {}: {err}", path.display()),
            "fix the TOML syntax or delete the file to restore defaults",
        )
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ForemanConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).map_err(|err| {
        ForemanError::new(
            codes::STATE_004,
            format!("serialize config: {err}"),
            "this is a bug in foreman; please report it",
        )
    })?;
    buf.push('\n');
    super::state_store::write_atomic(path, &buf)
}

fn invalid_config(message: &str) -> ForemanError {
    ForemanError::new(
        codes::STATE_004,
        message,
        "edit .foreman/config.toml or delete it to restore defaults",
    )
}
