// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    /// Source text does not match the expected offset/token layout.
    #[error("Format error: {0}")]
    Format(String),

    /// Structural violation of a profile table or reconstruction request.
    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Only produced by strict-mode checks on `Diagnostics`.
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),
}

impl FusionError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        FusionError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type FusionResult<T> = Result<T, FusionError>;
