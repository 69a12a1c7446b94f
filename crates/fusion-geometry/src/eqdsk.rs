// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — EQDSK Boundary Extraction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plasma boundary recovery from EQDSK-style fixed-column text dumps.
//!
//! The boundary block starts at a format-version-specific line offset.
//! From there every numeric token is collected in file order and paired
//! as (R, Z). Stray pairs appended after the legitimate boundary are
//! recognized by an out-of-range |Z| and diverted to the discard stream.

use fusion_types::config::BoundaryScanConfig;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{BoundaryExtraction, BoundaryPoint, RejectedPoint};
use regex::Regex;
use std::path::Path;

/// Compiled form of a [`BoundaryScanConfig`].
#[derive(Debug, Clone)]
pub struct BoundaryScanner {
    token: Regex,
    data_offset: usize,
    z_limit: f64,
}

impl BoundaryScanner {
    pub fn new(config: &BoundaryScanConfig) -> FusionResult<Self> {
        config.validate()?;
        let token = Regex::new(&config.token_pattern).map_err(|e| {
            FusionError::ConfigError(format!(
                "Invalid boundary token pattern '{}': {e}",
                config.token_pattern
            ))
        })?;
        Ok(BoundaryScanner {
            token,
            data_offset: config.data_offset,
            z_limit: config.z_limit,
        })
    }

    pub fn z_limit(&self) -> f64 {
        self.z_limit
    }

    /// Collect numeric tokens from every line at or after the data offset.
    pub fn tokens<'a, I>(&self, lines: I) -> FusionResult<Vec<f64>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values = Vec::new();
        for (line_no, line) in lines.into_iter().enumerate().skip(self.data_offset) {
            for found in self.token.find_iter(line) {
                let value = found.as_str().parse::<f64>().map_err(|e| {
                    FusionError::Format(format!(
                        "Token '{}' on line {} is not a number: {e}",
                        found.as_str(),
                        line_no + 1
                    ))
                })?;
                values.push(value);
            }
        }
        Ok(values)
    }

    pub fn scan_lines<'a, I>(&self, lines: I) -> FusionResult<BoundaryExtraction>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values = self.tokens(lines)?;
        if values.is_empty() {
            return Err(FusionError::Format(format!(
                "No numeric tokens found at or after line offset {}",
                self.data_offset
            )));
        }

        let mut accepted = Vec::with_capacity(values.len() / 2);
        let mut rejected = Vec::new();
        // An odd trailing token has no partner and is dropped.
        for (pair, rz) in values.chunks_exact(2).enumerate() {
            let point = BoundaryPoint::new(rz[0], rz[1]);
            if point.z.abs() > self.z_limit {
                let token_index = 2 * pair;
                tracing::warn!(
                    token_index,
                    r = point.r,
                    z = point.z,
                    z_limit = self.z_limit,
                    "boundary point outside vertical extent, discarded"
                );
                rejected.push(RejectedPoint { token_index, point });
            } else {
                accepted.push(point);
            }
        }

        tracing::debug!(
            tokens = values.len(),
            accepted = accepted.len(),
            rejected = rejected.len(),
            "boundary scan complete"
        );
        if accepted.len() < 3 {
            tracing::warn!(
                accepted = accepted.len(),
                "boundary scan yielded fewer than 3 points, contour is not closed"
            );
        }

        Ok(BoundaryExtraction {
            accepted,
            rejected,
            token_count: values.len(),
        })
    }

    pub fn scan(&self, text: &str) -> FusionResult<BoundaryExtraction> {
        self.scan_lines(text.lines())
    }

    pub fn scan_file(&self, path: impl AsRef<Path>) -> FusionResult<BoundaryExtraction> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| FusionError::io(path, e))?;
        // Legacy dumps are ASCII; tolerate stray bytes in header comments.
        let text = String::from_utf8_lossy(&bytes);
        self.scan(&text)
    }
}

/// Extract the boundary contour from EQDSK-style text.
pub fn extract_boundary(
    text: &str,
    config: &BoundaryScanConfig,
) -> FusionResult<BoundaryExtraction> {
    BoundaryScanner::new(config)?.scan(text)
}

/// Extract the boundary contour from an EQDSK-style file.
pub fn extract_boundary_from_file(
    path: impl AsRef<Path>,
    config: &BoundaryScanConfig,
) -> FusionResult<BoundaryExtraction> {
    BoundaryScanner::new(config)?.scan_file(path)
}
