// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Numeric Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Record of epsilon substitutions made while deriving geometry.
//!
//! Near-zero denominators at the magnetic axis are expected: the physical
//! model is singular there. Substitutions never raise, but every one is
//! recorded here so strict callers can reject the result.

use crate::error::{FusionError, FusionResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegeneracyWarning {
    /// Φ(last) was exactly zero; `substituted` was used for ρ_N.
    ZeroBoundaryFlux { substituted: f64 },
    /// |F·⟨1/R²⟩| at `index` was below tolerance.
    VprDenominator {
        index: usize,
        value: f64,
        substituted: f64,
    },
}

impl fmt::Display for DegeneracyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegeneracyWarning::ZeroBoundaryFlux { substituted } => {
                write!(f, "boundary toroidal flux is zero, used {substituted:e}")
            }
            DegeneracyWarning::VprDenominator {
                index,
                value,
                substituted,
            } => write!(
                f,
                "vpr denominator F*<1/R^2> = {value:e} at index {index}, used {substituted:e}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<DegeneracyWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a substitution and emit it as a `tracing` warning.
    pub fn record(&mut self, warning: DegeneracyWarning) {
        tracing::warn!(%warning, "numeric degeneracy substituted");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[DegeneracyWarning] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn extend(&mut self, other: &Diagnostics) {
        self.warnings.extend_from_slice(&other.warnings);
    }

    /// Strict mode: fail if any substitution happened.
    pub fn ensure_clean(&self) -> FusionResult<()> {
        if self.is_clean() {
            return Ok(());
        }
        let joined = self
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(FusionError::NumericDegeneracy(format!(
            "{} substitution(s): {joined}",
            self.warnings.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_diagnostics_pass_strict_check() {
        let diag = Diagnostics::new();
        assert!(diag.is_clean());
        assert!(diag.ensure_clean().is_ok());
    }

    #[test]
    fn test_recorded_warning_fails_strict_check() {
        let mut diag = Diagnostics::new();
        diag.record(DegeneracyWarning::VprDenominator {
            index: 0,
            value: 0.0,
            substituted: 1e-12,
        });
        assert!(!diag.is_clean());
        assert_eq!(diag.warnings().len(), 1);
        match diag.ensure_clean() {
            Err(FusionError::NumericDegeneracy(msg)) => {
                assert!(msg.contains("index 0"), "{msg}")
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
