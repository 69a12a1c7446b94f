// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — CHEASE Profile Normalization
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Conversion of CHEASE dimensionless flux-surface profiles to SI units.
//!
//! CHEASE normalizes lengths to R_major and fields to B_0. The scaling
//! below follows the COCOS convention used by the downstream transport
//! engine (COCOS > 10, hence the 4π² factor on ⟨Bp²⟩).

use fusion_types::constants::{MU0_SI, PHI_EPSILON, VPR_DENOMINATOR_EPSILON};
use fusion_types::diagnostics::{DegeneracyWarning, Diagnostics};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{ProfileChannel, RawProfileTable, ScaledProfileSet};
use ndarray::Array1;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;

/// Poloidal-flux unnormalization factor `R_major² · B_0 · 2π`.
pub fn psi_unnorm_factor(r_major: f64, b_0: f64) -> f64 {
    r_major * r_major * b_0 * 2.0 * PI
}

/// ρ_N = sqrt(Φ / Φ_boundary) with ρ_N[0] = 0 exactly.
///
/// A zero boundary flux is replaced by [`PHI_EPSILON`] and recorded; in that
/// case the boundary entry is pinned to 1 so the outermost surface keeps its
/// full minor radius.
pub fn normalized_toroidal_rho(phi: &Array1<f64>, diagnostics: &mut Diagnostics) -> Array1<f64> {
    let n = phi.len();
    if n == 0 {
        return Array1::zeros(0);
    }
    let phi_last = phi[n - 1];
    let degenerate = phi_last == 0.0;
    let denom = if degenerate {
        diagnostics.record(DegeneracyWarning::ZeroBoundaryFlux {
            substituted: PHI_EPSILON,
        });
        PHI_EPSILON
    } else {
        phi_last
    };

    let mut rho = phi.mapv(|p| (p / denom).sqrt());
    rho[0] = 0.0;
    if degenerate && n > 1 {
        rho[n - 1] = 1.0;
    }
    rho
}

/// `vpr = 4π · Φ_boundary · ρ_N / (F · ⟨1/R²⟩)`, guarding the denominator.
pub fn volume_derivative(
    phi_boundary: f64,
    rho_norm: &Array1<f64>,
    f: &Array1<f64>,
    flux_surf_avg_1_over_r2: &Array1<f64>,
    diagnostics: &mut Diagnostics,
) -> Array1<f64> {
    let mut vpr = Array1::zeros(rho_norm.len());
    for i in 0..rho_norm.len() {
        let value = f[i] * flux_surf_avg_1_over_r2[i];
        let denom = if value.abs() < VPR_DENOMINATOR_EPSILON {
            let substituted = VPR_DENOMINATOR_EPSILON.copysign(value);
            diagnostics.record(DegeneracyWarning::VprDenominator {
                index: i,
                value,
                substituted,
            });
            substituted
        } else {
            value
        };
        vpr[i] = 4.0 * PI * phi_boundary * rho_norm[i] / denom;
    }
    vpr
}

/// Scale a CHEASE profile table to physical units.
///
/// `r_major` [m] and `b_0` [T] are the normalization constants used by the
/// equilibrium run. `ip_from_parameters` is carried through untouched for
/// the transport engine.
pub fn scale_chease_profiles(
    table: &RawProfileTable,
    r_major: f64,
    b_0: f64,
    ip_from_parameters: bool,
) -> FusionResult<ScaledProfileSet> {
    if !r_major.is_finite() || r_major <= 0.0 {
        return Err(FusionError::ConfigError(format!(
            "R_major must be finite and > 0, got {r_major}"
        )));
    }
    if !b_0.is_finite() || b_0 == 0.0 {
        return Err(FusionError::ConfigError(format!(
            "B_0 must be finite and non-zero, got {b_0}"
        )));
    }

    let col = |c: ProfileChannel| Array1::from(table.channel(c).to_vec());
    let psi_factor = psi_unnorm_factor(r_major, b_0);
    let mut diagnostics = Diagnostics::new();

    let psi = col(ProfileChannel::PsiOver2Pi) * psi_factor;
    let ip_profile = col(ProfileChannel::CurrentProfile) * (r_major * b_0 / MU0_SI);
    let phi = col(ProfileChannel::RhoToroidal).mapv(|rho| (rho * r_major).powi(2) * b_0 * PI);

    let r_in = col(ProfileChannel::RInboard) * r_major;
    let r_out = col(ProfileChannel::ROutboard) * r_major;
    let f = col(ProfileChannel::ToroidalFieldFunction) * (r_major * b_0);

    let int_dl_over_bp = col(ProfileChannel::IntDlOverBp) * (r_major / b_0);
    let flux_surf_avg_1_over_r = col(ProfileChannel::FsaOneOverR) / r_major;
    let flux_surf_avg_1_over_r2 = col(ProfileChannel::FsaOneOverR2) / (r_major * r_major);
    // COCOS > 10: <|∇ψ|> = 2π<R Bp>
    let flux_surf_avg_grad_psi2_over_r2 = col(ProfileChannel::FsaBp2) * (b_0 * b_0 * 4.0 * PI * PI);
    let flux_surf_avg_grad_psi = col(ProfileChannel::FsaGradPsi) * (psi_factor / r_major);
    let flux_surf_avg_grad_psi2 =
        col(ProfileChannel::FsaGradPsi2) * (psi_factor * psi_factor / (r_major * r_major));
    let flux_surf_avg_b2 = col(ProfileChannel::FsaB2) * (b_0 * b_0);
    let flux_surf_avg_1_over_b2 = col(ProfileChannel::FsaOneOverB2) / (b_0 * b_0);

    let rho_norm = normalized_toroidal_rho(&phi, &mut diagnostics);
    let phi_boundary = phi[phi.len() - 1];
    let vpr = volume_derivative(
        phi_boundary,
        &rho_norm,
        &f,
        &flux_surf_avg_1_over_r2,
        &mut diagnostics,
    );

    tracing::debug!(
        n_rho = table.n_rho(),
        r_major,
        b_0,
        phi_boundary,
        warnings = diagnostics.warnings().len(),
        "CHEASE profiles scaled"
    );

    Ok(ScaledProfileSet {
        r_major,
        b_0,
        ip_from_parameters,
        psi,
        ip_profile,
        phi,
        r_in,
        r_out,
        f,
        int_dl_over_bp,
        flux_surf_avg_1_over_r,
        flux_surf_avg_1_over_r2,
        flux_surf_avg_grad_psi2_over_r2,
        flux_surf_avg_grad_psi,
        flux_surf_avg_grad_psi2,
        flux_surf_avg_b2,
        flux_surf_avg_1_over_b2,
        elongation: col(ProfileChannel::Elongation),
        delta_upper: col(ProfileChannel::DeltaUpper),
        delta_lower: col(ProfileChannel::DeltaBottom),
        rho_norm,
        vpr,
        diagnostics,
    })
}

/// Parse a CHEASE `.mat2cols` table: one header line of column names,
/// then whitespace-separated numeric rows.
pub fn parse_mat2cols(text: &str) -> FusionResult<RawProfileTable> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| FusionError::Format("CHEASE table is empty".to_string()))?;
    let names: Vec<&str> = header.split_whitespace().collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != names.len() {
            return Err(FusionError::Format(format!(
                "CHEASE row {} has {} columns, header has {}",
                row + 1,
                fields.len(),
                names.len()
            )));
        }
        for (j, field) in fields.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|e| {
                FusionError::Format(format!(
                    "CHEASE row {} column '{}': cannot parse '{field}': {e}",
                    row + 1,
                    names[j]
                ))
            })?;
            columns[j].push(value);
        }
    }

    let map: BTreeMap<String, Vec<f64>> = names
        .iter()
        .map(|n| n.to_string())
        .zip(columns)
        .collect();
    RawProfileTable::from_columns(map)
}

pub fn load_mat2cols(path: impl AsRef<Path>) -> FusionResult<RawProfileTable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| FusionError::io(path, e))?;
    parse_mat2cols(&text)
}
