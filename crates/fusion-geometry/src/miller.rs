// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Miller Flux-Surface Reconstruction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Miller-parameterized nested flux surfaces from scaled profiles.
//!
//! R(θ) = R_c + r·cos(θ + asin(δ)·sin(θ))
//! Z(θ) = Z_c + κ·r·sin(θ)
//!
//! with r = a·ρ_N, R_c the mean of inboard/outboard radius and δ the
//! up/down averaged triangularity.

use crate::chease::normalized_toroidal_rho;
use fusion_types::config::MillerParams;
use fusion_types::constants::TRIANGULARITY_LIMIT;
use fusion_types::diagnostics::Diagnostics;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{BoundaryPoint, ScaledProfileSet};
use ndarray::Array1;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTag {
    /// Last closed flux surface.
    Boundary,
    Interior,
}

/// Shape parameters of one flux surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MillerSurface {
    pub index: usize,
    pub rho_norm: f64,
    pub r_center: f64,
    pub z_center: f64,
    pub minor_radius: f64,
    pub elongation: f64,
    /// Clamped to ±0.99.
    pub triangularity: f64,
    pub tag: SurfaceTag,
}

impl MillerSurface {
    pub fn is_boundary(&self) -> bool {
        self.tag == SurfaceTag::Boundary
    }

    pub fn point_at(&self, theta: f64) -> BoundaryPoint {
        miller_point(
            self.r_center,
            self.z_center,
            self.minor_radius,
            self.elongation,
            self.triangularity,
            theta,
        )
    }

    /// Closed polygon over `n_theta` angles; first and last points coincide.
    pub fn contour(&self, n_theta: usize) -> Vec<BoundaryPoint> {
        theta_grid(n_theta)
            .iter()
            .map(|&theta| self.point_at(theta))
            .collect()
    }

    /// Outboard midplane radius R_c + r.
    pub fn outboard_radius(&self) -> f64 {
        self.r_center + self.minor_radius
    }
}

/// Clip δ into the open domain of `asin`.
pub fn clamp_triangularity(delta: f64) -> f64 {
    delta.clamp(-TRIANGULARITY_LIMIT, TRIANGULARITY_LIMIT)
}

/// Miller mapping of one poloidal angle. `delta` is clamped here as well.
pub fn miller_point(
    r_center: f64,
    z_center: f64,
    minor_radius: f64,
    elongation: f64,
    delta: f64,
    theta: f64,
) -> BoundaryPoint {
    let shift = clamp_triangularity(delta).asin();
    BoundaryPoint::new(
        r_center + minor_radius * (theta + shift * theta.sin()).cos(),
        z_center + elongation * minor_radius * theta.sin(),
    )
}

/// `n_theta` angles uniformly covering [0, 2π], both ends included.
pub fn theta_grid(n_theta: usize) -> Vec<f64> {
    Array1::linspace(0.0, 2.0 * PI, n_theta).to_vec()
}

/// Pick `k` radial indices evenly spread over [1, n_rho-1].
///
/// The axis (index 0) is excluded. Indices are floored, deduplicated, and
/// the boundary index `n_rho-1` is always present.
pub fn select_surface_indices(n_rho: usize, k: usize) -> FusionResult<Vec<usize>> {
    if n_rho < 2 {
        return Err(FusionError::Input(format!(
            "Surface selection requires n_rho >= 2, got {n_rho}"
        )));
    }
    if k < 1 {
        return Err(FusionError::Input(
            "Surface selection requires at least one surface".to_string(),
        ));
    }
    let last = n_rho - 1;
    let mut indices: Vec<usize> = if k == 1 {
        vec![last]
    } else {
        let span = last - 1;
        (0..k).map(|j| 1 + j * span / (k - 1)).collect()
    };
    indices.dedup();
    if indices.last() != Some(&last) {
        indices.push(last);
    }
    Ok(indices)
}

/// One reconstructed surface with its sampled outline.
#[derive(Debug, Clone)]
pub struct FluxSurfaceContour {
    pub surface: MillerSurface,
    pub points: Vec<BoundaryPoint>,
}

#[derive(Debug, Clone)]
pub struct MillerReconstruction {
    pub a_total: f64,
    /// Ordered from the innermost selected surface to the boundary.
    pub contours: Vec<FluxSurfaceContour>,
    pub diagnostics: Diagnostics,
}

impl MillerReconstruction {
    /// The last closed flux surface.
    pub fn boundary(&self) -> Option<&FluxSurfaceContour> {
        self.contours.last().filter(|c| c.surface.is_boundary())
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &MillerSurface> {
        self.contours.iter().map(|c| &c.surface)
    }
}

/// Shape parameters of surface `index` for total minor radius `a_total`.
pub fn miller_surface(
    set: &ScaledProfileSet,
    rho_norm: &Array1<f64>,
    a_total: f64,
    index: usize,
) -> MillerSurface {
    let last = set.n_rho() - 1;
    MillerSurface {
        index,
        rho_norm: rho_norm[index],
        r_center: set.geometric_center(index),
        z_center: 0.0,
        minor_radius: a_total * rho_norm[index],
        elongation: set.elongation[index],
        triangularity: clamp_triangularity(set.mean_triangularity(index)),
        tag: if index == last {
            SurfaceTag::Boundary
        } else {
            SurfaceTag::Interior
        },
    }
}

/// Build `params.n_surfaces` nested Miller contours from scaled profiles.
pub fn reconstruct_miller_surfaces(
    set: &ScaledProfileSet,
    a_total: f64,
    params: &MillerParams,
) -> FusionResult<MillerReconstruction> {
    params.validate()?;
    if !a_total.is_finite() || a_total <= 0.0 {
        return Err(FusionError::Input(format!(
            "Miller reconstruction requires a_total > 0, got {a_total}"
        )));
    }
    let n_rho = set.n_rho();
    for (name, len) in [
        ("r_in", set.r_in.len()),
        ("r_out", set.r_out.len()),
        ("elongation", set.elongation.len()),
        ("delta_upper", set.delta_upper.len()),
        ("delta_lower", set.delta_lower.len()),
    ] {
        if len != n_rho {
            return Err(FusionError::Input(format!(
                "Profile '{name}' has length {len}, expected {n_rho}"
            )));
        }
    }

    let indices = select_surface_indices(n_rho, params.n_surfaces)?;
    let mut diagnostics = Diagnostics::new();
    let rho_norm = normalized_toroidal_rho(&set.phi, &mut diagnostics);

    let contours: Vec<FluxSurfaceContour> = indices
        .iter()
        .map(|&index| {
            let surface = miller_surface(set, &rho_norm, a_total, index);
            FluxSurfaceContour {
                points: surface.contour(params.n_theta),
                surface,
            }
        })
        .collect();

    tracing::debug!(
        ?indices,
        a_total,
        n_theta = params.n_theta,
        "Miller surfaces reconstructed"
    );

    Ok(MillerReconstruction {
        a_total,
        contours,
        diagnostics,
    })
}
