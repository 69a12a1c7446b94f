// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::diagnostics::Diagnostics;
use crate::error::{FusionError, FusionResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point of a boundary contour in the poloidal plane [m].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub r: f64,
    pub z: f64,
}

impl BoundaryPoint {
    pub fn new(r: f64, z: f64) -> Self {
        BoundaryPoint { r, z }
    }
}

/// A coordinate pair diverted out of the boundary by the |Z| filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedPoint {
    /// Index of the R token in the scanned token stream.
    pub token_index: usize,
    pub point: BoundaryPoint,
}

/// Output of a boundary scan: accepted contour plus the discard stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryExtraction {
    pub accepted: Vec<BoundaryPoint>,
    pub rejected: Vec<RejectedPoint>,
    pub token_count: usize,
}

impl BoundaryExtraction {
    /// Number of complete (R, Z) pairs in the token stream.
    pub fn pair_count(&self) -> usize {
        self.token_count / 2
    }

    /// A closed contour needs at least three vertices.
    pub fn is_closed_contour(&self) -> bool {
        self.accepted.len() >= 3
    }

    pub fn r_values(&self) -> Vec<f64> {
        self.accepted.iter().map(|p| p.r).collect()
    }

    pub fn z_values(&self) -> Vec<f64> {
        self.accepted.iter().map(|p| p.z).collect()
    }
}

/// Dimensionless CHEASE output channels consumed by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileChannel {
    PsiOver2Pi,
    CurrentProfile,
    RhoToroidal,
    RInboard,
    ROutboard,
    ToroidalFieldFunction,
    IntDlOverBp,
    FsaOneOverR,
    FsaOneOverR2,
    FsaBp2,
    FsaGradPsi,
    FsaGradPsi2,
    FsaB2,
    FsaOneOverB2,
    Elongation,
    DeltaUpper,
    DeltaBottom,
}

impl ProfileChannel {
    pub const ALL: [ProfileChannel; 17] = [
        ProfileChannel::PsiOver2Pi,
        ProfileChannel::CurrentProfile,
        ProfileChannel::RhoToroidal,
        ProfileChannel::RInboard,
        ProfileChannel::ROutboard,
        ProfileChannel::ToroidalFieldFunction,
        ProfileChannel::IntDlOverBp,
        ProfileChannel::FsaOneOverR,
        ProfileChannel::FsaOneOverR2,
        ProfileChannel::FsaBp2,
        ProfileChannel::FsaGradPsi,
        ProfileChannel::FsaGradPsi2,
        ProfileChannel::FsaB2,
        ProfileChannel::FsaOneOverB2,
        ProfileChannel::Elongation,
        ProfileChannel::DeltaUpper,
        ProfileChannel::DeltaBottom,
    ];

    /// Column name exactly as written by CHEASE.
    pub fn name(self) -> &'static str {
        match self {
            ProfileChannel::PsiOver2Pi => "PSIchease=psi/2pi",
            ProfileChannel::CurrentProfile => "Ipprofile",
            ProfileChannel::RhoToroidal => "RHO_TOR=sqrt(Phi/pi/B0)",
            ProfileChannel::RInboard => "R_INBOARD",
            ProfileChannel::ROutboard => "R_OUTBOARD",
            ProfileChannel::ToroidalFieldFunction => "T=RBphi",
            ProfileChannel::IntDlOverBp => "Int(Rdlp/|grad(psi)|)=Int(Jdchi)",
            ProfileChannel::FsaOneOverR => "<1/R>profile",
            ProfileChannel::FsaOneOverR2 => "<1/R**2>",
            ProfileChannel::FsaBp2 => "<Bp**2>",
            ProfileChannel::FsaGradPsi => "<|grad(psi)|>",
            ProfileChannel::FsaGradPsi2 => "<|grad(psi)|**2>",
            ProfileChannel::FsaB2 => "<B**2>",
            ProfileChannel::FsaOneOverB2 => "<1/B**2>",
            ProfileChannel::Elongation => "elongation",
            ProfileChannel::DeltaUpper => "delta_upper",
            ProfileChannel::DeltaBottom => "delta_bottom",
        }
    }
}

/// Named dimensionless channels sharing one radial index (axis → boundary).
///
/// Extra columns are kept; every required channel must be present and all
/// columns must share the same length `n_rho >= 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfileTable {
    columns: BTreeMap<String, Vec<f64>>,
    n_rho: usize,
}

impl RawProfileTable {
    pub fn from_columns(columns: BTreeMap<String, Vec<f64>>) -> FusionResult<Self> {
        for channel in ProfileChannel::ALL {
            if !columns.contains_key(channel.name()) {
                return Err(FusionError::Input(format!(
                    "Missing profile channel '{}'",
                    channel.name()
                )));
            }
        }
        let n_rho = columns[ProfileChannel::RhoToroidal.name()].len();
        if n_rho < 2 {
            return Err(FusionError::Input(format!(
                "Profile table requires n_rho >= 2, got {n_rho}"
            )));
        }
        for (name, values) in &columns {
            if values.len() != n_rho {
                return Err(FusionError::Input(format!(
                    "Channel '{name}' has length {}, expected {n_rho}",
                    values.len()
                )));
            }
        }
        Ok(RawProfileTable { columns, n_rho })
    }

    pub fn n_rho(&self) -> usize {
        self.n_rho
    }

    pub fn channel(&self, channel: ProfileChannel) -> &[f64] {
        // Presence is checked in `from_columns`.
        self.columns
            .get(channel.name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Profiles in physical units, ready for the transport engine and for
/// Miller reconstruction.
#[derive(Debug, Clone)]
pub struct ScaledProfileSet {
    pub r_major: f64,
    pub b_0: f64,
    /// Whether the downstream solver imposes Ip instead of trusting `ip_profile`.
    pub ip_from_parameters: bool,
    pub psi: Array1<f64>,        // Poloidal flux [Wb]
    pub ip_profile: Array1<f64>, // Plasma current [A]
    pub phi: Array1<f64>,        // Toroidal flux [Wb]
    pub r_in: Array1<f64>,       // Inboard major radius [m]
    pub r_out: Array1<f64>,      // Outboard major radius [m]
    pub f: Array1<f64>,          // Toroidal field function R·Bφ [T·m]
    pub int_dl_over_bp: Array1<f64>,
    pub flux_surf_avg_1_over_r: Array1<f64>,
    pub flux_surf_avg_1_over_r2: Array1<f64>,
    pub flux_surf_avg_grad_psi2_over_r2: Array1<f64>,
    pub flux_surf_avg_grad_psi: Array1<f64>,
    pub flux_surf_avg_grad_psi2: Array1<f64>,
    pub flux_surf_avg_b2: Array1<f64>,
    pub flux_surf_avg_1_over_b2: Array1<f64>,
    pub elongation: Array1<f64>,
    pub delta_upper: Array1<f64>,
    pub delta_lower: Array1<f64>,
    pub rho_norm: Array1<f64>, // sqrt(Φ/Φ_boundary), [0, 1]
    pub vpr: Array1<f64>,
    pub diagnostics: Diagnostics,
}

impl ScaledProfileSet {
    pub fn n_rho(&self) -> usize {
        self.phi.len()
    }

    /// Geometric center of surface `i`: mean of inboard and outboard radius.
    pub fn geometric_center(&self, i: usize) -> f64 {
        0.5 * (self.r_in[i] + self.r_out[i])
    }

    /// Up/down averaged triangularity of surface `i` (unclamped).
    pub fn mean_triangularity(&self, i: usize) -> f64 {
        0.5 * (self.delta_upper[i] + self.delta_lower[i])
    }
}

/// Value exchanged with the external solver's output types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverValue {
    Scalar(f64),
    VectorField(Vec<f64>),
    Missing,
}

impl SolverValue {
    /// Scalar view. `Missing` reads as 0.0; a vector only if it has one entry.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SolverValue::Scalar(v) => Some(*v),
            SolverValue::VectorField(values) if values.len() == 1 => Some(values[0]),
            SolverValue::VectorField(_) => None,
            SolverValue::Missing => Some(0.0),
        }
    }

    /// Vector view. `Missing` becomes a zero placeholder of length `len`.
    pub fn to_vector(&self, len: usize) -> Vec<f64> {
        match self {
            SolverValue::Scalar(v) => vec![*v],
            SolverValue::VectorField(values) => values.clone(),
            SolverValue::Missing => vec![0.0; len],
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SolverValue::Missing)
    }
}

impl From<f64> for SolverValue {
    fn from(value: f64) -> Self {
        SolverValue::Scalar(value)
    }
}

impl From<Vec<f64>> for SolverValue {
    fn from(values: Vec<f64>) -> Self {
        SolverValue::VectorField(values)
    }
}

impl<T: Into<SolverValue>> From<Option<T>> for SolverValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SolverValue::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones_columns(n: usize) -> BTreeMap<String, Vec<f64>> {
        ProfileChannel::ALL
            .iter()
            .map(|c| (c.name().to_string(), vec![1.0; n]))
            .collect()
    }

    #[test]
    fn test_extraction_counts() {
        let extraction = BoundaryExtraction {
            accepted: vec![BoundaryPoint::new(1.0, 2.0), BoundaryPoint::new(5.0, 6.0)],
            rejected: vec![RejectedPoint {
                token_index: 2,
                point: BoundaryPoint::new(3.0, 99.0),
            }],
            token_count: 7,
        };
        assert_eq!(extraction.pair_count(), 3);
        assert!(!extraction.is_closed_contour());
        assert_eq!(extraction.r_values(), vec![1.0, 5.0]);
        assert_eq!(extraction.z_values(), vec![2.0, 6.0]);
    }

    #[test]
    fn test_table_accepts_complete_channels() {
        let mut columns = ones_columns(5);
        columns.insert("q_profile".to_string(), vec![1.0; 5]);
        let table = RawProfileTable::from_columns(columns).unwrap();
        assert_eq!(table.n_rho(), 5);
        assert_eq!(table.channel(ProfileChannel::Elongation).len(), 5);
        assert!(table.column("q_profile").is_some());
    }

    #[test]
    fn test_table_rejects_missing_channel() {
        let mut columns = ones_columns(5);
        columns.remove("<B**2>");
        match RawProfileTable::from_columns(columns) {
            Err(FusionError::Input(msg)) => assert!(msg.contains("<B**2>"), "{msg}"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_table_rejects_length_mismatch() {
        let mut columns = ones_columns(5);
        columns.insert("elongation".to_string(), vec![1.0; 4]);
        match RawProfileTable::from_columns(columns) {
            Err(FusionError::Input(msg)) => assert!(msg.contains("elongation"), "{msg}"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_table_rejects_single_point() {
        let err = RawProfileTable::from_columns(ones_columns(1)).unwrap_err();
        assert!(matches!(err, FusionError::Input(_)));
    }

    #[test]
    fn test_solver_value_views() {
        assert_eq!(SolverValue::Missing.as_scalar(), Some(0.0));
        assert_eq!(SolverValue::Scalar(2.5).as_scalar(), Some(2.5));
        assert_eq!(SolverValue::VectorField(vec![4.0]).as_scalar(), Some(4.0));
        assert_eq!(SolverValue::VectorField(vec![1.0, 2.0]).as_scalar(), None);
        assert_eq!(SolverValue::Missing.to_vector(3), vec![0.0; 3]);
        assert_eq!(SolverValue::from(None::<f64>), SolverValue::Missing);
        assert_eq!(
            SolverValue::from(Some(vec![1.0, 2.0])).to_vector(25),
            vec![1.0, 2.0]
        );
    }
}
