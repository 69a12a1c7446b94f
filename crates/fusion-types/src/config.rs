// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::EQDSK_TOKEN_PATTERN;
use crate::error::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level geometry pipeline configuration.
/// Every component receives its section explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub boundary_scan: BoundaryScanConfig,
    pub scaling: ScalingParams,
    pub miller: MillerParams,
    pub render: RenderSettings,
}

/// Layout of the boundary block in an EQDSK-style text dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryScanConfig {
    /// Zero-based line index where coordinate data begins.
    pub data_offset: usize,
    /// Regex matching one numeric token.
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Points with |Z| above this bound [m] are diverted to the discard stream.
    pub z_limit: f64,
}

fn default_token_pattern() -> String {
    EQDSK_TOKEN_PATTERN.to_string()
}

/// Scaling constants of the equilibrium being unnormalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingParams {
    #[serde(rename = "R_major")]
    pub r_major: f64,
    pub a_minor: f64,
    #[serde(rename = "B_0")]
    pub b_0: f64,
    #[serde(rename = "Ip_from_parameters", default = "default_ip_from_parameters")]
    pub ip_from_parameters: bool,
}

fn default_ip_from_parameters() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MillerParams {
    /// Number of flux surfaces to sample (the boundary is always included).
    pub n_surfaces: usize,
    /// Poloidal samples per contour, both ends of [0, 2π] included.
    pub n_theta: usize,
}

/// Fixed shape used when extruding a radial profile into 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IllustrativeGeometry {
    pub r0: f64,
    pub a: f64,
    pub kappa: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub geometry: IllustrativeGeometry,
    pub width: u32,
    pub height: u32,
    /// Poloidal resolution of the 3D surface.
    pub n_theta: usize,
    /// Draw captions, axis labels and legends. Needs system fonts.
    #[serde(default = "default_annotate")]
    pub annotate: bool,
}

fn default_annotate() -> bool {
    true
}

impl BoundaryScanConfig {
    /// ITER hybrid scenario dump (`iterhybrid_cocos02.eqdsk`, 129×129 grid).
    pub fn iter_hybrid_cocos02() -> Self {
        BoundaryScanConfig {
            data_offset: 3465,
            token_pattern: default_token_pattern(),
            z_limit: 3.99,
        }
    }

    pub fn validate(&self) -> FusionResult<()> {
        if !self.z_limit.is_finite() || self.z_limit <= 0.0 {
            return Err(FusionError::ConfigError(format!(
                "boundary z_limit must be finite and > 0, got {}",
                self.z_limit
            )));
        }
        if self.token_pattern.is_empty() {
            return Err(FusionError::ConfigError(
                "boundary token_pattern must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl ScalingParams {
    pub fn validate(&self) -> FusionResult<()> {
        if !self.r_major.is_finite() || self.r_major <= 0.0 {
            return Err(FusionError::ConfigError(format!(
                "R_major must be finite and > 0, got {}",
                self.r_major
            )));
        }
        if !self.a_minor.is_finite() || self.a_minor <= 0.0 {
            return Err(FusionError::ConfigError(format!(
                "a_minor must be finite and > 0, got {}",
                self.a_minor
            )));
        }
        if !self.b_0.is_finite() || self.b_0 == 0.0 {
            return Err(FusionError::ConfigError(format!(
                "B_0 must be finite and non-zero, got {}",
                self.b_0
            )));
        }
        Ok(())
    }
}

impl MillerParams {
    pub fn validate(&self) -> FusionResult<()> {
        if self.n_surfaces < 1 {
            return Err(FusionError::ConfigError(
                "Miller reconstruction requires n_surfaces >= 1".to_string(),
            ));
        }
        if self.n_theta < 3 {
            return Err(FusionError::ConfigError(format!(
                "Miller reconstruction requires n_theta >= 3, got {}",
                self.n_theta
            )));
        }
        Ok(())
    }
}

impl IllustrativeGeometry {
    /// ITER hybrid shape.
    pub fn iter_hybrid() -> Self {
        IllustrativeGeometry {
            r0: 6.2,
            a: 2.0,
            kappa: 1.8,
            delta: 0.4,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> FusionResult<()> {
        if self.width < 64 || self.height < 64 {
            return Err(FusionError::ConfigError(format!(
                "image size {}x{} is too small",
                self.width, self.height
            )));
        }
        if self.n_theta < 3 {
            return Err(FusionError::ConfigError(format!(
                "render n_theta must be >= 3, got {}",
                self.n_theta
            )));
        }
        if !self.geometry.a.is_finite() || self.geometry.a <= 0.0 {
            return Err(FusionError::ConfigError(
                "render geometry requires a > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl GeometryConfig {
    /// ITER hybrid defaults: R=6.2 m, a=2.0 m, B0=5.3 T.
    pub fn iter_hybrid() -> Self {
        GeometryConfig {
            boundary_scan: BoundaryScanConfig::iter_hybrid_cocos02(),
            scaling: ScalingParams {
                r_major: 6.2,
                a_minor: 2.0,
                b_0: 5.3,
                ip_from_parameters: true,
            },
            miller: MillerParams {
                n_surfaces: 10,
                n_theta: 360,
            },
            render: RenderSettings {
                geometry: IllustrativeGeometry::iter_hybrid(),
                width: 1200,
                height: 1000,
                n_theta: 180,
                annotate: true,
            },
        }
    }

    /// Load from JSON file and validate every section.
    pub fn from_file(path: impl AsRef<Path>) -> FusionResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| FusionError::io(path, e))?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FusionResult<()> {
        self.boundary_scan.validate()?;
        self.scaling.validate()?;
        self.miller.validate()?;
        self.render.validate()
    }
}
