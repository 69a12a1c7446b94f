// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Vacuum permeability (H/m), the defined value 4π·1e-7 used by the
/// transport engine's profile scaling.
pub const MU0_SI: f64 = 4.0 * std::f64::consts::PI * 1e-7;

/// Substitute for a zero boundary toroidal flux when normalizing ρ_N.
pub const PHI_EPSILON: f64 = 1e-9;

/// Smallest |F·⟨1/R²⟩| accepted in the vpr denominator.
pub const VPR_DENOMINATOR_EPSILON: f64 = 1e-12;

/// Triangularity is clipped to ±this value before `asin`.
pub const TRIANGULARITY_LIMIT: f64 = 0.99;

/// Scientific-notation token with an explicit `E` exponent marker.
pub const EQDSK_TOKEN_PATTERN: &str = r"[-+]?\d*\.\d+[E][-+]?\d+";
