// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Render
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plots used to check the geometry pipeline by eye.

pub mod contour_plot;
pub mod output;
pub mod surface_plot;

pub use contour_plot::{render_boundary_scan, render_miller_family, render_outline_document};
pub use output::{write_animation, write_figure, Figure, ImageFormat};
pub use surface_plot::{
    render_profile_animation, render_profile_surface, render_solver_value, strided_snapshots,
    FieldLabel,
};
