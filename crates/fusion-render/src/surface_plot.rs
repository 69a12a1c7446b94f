// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Extruded Profile Surface
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 3D plot of a radial profile extruded over the poloidal angle.
//!
//! The profile is treated as a flux function: sample `i` sits on the Miller
//! surface at cell-centre radius `ρ = (i + 0.5) / n` of a fixed illustrative
//! geometry and is broadcast around it. Height and colour both carry the
//! value.

use crate::output::{empty_input, render_err, write_animation, write_figure, Figure};
use fusion_geometry::miller::{miller_point, theta_grid};
use fusion_types::config::{IllustrativeGeometry, RenderSettings};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{BoundaryPoint, SolverValue};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::fmt;
use std::ops::Range;
use std::path::Path;

const COLORBAR_WIDTH: i32 = 140;
const COLORBAR_STEPS: usize = 128;
const VIEW_PITCH: f64 = 0.6;
const VIEW_YAW: f64 = -1.05;

/// Physical label for the plotted field, shown on the colour bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabel {
    pub name: String,
    pub units: String,
}

impl FieldLabel {
    pub fn new(name: impl Into<String>, units: impl Into<String>) -> Self {
        FieldLabel {
            name: name.into(),
            units: units.into(),
        }
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} [{}]", self.name, self.units)
        }
    }
}

/// Jet-like colormap on `t` in [0, 1].
pub fn jet(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |offset: f64| ((1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0) as u8;
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// Cell-centred normalized radii for `n` samples.
pub fn cell_centers(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect()
}

/// Min/max of the field, widened by ±0.5 when flat.
pub fn value_range(data: &[f64]) -> Range<f64> {
    let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5)..(hi + 0.5)
    } else {
        lo..hi
    }
}

/// Miller rings for every sample, `n_theta` points each.
pub fn extruded_rings(
    geometry: &IllustrativeGeometry,
    n_samples: usize,
    n_theta: usize,
) -> Vec<Vec<BoundaryPoint>> {
    let thetas = theta_grid(n_theta);
    cell_centers(n_samples)
        .into_iter()
        .map(|rho| {
            thetas
                .iter()
                .map(|&theta| {
                    miller_point(
                        geometry.r0,
                        0.0,
                        geometry.a * rho,
                        geometry.kappa,
                        geometry.delta,
                        theta,
                    )
                })
                .collect()
        })
        .collect()
}

pub struct ProfileSurfaceFigure<'a> {
    pub data: &'a [f64],
    /// Colour and height scale; shared by all frames of an animation.
    pub range: Range<f64>,
    pub label: &'a FieldLabel,
    pub settings: &'a RenderSettings,
}

impl ProfileSurfaceFigure<'_> {
    fn draw_colorbar<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        range: Range<f64>,
    ) -> FusionResult<()> {
        let annotate = self.settings.annotate;
        let mut builder = ChartBuilder::on(area);
        builder.margin(30);
        if annotate {
            builder.set_label_area_size(LabelAreaPosition::Left, 70);
        }
        let mut bar = builder
            .build_cartesian_2d(0.0..1.0, range.clone())
            .map_err(render_err)?;
        if annotate {
            let label_font = FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal);
            bar.configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .disable_x_axis()
                .y_desc(self.label.to_string())
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(label_font)
                .draw()
                .map_err(render_err)?;
        }
        let step = (range.end - range.start) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|k| {
            let y0 = range.start + k as f64 * step;
            let t = (k as f64 + 0.5) / COLORBAR_STEPS as f64;
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], jet(t).filled())
        }))
        .map_err(render_err)?;
        Ok(())
    }
}

impl Figure for ProfileSurfaceFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()> {
        let settings = self.settings;
        let geometry = &settings.geometry;
        root.fill(&WHITE).map_err(render_err)?;

        let split = (settings.width as i32 - COLORBAR_WIDTH).max(1);
        let (plot_area, bar_area) = root.split_horizontally(split);

        let range = self.range.clone();
        let span = range.end - range.start;
        let normalize = |v: f64| (v - range.start) / span;
        let rings = extruded_rings(geometry, self.data.len(), settings.n_theta);

        let r_extent = geometry.a * 1.1;
        let z_extent = geometry.a * geometry.kappa * 1.1;
        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(20);
        if settings.annotate {
            builder.caption(
                "3D Reconstruction of Plasma Profile",
                FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Normal),
            );
        }
        let mut chart = builder
            .build_cartesian_3d(
                (geometry.r0 - r_extent)..(geometry.r0 + r_extent),
                range.clone(),
                -z_extent..z_extent,
            )
            .map_err(render_err)?;
        chart.with_projection(|mut pb| {
            pb.pitch = VIEW_PITCH;
            pb.yaw = VIEW_YAW;
            pb.scale = 0.85;
            pb.into_matrix()
        });
        if settings.annotate {
            chart
                .configure_axes()
                .light_grid_style(&BLACK.mix(0.1))
                .max_light_lines(3)
                .draw()
                .map_err(render_err)?;
        }

        if rings.len() < 2 {
            // A single sample has no neighbour to span a patch with.
            let v = self.data[0];
            let color = jet(normalize(v));
            chart
                .draw_series(LineSeries::new(
                    rings[0].iter().map(|p| (p.r, v, p.z)),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?;
        } else {
            let mut quads = Vec::with_capacity((rings.len() - 1) * settings.n_theta);
            for i in 0..rings.len() - 1 {
                let (v0, v1) = (self.data[i], self.data[i + 1]);
                let color = jet(normalize(0.5 * (v0 + v1)));
                let (inner, outer) = (&rings[i], &rings[i + 1]);
                for j in 0..inner.len() - 1 {
                    let corners = vec![
                        (inner[j].r, v0, inner[j].z),
                        (inner[j + 1].r, v0, inner[j + 1].z),
                        (outer[j + 1].r, v1, outer[j + 1].z),
                        (outer[j].r, v1, outer[j].z),
                    ];
                    quads.push(Polygon::new(corners, color.mix(0.9).filled()));
                }
            }
            chart.draw_series(quads).map_err(render_err)?;
        }

        self.draw_colorbar(&bar_area, range)?;
        root.present().map_err(render_err)
    }
}

fn check_profile(data: &[f64], label: &FieldLabel, path: &Path) -> FusionResult<()> {
    if data.is_empty() {
        return Err(empty_input(path, "profile array is empty"));
    }
    if let Some(i) = data.iter().position(|v| !v.is_finite()) {
        return Err(FusionError::Input(format!(
            "Profile '{}' has a non-finite value at index {i}",
            label.name
        )));
    }
    Ok(())
}

/// Extrude `data` over the poloidal angle and write the surface plot.
///
/// An empty array is reported as an I/O error against `path`, matching the
/// missing-directory case; neither creates a file.
pub fn render_profile_surface(
    data: &[f64],
    label: &FieldLabel,
    path: &Path,
    settings: &RenderSettings,
) -> FusionResult<()> {
    check_profile(data, label, path)?;
    settings.validate()?;
    tracing::debug!(samples = data.len(), field = %label, "rendering profile surface");
    let figure = ProfileSurfaceFigure {
        data,
        range: value_range(data),
        label,
        settings,
    };
    write_figure(&figure, path, (settings.width, settings.height))
}

/// Every `stride`-th snapshot of a profile history, starting with the first.
pub fn strided_snapshots<T: AsRef<[f64]>>(
    history: &[T],
    stride: usize,
) -> FusionResult<Vec<&[f64]>> {
    if stride == 0 {
        return Err(FusionError::ConfigError(
            "snapshot stride must be >= 1".to_string(),
        ));
    }
    Ok(history.iter().step_by(stride).map(|h| h.as_ref()).collect())
}

/// Write one extruded surface per frame into a looping GIF at `path`.
///
/// All frames share one value range so colours are comparable over time.
pub fn render_profile_animation<T: AsRef<[f64]>>(
    frames: &[T],
    label: &FieldLabel,
    path: &Path,
    frame_delay_ms: u32,
    settings: &RenderSettings,
) -> FusionResult<()> {
    if frames.is_empty() {
        return Err(empty_input(path, "animation has no frames"));
    }
    for frame in frames {
        check_profile(frame.as_ref(), label, path)?;
    }
    settings.validate()?;
    let all: Vec<f64> = frames.iter().flat_map(|f| f.as_ref().iter().copied()).collect();
    let range = value_range(&all);
    let figures: Vec<ProfileSurfaceFigure<'_>> = frames
        .iter()
        .map(|frame| ProfileSurfaceFigure {
            data: frame.as_ref(),
            range: range.clone(),
            label,
            settings,
        })
        .collect();
    tracing::debug!(frames = figures.len(), field = %label, "rendering profile animation");
    write_animation(
        &figures,
        path,
        (settings.width, settings.height),
        frame_delay_ms,
    )
}

/// Plot a solver output quantity; scalars draw as a single ring and a
/// missing quantity as `n_rho` zeros.
pub fn render_solver_value(
    value: &SolverValue,
    n_rho: usize,
    label: &FieldLabel,
    path: &Path,
    settings: &RenderSettings,
) -> FusionResult<()> {
    render_profile_surface(&value.to_vector(n_rho), label, path, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(jet(0.0), RGBColor(0, 0, 127));
        assert_eq!(jet(0.5), RGBColor(127, 255, 127));
        assert_eq!(jet(1.0), RGBColor(127, 0, 0));
        assert_eq!(jet(-3.0), jet(0.0));
        assert_eq!(jet(f64::NAN), jet(0.0));
    }

    #[test]
    fn test_cell_centers() {
        let rho = cell_centers(25);
        assert!((rho[0] - 0.02).abs() < 1e-12);
        assert!((rho[24] - 0.98).abs() < 1e-12);
        assert!(cell_centers(0).is_empty());
    }

    #[test]
    fn test_flat_range_is_padded() {
        assert_eq!(value_range(&[2.0, 2.0]), 1.5..2.5);
        assert_eq!(value_range(&[3.0, 1.0, 2.0]), 1.0..3.0);
    }

    #[test]
    fn test_rings_follow_miller_mapping() {
        let geometry = IllustrativeGeometry::iter_hybrid();
        let rings = extruded_rings(&geometry, 4, 9);
        assert_eq!(rings.len(), 4);
        assert!(rings.iter().all(|ring| ring.len() == 9));
        // theta = 0 sits on the outboard midplane at R0 + a * rho.
        let expected = geometry.r0 + geometry.a * 0.875;
        assert!((rings[3][0].r - expected).abs() < 1e-12);
        assert!(rings[3][0].z.abs() < 1e-12);
    }

    #[test]
    fn test_strided_snapshots() {
        let history: Vec<Vec<f64>> = (0..250).map(|i| vec![i as f64]).collect();
        let picked = strided_snapshots(&history, 100).unwrap();
        assert_eq!(picked, vec![&[0.0][..], &[100.0][..], &[200.0][..]]);
        assert_eq!(strided_snapshots(&history, 1).unwrap().len(), 250);
        assert!(matches!(
            strided_snapshots(&history, 0),
            Err(FusionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(
            FieldLabel::new("Electron Temp. Te", "keV").to_string(),
            "Electron Temp. Te [keV]"
        );
        assert_eq!(FieldLabel::new("q", "").to_string(), "q");
    }
}
