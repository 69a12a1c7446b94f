// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Poloidal Cross-Section Plots
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 2D (R, Z) plots: boundary scans, outline documents and Miller families.

use crate::output::{empty_input, render_err, write_figure, Figure};
use fusion_geometry::miller::MillerReconstruction;
use fusion_geometry::outline::{read_boundary_outline, read_geometric_axis, read_magnetic_axis};
use fusion_types::config::RenderSettings;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{BoundaryExtraction, BoundaryPoint, ScaledProfileSet};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde_json::Value;
use std::ops::Range;
use std::path::Path;

const ACCEPTED_COLOR: RGBColor = RGBColor(34, 139, 34);
const REJECTED_COLOR: RGBColor = RGBColor(220, 20, 60);
const MAGNETIC_AXIS_COLOR: RGBColor = RGBColor(0, 128, 0);
const GEOMETRIC_AXIS_COLOR: RGBColor = RGBColor(218, 165, 32);

/// Widen the shorter range so one metre spans the same pixels on both axes.
pub fn equal_aspect(x: Range<f64>, y: Range<f64>, size: (u32, u32)) -> (Range<f64>, Range<f64>) {
    let (w, h) = (size.0.max(1) as f64, size.1.max(1) as f64);
    let (dx, dy) = ((x.end - x.start).max(1e-9), (y.end - y.start).max(1e-9));
    if dx / w > dy / h {
        let half = 0.5 * dx * h / w;
        let mid = 0.5 * (y.start + y.end);
        (x, (mid - half)..(mid + half))
    } else {
        let half = 0.5 * dy * w / h;
        let mid = 0.5 * (x.start + x.end);
        ((mid - half)..(mid + half), y)
    }
}

fn bounds<'a, I>(points: I, pad: f64) -> Option<(Range<f64>, Range<f64>)>
where
    I: IntoIterator<Item = &'a BoundaryPoint>,
{
    let mut it = points.into_iter().peekable();
    it.peek()?;
    let (mut r0, mut r1, mut z0, mut z1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for p in it {
        r0 = r0.min(p.r);
        r1 = r1.max(p.r);
        z0 = z0.min(p.z);
        z1 = z1.max(p.z);
    }
    let pr = ((r1 - r0) * pad).max(0.1);
    let pz = ((z1 - z0) * pad).max(0.1);
    Some(((r0 - pr)..(r1 + pr), (z0 - pz)..(z1 + pz)))
}

fn cross_section_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    r_range: Range<f64>,
    z_range: Range<f64>,
    annotate: bool,
) -> FusionResult<ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>> {
    area.fill(&WHITE).map_err(render_err)?;
    let mut builder = ChartBuilder::on(area);
    builder.margin(20);
    if annotate {
        let title_font = FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Normal);
        builder
            .caption(title, title_font)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45);
    }
    let mut chart = builder
        .build_cartesian_2d(r_range, z_range)
        .map_err(render_err)?;
    if annotate {
        chart
            .configure_mesh()
            .x_desc("Major Radius R [m]")
            .y_desc("Vertical Position Z [m]")
            .x_label_formatter(&|v| format!("{v:.1}"))
            .y_label_formatter(&|v| format!("{v:.1}"))
            .draw()
            .map_err(render_err)?;
    }
    Ok(chart)
}

/// Accepted (green) and discarded (red) points of a boundary scan.
pub struct BoundaryScanFigure<'a> {
    pub extraction: &'a BoundaryExtraction,
    pub settings: &'a RenderSettings,
}

impl Figure for BoundaryScanFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()> {
        let rejected: Vec<BoundaryPoint> =
            self.extraction.rejected.iter().map(|r| r.point).collect();
        let all = self.extraction.accepted.iter().chain(rejected.iter());
        let (r_range, z_range) = bounds(all, 0.05)
            .ok_or_else(|| FusionError::Input("Boundary scan has no points to plot".into()))?;
        let (r_range, z_range) = equal_aspect(
            r_range,
            z_range,
            (self.settings.width, self.settings.height),
        );
        let annotate = self.settings.annotate;
        let mut chart =
            cross_section_chart(&root, "EQDSK Boundary Scan", r_range, z_range, annotate)?;

        let accepted = chart
            .draw_series(
                self.extraction
                    .accepted
                    .iter()
                    .map(|p| Circle::new((p.r, p.z), 2, ACCEPTED_COLOR.filled())),
            )
            .map_err(render_err)?;
        if annotate {
            accepted
                .label("Boundary")
                .legend(|(x, y)| Circle::new((x, y), 3, ACCEPTED_COLOR.filled()));
        }
        let discarded = chart
            .draw_series(
                rejected
                    .iter()
                    .map(|p| Circle::new((p.r, p.z), 2, REJECTED_COLOR.filled())),
            )
            .map_err(render_err)?;
        if annotate {
            discarded
                .label("Discarded |Z| > limit")
                .legend(|(x, y)| Circle::new((x, y), 3, REJECTED_COLOR.filled()));
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK.mix(0.3))
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(render_err)?;
        }
        root.present().map_err(render_err)
    }
}

/// Boundary outline, magnetic axis and geometric axes stored in an
/// equilibrium document.
pub struct OutlineFigure<'a> {
    pub document: &'a Value,
    pub time_slice: usize,
    pub settings: &'a RenderSettings,
}

impl Figure for OutlineFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()> {
        let outline = read_boundary_outline(self.document, self.time_slice)?;
        let mut points = outline.points();
        let axis = read_magnetic_axis(self.document, self.time_slice);
        let geometric = read_geometric_axis(self.document, self.time_slice);
        let all = points.iter().chain(axis.iter()).chain(geometric.iter());
        let (r_range, z_range) = bounds(all, 0.1)
            .ok_or_else(|| FusionError::Input("Outline document has no points".into()))?;
        let (r_range, z_range) = equal_aspect(
            r_range,
            z_range,
            (self.settings.width, self.settings.height),
        );
        let mut chart = cross_section_chart(
            &root,
            "Equilibrium Boundary Outline",
            r_range,
            z_range,
            self.settings.annotate,
        )?;

        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.r, p.z)),
                BLUE.mix(0.6).stroke_width(1),
            ))
            .map_err(render_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.r, p.z), 2, BLUE.filled())),
            )
            .map_err(render_err)?;
        chart
            .draw_series(
                geometric
                    .iter()
                    .map(|p| Circle::new((p.r, p.z), 3, GEOMETRIC_AXIS_COLOR.filled())),
            )
            .map_err(render_err)?;
        if let Some(axis) = axis {
            chart
                .draw_series(std::iter::once(Circle::new(
                    (axis.r, axis.z),
                    5,
                    MAGNETIC_AXIS_COLOR.filled(),
                )))
                .map_err(render_err)?;
        }
        root.present().map_err(render_err)
    }
}

/// Nested Miller contours with the last closed flux surface highlighted.
pub struct MillerFamilyFigure<'a> {
    pub profiles: &'a ScaledProfileSet,
    pub reconstruction: &'a MillerReconstruction,
    pub settings: &'a RenderSettings,
}

impl MillerFamilyFigure<'_> {
    fn limits(&self) -> (Range<f64>, Range<f64>) {
        let a = self.reconstruction.a_total;
        let r_min = self.profiles.r_in.iter().copied().fold(f64::MAX, f64::min) * 0.9;
        let r_max = self.profiles.r_out.iter().copied().fold(f64::MIN, f64::max) * 1.05;
        let z_max = self
            .profiles
            .elongation
            .iter()
            .map(|k| k * a)
            .fold(f64::MIN, f64::max)
            * 1.1;
        equal_aspect(
            r_min..r_max,
            -z_max..z_max,
            (self.settings.width, self.settings.height),
        )
    }
}

impl Figure for MillerFamilyFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()> {
        let annotate = self.settings.annotate;
        let (r_range, z_range) = self.limits();
        let mut chart = cross_section_chart(
            &root,
            "Geometry Layers (Miller Reconstruction)",
            r_range,
            z_range,
            annotate,
        )?;

        for contour in &self.reconstruction.contours {
            let s = &contour.surface;
            let line = contour.points.iter().map(|p| (p.r, p.z));
            if s.is_boundary() {
                let drawn = chart
                    .draw_series(LineSeries::new(line, RED.stroke_width(3)))
                    .map_err(render_err)?;
                if annotate {
                    drawn
                        .label("LCFS (boundary, ρN = 1.0)")
                        .legend(|(x, y)| {
                            PathElement::new(vec![(x, y), (x + 25, y)], RED.stroke_width(3))
                        });
                }
                chart
                    .draw_series(std::iter::once(Circle::new(
                        (s.outboard_radius(), s.z_center),
                        5,
                        RED.filled(),
                    )))
                    .map_err(render_err)?;
            } else {
                let alpha = 0.3 + 0.4 * s.rho_norm;
                chart
                    .draw_series(LineSeries::new(line, BLUE.mix(alpha).stroke_width(1)))
                    .map_err(render_err)?;
            }
        }

        let axis = (self.profiles.geometric_center(0), 0.0);
        let marker = chart
            .draw_series(std::iter::once(Cross::new(axis, 8, BLACK.stroke_width(2))))
            .map_err(render_err)?;
        if annotate {
            marker
                .label("Magnetic axis (approx.)")
                .legend(|(x, y)| Cross::new((x, y), 6, BLACK.stroke_width(2)));
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK.mix(0.3))
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(render_err)?;
        }
        root.present().map_err(render_err)
    }
}

pub fn render_boundary_scan(
    extraction: &BoundaryExtraction,
    path: &Path,
    settings: &RenderSettings,
) -> FusionResult<()> {
    if extraction.accepted.is_empty() && extraction.rejected.is_empty() {
        return Err(empty_input(path, "boundary scan has no points to plot"));
    }
    settings.validate()?;
    let figure = BoundaryScanFigure {
        extraction,
        settings,
    };
    write_figure(&figure, path, (settings.width, settings.height))
}

pub fn render_outline_document(
    document: &Value,
    time_slice: usize,
    path: &Path,
    settings: &RenderSettings,
) -> FusionResult<()> {
    // Fail before touching the filesystem if the outline is absent.
    if read_boundary_outline(document, time_slice)?.is_empty() {
        return Err(empty_input(path, "boundary outline is empty"));
    }
    settings.validate()?;
    let figure = OutlineFigure {
        document,
        time_slice,
        settings,
    };
    write_figure(&figure, path, (settings.width, settings.height))
}

pub fn render_miller_family(
    profiles: &ScaledProfileSet,
    reconstruction: &MillerReconstruction,
    path: &Path,
    settings: &RenderSettings,
) -> FusionResult<()> {
    if reconstruction.contours.is_empty() || profiles.n_rho() == 0 {
        return Err(empty_input(path, "Miller family has no surfaces to plot"));
    }
    settings.validate()?;
    let figure = MillerFamilyFigure {
        profiles,
        reconstruction,
        settings,
    };
    write_figure(&figure, path, (settings.width, settings.height))
}
