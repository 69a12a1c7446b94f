// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Boundary Outline Document
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exchange of the boundary outline with the transport engine's
//! equilibrium document (IMAS-like JSON).
//!
//! Only `equilibrium.time_slice[k].boundary.outline.{r,z}` is owned here;
//! the rest of the document is left untouched.

use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::BoundaryPoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryOutline {
    pub r: Vec<f64>,
    pub z: Vec<f64>,
}

impl BoundaryOutline {
    /// Split an ordered contour into R and Z arrays. Needs >= 3 points.
    pub fn from_points(points: &[BoundaryPoint]) -> FusionResult<Self> {
        if points.len() < 3 {
            return Err(FusionError::Input(format!(
                "Boundary outline requires at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(BoundaryOutline {
            r: points.iter().map(|p| p.r).collect(),
            z: points.iter().map(|p| p.z).collect(),
        })
    }

    pub fn points(&self) -> Vec<BoundaryPoint> {
        self.r
            .iter()
            .zip(&self.z)
            .map(|(&r, &z)| BoundaryPoint::new(r, z))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
}

fn time_slice<'a>(doc: &'a Value, index: usize) -> FusionResult<&'a Value> {
    doc.get("equilibrium")
        .and_then(|eq| eq.get("time_slice"))
        .and_then(|slices| slices.get(index))
        .ok_or_else(|| {
            FusionError::ConfigError(format!(
                "Document has no equilibrium.time_slice[{index}]"
            ))
        })
}

fn time_slice_mut(doc: &mut Value, index: usize) -> FusionResult<&mut Value> {
    doc.get_mut("equilibrium")
        .and_then(|eq| eq.get_mut("time_slice"))
        .and_then(|slices| slices.get_mut(index))
        .ok_or_else(|| {
            FusionError::ConfigError(format!(
                "Document has no equilibrium.time_slice[{index}]"
            ))
        })
}

/// Overwrite the boundary outline R/Z arrays of time slice `index`.
pub fn apply_boundary_outline(
    doc: &mut Value,
    index: usize,
    outline: &BoundaryOutline,
) -> FusionResult<()> {
    if outline.r.len() != outline.z.len() {
        return Err(FusionError::Input(format!(
            "Outline R/Z length mismatch: {} vs {}",
            outline.r.len(),
            outline.z.len()
        )));
    }
    if outline.len() < 3 {
        return Err(FusionError::Input(format!(
            "Boundary outline requires at least 3 points, got {}",
            outline.len()
        )));
    }
    let boundary = time_slice_mut(doc, index)?
        .get_mut("boundary")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            FusionError::ConfigError(format!(
                "Document has no equilibrium.time_slice[{index}].boundary object"
            ))
        })?;
    let entry = boundary
        .entry("outline")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    let outline_obj = entry.as_object_mut().ok_or_else(|| {
        FusionError::ConfigError("boundary.outline is not an object".to_string())
    })?;
    outline_obj.insert("r".to_string(), serde_json::to_value(&outline.r)?);
    outline_obj.insert("z".to_string(), serde_json::to_value(&outline.z)?);
    tracing::debug!(
        time_slice = index,
        points = outline.len(),
        "boundary outline updated"
    );
    Ok(())
}

/// Read back the boundary outline of time slice `index`.
pub fn read_boundary_outline(doc: &Value, index: usize) -> FusionResult<BoundaryOutline> {
    let outline = time_slice(doc, index)?
        .get("boundary")
        .and_then(|b| b.get("outline"))
        .ok_or_else(|| {
            FusionError::ConfigError(format!(
                "Document has no equilibrium.time_slice[{index}].boundary.outline"
            ))
        })?;
    let outline: BoundaryOutline = serde_json::from_value(outline.clone())?;
    if outline.r.len() != outline.z.len() {
        return Err(FusionError::Format(format!(
            "Outline R/Z length mismatch: {} vs {}",
            outline.r.len(),
            outline.z.len()
        )));
    }
    Ok(outline)
}

/// Magnetic axis of time slice `index`, if the document records one.
/// Values may be scalars or one-element arrays.
pub fn read_magnetic_axis(doc: &Value, index: usize) -> Option<BoundaryPoint> {
    let axis = time_slice(doc, index)
        .ok()?
        .get("global_quantities")?
        .get("magnetic_axis")?;
    let scalar = |v: &Value| v.as_f64().or_else(|| v.get(0).and_then(Value::as_f64));
    Some(BoundaryPoint::new(
        scalar(axis.get("r")?)?,
        scalar(axis.get("z")?)?,
    ))
}

/// Geometric axis of each flux surface in `profiles_1d`, if present.
/// Values may be scalars or arrays; R and Z are paired in order.
pub fn read_geometric_axis(doc: &Value, index: usize) -> Vec<BoundaryPoint> {
    let Some(axis) = time_slice(doc, index)
        .ok()
        .and_then(|slice| slice.get("profiles_1d"))
        .and_then(|p| p.get("geometric_axis"))
    else {
        return Vec::new();
    };
    let values = |key: &str| -> Vec<f64> {
        match axis.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_f64).collect(),
            Some(v) => v.as_f64().into_iter().collect(),
            None => Vec::new(),
        }
    };
    values("r")
        .into_iter()
        .zip(values("z"))
        .map(|(r, z)| BoundaryPoint::new(r, z))
        .collect()
}
