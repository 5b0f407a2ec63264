use crate::types::{BoundingBox, GridExtent, ZoneError, ZoneResult, GRID_ALIGNMENT};

/// Round a coordinate down to the nearest multiple of `step`
fn round_down_to(value: f64, step: f64) -> f64 {
    (value / step).floor() * step
}

/// Round a coordinate up to the nearest multiple of `step`
fn round_up_to(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

/// Snap a layer envelope outward to the kilometre grid
///
/// Minima are floored and maxima are ceiled to the nearest multiple of
/// [`GRID_ALIGNMENT`], so the result always contains the input envelope and
/// values already on a kilometre boundary are unchanged.
pub fn snap_to_grid(bbox: &BoundingBox) -> ZoneResult<GridExtent> {
    if !bbox.is_finite() {
        return Err(ZoneError::Processing(format!(
            "Layer extent is not finite: {:?}",
            bbox
        )));
    }

    let extent = GridExtent {
        xmin: round_down_to(bbox.xmin, GRID_ALIGNMENT) as i64,
        ymin: round_down_to(bbox.ymin, GRID_ALIGNMENT) as i64,
        xmax: round_up_to(bbox.xmax, GRID_ALIGNMENT) as i64,
        ymax: round_up_to(bbox.ymax, GRID_ALIGNMENT) as i64,
    };

    if extent.width() <= 0 || extent.height() <= 0 {
        return Err(ZoneError::Processing(format!(
            "Degenerate rasterisation window {} from extent {:?}",
            extent, bbox
        )));
    }

    Ok(extent)
}
