use crate::types::{ZoneError, ZoneResult};
use gdal::Dataset;
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;

/// Cell statistics for a produced zone-identity grid
#[derive(Debug, Clone)]
pub struct RasterSummary {
    pub columns: usize,
    pub rows: usize,
    pub nodata_cells: usize,
    /// Cell count per burned zone identifier (nodata excluded)
    pub zone_cells: HashMap<u32, usize>,
}

impl RasterSummary {
    pub fn total_cells(&self) -> usize {
        self.columns * self.rows
    }

    /// Fraction of cells carrying a zone identifier
    pub fn populated_fraction(&self) -> f64 {
        if self.total_cells() == 0 {
            return 0.0;
        }
        (self.total_cells() - self.nodata_cells) as f64 / self.total_cells() as f64
    }
}

/// Read back a rasterized grid and tally cells per zone identifier
///
/// `expected_ids` are the identifiers that were burned; any of them that
/// registered no cell at all is logged as a warning (the zone is smaller
/// than a cell at the target resolution, or was swallowed by the nodata
/// value).
pub fn summarize_raster(path: &Path, nodata: f64, expected_ids: &[u32]) -> ZoneResult<RasterSummary> {
    let dataset = Dataset::open(path)?;
    let (columns, rows) = dataset.raster_size();

    let band = dataset.rasterband(1)?;
    let buffer = band.read_as::<u32>((0, 0), (columns, rows), (columns, rows), None)?;
    let grid = Array2::from_shape_vec((rows, columns), buffer.data)
        .map_err(|e| ZoneError::Processing(format!("Failed to reshape raster data: {}", e)))?;

    let nodata_value = nodata as u32;
    let mut nodata_cells = 0usize;
    let mut zone_cells: HashMap<u32, usize> = HashMap::new();
    for &cell in grid.iter() {
        if cell == nodata_value {
            nodata_cells += 1;
        } else {
            *zone_cells.entry(cell).or_insert(0) += 1;
        }
    }

    for &id in expected_ids {
        if id != nodata_value && !zone_cells.contains_key(&id) {
            log::warn!(
                "Zone {} registered no cells; it is smaller than one cell at the target resolution",
                id
            );
        }
    }

    Ok(RasterSummary {
        columns,
        rows,
        nodata_cells,
        zone_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn populated_fraction_counts_zone_cells() {
        let summary = RasterSummary {
            columns: 10,
            rows: 10,
            nodata_cells: 75,
            zone_cells: HashMap::from([(1, 15), (2, 10)]),
        };
        assert_eq!(summary.total_cells(), 100);
        assert_relative_eq!(summary.populated_fraction(), 0.25);
    }

    #[test]
    fn empty_grid_has_zero_fraction() {
        let summary = RasterSummary {
            columns: 0,
            rows: 0,
            nodata_cells: 0,
            zone_cells: HashMap::new(),
        };
        assert_eq!(summary.populated_fraction(), 0.0);
    }
}
